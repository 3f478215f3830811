// src/lib.rs
pub mod checks;
pub mod config;
pub mod metrics;
pub mod runner;
