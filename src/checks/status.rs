// src/checks/status.rs
use super::{port_of, Check, CheckError, CheckResult, Expectation, Observation};
use crate::metrics::Timer;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

/// A single GET whose status must match exactly.
pub struct StatusCheck {
    name: &'static str,
    url: Url,
    expected: u16,
}

impl StatusCheck {
    pub fn new(name: &'static str, url: Url, expected: u16) -> Self {
        Self {
            name,
            url,
            expected,
        }
    }
}

#[async_trait]
impl Check for StatusCheck {
    async fn run(&self, client: &Client) -> CheckResult {
        let port = port_of(&self.url);
        let expected = Expectation::Status {
            code: self.expected,
        };
        let timer = Timer::new();

        match client.get(self.url.clone()).send().await {
            Ok(response) => {
                let actual = response.status().as_u16();
                debug!(url = %self.url, status = actual, "response received");

                if actual == self.expected {
                    CheckResult::pass(
                        self.name,
                        expected,
                        Observation::Status { code: actual },
                        format!("port {} returned status {}", port, actual),
                        timer.elapsed(),
                    )
                } else {
                    CheckResult::fail(
                        self.name,
                        expected,
                        Observation::Status { code: actual },
                        CheckError::UnexpectedStatus {
                            port,
                            expected: self.expected,
                            actual,
                        },
                        timer.elapsed(),
                    )
                }
            }
            Err(source) => CheckResult::fail(
                self.name,
                expected,
                Observation::Error {
                    message: source.to_string(),
                },
                CheckError::Transport { port, source },
                timer.elapsed(),
            ),
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
