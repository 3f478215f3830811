//! Synthetic targets for the runner integration tests.

use hyper::{
    service::{make_service_fn, service_fn},
    Body, Request, Response, Server, StatusCode,
};
use nginx_smoke_check::config::Config;
use std::{
    convert::Infallible,
    net::TcpListener,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::time::sleep;

#[derive(Clone, Copy, Debug)]
pub enum Behavior {
    /// Every request gets the same status
    Fixed(u16),
    /// 200 while at most `max_in_flight` requests are being served, 503 above
    /// that. Each request is held for `hold` so a burst overlaps.
    ConnLimited { max_in_flight: usize, hold: Duration },
}

#[derive(Clone)]
struct TargetState {
    behavior: Behavior,
    in_flight: Arc<AtomicUsize>,
    served: Arc<AtomicUsize>,
}

pub struct Target {
    pub port: u16,
    served: Arc<AtomicUsize>,
}

impl Target {
    pub fn served(&self) -> usize {
        self.served.load(Ordering::SeqCst)
    }
}

async fn handle(_req: Request<Body>, state: TargetState) -> Result<Response<Body>, Infallible> {
    state.served.fetch_add(1, Ordering::SeqCst);

    let status = match state.behavior {
        Behavior::Fixed(code) => code,
        Behavior::ConnLimited {
            max_in_flight,
            hold,
        } => {
            let in_flight = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            sleep(hold).await;
            state.in_flight.fetch_sub(1, Ordering::SeqCst);
            if in_flight <= max_in_flight {
                200
            } else {
                503
            }
        }
    };

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    Ok(Response::builder()
        .status(status)
        .body(Body::from(status.to_string()))
        .unwrap())
}

/// Start a target on an ephemeral localhost port.
pub fn spawn_target(behavior: Behavior) -> Target {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let port = listener.local_addr().unwrap().port();

    let state = TargetState {
        behavior,
        in_flight: Arc::new(AtomicUsize::new(0)),
        served: Arc::new(AtomicUsize::new(0)),
    };
    let served = state.served.clone();

    let make_svc = make_service_fn(move |_conn| {
        let st = state.clone();
        async move { Ok::<_, Infallible>(service_fn(move |req| handle(req, st.clone()))) }
    });

    let server = Server::from_tcp(listener).unwrap().serve(make_svc);
    tokio::spawn(async move {
        let _ = server.await;
    });

    Target { port, served }
}

/// A port nothing listens on. Call once per test; the listener is dropped
/// before returning, so each extra call may race with other tests' binds.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

pub fn rate_limited() -> Behavior {
    Behavior::ConnLimited {
        max_in_flight: 5,
        hold: Duration::from_millis(50),
    }
}

pub fn local_config(primary_port: u16, secondary_port: u16) -> Config {
    let mut config = Config::default();
    config.target.host = "127.0.0.1".to_string();
    config.target.primary_port = primary_port;
    config.target.secondary_port = secondary_port;
    config.target.timeout_secs = Some(10);
    config
}
