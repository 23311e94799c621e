//! environment::address
//!
//! Where the application answers, and when.
//!
//! The published address comes from `docker compose port`; a wildcard bind
//! is shown as loopback. If the query fails or prints nothing usable, the
//! configured default URL is used. Readiness is then polled over HTTP.

use std::thread;
use std::time::{Duration, Instant};

use super::compose::Compose;
use crate::core::types::HostPort;
use crate::process::{run_escalated, CommandRunner};

/// Per-request timeout of a readiness check.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Answers whether a URL is serving.
pub trait ReadyCheck {
    fn is_ready(&self, url: &str) -> bool;
}

/// HTTP GET readiness check. Any response, whatever its status, counts as ready.
#[derive(Debug, Clone)]
pub struct HttpReadyCheck {
    client: reqwest::blocking::Client,
}

impl HttpReadyCheck {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

impl ReadyCheck for HttpReadyCheck {
    fn is_ready(&self, url: &str) -> bool {
        match self.client.get(url).send() {
            Ok(response) => {
                tracing::debug!(url, status = %response.status(), "server answered");
                true
            }
            Err(err) => {
                tracing::debug!(url, error = %err, "request failed");
                false
            }
        }
    }
}

/// Outcome of [`wait_until_reachable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready { attempts: u32 },
    TimedOut { attempts: u32 },
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready { .. })
    }
}

/// Ask `compose` where `service`'s `container_port` is published.
///
/// Uses the same sudo retry as other compose steps, but never fails:
/// falls back to `default_url`.
pub fn resolve_url(
    runner: &dyn CommandRunner,
    compose: &Compose,
    service: &str,
    container_port: u16,
    default_url: &str,
) -> String {
    let query = compose.port(service, container_port);
    let result = run_escalated(runner, &query, |err| {
        tracing::debug!(error = %err, "port query failed, retrying with sudo");
    });

    let stdout = match result {
        Ok(done) => done.output.stdout,
        Err(err) => {
            tracing::debug!(error = %err, fallback = default_url, "port query failed");
            return default_url.to_string();
        }
    };

    match HostPort::parse(&stdout) {
        Ok(published) => {
            tracing::debug!(%published, "published address");
            published.url()
        }
        Err(err) => {
            tracing::debug!(error = %err, fallback = default_url, "unusable port output");
            default_url.to_string()
        }
    }
}

/// Poll `url` every `interval` until it answers or `timeout` has elapsed.
///
/// A `timeout` too large to represent as an instant waits without a deadline.
pub fn wait_until_reachable(
    check: &dyn ReadyCheck,
    url: &str,
    timeout: Duration,
    interval: Duration,
) -> Readiness {
    let deadline = Instant::now().checked_add(timeout);
    let mut attempts: u32 = 0;

    loop {
        attempts = attempts.saturating_add(1);
        if check.is_ready(url) {
            return Readiness::Ready { attempts };
        }

        let pause = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    tracing::debug!(url, attempts, "readiness wait timed out");
                    return Readiness::TimedOut { attempts };
                }
                interval.min(deadline - now)
            }
            None => interval,
        };
        thread::sleep(pause);
    }
}
