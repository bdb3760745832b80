//! One-shot requests against the debug server.
//!
//! Readiness fetch plus the three operator actions. Every request carries a
//! bounded timeout so a dead server cannot wedge the console in a
//! "stopping" state, and every response is applied only after the session
//! epoch check in the operator loop.

use std::time::Duration;

use jointscope_core::config::ConsoleConfig;
use jointscope_core::error::{ConsoleError, Result};
use jointscope_core::session::SessionContext;
use jointscope_protocol::{AdvanceRequest, AdvanceResponse, ReadinessReport};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ActionClient {
    http: reqwest::Client,
    config: ConsoleConfig,
}

impl ActionClient {
    pub fn new(config: ConsoleConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ConsoleError::ActionTransport {
                action: "client".to_string(),
                details: err.to_string(),
            })?;
        Ok(Self { http, config })
    }

    /// Fetches the component readiness map. Any failure is pessimistic: the
    /// caller treats it as "not ready" and keeps no partial report.
    pub async fn fetch_readiness(&self, session: &SessionContext) -> Result<ReadinessReport> {
        let url = self.config.state_url(session.token());
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| ConsoleError::ReadinessFetch(err.to_string()))?;
        if !response.status().is_success() {
            return Err(ConsoleError::ReadinessFetch(format!(
                "server returned {}",
                response.status()
            )));
        }
        response
            .json::<ReadinessReport>()
            .await
            .map_err(|err| ConsoleError::ReadinessFetch(err.to_string()))
    }

    /// Requests `iterate` tacts of inference with `wait` milliseconds
    /// between them. Success here is only the server accepting the request;
    /// the actual effects arrive as push messages.
    pub async fn advance(&self, session: &SessionContext, request: &AdvanceRequest) -> Result<()> {
        request.validate().map_err(ConsoleError::InvalidAction)?;
        let url = self.config.process_tact_url(session.token());
        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|err| transport_error("advance", err))?;
        if !response.status().is_success() {
            return Err(rejected("advance", response.status()));
        }
        let body: AdvanceResponse = response
            .json()
            .await
            .map_err(|err| transport_error("advance", err))?;
        if body.success {
            Ok(())
        } else {
            Err(ConsoleError::ActionRejected {
                action: "advance".to_string(),
                details: "server reported success=false".to_string(),
            })
        }
    }

    /// Requests cooperative termination. Acceptance only starts the stop;
    /// completion is confirmed by the joint stop push.
    pub async fn stop(&self, session: &SessionContext) -> Result<()> {
        let url = self.config.stop_url(session.token());
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| transport_error("stop", err))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(rejected("stop", response.status()))
        }
    }

    pub async fn reset(&self, session: &SessionContext) -> Result<()> {
        let url = self.config.reset_url(session.token());
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| transport_error("reset", err))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(rejected("reset", response.status()))
        }
    }
}

fn transport_error(action: &str, err: reqwest::Error) -> ConsoleError {
    ConsoleError::ActionTransport {
        action: action.to_string(),
        details: err.to_string(),
    }
}

fn rejected(action: &str, status: reqwest::StatusCode) -> ConsoleError {
    ConsoleError::ActionRejected {
        action: action.to_string(),
        details: format!("server returned {}", status),
    }
}
