//! Endpoint configuration.
//!
//! The console talks to one debug server over HTTP (readiness + actions) and
//! one WebSocket endpoint (live pushes). Both bases can be overridden via
//! CLI flags or environment; defaults point at a local server.

use url::Url;

use crate::error::{ConsoleError, Result};

pub const API_URL_ENV: &str = "JOINTSCOPE_API_URL";
pub const WS_URL_ENV: &str = "JOINTSCOPE_WS_URL";

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_WS_URL: &str = "ws://127.0.0.1:8000";

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    api_base: Url,
    ws_base: Url,
}

impl ConsoleConfig {
    /// Resolves the endpoint bases: explicit override, then environment,
    /// then the local default.
    pub fn resolve(api_override: Option<&str>, ws_override: Option<&str>) -> Result<Self> {
        let api = resolve_base(api_override, API_URL_ENV, DEFAULT_API_URL)?;
        let ws = resolve_base(ws_override, WS_URL_ENV, DEFAULT_WS_URL)?;
        Ok(Self {
            api_base: api,
            ws_base: ws,
        })
    }

    pub fn state_url(&self, token: &str) -> Url {
        self.api_endpoint("api/state", token)
    }

    pub fn process_tact_url(&self, token: &str) -> Url {
        self.api_endpoint("api/process_tact", token)
    }

    pub fn stop_url(&self, token: &str) -> Url {
        self.api_endpoint("api/stop", token)
    }

    pub fn reset_url(&self, token: &str) -> Url {
        self.api_endpoint("api/reset", token)
    }

    /// The streaming endpoint authenticates via `auth_token` rather than
    /// `token`; that is what the debug server expects on its WebSocket route.
    pub fn ws_url(&self, token: &str) -> Url {
        let mut url = self.ws_base.clone();
        url.set_path("api/ws");
        url.query_pairs_mut().append_pair("auth_token", token);
        url
    }

    fn api_endpoint(&self, path: &str, token: &str) -> Url {
        let mut url = self.api_base.clone();
        url.set_path(path);
        url.query_pairs_mut().append_pair("token", token);
        url
    }
}

fn resolve_base(explicit: Option<&str>, env_key: &str, default: &str) -> Result<Url> {
    let raw = match explicit {
        Some(value) => value.to_string(),
        None => std::env::var(env_key).unwrap_or_else(|_| default.to_string()),
    };
    Url::parse(raw.trim_end_matches('/'))
        .map_err(|err| ConsoleError::InvalidConfig(format!("bad base URL {}: {}", raw, err)))
}
