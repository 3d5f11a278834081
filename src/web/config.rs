//! Listener and observer settings for the pin dashboard.

use serde::{Deserialize, Serialize};

/// Observers admitted at once unless configured otherwise.
pub const DEFAULT_MAX_OBSERVERS: usize = 100;

/// Where the dashboard listens and how many observers it admits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Interface the dashboard listens on
    pub host: String,
    /// TCP port for the dashboard and the pin stream
    pub port: u16,
    /// Route observers connect to
    pub ws_path: String,
    /// Allow cross-origin observers
    pub enable_cors: bool,
    /// Observers admitted at once; further connects get 503
    pub max_observers: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: crate::DEFAULT_WEB_PORT,
            ws_path: crate::DEFAULT_WS_PATH.to_string(),
            enable_cors: true,
            max_observers: DEFAULT_MAX_OBSERVERS,
        }
    }
}

impl WebConfig {
    /// Listen on `host:port` with default observer settings.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Serve the pin stream on `path` instead of `/ws`.
    pub fn with_ws_path(mut self, path: impl Into<String>) -> Self {
        self.ws_path = path.into();
        self
    }

    /// Toggle the permissive CORS layer for browser observers on other origins.
    pub fn with_cors(mut self, enable_cors: bool) -> Self {
        self.enable_cors = enable_cors;
        self
    }

    /// Cap concurrent observers. Zero is rejected at validation.
    pub fn with_max_observers(mut self, max: usize) -> Self {
        self.max_observers = max;
        self
    }

    /// `host:port` as handed to the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
