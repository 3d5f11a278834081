//! Top-level viewer configuration.

use crate::board::{BoardDescription, DEFAULT_BOARD};
use crate::error::{Result, ViewerError};
use crate::monitor::PinRegistry;
use crate::web::WebConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which pins to monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinSelection {
    /// Every GPIO the board description lists
    All,
    /// An explicit list, in the order given
    Explicit(Vec<u8>),
}

impl Default for PinSelection {
    fn default() -> Self {
        Self::All
    }
}

/// Configuration read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Sampling period in milliseconds
    pub sampling_interval_ms: u64,
    /// Monitored pin set
    pub pins: PinSelection,
    /// Board description name
    pub board: String,
    /// Web server settings
    pub web: WebConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            sampling_interval_ms: crate::DEFAULT_INTERVAL_MS,
            pins: PinSelection::All,
            board: DEFAULT_BOARD.to_string(),
            web: WebConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Set the sampling interval.
    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.sampling_interval_ms = interval_ms;
        self
    }

    /// Monitor an explicit list of pins.
    pub fn with_pins(mut self, pins: Vec<u8>) -> Self {
        self.pins = PinSelection::Explicit(pins);
        self
    }

    /// Monitor every pin of the board.
    pub fn with_all_pins(mut self) -> Self {
        self.pins = PinSelection::All;
        self
    }

    /// Select the board description.
    pub fn with_board(mut self, board: impl Into<String>) -> Self {
        self.board = board.into();
        self
    }

    /// Replace the web settings.
    pub fn with_web(mut self, web: WebConfig) -> Self {
        self.web = web;
        self
    }

    /// Sampling interval as a duration.
    pub fn sampling_interval(&self) -> Duration {
        Duration::from_millis(self.sampling_interval_ms)
    }

    /// Check the configuration without building anything.
    pub fn validate(&self) -> Result<()> {
        if self.sampling_interval_ms == 0 {
            return Err(ViewerError::config_error(
                "sampling interval must be greater than zero",
            ));
        }
        if let PinSelection::Explicit(pins) = &self.pins {
            if pins.is_empty() {
                return Err(ViewerError::config_error(
                    "explicit pin list must contain at least one pin",
                ));
            }
        }
        if self.web.max_observers == 0 {
            return Err(ViewerError::config_error(
                "observer limit must allow at least one observer",
            ));
        }
        if !self.web.ws_path.starts_with('/') {
            return Err(ViewerError::config_error(format!(
                "websocket path '{}' must start with '/'",
                self.web.ws_path
            )));
        }
        self.board_description().map(|_| ())
    }

    /// Resolve the configured board description.
    pub fn board_description(&self) -> Result<BoardDescription> {
        BoardDescription::by_name(&self.board)
            .ok_or_else(|| ViewerError::config_error(format!("unknown board '{}'", self.board)))
    }

    /// Build the pin registry for this configuration.
    pub fn registry(&self) -> Result<PinRegistry> {
        match &self.pins {
            PinSelection::All => PinRegistry::from_board(&self.board_description()?),
            PinSelection::Explicit(pins) => PinRegistry::from_pins(pins.iter().copied()),
        }
    }
}
