//! # GPIO Viewer - live pin state in the browser
//!
//! Samples a fixed set of GPIO lines at a fixed interval and streams every
//! change to connected WebSocket observers as a flat JSON object such as
//! `{"2": 1, "4": 0}`. A newly connected observer always starts from a full
//! snapshot of every monitored pin.
//!
//! ## Features
//!
//! - **Change-only streaming**: a message is sent only when a pin changed
//! - **Resync on connect**: each connect forces a full snapshot
//! - **Pluggable hardware access**: register-mapped, rppal (feature `gpio`) or simulated
//! - **Dashboard**: one indicator per monitored pin, laid out by board header
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gpio_viewer::{start_web_server, SimulatedPortReader, ViewerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ViewerConfig::default().with_pins(vec![2, 4, 5]);
//!     let reader = SimulatedPortReader::with_pins([2u8, 4, 5]);
//!     start_web_server(config, reader).await?;
//!     Ok(())
//! }
//! ```

pub mod board;
pub mod config;
pub mod error;
pub mod monitor;
pub mod web;

// Re-export public API
pub use board::{BoardDescription, BoardPin};
pub use config::{PinSelection, ViewerConfig};
pub use error::{Result, ViewerError};
pub use monitor::{
    ChangeEncoder, ChangeSet, Cycle, MemoryRegisters, PinId, PinLevel, PinMessage, PinRegistry,
    PortReader, RegisterBank, RegisterPortReader, ResetHandle, SamplingLoop, SimulatedPortReader,
    StateBaseline,
};

#[cfg(feature = "gpio")]
pub use monitor::RppalPortReader;

pub use web::{start_web_server, Broadcaster, ConnectionLifecycle, Viewer, WebConfig};

/// The default sampling interval in milliseconds
pub const DEFAULT_INTERVAL_MS: u64 = 50;

/// The default web server port
pub const DEFAULT_WEB_PORT: u16 = 8080;

/// The default WebSocket route
pub const DEFAULT_WS_PATH: &str = "/ws";
