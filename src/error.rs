//! Error handling for the GPIO viewer crate.

/// A specialized `Result` type for GPIO viewer operations.
pub type Result<T> = std::result::Result<T, ViewerError>;

/// The main error type for GPIO viewer operations.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration rejected at construction time
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading a pin level from the hardware failed
    #[error("Hardware read failed for pin {pin}: {message}")]
    Hardware {
        /// Pin that could not be read
        pin: u8,
        /// Description of the failure
        message: String,
    },

    /// Building a wire message failed
    #[error("Encoding error: {0}")]
    Encode(String),

    /// Web server error
    #[error("Web server error: {0}")]
    WebServer(String),

    /// GPIO peripheral could not be initialised (only available with gpio feature)
    #[cfg(feature = "gpio")]
    #[error("GPIO error: {0}")]
    Gpio(String),
}

impl ViewerError {
    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new hardware read error for `pin`
    pub fn hardware_error(pin: u8, msg: impl Into<String>) -> Self {
        Self::Hardware {
            pin,
            message: msg.into(),
        }
    }

    /// Create a new encoding error
    pub fn encode_error(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Create a new web server error
    pub fn web_server_error(msg: impl Into<String>) -> Self {
        Self::WebServer(msg.into())
    }

    /// Create a new GPIO error
    #[cfg(feature = "gpio")]
    pub fn gpio_error(msg: impl Into<String>) -> Self {
        Self::Gpio(msg.into())
    }
}

impl From<serde_json::Error> for ViewerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encode(err.to_string())
    }
}
