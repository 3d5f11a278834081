//! Wire encoding of change sets.
//!
//! A message is a flat JSON object mapping the decimal pin number to `0` or
//! `1`, e.g. `{"2":1,"4":0}`. Keys appear in registry order.

use crate::error::{Result, ViewerError};
use crate::monitor::data::ChangeSet;
use serde::Serialize;
use serde_json::{Map, Value};

/// One encoded message ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinMessage {
    /// Reset generation observed at the start of the producing cycle
    pub generation: u64,
    /// Whether the cycle followed a baseline reset and reports every pin
    pub full_snapshot: bool,
    /// JSON payload sent to observers
    pub payload: String,
}

/// Serializes change sets into the wire format.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeEncoder;

impl ChangeEncoder {
    /// Create an encoder.
    pub fn new() -> Self {
        Self
    }

    /// Build the key/value structure for `changes`.
    pub fn to_value(&self, changes: &ChangeSet) -> Result<Value> {
        if changes.is_empty() {
            return Err(ViewerError::encode_error("refusing to encode an empty change set"));
        }

        let mut object = Map::with_capacity(changes.len());
        for (pin, level) in changes {
            let bit = level.as_bit().ok_or_else(|| {
                ViewerError::encode_error(format!("pin {} has no observed level", pin))
            })?;
            object.insert(pin.to_string(), Value::from(bit));
        }
        Ok(Value::Object(object))
    }

    /// Encode `changes` as the JSON text sent on the wire.
    pub fn encode(&self, changes: &ChangeSet) -> Result<String> {
        let value = self.to_value(changes)?;
        Ok(serde_json::to_string(&value)?)
    }
}
