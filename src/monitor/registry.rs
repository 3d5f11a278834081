//! The fixed, ordered set of monitored pins.

use crate::board::BoardDescription;
use crate::error::{Result, ViewerError};
use crate::monitor::data::PinId;

/// Immutable ordered set of monitored pins, fixed at startup.
///
/// Duplicates in an explicit list are kept as given; callers are expected
/// not to supply them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRegistry {
    pins: Vec<PinId>,
}

impl PinRegistry {
    /// Build a registry from an explicit caller-supplied list.
    ///
    /// An empty list is a configuration error.
    pub fn from_pins<I, P>(pins: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PinId>,
    {
        let pins: Vec<PinId> = pins.into_iter().map(Into::into).collect();
        if pins.is_empty() {
            return Err(ViewerError::config_error(
                "explicit pin list must contain at least one pin",
            ));
        }
        Ok(Self { pins })
    }

    /// Build a registry monitoring every GPIO the board exposes.
    pub fn from_board(board: &BoardDescription) -> Result<Self> {
        Self::from_pins(board.gpio_pins()).map_err(|_| {
            ViewerError::config_error(format!("board '{}' exposes no GPIO pins", board.name))
        })
    }

    /// Number of monitored pins.
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    /// Whether no pins are monitored.
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Monitored pins in declared order.
    pub fn pins(&self) -> &[PinId] {
        &self.pins
    }

    /// Iterate monitored pins in declared order.
    pub fn iter(&self) -> impl Iterator<Item = PinId> + '_ {
        self.pins.iter().copied()
    }

    /// Whether `pin` is monitored. Never fails for unknown pins.
    pub fn is_monitored(&self, pin: PinId) -> bool {
        self.pins.contains(&pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_list_keeps_order() {
        let registry = PinRegistry::from_pins([5u8, 2, 4]).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.pins(), &[PinId(5), PinId(2), PinId(4)]);
    }

    #[test]
    fn test_empty_list_rejected() {
        let result = PinRegistry::from_pins(Vec::<u8>::new());
        assert!(matches!(result, Err(ViewerError::Config(_))));
    }

    #[test]
    fn test_membership() {
        let registry = PinRegistry::from_pins([2u8, 4, 5]).unwrap();
        assert!(registry.is_monitored(PinId(4)));
        assert!(!registry.is_monitored(PinId(3)));
        assert!(!registry.is_monitored(PinId(255)));
    }

    #[test]
    fn test_duplicates_not_removed() {
        let registry = PinRegistry::from_pins([2u8, 2]).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_from_board() {
        let board = BoardDescription::raspberry_pi_40();
        let registry = PinRegistry::from_board(&board).unwrap();
        assert_eq!(registry.len(), board.gpio_pins().len());
        assert!(registry.is_monitored(PinId(17)));
    }
}
