//! Data structures shared by the sampling and encoding path.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a physical GPIO line (the controller's GPIO number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinId(pub u8);

impl PinId {
    /// The raw GPIO number.
    pub fn number(self) -> u8 {
        self.0
    }
}

impl From<u8> for PinId {
    fn from(pin: u8) -> Self {
        Self(pin)
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Binary level of a pin.
///
/// `Unknown` only ever appears in the baseline, as the initial and reset
/// value. Readers never return it and it is never encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PinLevel {
    /// Line reads low
    Low,
    /// Line reads high
    High,
    /// No observation recorded yet
    #[default]
    Unknown,
}

impl PinLevel {
    /// Wire indicator for a real level: `Low` is 0, `High` is 1.
    pub fn as_bit(self) -> Option<u8> {
        match self {
            PinLevel::Low => Some(0),
            PinLevel::High => Some(1),
            PinLevel::Unknown => None,
        }
    }

    /// Whether this is an observed level rather than the sentinel.
    pub fn is_known(self) -> bool {
        self != PinLevel::Unknown
    }

    /// The opposite real level. `Unknown` stays `Unknown`.
    pub fn toggled(self) -> Self {
        match self {
            PinLevel::Low => PinLevel::High,
            PinLevel::High => PinLevel::Low,
            PinLevel::Unknown => PinLevel::Unknown,
        }
    }
}

impl From<bool> for PinLevel {
    fn from(high: bool) -> Self {
        if high {
            PinLevel::High
        } else {
            PinLevel::Low
        }
    }
}

/// Pins whose level differs from the baseline in one sampling cycle, in
/// registry order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    changes: Vec<(PinId, PinLevel)>,
}

impl ChangeSet {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a change. Callers push in registry order and only real levels.
    pub(crate) fn push(&mut self, pin: PinId, level: PinLevel) {
        debug_assert!(level.is_known(), "Unknown must never enter a change set");
        self.changes.push((pin, level));
    }

    /// Number of changed pins.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Whether no pin changed.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Iterate over the changes in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &(PinId, PinLevel)> {
        self.changes.iter()
    }

    /// Changed pin identifiers in registry order.
    pub fn pins(&self) -> Vec<PinId> {
        self.changes.iter().map(|(pin, _)| *pin).collect()
    }

    /// Level recorded for `pin` in this change set, if it changed.
    pub fn level_of(&self, pin: PinId) -> Option<PinLevel> {
        self.changes
            .iter()
            .find(|(p, _)| *p == pin)
            .map(|(_, level)| *level)
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a (PinId, PinLevel);
    type IntoIter = std::slice::Iter<'a, (PinId, PinLevel)>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_bits() {
        assert_eq!(PinLevel::Low.as_bit(), Some(0));
        assert_eq!(PinLevel::High.as_bit(), Some(1));
        assert_eq!(PinLevel::Unknown.as_bit(), None);
    }

    #[test]
    fn test_unknown_differs_from_real_levels() {
        assert_ne!(PinLevel::Unknown, PinLevel::Low);
        assert_ne!(PinLevel::Unknown, PinLevel::High);
        assert_eq!(PinLevel::default(), PinLevel::Unknown);
    }

    #[test]
    fn test_toggle() {
        assert_eq!(PinLevel::Low.toggled(), PinLevel::High);
        assert_eq!(PinLevel::High.toggled(), PinLevel::Low);
        assert_eq!(PinLevel::Unknown.toggled(), PinLevel::Unknown);
    }

    #[test]
    fn test_change_set_keeps_insertion_order() {
        let mut changes = ChangeSet::new();
        changes.push(PinId(5), PinLevel::High);
        changes.push(PinId(2), PinLevel::Low);

        assert_eq!(changes.pins(), vec![PinId(5), PinId(2)]);
        assert_eq!(changes.level_of(PinId(2)), Some(PinLevel::Low));
        assert_eq!(changes.level_of(PinId(9)), None);
    }
}
