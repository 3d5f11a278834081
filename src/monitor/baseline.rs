//! Last-observed pin levels and the reset request slot.
//!
//! The baseline itself is owned by the sampling loop. Other execution
//! contexts never touch it directly: they raise a reset request through a
//! [`ResetHandle`], and the loop applies it at the start of its next cycle.

use crate::monitor::data::{PinId, PinLevel};
use crate::monitor::registry::PinRegistry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Last observed level per monitored pin, parallel to the registry.
#[derive(Debug, Clone)]
pub struct StateBaseline {
    levels: Vec<PinLevel>,
}

impl StateBaseline {
    /// Create a baseline with every entry `Unknown`.
    pub fn new(registry: &PinRegistry) -> Self {
        Self {
            levels: vec![PinLevel::Unknown; registry.len()],
        }
    }

    /// Set every entry back to `Unknown` so the next pass reports all pins.
    pub fn reset_all(&mut self) {
        self.levels.fill(PinLevel::Unknown);
    }

    /// Level recorded at registry `index`.
    pub fn get(&self, index: usize) -> PinLevel {
        self.levels.get(index).copied().unwrap_or_default()
    }

    /// Overwrite the entry at registry `index`.
    pub fn update(&mut self, index: usize, level: PinLevel) {
        if let Some(slot) = self.levels.get_mut(index) {
            *slot = level;
        }
    }

    /// Number of entries, always equal to the registry length.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether the baseline has no entries.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Pairs of pin and recorded level, in registry order.
    pub fn snapshot(&self, registry: &PinRegistry) -> Vec<(PinId, PinLevel)> {
        registry.iter().zip(self.levels.iter().copied()).collect()
    }
}

/// Cloneable handle used to request a full baseline reset.
///
/// Requests are a monotonically increasing generation number. The sampling
/// loop compares it against the last generation it applied.
#[derive(Debug, Clone, Default)]
pub struct ResetHandle {
    generation: Arc<AtomicU64>,
}

impl ResetHandle {
    /// Create a handle with no pending request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a reset and return the generation that satisfies it.
    ///
    /// Any message stamped with this generation or a later one was produced
    /// by a cycle that started after the reset was applied.
    pub fn request_reset(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// The most recently requested generation.
    pub fn current(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}
