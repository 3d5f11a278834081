//! The periodic sampling loop.

use crate::error::Result;
use crate::monitor::baseline::{ResetHandle, StateBaseline};
use crate::monitor::data::{ChangeSet, PinLevel};
use crate::monitor::encoder::{ChangeEncoder, PinMessage};
use crate::monitor::reader::PortReader;
use crate::monitor::registry::PinRegistry;
use futures_util::stream::{self, BoxStream};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, warn};

/// Result of one sampling pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Reset generation in force for this pass
    pub generation: u64,
    /// Whether the baseline was invalidated before this pass
    pub full_snapshot: bool,
    /// Pins that changed, in registry order
    pub changes: ChangeSet,
}

/// Samples every monitored pin, diffs against the baseline and produces
/// messages for the pins that changed.
///
/// All state the loop needs is held here; the loop is moved into its task
/// or stream when started.
pub struct SamplingLoop<R> {
    registry: Arc<PinRegistry>,
    reader: R,
    baseline: StateBaseline,
    reset: ResetHandle,
    applied_generation: u64,
    primed: bool,
    encoder: ChangeEncoder,
    interval: Duration,
}

impl<R: PortReader> SamplingLoop<R> {
    /// Create a loop over `registry`, reading through `reader`.
    pub fn new(
        registry: Arc<PinRegistry>,
        reader: R,
        reset: ResetHandle,
        interval: Duration,
    ) -> Self {
        let baseline = StateBaseline::new(&registry);
        let applied_generation = reset.current();
        Self {
            registry,
            reader,
            baseline,
            reset,
            applied_generation,
            primed: false,
            encoder: ChangeEncoder::new(),
            interval,
        }
    }

    /// Handle for requesting a full resync from another context.
    pub fn reset_handle(&self) -> ResetHandle {
        self.reset.clone()
    }

    /// The monitored pins.
    pub fn registry(&self) -> &Arc<PinRegistry> {
        &self.registry
    }

    /// Current baseline contents.
    pub fn baseline(&self) -> &StateBaseline {
        &self.baseline
    }

    /// Sampling period.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one pass over the registry.
    ///
    /// A pending reset request is applied first, so every pin is reported.
    /// A pin whose read fails is logged and left untouched for this pass.
    pub fn sample(&mut self) -> Cycle {
        let generation = self.reset.current();
        let mut full_snapshot = !self.primed;
        if generation != self.applied_generation {
            self.baseline.reset_all();
            self.applied_generation = generation;
            full_snapshot = true;
        }
        self.primed = true;

        let mut changes = ChangeSet::new();
        for (index, pin) in self.registry.iter().enumerate() {
            let level = match self.reader.read_level(pin) {
                Ok(PinLevel::Unknown) => {
                    warn!(pin = %pin, reader = self.reader.name(), "Reader returned no level");
                    continue;
                }
                Ok(level) => level,
                Err(e) => {
                    warn!(pin = %pin, reader = self.reader.name(), "Failed to read pin: {}", e);
                    continue;
                }
            };

            if level != self.baseline.get(index) {
                changes.push(pin, level);
                self.baseline.update(index, level);
            }
        }

        Cycle {
            generation,
            full_snapshot,
            changes,
        }
    }

    /// Run one pass and encode the result. Returns `None` when nothing changed.
    pub fn next_message(&mut self) -> Result<Option<PinMessage>> {
        let cycle = self.sample();
        if cycle.changes.is_empty() {
            return Ok(None);
        }

        let payload = self.encoder.encode(&cycle.changes)?;
        debug!(
            generation = cycle.generation,
            changed = cycle.changes.len(),
            full_snapshot = cycle.full_snapshot,
            "Pin levels changed"
        );
        Ok(Some(PinMessage {
            generation: cycle.generation,
            full_snapshot: cycle.full_snapshot,
            payload,
        }))
    }
}

impl<R: PortReader + 'static> SamplingLoop<R> {
    /// Sample forever at the configured interval, yielding a message for
    /// every pass in which at least one pin changed.
    pub fn into_stream(self) -> BoxStream<'static, PinMessage> {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let stream = stream::unfold((self, ticker), |(mut sampler, mut ticker)| async move {
            loop {
                ticker.tick().await;
                match sampler.next_message() {
                    Ok(Some(message)) => return Some((message, (sampler, ticker))),
                    Ok(None) => {}
                    Err(e) => error!("Failed to encode pin changes: {}", e),
                }
            }
        });

        Box::pin(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::data::PinId;
    use crate::monitor::reader::SimulatedPortReader;
    use futures_util::StreamExt;

    fn sampler(pins: &[u8]) -> (SamplingLoop<SimulatedPortReader>, SimulatedPortReader) {
        let registry = Arc::new(PinRegistry::from_pins(pins.iter().copied()).unwrap());
        let reader = SimulatedPortReader::with_pins(pins.iter().copied());
        let driver = reader.clone();
        let sampler = SamplingLoop::new(
            registry,
            reader,
            ResetHandle::new(),
            Duration::from_millis(50),
        );
        (sampler, driver)
    }

    #[test]
    fn test_first_pass_reports_everything() {
        let (mut sampler, _) = sampler(&[2, 4, 5]);
        let cycle = sampler.sample();
        assert!(cycle.full_snapshot);
        assert_eq!(cycle.changes.pins(), vec![PinId(2), PinId(4), PinId(5)]);
    }

    #[test]
    fn test_identical_reads_emit_nothing() {
        let (mut sampler, _) = sampler(&[2, 4]);
        assert!(sampler.next_message().unwrap().is_some());
        assert!(sampler.next_message().unwrap().is_none());
        assert!(sampler.next_message().unwrap().is_none());
    }

    #[test]
    fn test_reset_request_forces_full_snapshot() {
        let (mut sampler, _) = sampler(&[2, 4, 5]);
        sampler.sample();
        let handle = sampler.reset_handle();
        let generation = handle.request_reset();

        let cycle = sampler.sample();
        assert_eq!(cycle.generation, generation);
        assert!(cycle.full_snapshot);
        assert_eq!(cycle.changes.len(), 3);

        let cycle = sampler.sample();
        assert!(!cycle.full_snapshot);
        assert!(cycle.changes.is_empty());
    }

    #[test]
    fn test_failed_read_leaves_baseline() {
        let (mut sampler, driver) = sampler(&[2, 4]);
        sampler.sample();

        driver.set_level(PinId(2), PinLevel::Unknown);
        driver.set_level(PinId(4), PinLevel::High);
        let cycle = sampler.sample();
        assert_eq!(cycle.changes.pins(), vec![PinId(4)]);
        assert_eq!(sampler.baseline().get(0), PinLevel::Low);

        driver.set_level(PinId(2), PinLevel::Low);
        assert!(sampler.sample().changes.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_skips_quiet_cycles() {
        let (sampler, driver) = sampler(&[3]);
        let mut stream = sampler.into_stream();

        let first = stream.next().await.unwrap();
        assert_eq!(first.payload, r#"{"3":0}"#);

        driver.set_level(PinId(3), PinLevel::High);
        let second = stream.next().await.unwrap();
        assert_eq!(second.payload, r#"{"3":1}"#);
        assert!(!second.full_snapshot);
    }
}
