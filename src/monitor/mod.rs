//! Pin sampling and change propagation.
//!
//! This module holds the hardware-agnostic core: the pin registry, the
//! baseline of last observed levels, the sampling loop that diffs against
//! it, and the encoder that turns change sets into wire messages. The only
//! hardware dependency is the [`PortReader`] trait.

pub mod baseline;
pub mod data;
pub mod encoder;
pub mod reader;
pub mod registry;
pub mod sampler;

// Re-export commonly used items
pub use baseline::{ResetHandle, StateBaseline};
pub use data::{ChangeSet, PinId, PinLevel};
pub use encoder::{ChangeEncoder, PinMessage};
pub use reader::{MemoryRegisters, PortReader, RegisterBank, RegisterPortReader, SimulatedPortReader};
pub use registry::PinRegistry;
pub use sampler::{Cycle, SamplingLoop};

#[cfg(feature = "gpio")]
pub use reader::RppalPortReader;
