//! Port readers: the only hardware-specific seam.
//!
//! Everything downstream of [`PortReader`] is hardware agnostic. Register
//! layouts, chip drivers and simulations live behind this trait and can be
//! swapped without touching the sampling loop.

use crate::error::{Result, ViewerError};
use crate::monitor::data::{PinId, PinLevel};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Reads the instantaneous level of a pin.
pub trait PortReader: Send {
    /// Read `pin`. Implementations return `Low` or `High`, never `Unknown`.
    fn read_level(&mut self, pin: PinId) -> Result<PinLevel>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

impl<R: PortReader + ?Sized> PortReader for Box<R> {
    fn read_level(&mut self, pin: PinId) -> Result<PinLevel> {
        (**self).read_level(pin)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// A set of 32-bit input status registers.
pub trait RegisterBank: Send {
    /// Read input register `index` (0 covers GPIO 0-31, 1 covers 32-63, ...).
    fn read_bank(&mut self, index: usize) -> Result<u32>;
}

/// Port reader for controllers that expose pin levels as bits of 32-bit
/// input registers: pin `n` is bit `n % 32` of register `n / 32`.
#[derive(Debug)]
pub struct RegisterPortReader<B> {
    bank: B,
}

impl<B: RegisterBank> RegisterPortReader<B> {
    /// Wrap a register bank.
    pub fn new(bank: B) -> Self {
        Self { bank }
    }

    /// Access the underlying bank.
    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }
}

impl<B: RegisterBank> PortReader for RegisterPortReader<B> {
    fn read_level(&mut self, pin: PinId) -> Result<PinLevel> {
        let number = pin.number();
        let word = self.bank.read_bank(usize::from(number / 32))?;
        Ok(PinLevel::from((word >> (number % 32)) & 0x1 == 1))
    }

    fn name(&self) -> &'static str {
        "register"
    }
}

/// In-memory register bank.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegisters {
    words: Vec<u32>,
}

impl MemoryRegisters {
    /// Create `banks` registers, all zero.
    pub fn new(banks: usize) -> Self {
        Self {
            words: vec![0; banks],
        }
    }

    /// Overwrite a whole register.
    pub fn set_word(&mut self, index: usize, word: u32) {
        if let Some(slot) = self.words.get_mut(index) {
            *slot = word;
        }
    }

    /// Set or clear the bit for a single pin.
    pub fn set_pin(&mut self, pin: PinId, high: bool) {
        let number = pin.number();
        if let Some(word) = self.words.get_mut(usize::from(number / 32)) {
            let mask = 1u32 << (number % 32);
            if high {
                *word |= mask;
            } else {
                *word &= !mask;
            }
        }
    }
}

impl RegisterBank for MemoryRegisters {
    fn read_bank(&mut self, index: usize) -> Result<u32> {
        self.words.get(index).copied().ok_or_else(|| {
            let first_pin = u8::try_from(index.saturating_mul(32)).unwrap_or(u8::MAX);
            ViewerError::hardware_error(first_pin, format!("no input register {}", index))
        })
    }
}

/// Simulated pins backed by a shared level table.
///
/// Clones share the same table, so a test or demo task can drive levels
/// while the sampling loop reads them.
#[derive(Debug, Clone, Default)]
pub struct SimulatedPortReader {
    levels: Arc<RwLock<HashMap<PinId, PinLevel>>>,
}

impl SimulatedPortReader {
    /// Create a simulation with no pins present.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a simulation where every listed pin starts low.
    pub fn with_pins<I, P>(pins: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PinId>,
    {
        let reader = Self::new();
        for pin in pins {
            reader.set_level(pin.into(), PinLevel::Low);
        }
        reader
    }

    /// Drive `pin` to `level`. Setting `Unknown` removes the pin, which makes
    /// subsequent reads fail.
    pub fn set_level(&self, pin: PinId, level: PinLevel) {
        let mut levels = match self.levels.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if level.is_known() {
            levels.insert(pin, level);
        } else {
            levels.remove(&pin);
        }
    }

    /// Drive several pins at once.
    pub fn set_levels<I>(&self, levels: I)
    where
        I: IntoIterator<Item = (PinId, PinLevel)>,
    {
        for (pin, level) in levels {
            self.set_level(pin, level);
        }
    }

    /// Flip `pin` and return its new level.
    pub fn toggle(&self, pin: PinId) -> PinLevel {
        let next = self.peek(pin).unwrap_or(PinLevel::High).toggled();
        self.set_level(pin, next);
        next
    }

    /// Current simulated level, if the pin is present.
    pub fn peek(&self, pin: PinId) -> Option<PinLevel> {
        let levels = match self.levels.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        levels.get(&pin).copied()
    }
}

impl PortReader for SimulatedPortReader {
    fn read_level(&mut self, pin: PinId) -> Result<PinLevel> {
        self.peek(pin)
            .ok_or_else(|| ViewerError::hardware_error(pin.number(), "pin not present"))
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

#[cfg(feature = "gpio")]
mod raspberry_pi {
    use super::*;
    use rppal::gpio::{Gpio, Level, Pin};

    /// Raspberry Pi port reader using rppal.
    ///
    /// Pins are fetched once and cached. Reading does not change a pin's
    /// mode, so outputs driven by other processes are observed as-is.
    pub struct RppalPortReader {
        gpio: Gpio,
        pins: HashMap<u8, Pin>,
    }

    impl RppalPortReader {
        /// Open the GPIO peripheral.
        pub fn new() -> Result<Self> {
            let gpio = Gpio::new().map_err(|e| {
                ViewerError::gpio_error(format!("Failed to initialize GPIO: {}", e))
            })?;

            Ok(Self {
                gpio,
                pins: HashMap::new(),
            })
        }
    }

    impl PortReader for RppalPortReader {
        fn read_level(&mut self, pin: PinId) -> Result<PinLevel> {
            let number = pin.number();
            if !self.pins.contains_key(&number) {
                let gpio_pin = self.gpio.get(number).map_err(|e| {
                    ViewerError::hardware_error(number, format!("failed to access pin: {}", e))
                })?;
                self.pins.insert(number, gpio_pin);
            }

            let level = match self.pins.get(&number) {
                Some(gpio_pin) => gpio_pin.read(),
                None => return Err(ViewerError::hardware_error(number, "pin not cached")),
            };

            Ok(match level {
                Level::High => PinLevel::High,
                Level::Low => PinLevel::Low,
            })
        }

        fn name(&self) -> &'static str {
            "rppal"
        }
    }
}

#[cfg(feature = "gpio")]
pub use raspberry_pi::RppalPortReader;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_bit_mapping() {
        let mut registers = MemoryRegisters::new(2);
        registers.set_word(0, 0b10100);
        registers.set_word(1, 0b1);
        let mut reader = RegisterPortReader::new(registers);

        assert_eq!(reader.read_level(PinId(2)).unwrap(), PinLevel::High);
        assert_eq!(reader.read_level(PinId(3)).unwrap(), PinLevel::Low);
        assert_eq!(reader.read_level(PinId(4)).unwrap(), PinLevel::High);
        assert_eq!(reader.read_level(PinId(32)).unwrap(), PinLevel::High);
        assert_eq!(reader.read_level(PinId(33)).unwrap(), PinLevel::Low);
    }

    #[test]
    fn test_register_set_pin() {
        let mut reader = RegisterPortReader::new(MemoryRegisters::new(2));
        reader.bank_mut().set_pin(PinId(39), true);
        assert_eq!(reader.read_level(PinId(39)).unwrap(), PinLevel::High);
        reader.bank_mut().set_pin(PinId(39), false);
        assert_eq!(reader.read_level(PinId(39)).unwrap(), PinLevel::Low);
    }

    #[test]
    fn test_missing_register_is_hardware_error() {
        let mut reader = RegisterPortReader::new(MemoryRegisters::new(1));
        let result = reader.read_level(PinId(40));
        assert!(matches!(result, Err(ViewerError::Hardware { .. })));
    }

    #[test]
    fn test_simulated_reader_shares_state() {
        let mut reader = SimulatedPortReader::with_pins([2u8]);
        let driver = reader.clone();

        assert_eq!(reader.read_level(PinId(2)).unwrap(), PinLevel::Low);
        driver.set_level(PinId(2), PinLevel::High);
        assert_eq!(reader.read_level(PinId(2)).unwrap(), PinLevel::High);
        assert_eq!(driver.toggle(PinId(2)), PinLevel::Low);
        assert_eq!(reader.read_level(PinId(2)).unwrap(), PinLevel::Low);
    }

    #[test]
    fn test_simulated_reader_missing_pin() {
        let mut reader = SimulatedPortReader::new();
        let result = reader.read_level(PinId(7));
        assert!(matches!(result, Err(ViewerError::Hardware { pin: 7, .. })));
    }

    #[test]
    fn test_boxed_reader() {
        let mut reader: Box<dyn PortReader> = Box::new(SimulatedPortReader::with_pins([1u8]));
        assert_eq!(reader.name(), "simulated");
        assert_eq!(reader.read_level(PinId(1)).unwrap(), PinLevel::Low);
    }
}
