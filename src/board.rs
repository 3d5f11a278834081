//! Built-in board descriptions.
//!
//! A board description maps GPIO numbers to their position on the board's
//! header. It supplies the default "monitor everything" pin set and the
//! layout used by the dashboard page.

use serde::{Deserialize, Serialize};

/// One GPIO exposed on a board header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardPin {
    /// Controller GPIO number
    pub gpio: u8,
    /// Physical header position (1-based)
    pub header_pin: u8,
    /// Silkscreen label
    pub label: String,
}

/// Static description of a development board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDescription {
    /// Short identifier used on the command line
    pub name: String,
    /// Human readable title
    pub title: String,
    /// Header pins that carry a GPIO, in header order
    pub pins: Vec<BoardPin>,
}

/// Names accepted by [`BoardDescription::by_name`].
pub const BOARD_NAMES: &[&str] = &["raspberry-pi-40", "esp32-devkit-38"];

/// Default board when none is configured.
pub const DEFAULT_BOARD: &str = "raspberry-pi-40";

// (header pin, BCM GPIO)
const RASPBERRY_PI_40: &[(u8, u8)] = &[
    (3, 2),
    (5, 3),
    (7, 4),
    (8, 14),
    (10, 15),
    (11, 17),
    (12, 18),
    (13, 27),
    (15, 22),
    (16, 23),
    (18, 24),
    (19, 10),
    (21, 9),
    (22, 25),
    (23, 11),
    (24, 8),
    (26, 7),
    (27, 0),
    (28, 1),
    (29, 5),
    (31, 6),
    (32, 12),
    (33, 13),
    (35, 19),
    (36, 16),
    (37, 26),
    (38, 20),
    (40, 21),
];

// (header pin, GPIO, label). Flash pins 6-11 are left out.
const ESP32_DEVKIT_38: &[(u8, u8, &str)] = &[
    (3, 36, "VP"),
    (4, 39, "VN"),
    (5, 34, "D34"),
    (6, 35, "D35"),
    (7, 32, "D32"),
    (8, 33, "D33"),
    (9, 25, "D25"),
    (10, 26, "D26"),
    (11, 27, "D27"),
    (12, 14, "D14"),
    (13, 12, "D12"),
    (15, 13, "D13"),
    (21, 23, "D23"),
    (22, 22, "D22"),
    (23, 1, "TX0"),
    (24, 3, "RX0"),
    (25, 21, "D21"),
    (27, 19, "D19"),
    (28, 18, "D18"),
    (29, 5, "D5"),
    (30, 17, "TX2"),
    (31, 16, "RX2"),
    (32, 4, "D4"),
    (33, 0, "BOOT"),
    (34, 2, "D2"),
    (35, 15, "D15"),
];

impl BoardDescription {
    /// Look up a built-in board.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "raspberry-pi-40" => Some(Self::raspberry_pi_40()),
            "esp32-devkit-38" => Some(Self::esp32_devkit_38()),
            _ => None,
        }
    }

    /// Raspberry Pi 40-pin header, BCM numbering.
    pub fn raspberry_pi_40() -> Self {
        Self {
            name: "raspberry-pi-40".to_string(),
            title: "Raspberry Pi (40-pin header)".to_string(),
            pins: RASPBERRY_PI_40
                .iter()
                .map(|&(header_pin, gpio)| BoardPin {
                    gpio,
                    header_pin,
                    label: format!("GPIO{}", gpio),
                })
                .collect(),
        }
    }

    /// ESP32 DevKitC, 38-pin variant.
    pub fn esp32_devkit_38() -> Self {
        Self {
            name: "esp32-devkit-38".to_string(),
            title: "ESP32 DevKit (38 pins)".to_string(),
            pins: ESP32_DEVKIT_38
                .iter()
                .map(|&(header_pin, gpio, label)| BoardPin {
                    gpio,
                    header_pin,
                    label: label.to_string(),
                })
                .collect(),
        }
    }

    /// GPIO numbers in header order.
    pub fn gpio_pins(&self) -> Vec<u8> {
        self.pins.iter().map(|pin| pin.gpio).collect()
    }

    /// Header entry for `gpio`.
    pub fn pin(&self, gpio: u8) -> Option<&BoardPin> {
        self.pins.iter().find(|pin| pin.gpio == gpio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_boards_resolve() {
        for name in BOARD_NAMES {
            let board = BoardDescription::by_name(name).unwrap();
            assert_eq!(board.name, *name);
            assert!(!board.pins.is_empty());
        }
        assert!(BoardDescription::by_name("arduino").is_none());
    }

    #[test]
    fn test_raspberry_pi_covers_bcm_0_to_27() {
        let board = BoardDescription::raspberry_pi_40();
        let gpios: HashSet<u8> = board.gpio_pins().into_iter().collect();
        assert_eq!(gpios, (0..=27).collect::<HashSet<u8>>());
        assert_eq!(board.pin(17).unwrap().header_pin, 11);
    }

    #[test]
    fn test_no_duplicate_gpios() {
        for name in BOARD_NAMES {
            let board = BoardDescription::by_name(name).unwrap();
            let unique: HashSet<u8> = board.gpio_pins().into_iter().collect();
            assert_eq!(unique.len(), board.pins.len());
        }
    }

    #[test]
    fn test_esp32_skips_flash_pins() {
        let board = BoardDescription::esp32_devkit_38();
        assert!((6..=11).all(|gpio| board.pin(gpio).is_none()));
        assert_eq!(board.pin(0).unwrap().label, "BOOT");
    }
}
