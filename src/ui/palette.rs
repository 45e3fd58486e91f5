/// LED colour palette and the brightness → colour mapping.
///
/// Each named colour carries three shades: `on`, `dim` (lit at low
/// brightness) and `off` (the faint glow of an unlit LED).

use std::collections::BTreeMap;

/// Brightness (0..=100) below this renders lit LEDs with the dim shade.
pub const DIM_THRESHOLD: u8 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Parse `#RRGGBB` (leading `#` optional).
    pub fn parse_hex(s: &str) -> Option<Rgb> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// What a single LED shows this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedLevel {
    Off,
    Dim,
    On,
}

impl LedLevel {
    /// Shared cosmetic mapping: off is always off, lit LEDs dim below the
    /// brightness threshold.
    pub fn classify(on: bool, brightness: u8) -> LedLevel {
        if !on {
            LedLevel::Off
        } else if brightness < DIM_THRESHOLD {
            LedLevel::Dim
        } else {
            LedLevel::On
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedColors {
    pub on: Rgb,
    pub dim: Rgb,
    pub off: Rgb,
}

impl LedColors {
    pub fn shade(&self, level: LedLevel) -> Rgb {
        match level {
            LedLevel::On => self.on,
            LedLevel::Dim => self.dim,
            LedLevel::Off => self.off,
        }
    }
}

const RED: LedColors = LedColors {
    on: Rgb::new(0xFF, 0x00, 0x00),
    dim: Rgb::new(0x66, 0x00, 0x00),
    off: Rgb::new(0x1A, 0x00, 0x00),
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    entries: BTreeMap<String, LedColors>,
}

impl Palette {
    pub fn builtin() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert("red".to_string(), RED);
        entries.insert(
            "green".to_string(),
            LedColors {
                on: Rgb::new(0x00, 0xFF, 0x40),
                dim: Rgb::new(0x00, 0x66, 0x1A),
                off: Rgb::new(0x00, 0x1A, 0x08),
            },
        );
        entries.insert(
            "blue".to_string(),
            LedColors {
                on: Rgb::new(0x30, 0x80, 0xFF),
                dim: Rgb::new(0x10, 0x30, 0x66),
                off: Rgb::new(0x05, 0x0A, 0x1A),
            },
        );
        entries.insert(
            "yellow".to_string(),
            LedColors {
                on: Rgb::new(0xFF, 0xD0, 0x00),
                dim: Rgb::new(0x66, 0x52, 0x00),
                off: Rgb::new(0x1A, 0x15, 0x00),
            },
        );
        entries.insert(
            "white".to_string(),
            LedColors {
                on: Rgb::new(0xFF, 0xFF, 0xFF),
                dim: Rgb::new(0x66, 0x66, 0x66),
                off: Rgb::new(0x1A, 0x1A, 0x1A),
            },
        );
        Palette { entries }
    }

    pub fn insert(&mut self, name: &str, colors: LedColors) {
        self.entries.insert(name.to_string(), colors);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Colours for `name`; unknown names fall back to red.
    pub fn colors(&self, name: &str) -> LedColors {
        self.entries.get(name).copied().unwrap_or(RED)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_levels() {
        assert_eq!(LedLevel::classify(false, 100), LedLevel::Off);
        assert_eq!(LedLevel::classify(false, 10), LedLevel::Off);
        assert_eq!(LedLevel::classify(true, 100), LedLevel::On);
        assert_eq!(LedLevel::classify(true, DIM_THRESHOLD), LedLevel::On);
        assert_eq!(LedLevel::classify(true, DIM_THRESHOLD - 1), LedLevel::Dim);
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(Rgb::parse_hex("#FF0000"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(Rgb::parse_hex("1a1A1a"), Some(Rgb::new(26, 26, 26)));
        assert_eq!(Rgb::parse_hex("#FFF"), None);
        assert_eq!(Rgb::parse_hex("#GG0000"), None);
        assert_eq!(Rgb::parse_hex("#ÄÄÄ"), None);
    }

    #[test]
    fn unknown_colour_falls_back_to_red() {
        let p = Palette::builtin();
        assert!(p.contains("green"));
        assert!(!p.contains("mauve"));
        assert_eq!(p.colors("mauve"), p.colors("red"));
        assert_eq!(p.colors("red").shade(LedLevel::Dim), Rgb::new(0x66, 0, 0));
    }
}
