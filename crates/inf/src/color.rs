use std::fmt;

use crate::{Error, Result};

pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
pub const BLACK: Color = Color::rgb(0, 0, 0);
pub const WHITE: Color = Color::rgb(255, 255, 255);
pub const RED: Color = Color::rgb(255, 0, 0);
pub const GREEN: Color = Color::rgb(0, 255, 0);
pub const BLUE: Color = Color::rgb(0, 0, 255);

/// 8-bit RGBA color
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Parses a hex color string, the leading '#' is optional.
    /// Supported forms: `RGB`, `RRGGBB` and `RRGGBBAA` (case insensitive).
    pub fn from_hex_string(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidArgument(format!("Invalid hex color: '{hex}'")));
        }

        let channel = |index: usize| -> Result<u8> { Ok(u8::from_str_radix(&digits[index..index + 2], 16)?) };

        match digits.len() {
            3 => {
                let short_channel = |index: usize| -> Result<u8> {
                    let value = u8::from_str_radix(&digits[index..index + 1], 16)?;
                    Ok(value * 17)
                };
                Ok(Color::rgb(short_channel(0)?, short_channel(1)?, short_channel(2)?))
            }
            6 => Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Color::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => Err(Error::InvalidArgument(format!("Invalid hex color: '{hex}'"))),
        }
    }

    pub fn to_hex_string(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Color::rgba(self.r, self.g, self.b, a)
    }

    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Packed representation with red in the lowest byte, matches the in-memory RGBA byte order on little endian
    pub const fn to_bits(&self) -> u32 {
        u32::from_le_bytes([self.r, self.g, self.b, self.a])
    }

    pub const fn from_bits(bits: u32) -> Self {
        let [r, g, b, a] = bits.to_le_bytes();
        Color { r, g, b, a }
    }

    pub const fn to_rgba(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl std::str::FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Color::from_hex_string(s)
    }
}
