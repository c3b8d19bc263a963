use image::{Rgba, RgbaImage};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CodecError;

/// Pixels with alpha below this value count as transparent (slot 0).
pub const ALPHA_THRESHOLD: u8 = 128;

/// An opaque 8-bit-per-channel color, the normalized key used by palettes and mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from a packed `0xRRGGBB` value.
    pub const fn from_u32(v: u32) -> Self {
        Self {
            r: ((v >> 16) & 0xFF) as u8,
            g: ((v >> 8) & 0xFF) as u8,
            b: (v & 0xFF) as u8,
        }
    }

    pub fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Upper-case `#RRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Color of an RGBA pixel, or `None` if it is transparent.
    pub fn from_pixel(px: &Rgba<u8>) -> Option<Self> {
        if px[3] < ALPHA_THRESHOLD {
            None
        } else {
            Some(Self::new(px[0], px[1], px[2]))
        }
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = CodecError;

    /// Accepts `#RRGGBB` or `RRGGBB`, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CodecError::InvalidInput(format!("bad hex color: {s}")));
        }
        u32::from_str_radix(hex, 16)
            .map(Rgb::from_u32)
            .map_err(|_| CodecError::InvalidInput(format!("bad hex color: {s}")))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Collects the distinct opaque colors of `frames` in first-seen order
/// (frames in index order, each scanned row-major).
pub fn collect_distinct_colors<'a, I>(frames: I) -> Vec<Rgb>
where
    I: IntoIterator<Item = &'a RgbaImage>,
{
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for frame in frames {
        for px in frame.pixels() {
            if let Some(c) = Rgb::from_pixel(px) {
                if seen.insert(c) {
                    out.push(c);
                }
            }
        }
    }
    out
}
