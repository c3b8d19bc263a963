use serde::{Serialize, Serializer};

use crate::color::Rgb;
use crate::palettes::FixedPalette;

/// Color space a console draws its palette from.
///
/// Arithmetic spaces snap each channel to `bits` and back; `Fixed` spaces
/// only admit the colors of their table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteSpace {
    /// Any 24-bit color.
    None,
    Fixed(&'static FixedPalette),
    Rgb555,
    Rgb333,
    Rgb444,
    Rgb222,
}

impl PaletteSpace {
    /// Bits per channel for arithmetic spaces.
    pub fn channel_bits(&self) -> Option<u32> {
        match self {
            PaletteSpace::Rgb555 => Some(5),
            PaletteSpace::Rgb444 => Some(4),
            PaletteSpace::Rgb333 => Some(3),
            PaletteSpace::Rgb222 => Some(2),
            PaletteSpace::None | PaletteSpace::Fixed(_) => None,
        }
    }

    pub fn fixed_palette(&self) -> Option<&'static FixedPalette> {
        match self {
            PaletteSpace::Fixed(p) => Some(*p),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            PaletteSpace::None => "none",
            PaletteSpace::Fixed(_) => "fixed",
            PaletteSpace::Rgb555 => "rgb555",
            PaletteSpace::Rgb333 => "rgb333",
            PaletteSpace::Rgb444 => "rgb444",
            PaletteSpace::Rgb222 => "rgb222",
        }
    }

    /// Snaps `color` into this space.
    ///
    /// Arithmetic spaces always succeed. Fixed spaces return the color only
    /// when it is an exact table member; there is no nearest-color fallback.
    pub fn quantize(&self, color: Rgb) -> Option<Rgb> {
        match self {
            PaletteSpace::None => Some(color),
            PaletteSpace::Fixed(p) => p.find(color).map(|e| e.color),
            _ => {
                let bits = self.channel_bits().unwrap_or(8);
                Some(snap_color(color, bits))
            }
        }
    }

    /// True if `color` is representable without change.
    pub fn contains(&self, color: Rgb) -> bool {
        self.quantize(color) == Some(color)
    }

    /// Parses and quantizes a `#RRGGBB` string; `None` for bad hex or a non-member.
    pub fn quantize_hex(&self, hex: &str) -> Option<Rgb> {
        hex.parse::<Rgb>().ok().and_then(|c| self.quantize(c))
    }
}

impl Serialize for PaletteSpace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

fn max_level(bits: u32) -> u32 {
    (1u32 << bits) - 1
}

/// Reduces an 8-bit channel to `bits` with round-half-up.
pub fn to_n_bit(v: u8, bits: u32) -> u8 {
    let max = max_level(bits);
    ((v as u32 * max * 2 + 255) / 510) as u8
}

/// Expands a `bits`-wide level back to 8 bits with round-half-up.
pub fn expand(n: u8, bits: u32) -> u8 {
    let max = max_level(bits);
    ((n as u32 * 255 * 2 + max) / (max * 2)) as u8
}

pub fn snap_channel(v: u8, bits: u32) -> u8 {
    expand(to_n_bit(v, bits), bits)
}

/// Snaps each channel independently.
pub fn snap_color(c: Rgb, bits: u32) -> Rgb {
    Rgb::new(
        snap_channel(c.r, bits),
        snap_channel(c.g, bits),
        snap_channel(c.b, bits),
    )
}

/// RGBA variant; alpha passes through untouched.
pub fn snap_rgba(px: [u8; 4], bits: u32) -> [u8; 4] {
    [
        snap_channel(px[0], bits),
        snap_channel(px[1], bits),
        snap_channel(px[2], bits),
        px[3],
    ]
}
