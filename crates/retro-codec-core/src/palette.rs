use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::color::Rgb;
use crate::error::{CodecError, Result};
use crate::mapping::ColorIndexMapping;
use crate::palettes::FixedPalette;
use crate::profile::ConsoleProfile;
use crate::quantize::to_n_bit;

/// Console-native palette entry layouts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaletteFormat {
    /// Master System CRAM: `--BBGGRR`.
    Cram8,
    /// Genesis CRAM word `0000BBB0 GGG0RRR0`, big-endian.
    Cram16,
    /// Little-endian `0BBBBBGG GGGRRRRR` (GBC, SNES, GBA).
    Bgr555,
    /// Game Gear, little-endian `0000BBBB GGGGRRRR`.
    Gg12,
    /// MSX2 palette register pair: `0RRR0GGG`, `0BBB0000`.
    Msx2,
    /// One byte per entry: the hardware code from the console's fixed table.
    Fixed,
}

impl PaletteFormat {
    pub fn bytes_per_entry(&self) -> usize {
        match self {
            PaletteFormat::Cram8 | PaletteFormat::Fixed => 1,
            PaletteFormat::Cram16
            | PaletteFormat::Bgr555
            | PaletteFormat::Gg12
            | PaletteFormat::Msx2 => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PaletteFormat::Cram8 => "cram8",
            PaletteFormat::Cram16 => "cram16",
            PaletteFormat::Bgr555 => "bgr555",
            PaletteFormat::Gg12 => "gg12",
            PaletteFormat::Msx2 => "msx2",
            PaletteFormat::Fixed => "fixed",
        }
    }

    /// Encodes one arithmetic entry. `Fixed` needs a table; use [`encode_fixed`].
    pub fn encode_color(&self, c: Rgb) -> Option<Vec<u8>> {
        let entry = match self {
            PaletteFormat::Cram8 => vec![cram8(c)],
            PaletteFormat::Cram16 => cram16(c).to_vec(),
            PaletteFormat::Bgr555 => bgr555(c).to_vec(),
            PaletteFormat::Gg12 => gg12(c).to_vec(),
            PaletteFormat::Msx2 => msx2(c).to_vec(),
            PaletteFormat::Fixed => return None,
        };
        Some(entry)
    }
}

impl fmt::Display for PaletteFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PaletteFormat {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cram8" | "sms" => Ok(Self::Cram8),
            "cram16" | "genesis" => Ok(Self::Cram16),
            "bgr555" => Ok(Self::Bgr555),
            "gg12" | "gamegear" => Ok(Self::Gg12),
            "msx2" => Ok(Self::Msx2),
            "fixed" => Ok(Self::Fixed),
            _ => Err(()),
        }
    }
}

pub fn cram8(c: Rgb) -> u8 {
    to_n_bit(c.r, 2) | (to_n_bit(c.g, 2) << 2) | (to_n_bit(c.b, 2) << 4)
}

/// `[high, low]`: the high byte carries blue, the low byte green and red.
pub fn cram16(c: Rgb) -> [u8; 2] {
    let r = to_n_bit(c.r, 3) << 1;
    let g = to_n_bit(c.g, 3) << 1;
    let b = to_n_bit(c.b, 3) << 1;
    [b, (g << 4) | r]
}

pub fn bgr555(c: Rgb) -> [u8; 2] {
    let r = to_n_bit(c.r, 5);
    let g = to_n_bit(c.g, 5);
    let b = to_n_bit(c.b, 5);
    [((g & 0x07) << 5) | r, (b << 2) | ((g >> 3) & 0x03)]
}

pub fn gg12(c: Rgb) -> [u8; 2] {
    let r = to_n_bit(c.r, 4);
    let g = to_n_bit(c.g, 4);
    let b = to_n_bit(c.b, 4);
    [(g << 4) | r, b]
}

pub fn msx2(c: Rgb) -> [u8; 2] {
    let r = to_n_bit(c.r, 3);
    let g = to_n_bit(c.g, 3);
    let b = to_n_bit(c.b, 3);
    [(r << 4) | g, b << 4]
}

/// Exact table lookup, no arithmetic.
pub fn encode_fixed(table: &FixedPalette, c: Rgb) -> Option<u8> {
    table.code_of(c)
}

/// Serializes the mapping's colors into a `slots`-entry buffer.
///
/// Slot 0 and every slot past the last color stay zero. Fixed tables have no
/// arithmetic fallback: a color outside the table leaves its entry at zero.
/// Callers that must reject such colors check
/// [`ConsoleProfile::check_palette_membership`] first.
pub fn serialize_palette(
    profile: &ConsoleProfile,
    mapping: &ColorIndexMapping,
    slots: usize,
) -> Result<Vec<u8>> {
    let format = profile
        .palette_format
        .ok_or_else(|| CodecError::UnsupportedFormat {
            console: profile.name.clone(),
            format: "palette".into(),
        })?;
    if mapping.len() > slots {
        return Err(CodecError::InvalidInput(format!(
            "{} colors do not fit a {}-slot palette",
            mapping.colors().len(),
            slots
        )));
    }
    let width = format.bytes_per_entry();
    let mut buf = vec![0u8; slots * width];
    for (i, &c) in mapping.colors().iter().enumerate() {
        let entry = match format {
            PaletteFormat::Fixed => {
                let code = profile
                    .space
                    .fixed_palette()
                    .and_then(|table| encode_fixed(table, c));
                match code {
                    Some(code) => vec![code],
                    None => {
                        warn!(
                            color = %c,
                            console = %profile.id,
                            "color not in fixed palette, entry left at 0"
                        );
                        vec![0]
                    }
                }
            }
            _ => format
                .encode_color(c)
                .ok_or_else(|| CodecError::UnsupportedFormat {
                    console: profile.name.clone(),
                    format: format.name().into(),
                })?,
        };
        let at = (i + 1) * width;
        buf[at..at + width].copy_from_slice(&entry);
    }
    Ok(buf)
}
