//! Dreamcast PVR textures: 16-bit pixel packing and the container headers.
//!
//! Layout (all integers little-endian):
//!
//! | offset | size | field |
//! |---|---|---|
//! | 0 | 16 | optional `GBIX` chunk: magic, size (8), global index, padding |
//! | 0/16 | 4 | `PVRT` |
//! | +4 | 4 | payload size (8 + pixel bytes) |
//! | +8 | 1 | pixel format code |
//! | +9 | 1 | data format code |
//! | +10 | 2 | reserved |
//! | +12 | 2 | width |
//! | +14 | 2 | height |
//! | +16 | .. | pixels, two bytes each |

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::color::ALPHA_THRESHOLD;
use crate::error::Result;
use crate::quantize::to_n_bit;
use crate::twiddle;

pub const GBIX_MAGIC: &[u8; 4] = b"GBIX";
pub const PVRT_MAGIC: &[u8; 4] = b"PVRT";
pub const HEADER_LEN: usize = 16;

/// Data format code for square twiddled textures.
pub const DATA_FORMAT_TWIDDLED: u8 = 0x01;
/// Data format code for rectangular textures.
pub const DATA_FORMAT_RECTANGLE: u8 = 0x09;

/// 16-bit texel encodings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PvrPixelFormat {
    #[default]
    Argb1555,
    Rgb565,
    Argb4444,
}

impl PvrPixelFormat {
    pub fn code(&self) -> u8 {
        match self {
            PvrPixelFormat::Argb1555 => 0x00,
            PvrPixelFormat::Rgb565 => 0x01,
            PvrPixelFormat::Argb4444 => 0x02,
        }
    }

    pub fn pack(&self, px: [u8; 4]) -> u16 {
        let [r, g, b, a] = px;
        match self {
            PvrPixelFormat::Argb1555 => {
                let a = u16::from(a >= ALPHA_THRESHOLD);
                (a << 15)
                    | ((to_n_bit(r, 5) as u16) << 10)
                    | ((to_n_bit(g, 5) as u16) << 5)
                    | to_n_bit(b, 5) as u16
            }
            PvrPixelFormat::Rgb565 => {
                ((to_n_bit(r, 5) as u16) << 11)
                    | ((to_n_bit(g, 6) as u16) << 5)
                    | to_n_bit(b, 5) as u16
            }
            PvrPixelFormat::Argb4444 => {
                ((to_n_bit(a, 4) as u16) << 12)
                    | ((to_n_bit(r, 4) as u16) << 8)
                    | ((to_n_bit(g, 4) as u16) << 4)
                    | to_n_bit(b, 4) as u16
            }
        }
    }
}

impl FromStr for PvrPixelFormat {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "argb1555" | "1555" => Ok(Self::Argb1555),
            "rgb565" | "565" => Ok(Self::Rgb565),
            "argb4444" | "4444" => Ok(Self::Argb4444),
            _ => Err(()),
        }
    }
}

/// Row-major 16-bit texels of `frame`.
pub fn to_linear16(frame: &RgbaImage, format: PvrPixelFormat) -> Vec<u16> {
    frame.pixels().map(|px| format.pack(px.0)).collect()
}

pub fn data_format_code(width: u32, height: u32) -> u8 {
    if width == height {
        DATA_FORMAT_TWIDDLED
    } else {
        DATA_FORMAT_RECTANGLE
    }
}

pub fn write_gbix(global_index: u32, out: &mut Vec<u8>) {
    out.extend_from_slice(GBIX_MAGIC);
    out.extend_from_slice(&8u32.to_le_bytes());
    out.extend_from_slice(&global_index.to_le_bytes());
    out.extend_from_slice(&[0u8; 4]);
}

pub fn write_pvrt_header(
    pixel_format: PvrPixelFormat,
    data_format: u8,
    width: u16,
    height: u16,
    pixel_bytes: usize,
    out: &mut Vec<u8>,
) {
    out.extend_from_slice(PVRT_MAGIC);
    out.extend_from_slice(&((pixel_bytes + 8) as u32).to_le_bytes());
    out.push(pixel_format.code());
    out.push(data_format);
    out.extend_from_slice(&[0u8; 2]);
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
}

/// Builds a complete texture file for one frame.
pub fn encode_texture(
    frame: &RgbaImage,
    pixel_format: PvrPixelFormat,
    global_index: Option<u32>,
) -> Result<Vec<u8>> {
    let (w, h) = frame.dimensions();
    let linear = to_linear16(frame, pixel_format);
    let texels = twiddle::twiddle(&linear, w, h)?;
    let pixel_bytes = texels.len() * 2;
    let mut out = Vec::with_capacity(2 * HEADER_LEN + pixel_bytes);
    if let Some(index) = global_index {
        write_gbix(index, &mut out);
    }
    // twiddle() only accepts sides up to 1024, so both fit in u16
    write_pvrt_header(
        pixel_format,
        data_format_code(w, h),
        w as u16,
        h as u16,
        pixel_bytes,
        &mut out,
    );
    for t in texels {
        out.extend_from_slice(&t.to_le_bytes());
    }
    Ok(out)
}
