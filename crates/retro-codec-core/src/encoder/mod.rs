use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::color::Rgb;
use crate::error::{CodecError, Result};
use crate::mapping::{ColorIndexMapping, TRANSPARENT_SLOT};

pub mod linear;
pub mod mono;
pub mod planar;

pub use linear::{Linear8Encoder, Packed4Encoder, Packed4LsbEncoder};
pub use mono::Mono1Encoder;
pub use planar::{Bitplane4Encoder, Interleaved2Encoder, Planar2Encoder};

/// Edge of a standard tile in pixels.
pub const TILE_SIZE: u32 = 8;

/// Bit-exact tile layouts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TileFormat {
    /// 2bpp, two separate planes (NES CHR).
    Planar2,
    /// 2bpp, planes interleaved per row (Game Boy).
    Interleaved2,
    /// 4bpp packed, left pixel in the high nibble.
    Packed4,
    /// 4bpp packed, left pixel in the low nibble (GBA).
    Packed4Lsb,
    /// 4bpp, planes 0/1 then planes 2/3, each pair interleaved per row (SNES).
    Bitplane4,
    /// 8bpp, one byte per pixel.
    Linear8,
    /// 1bpp pattern plus a per-row color byte (MSX1 sprites).
    Mono1,
}

impl TileFormat {
    pub fn bits_per_pixel(&self) -> u32 {
        match self {
            TileFormat::Mono1 => 1,
            TileFormat::Planar2 | TileFormat::Interleaved2 => 2,
            TileFormat::Packed4 | TileFormat::Packed4Lsb | TileFormat::Bitplane4 => 4,
            TileFormat::Linear8 => 8,
        }
    }

    /// Bytes of one encoded 8x8 tile.
    pub fn bytes_per_tile(&self) -> usize {
        (TILE_SIZE * TILE_SIZE * self.bits_per_pixel() / 8) as usize
    }

    /// Highest slot a pixel can address.
    pub fn max_slot(&self) -> u8 {
        ((1u32 << self.bits_per_pixel()) - 1) as u8
    }

    /// Entries in the matching palette buffer.
    pub fn palette_slots(&self) -> usize {
        match self {
            // one foreground color out of the 16 TMS9918 colors
            TileFormat::Mono1 => 16,
            _ => 1usize << self.bits_per_pixel(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TileFormat::Planar2 => "planar2",
            TileFormat::Interleaved2 => "interleaved2",
            TileFormat::Packed4 => "packed4",
            TileFormat::Packed4Lsb => "packed4_lsb",
            TileFormat::Bitplane4 => "bitplane4",
            TileFormat::Linear8 => "linear8",
            TileFormat::Mono1 => "mono1",
        }
    }

    pub fn encoder(&self) -> &'static dyn TileEncoder {
        match self {
            TileFormat::Planar2 => &Planar2Encoder,
            TileFormat::Interleaved2 => &Interleaved2Encoder,
            TileFormat::Packed4 => &Packed4Encoder,
            TileFormat::Packed4Lsb => &Packed4LsbEncoder,
            TileFormat::Bitplane4 => &Bitplane4Encoder,
            TileFormat::Linear8 => &Linear8Encoder,
            TileFormat::Mono1 => &Mono1Encoder,
        }
    }
}

impl fmt::Display for TileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TileFormat {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "planar2" | "nes" | "chr" => Ok(Self::Planar2),
            "interleaved2" | "gb" | "2bpp" => Ok(Self::Interleaved2),
            "packed4" | "4bpp" | "genesis" => Ok(Self::Packed4),
            "packed4_lsb" | "packed4lsb" | "gba" => Ok(Self::Packed4Lsb),
            "bitplane4" | "snes" => Ok(Self::Bitplane4),
            "linear8" | "8bpp" => Ok(Self::Linear8),
            "mono1" | "1bpp" | "msx1" => Ok(Self::Mono1),
            _ => Err(()),
        }
    }
}

/// A square window of resolved palette slots, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileBlock {
    size: u32,
    slots: Vec<u8>,
}

impl TileBlock {
    /// `size` must be a non-zero multiple of 8 and `slots` must hold
    /// `size * size` entries.
    pub fn new(size: u32, slots: Vec<u8>) -> Result<Self> {
        if size == 0 || size % TILE_SIZE != 0 {
            return Err(CodecError::InvalidInput(format!(
                "tile block size {size} is not a multiple of {TILE_SIZE}"
            )));
        }
        if slots.len() != (size * size) as usize {
            return Err(CodecError::InvalidInput(format!(
                "tile block of size {size} needs {} slots, got {}",
                size * size,
                slots.len()
            )));
        }
        Ok(Self { size, slots })
    }

    /// A block with every pixel set to `slot`.
    pub fn filled(size: u32, slot: u8) -> Result<Self> {
        Self::new(size, vec![slot; (size * size) as usize])
    }

    /// Reads the `size` x `size` window at (`x0`, `y0`) of `frame`.
    pub fn from_frame(
        frame: &RgbaImage,
        x0: u32,
        y0: u32,
        size: u32,
        resolver: &mut SlotResolver<'_>,
    ) -> Self {
        let mut slots = Vec::with_capacity((size * size) as usize);
        for y in y0..y0 + size {
            for x in x0..x0 + size {
                slots.push(resolver.resolve(frame, x, y));
            }
        }
        Self { size, slots }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn slot(&self, x: u32, y: u32) -> u8 {
        self.slots[(y * self.size + x) as usize]
    }

    pub fn slots(&self) -> &[u8] {
        &self.slots
    }

    /// Eight pixels starting at (`x0`, `y`) reduced to one byte: bit `plane`
    /// of each slot, leftmost pixel in bit 7.
    pub fn plane_byte(&self, x0: u32, y: u32, plane: u32) -> u8 {
        (0..8).fold(0u8, |acc, i| {
            let bit = (self.slot(x0 + i, y) >> plane) & 1;
            acc | (bit << (7 - i))
        })
    }
}

/// A tile layout. Implementations append exactly [`TileEncoder::encoded_len`] bytes.
pub trait TileEncoder: Sync {
    fn encoded_len(&self, block_size: u32) -> usize;
    fn encode(&self, block: &TileBlock, out: &mut Vec<u8>);
}

/// Encodes one block into a fresh buffer.
pub fn encode_tile(format: TileFormat, block: &TileBlock) -> Vec<u8> {
    let encoder = format.encoder();
    let mut out = Vec::with_capacity(encoder.encoded_len(block.size()));
    encoder.encode(block, &mut out);
    out
}

/// Maps pixels to slots and counts lookups that missed the mapping.
pub struct SlotResolver<'a> {
    mapping: &'a ColorIndexMapping,
    unmapped: usize,
}

impl<'a> SlotResolver<'a> {
    pub fn new(mapping: &'a ColorIndexMapping) -> Self {
        Self {
            mapping,
            unmapped: 0,
        }
    }

    /// Transparent pixels give slot 0. A color missing from the mapping is
    /// a bug in mapping construction: it is logged and drawn with slot 1 so
    /// the export still completes.
    pub fn resolve(&mut self, frame: &RgbaImage, x: u32, y: u32) -> u8 {
        let Some(color) = Rgb::from_pixel(frame.get_pixel(x, y)) else {
            return TRANSPARENT_SLOT;
        };
        match self.mapping.slot_of(color) {
            Some(slot) => slot,
            None => {
                warn!(%color, x, y, "color missing from index mapping, using slot 1");
                self.unmapped += 1;
                1
            }
        }
    }

    pub fn unmapped(&self) -> usize {
        self.unmapped
    }
}

/// Encoded tiles of one frame.
#[derive(Debug, Clone, Default)]
pub struct EncodedFrame {
    pub tiles: Vec<u8>,
    pub tile_count: usize,
    /// Per-row bytes for [`TileFormat::Mono1`]; empty for other formats.
    pub colors: Vec<u8>,
    pub unmapped: usize,
}

/// Splits `frame` into `block_size` blocks (left to right, top to bottom) and
/// encodes each one.
///
/// `mono_foreground` is the color byte nibble used for [`TileFormat::Mono1`].
pub fn encode_frame(
    frame: &RgbaImage,
    format: TileFormat,
    block_size: u32,
    mapping: &ColorIndexMapping,
    mono_foreground: u8,
) -> Result<EncodedFrame> {
    let (w, h) = frame.dimensions();
    if block_size == 0 || w % block_size != 0 || h % block_size != 0 {
        return Err(CodecError::InvalidInput(format!(
            "frame {w}x{h} is not divisible into {block_size}x{block_size} tiles"
        )));
    }
    let encoder = format.encoder();
    let per_tile = encoder.encoded_len(block_size);
    let tile_count = ((w / block_size) * (h / block_size)) as usize;
    let mut out = EncodedFrame {
        tiles: Vec::with_capacity(per_tile * tile_count),
        tile_count,
        ..Default::default()
    };
    let mut resolver = SlotResolver::new(mapping);
    for ty in (0..h).step_by(block_size as usize) {
        for tx in (0..w).step_by(block_size as usize) {
            let block = TileBlock::from_frame(frame, tx, ty, block_size, &mut resolver);
            encoder.encode(&block, &mut out.tiles);
            if format == TileFormat::Mono1 {
                out.colors
                    .extend(mono::color_rows(block_size, mono_foreground));
            }
        }
    }
    out.unmapped = resolver.unmapped();
    Ok(out)
}
