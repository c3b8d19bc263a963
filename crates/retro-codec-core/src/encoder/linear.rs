//! Chunky layouts where a pixel's bits stay together, rows top to bottom.

use super::{TileBlock, TileEncoder};

/// Two pixels per byte, left pixel in the high nibble (Genesis, Master System,
/// Game Gear, MSX2 screen 5).
#[derive(Debug, Clone, Copy, Default)]
pub struct Packed4Encoder;

impl TileEncoder for Packed4Encoder {
    fn encoded_len(&self, block_size: u32) -> usize {
        (block_size * block_size / 2) as usize
    }

    fn encode(&self, block: &TileBlock, out: &mut Vec<u8>) {
        out.extend(
            block
                .slots()
                .chunks_exact(2)
                .map(|pair| ((pair[0] & 0x0F) << 4) | (pair[1] & 0x0F)),
        );
    }
}

/// Two pixels per byte, left pixel in the low nibble (GBA 4bpp).
#[derive(Debug, Clone, Copy, Default)]
pub struct Packed4LsbEncoder;

impl TileEncoder for Packed4LsbEncoder {
    fn encoded_len(&self, block_size: u32) -> usize {
        (block_size * block_size / 2) as usize
    }

    fn encode(&self, block: &TileBlock, out: &mut Vec<u8>) {
        out.extend(
            block
                .slots()
                .chunks_exact(2)
                .map(|pair| ((pair[1] & 0x0F) << 4) | (pair[0] & 0x0F)),
        );
    }
}

/// One byte per pixel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Linear8Encoder;

impl TileEncoder for Linear8Encoder {
    fn encoded_len(&self, block_size: u32) -> usize {
        (block_size * block_size) as usize
    }

    fn encode(&self, block: &TileBlock, out: &mut Vec<u8>) {
        out.extend_from_slice(block.slots());
    }
}
