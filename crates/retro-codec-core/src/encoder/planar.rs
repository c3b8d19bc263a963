//! Bitplane layouts: each byte holds one bit of eight horizontally adjacent
//! pixels, leftmost pixel in bit 7.

use super::{TileBlock, TileEncoder};

/// NES CHR: bit 0 of every row (8 bytes), then bit 1 of every row (8 bytes).
#[derive(Debug, Clone, Copy, Default)]
pub struct Planar2Encoder;

impl TileEncoder for Planar2Encoder {
    fn encoded_len(&self, block_size: u32) -> usize {
        (block_size * block_size / 4) as usize
    }

    fn encode(&self, block: &TileBlock, out: &mut Vec<u8>) {
        for plane in 0..2 {
            for y in 0..block.size() {
                for x0 in (0..block.size()).step_by(8) {
                    out.push(block.plane_byte(x0, y, plane));
                }
            }
        }
    }
}

/// Game Boy: per row, the bit 0 byte followed by the bit 1 byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interleaved2Encoder;

impl TileEncoder for Interleaved2Encoder {
    fn encoded_len(&self, block_size: u32) -> usize {
        (block_size * block_size / 4) as usize
    }

    fn encode(&self, block: &TileBlock, out: &mut Vec<u8>) {
        push_interleaved_pair(block, 0, out);
    }
}

/// SNES 4bpp: the Game Boy layout for planes 0/1 (16 bytes), then the same
/// for planes 2/3 (16 bytes).
#[derive(Debug, Clone, Copy, Default)]
pub struct Bitplane4Encoder;

impl TileEncoder for Bitplane4Encoder {
    fn encoded_len(&self, block_size: u32) -> usize {
        (block_size * block_size / 2) as usize
    }

    fn encode(&self, block: &TileBlock, out: &mut Vec<u8>) {
        push_interleaved_pair(block, 0, out);
        push_interleaved_pair(block, 2, out);
    }
}

fn push_interleaved_pair(block: &TileBlock, low_plane: u32, out: &mut Vec<u8>) {
    for y in 0..block.size() {
        for x0 in (0..block.size()).step_by(8) {
            out.push(block.plane_byte(x0, y, low_plane));
            out.push(block.plane_byte(x0, y, low_plane + 1));
        }
    }
}
