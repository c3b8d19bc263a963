use super::{TileBlock, TileEncoder};

/// MSX1 sprite patterns: one bit per pixel, set for any non-transparent pixel.
///
/// 16x16 blocks are written as four 8x8 quadrants in sprite generator order:
/// top-left, bottom-left, top-right, bottom-right.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mono1Encoder;

impl TileEncoder for Mono1Encoder {
    fn encoded_len(&self, block_size: u32) -> usize {
        (block_size * block_size / 8) as usize
    }

    fn encode(&self, block: &TileBlock, out: &mut Vec<u8>) {
        let n = block.size();
        for x0 in (0..n).step_by(8) {
            for y in 0..n {
                out.push(pattern_byte(block, x0, y));
            }
        }
    }
}

fn pattern_byte(block: &TileBlock, x0: u32, y: u32) -> u8 {
    (0..8).fold(0u8, |acc, i| {
        if block.slot(x0 + i, y) != 0 {
            acc | (0x80 >> i)
        } else {
            acc
        }
    })
}

/// Color bytes for the rows of one block: foreground in the high nibble,
/// background 0 (transparent).
pub fn color_rows(block_size: u32, foreground: u8) -> Vec<u8> {
    vec![(foreground & 0x0F) << 4; block_size as usize]
}
