//! Morton (Z-order) texture layout used by the PowerVR texture unit.
//!
//! `morton_code` puts the bits of `x` on even positions and the bits of `y`
//! on odd positions. Square textures are twiddled as one block; rectangular
//! ones are split into `min(w, h)` squares laid out in raster order, each
//! twiddled on its own and stored back to back.

use crate::error::{CodecError, Result};
use crate::profile::{Axis, DimensionIssue};

pub const MIN_TEXTURE_SIZE: u32 = 8;
pub const MAX_TEXTURE_SIZE: u32 = 1024;

/// Spreads the low 16 bits of `v` onto the even bit positions.
pub fn spread_bits(v: u32) -> u32 {
    let mut x = v & 0x0000_FFFF;
    x = (x | (x << 8)) & 0x00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333;
    x = (x | (x << 1)) & 0x5555_5555;
    x
}

/// Inverse of [`spread_bits`]: gathers the even bit positions.
pub fn compact_bits(v: u32) -> u32 {
    let mut x = v & 0x5555_5555;
    x = (x | (x >> 1)) & 0x3333_3333;
    x = (x | (x >> 2)) & 0x0F0F_0F0F;
    x = (x | (x >> 4)) & 0x00FF_00FF;
    x = (x | (x >> 8)) & 0x0000_FFFF;
    x
}

pub fn morton_code(x: u32, y: u32) -> u32 {
    spread_bits(x) | (spread_bits(y) << 1)
}

/// Recovers `x` from a Morton code.
pub fn deinterleave_even(code: u32) -> u32 {
    compact_bits(code)
}

/// Recovers `y` from a Morton code.
pub fn deinterleave_odd(code: u32) -> u32 {
    compact_bits(code >> 1)
}

fn is_valid_side(v: u32, min: u32, max: u32) -> bool {
    v.is_power_of_two() && (min..=max).contains(&v)
}

/// One issue per axis that is not a power of two within `[min, max]`.
pub fn texture_dimension_issues(
    width: u32,
    height: u32,
    min: u32,
    max: u32,
) -> Vec<DimensionIssue> {
    [(Axis::Width, width), (Axis::Height, height)]
        .into_iter()
        .filter(|&(_, v)| !is_valid_side(v, min, max))
        .map(|(axis, v)| DimensionIssue::power_of_two(axis, v, min, max))
        .collect()
}

pub fn validate_texture_dimensions(width: u32, height: u32) -> Result<()> {
    let issues = texture_dimension_issues(width, height, MIN_TEXTURE_SIZE, MAX_TEXTURE_SIZE);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(CodecError::Dimension { issues })
    }
}

fn check_buffer<T>(buf: &[T], width: u32, height: u32) -> Result<()> {
    validate_texture_dimensions(width, height)?;
    let expected = width as usize * height as usize;
    if buf.len() != expected {
        return Err(CodecError::InvalidInput(format!(
            "texture buffer has {} texels, expected {}x{} = {}",
            buf.len(),
            width,
            height,
            expected
        )));
    }
    Ok(())
}

/// Calls `f(twiddled_index, linear_index)` for every texel.
fn for_each_texel(width: u32, height: u32, mut f: impl FnMut(usize, usize)) {
    let block = width.min(height);
    let block_area = (block * block) as usize;
    let blocks_x = width / block;
    let blocks_y = height / block;
    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let base = (by * blocks_x + bx) as usize * block_area;
            for i in 0..block_area {
                let lx = deinterleave_even(i as u32);
                let ly = deinterleave_odd(i as u32);
                let x = bx * block + lx;
                let y = by * block + ly;
                f(base + i, (y * width + x) as usize);
            }
        }
    }
}

/// Reorders a row-major buffer into twiddled order.
pub fn twiddle<T: Copy>(linear: &[T], width: u32, height: u32) -> Result<Vec<T>> {
    check_buffer(linear, width, height)?;
    let mut out = linear.to_vec();
    for_each_texel(width, height, |t, l| out[t] = linear[l]);
    Ok(out)
}

/// Exact inverse of [`twiddle`].
pub fn untwiddle<T: Copy>(twiddled: &[T], width: u32, height: u32) -> Result<Vec<T>> {
    check_buffer(twiddled, width, height)?;
    let mut out = twiddled.to_vec();
    for_each_texel(width, height, |t, l| out[l] = twiddled[t]);
    Ok(out)
}
