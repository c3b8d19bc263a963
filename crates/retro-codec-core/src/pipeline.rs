use image::RgbaImage;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::color::{Rgb, collect_distinct_colors};
use crate::config::ExportConfig;
use crate::encoder::{self, EncodedFrame, TILE_SIZE, TileFormat};
use crate::error::{CodecError, Result};
use crate::mapping::ColorIndexMapping;
use crate::palette::serialize_palette;
use crate::palettes;
use crate::profile::{Axis, ConsoleProfile, DimensionIssue, ValidationResult};
use crate::pvr;
use crate::registry::Registry;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Byte counts of an export, for logs and `--export-stats`.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ExportStats {
    pub frames: usize,
    pub tiles: usize,
    pub tile_bytes: usize,
    pub palette_bytes: usize,
    pub color_table_bytes: usize,
    pub texture_bytes: usize,
    pub colors: usize,
}

/// Everything produced for one sprite.
#[derive(Debug, Clone)]
pub struct ExportOutput {
    pub console: String,
    /// Tile layout used; `None` for texture exports.
    pub format: Option<TileFormat>,
    /// Tiles of every frame, frames in index order.
    pub tiles: Vec<u8>,
    pub palette: Vec<u8>,
    /// MSX1 per-row color bytes, parallel to `tiles`.
    pub color_table: Vec<u8>,
    /// One PVR file per frame for texture profiles.
    pub textures: Vec<Vec<u8>>,
    pub mapping: ColorIndexMapping,
    pub stats: ExportStats,
    /// Pixels whose color was missing from the mapping. Non-zero means the
    /// color list handed in did not match the frames.
    pub unmapped_pixels: usize,
}

/// Per-check results for warnings and badges.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SpriteReport {
    pub console: String,
    pub dimensions: ValidationResult,
    pub colors: ValidationResult,
    pub palette: ValidationResult,
}

impl SpriteReport {
    pub fn is_valid(&self) -> bool {
        self.dimensions.valid && self.colors.valid && self.palette.valid
    }
}

/// Runs every validation without encoding anything.
pub fn validate_sprite(
    profile: &ConsoleProfile,
    width: u32,
    height: u32,
    colors: &[Rgb],
) -> SpriteReport {
    SpriteReport {
        console: profile.id.clone(),
        dimensions: profile.validate_dimensions(width, height),
        colors: profile.validate_color_count(colors),
        palette: profile.validate_palette_membership(colors),
    }
}

fn frame_dimensions(frames: &[RgbaImage]) -> Result<(u32, u32)> {
    let first = frames
        .first()
        .ok_or_else(|| CodecError::InvalidInput("no frames to export".into()))?;
    let dims = first.dimensions();
    if let Some((i, f)) = frames
        .iter()
        .enumerate()
        .find(|(_, f)| f.dimensions() != dims)
    {
        return Err(CodecError::InvalidInput(format!(
            "frame {} is {}x{}, expected {}x{}",
            i,
            f.width(),
            f.height(),
            dims.0,
            dims.1
        )));
    }
    Ok(dims)
}

fn resolve_format(profile: &ConsoleProfile, cfg: &ExportConfig) -> Result<TileFormat> {
    let format = cfg
        .tile_format
        .or_else(|| profile.default_tile_format())
        .ok_or_else(|| CodecError::UnsupportedFormat {
            console: profile.name.clone(),
            format: "tiles".into(),
        })?;
    if !profile.supports(format) {
        return Err(CodecError::UnsupportedFormat {
            console: profile.name.clone(),
            format: format.to_string(),
        });
    }
    Ok(format)
}

/// MSX1 code of the single foreground color, 0 when the sprite is empty.
fn mono_foreground(profile: &ConsoleProfile, mapping: &ColorIndexMapping) -> u8 {
    let table = profile.space.fixed_palette().unwrap_or(&palettes::MSX1);
    mapping
        .color_at(1)
        .and_then(|c| table.code_of(c))
        .unwrap_or(0)
}

#[instrument(skip_all, fields(console = %profile.id))]
/// Encodes `frames` for `profile`.
///
/// `colors` is the sprite's ordered list of distinct opaque colors. Every
/// blocking check (dimensions, color count, format support, and palette
/// membership when `cfg.strict_palette` is set) runs before the first byte is
/// produced; on error nothing is returned.
///
/// Notes:
/// - Tiles run left to right, top to bottom; frames are concatenated in order.
/// - Texture profiles produce one PVR file per frame instead of tiles.
/// - With feature "parallel" and `cfg.parallel`, frames encode concurrently; output order is unchanged.
pub fn export_sprite(
    profile: &ConsoleProfile,
    frames: &[RgbaImage],
    colors: &[Rgb],
    cfg: &ExportConfig,
) -> Result<ExportOutput> {
    let (w, h) = frame_dimensions(frames)?;
    profile.check_exportable(w, h, colors)?;
    if cfg.strict_palette {
        profile.check_palette_membership(colors)?;
    }

    if profile.is_texture() {
        return export_textures(profile, frames, colors, cfg);
    }

    let format = resolve_format(profile, cfg)?;
    let mapping = ColorIndexMapping::build(colors, profile)?;
    if mapping.max_slot() > format.max_slot() {
        return Err(CodecError::UnsupportedFormat {
            console: profile.name.clone(),
            format: format!("{} with {} colors", format, mapping.colors().len()),
        });
    }

    let block = if format == TileFormat::Mono1 {
        cfg.mono_block.size()
    } else {
        TILE_SIZE
    };
    let issues: Vec<DimensionIssue> = [(Axis::Width, w), (Axis::Height, h)]
        .into_iter()
        .filter(|&(_, v)| v % block != 0)
        .map(|(axis, v)| DimensionIssue::tile_multiple(axis, v, block))
        .collect();
    if !issues.is_empty() {
        return Err(CodecError::Dimension { issues });
    }

    let foreground = if format == TileFormat::Mono1 {
        mono_foreground(profile, &mapping)
    } else {
        0
    };
    let palette = serialize_palette(profile, &mapping, format.palette_slots())?;
    let encoded = encode_frames(frames, format, block, &mapping, foreground, cfg)?;

    let mut out = ExportOutput {
        console: profile.id.clone(),
        format: Some(format),
        tiles: Vec::new(),
        palette,
        color_table: Vec::new(),
        textures: Vec::new(),
        stats: ExportStats {
            frames: frames.len(),
            colors: mapping.colors().len(),
            ..Default::default()
        },
        mapping,
        unmapped_pixels: 0,
    };
    for f in encoded {
        out.stats.tiles += f.tile_count;
        out.tiles.extend(f.tiles);
        out.color_table.extend(f.colors);
        out.unmapped_pixels += f.unmapped;
    }
    out.stats.tile_bytes = out.tiles.len();
    out.stats.palette_bytes = out.palette.len();
    out.stats.color_table_bytes = out.color_table.len();

    if out.unmapped_pixels > 0 {
        warn!(
            pixels = out.unmapped_pixels,
            "export drew unmapped colors with slot 1"
        );
    }
    debug!(
        format = %format,
        frames = out.stats.frames,
        tiles = out.stats.tiles,
        tile_bytes = out.stats.tile_bytes,
        palette_bytes = out.stats.palette_bytes,
        "sprite exported"
    );
    Ok(out)
}

fn encode_frames(
    frames: &[RgbaImage],
    format: TileFormat,
    block: u32,
    mapping: &ColorIndexMapping,
    foreground: u8,
    cfg: &ExportConfig,
) -> Result<Vec<EncodedFrame>> {
    let encode_one = |f: &RgbaImage| encoder::encode_frame(f, format, block, mapping, foreground);

    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            return frames.par_iter().map(encode_one).collect();
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = cfg.parallel;

    frames.iter().map(encode_one).collect()
}

fn export_textures(
    profile: &ConsoleProfile,
    frames: &[RgbaImage],
    colors: &[Rgb],
    cfg: &ExportConfig,
) -> Result<ExportOutput> {
    let textures = frames
        .iter()
        .map(|f| pvr::encode_texture(f, cfg.pixel_format, cfg.global_index))
        .collect::<Result<Vec<_>>>()?;
    let texture_bytes = textures.iter().map(Vec::len).sum();
    debug!(
        frames = frames.len(),
        texture_bytes,
        pixel_format = ?cfg.pixel_format,
        "textures exported"
    );
    Ok(ExportOutput {
        console: profile.id.clone(),
        format: None,
        tiles: Vec::new(),
        palette: Vec::new(),
        color_table: Vec::new(),
        textures,
        mapping: ColorIndexMapping::default(),
        stats: ExportStats {
            frames: frames.len(),
            texture_bytes,
            colors: colors.len(),
            ..Default::default()
        },
        unmapped_pixels: 0,
    })
}

/// Exports with the registry's active profile, collecting the color list from the frames.
pub fn export_active(
    registry: &Registry,
    frames: &[RgbaImage],
    cfg: &ExportConfig,
) -> Result<ExportOutput> {
    let colors = collect_distinct_colors(frames);
    export_sprite(registry.active(), frames, &colors, cfg)
}
