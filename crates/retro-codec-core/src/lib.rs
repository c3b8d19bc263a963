//! Core library for turning RGBA sprite frames into retro console data.
//!
//! - Tiles: NES 2bpp planar, Game Boy 2bpp interleaved, 4bpp packed (both nibble orders), SNES 4bpp bitplanes, 8bpp linear, MSX1 1bpp
//! - Palettes: Master System/Genesis CRAM, BGR555, Game Gear 12-bit, MSX2 registers, fixed NES/Game Boy/MSX1 tables
//! - Textures: Dreamcast PVR with Morton twiddling
//! - Pipeline: `export_sprite` validates first and only then encodes; nothing is produced for a sprite that breaks a console limit.
//!
//! Quick example:
//! ```ignore
//! use image::ImageReader;
//! use retro_codec_core::{ConsoleKind, ExportConfig, collect_distinct_colors, export_sprite};
//! # fn main() -> anyhow::Result<()> {
//! let frame = ImageReader::open("hero.png")?.decode()?.to_rgba8();
//! let frames = vec![frame];
//! let profile = ConsoleKind::Nes.profile();
//! let colors = collect_distinct_colors(&frames);
//! let out = export_sprite(&profile, &frames, &colors, &ExportConfig::default())?;
//! println!("chr: {} bytes, palette: {:02X?}", out.tiles.len(), out.palette);
//! # Ok(()) }
//! ```

pub mod color;
pub mod config;
pub mod encoder;
pub mod error;
pub mod mapping;
pub mod palette;
pub mod palettes;
pub mod pipeline;
pub mod profile;
pub mod pvr;
pub mod quantize;
pub mod registry;
pub mod twiddle;

pub use color::*;
pub use config::*;
pub use encoder::{TileBlock, TileEncoder, TileFormat, encode_frame, encode_tile};
pub use error::*;
pub use mapping::*;
pub use palette::{PaletteFormat, serialize_palette};
pub use pipeline::*;
pub use profile::*;
pub use quantize::PaletteSpace;
pub use registry::*;

/// Convenience prelude for common types and functions.
/// Importing `retro_codec_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::color::{Rgb, collect_distinct_colors};
    pub use crate::config::{ExportConfig, ExportConfigBuilder, MonoBlock};
    pub use crate::encoder::{TileBlock, TileFormat, encode_tile};
    pub use crate::mapping::ColorIndexMapping;
    pub use crate::palette::PaletteFormat;
    pub use crate::profile::{ConsoleKind, ConsoleProfile, ValidationResult};
    pub use crate::pvr::PvrPixelFormat;
    pub use crate::quantize::PaletteSpace;
    pub use crate::registry::{ProfileChange, Registry};
    pub use crate::twiddle::{morton_code, twiddle, untwiddle};
    pub use crate::{ExportOutput, export_active, export_sprite, validate_sprite};
}
