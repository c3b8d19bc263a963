//! Export configuration.
//! Key notes:
//!   - `tile_format` overrides the profile's default layout; it must be one the profile lists
//!   - `mono_block` only affects the 1bpp MSX1 layout
//!   - `pixel_format` and `global_index` only affect PVR texture export
//!   - `strict_palette` rejects colors outside a fixed console palette instead of zeroing their entries
//!   - `parallel` encodes frames on the rayon pool when feature "parallel" is on

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::encoder::TileFormat;
use crate::pvr::PvrPixelFormat;

/// Sprite block edge for the 1bpp layout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MonoBlock {
    /// 8x8 sprites: 8 pattern bytes per block.
    Small,
    /// 16x16 sprites: 32 pattern bytes per block in quadrant order.
    Large,
}

impl MonoBlock {
    pub fn size(&self) -> u32 {
        match self {
            MonoBlock::Small => 8,
            MonoBlock::Large => 16,
        }
    }
}

impl FromStr for MonoBlock {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "8" | "8x8" | "small" => Ok(Self::Small),
            "16" | "16x16" | "large" => Ok(Self::Large),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportConfig {
    /// Tile layout; `None` picks the profile's first format.
    #[serde(default)]
    pub tile_format: Option<TileFormat>,
    #[serde(default = "default_mono_block")]
    pub mono_block: MonoBlock,
    #[serde(default)]
    pub pixel_format: PvrPixelFormat,
    /// Write a `GBIX` chunk with this index before each texture.
    #[serde(default)]
    pub global_index: Option<u32>,
    /// Block the export when a color is missing from a fixed palette.
    #[serde(default)]
    pub strict_palette: bool,
    /// Enable parallel frame encoding when feature "parallel" is on.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            tile_format: None,
            mono_block: default_mono_block(),
            pixel_format: PvrPixelFormat::default(),
            global_index: None,
            strict_palette: false,
            parallel: default_parallel(),
        }
    }
}

fn default_mono_block() -> MonoBlock {
    MonoBlock::Small
}
fn default_parallel() -> bool {
    false
}

/// Builder for `ExportConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct ExportConfigBuilder {
    cfg: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: ExportConfig::default(),
        }
    }
    pub fn tile_format(mut self, v: TileFormat) -> Self {
        self.cfg.tile_format = Some(v);
        self
    }
    pub fn mono_block(mut self, v: MonoBlock) -> Self {
        self.cfg.mono_block = v;
        self
    }
    pub fn pixel_format(mut self, v: PvrPixelFormat) -> Self {
        self.cfg.pixel_format = v;
        self
    }
    pub fn global_index(mut self, v: Option<u32>) -> Self {
        self.cfg.global_index = v;
        self
    }
    pub fn strict_palette(mut self, v: bool) -> Self {
        self.cfg.strict_palette = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> ExportConfig {
        self.cfg
    }
}

impl ExportConfig {
    /// Create a fluent builder for `ExportConfig`.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder::new()
    }
}
