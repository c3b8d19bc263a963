use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::color::Rgb;
use crate::encoder::TileFormat;
use crate::error::{CodecError, Result};
use crate::palette::PaletteFormat;
use crate::palettes;
use crate::quantize::PaletteSpace;
use crate::twiddle;

/// Consoles with a built-in profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleKind {
    Default,
    Nes,
    GameBoy,
    GameBoyColor,
    MasterSystem,
    GameGear,
    Genesis,
    Snes,
    Gba,
    Msx1,
    Msx2,
    Dreamcast,
}

impl ConsoleKind {
    pub const ALL: [ConsoleKind; 12] = [
        ConsoleKind::Default,
        ConsoleKind::Nes,
        ConsoleKind::GameBoy,
        ConsoleKind::GameBoyColor,
        ConsoleKind::MasterSystem,
        ConsoleKind::GameGear,
        ConsoleKind::Genesis,
        ConsoleKind::Snes,
        ConsoleKind::Gba,
        ConsoleKind::Msx1,
        ConsoleKind::Msx2,
        ConsoleKind::Dreamcast,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ConsoleKind::Default => "default",
            ConsoleKind::Nes => "nes",
            ConsoleKind::GameBoy => "gameboy",
            ConsoleKind::GameBoyColor => "gbc",
            ConsoleKind::MasterSystem => "sms",
            ConsoleKind::GameGear => "gamegear",
            ConsoleKind::Genesis => "genesis",
            ConsoleKind::Snes => "snes",
            ConsoleKind::Gba => "gba",
            ConsoleKind::Msx1 => "msx1",
            ConsoleKind::Msx2 => "msx2",
            ConsoleKind::Dreamcast => "dreamcast",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ConsoleKind::Default => "Default",
            ConsoleKind::Nes => "NES",
            ConsoleKind::GameBoy => "Game Boy",
            ConsoleKind::GameBoyColor => "Game Boy Color",
            ConsoleKind::MasterSystem => "Master System",
            ConsoleKind::GameGear => "Game Gear",
            ConsoleKind::Genesis => "Genesis / Mega Drive",
            ConsoleKind::Snes => "SNES",
            ConsoleKind::Gba => "Game Boy Advance",
            ConsoleKind::Msx1 => "MSX1",
            ConsoleKind::Msx2 => "MSX2",
            ConsoleKind::Dreamcast => "Dreamcast",
        }
    }

    /// The built-in descriptor: shared defaults from [`ConsoleProfile::base`]
    /// with the per-console fields overridden.
    pub fn profile(&self) -> ConsoleProfile {
        let base = ConsoleProfile::base(*self);
        match self {
            ConsoleKind::Default => base,
            ConsoleKind::Nes => ConsoleProfile {
                space: PaletteSpace::Fixed(&palettes::NES),
                max_colors: Some(3),
                dimension_rule: DimensionRule::TileMultiple(8),
                tile_formats: vec![TileFormat::Planar2],
                palette_format: Some(PaletteFormat::Fixed),
                ..base
            },
            ConsoleKind::GameBoy => ConsoleProfile {
                space: PaletteSpace::Fixed(&palettes::GAME_BOY),
                max_colors: Some(3),
                dimension_rule: DimensionRule::TileMultiple(8),
                tile_formats: vec![TileFormat::Interleaved2],
                palette_format: Some(PaletteFormat::Fixed),
                ..base
            },
            ConsoleKind::GameBoyColor => ConsoleProfile {
                space: PaletteSpace::Rgb555,
                max_colors: Some(3),
                dimension_rule: DimensionRule::TileMultiple(8),
                tile_formats: vec![TileFormat::Interleaved2],
                palette_format: Some(PaletteFormat::Bgr555),
                ..base
            },
            ConsoleKind::MasterSystem => ConsoleProfile {
                space: PaletteSpace::Rgb222,
                max_colors: Some(15),
                dimension_rule: DimensionRule::TileMultiple(8),
                tile_formats: vec![TileFormat::Packed4],
                palette_format: Some(PaletteFormat::Cram8),
                ..base
            },
            ConsoleKind::GameGear => ConsoleProfile {
                space: PaletteSpace::Rgb444,
                max_colors: Some(15),
                dimension_rule: DimensionRule::TileMultiple(8),
                tile_formats: vec![TileFormat::Packed4],
                palette_format: Some(PaletteFormat::Gg12),
                ..base
            },
            ConsoleKind::Genesis => ConsoleProfile {
                space: PaletteSpace::Rgb333,
                max_colors: Some(15),
                dimension_rule: DimensionRule::TileMultiple(8),
                default_canvas: (32, 32),
                tile_formats: vec![TileFormat::Packed4],
                palette_format: Some(PaletteFormat::Cram16),
                ..base
            },
            ConsoleKind::Snes => ConsoleProfile {
                space: PaletteSpace::Rgb555,
                max_colors: Some(15),
                dimension_rule: DimensionRule::TileMultiple(8),
                default_canvas: (32, 32),
                tile_formats: vec![TileFormat::Bitplane4],
                palette_format: Some(PaletteFormat::Bgr555),
                ..base
            },
            ConsoleKind::Gba => ConsoleProfile {
                space: PaletteSpace::Rgb555,
                max_colors: Some(15),
                dimension_rule: DimensionRule::TileMultiple(8),
                default_canvas: (32, 32),
                tile_formats: vec![TileFormat::Packed4Lsb, TileFormat::Linear8],
                palette_format: Some(PaletteFormat::Bgr555),
                ..base
            },
            ConsoleKind::Msx1 => ConsoleProfile {
                space: PaletteSpace::Fixed(&palettes::MSX1),
                max_colors: Some(1),
                dimension_rule: DimensionRule::TileMultiple(8),
                tile_formats: vec![TileFormat::Mono1],
                palette_format: Some(PaletteFormat::Fixed),
                ..base
            },
            ConsoleKind::Msx2 => ConsoleProfile {
                space: PaletteSpace::Rgb333,
                max_colors: Some(15),
                dimension_rule: DimensionRule::TileMultiple(8),
                tile_formats: vec![TileFormat::Packed4],
                palette_format: Some(PaletteFormat::Msx2),
                ..base
            },
            ConsoleKind::Dreamcast => ConsoleProfile {
                dimension_rule: DimensionRule::PowerOfTwo {
                    min: twiddle::MIN_TEXTURE_SIZE,
                    max: twiddle::MAX_TEXTURE_SIZE,
                },
                default_canvas: (64, 64),
                ..base
            },
        }
    }
}

impl fmt::Display for ConsoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ConsoleKind {
    type Err = CodecError;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key = s.to_ascii_lowercase().replace(['-', '_', ' '], "");
        Ok(match key.as_str() {
            "default" | "none" => Self::Default,
            "nes" | "famicom" => Self::Nes,
            "gameboy" | "gb" | "dmg" => Self::GameBoy,
            "gbc" | "gameboycolor" | "cgb" => Self::GameBoyColor,
            "sms" | "mastersystem" => Self::MasterSystem,
            "gg" | "gamegear" => Self::GameGear,
            "genesis" | "megadrive" | "md" => Self::Genesis,
            "snes" | "superfamicom" | "sfc" => Self::Snes,
            "gba" | "gameboyadvance" | "agb" => Self::Gba,
            "msx1" | "msx" => Self::Msx1,
            "msx2" | "msx2+" | "msx2plus" => Self::Msx2,
            "dreamcast" | "dc" | "pvr" => Self::Dreamcast,
            _ => return Err(CodecError::UnknownProfile(s.to_string())),
        })
    }
}

/// How frame dimensions are constrained.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DimensionRule {
    Unconstrained,
    /// Width and height must be multiples of the tile size.
    TileMultiple(u32),
    /// Width and height must each be an exact power of two in `[min, max]`.
    PowerOfTwo { min: u32, max: u32 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Width,
    Height,
}

impl Axis {
    fn label(&self) -> &'static str {
        match self {
            Axis::Width => "Width",
            Axis::Height => "Height",
        }
    }
}

/// One failing axis. `suggested` is a hint for the user; nothing is rounded automatically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DimensionIssue {
    pub axis: Axis,
    pub value: u32,
    pub message: String,
    pub suggested: Option<u32>,
}

impl DimensionIssue {
    pub(crate) fn tile_multiple(axis: Axis, value: u32, tile: u32) -> Self {
        let suggested = if value == 0 {
            tile
        } else {
            value.div_ceil(tile) * tile
        };
        Self {
            axis,
            value,
            message: format!(
                "{} {} is not a multiple of {} (try {})",
                axis.label(),
                value,
                tile,
                suggested
            ),
            suggested: Some(suggested),
        }
    }

    pub(crate) fn power_of_two(axis: Axis, value: u32, min: u32, max: u32) -> Self {
        let suggested = value
            .max(1)
            .checked_next_power_of_two()
            .unwrap_or(max)
            .clamp(min, max);
        Self {
            axis,
            value,
            message: format!(
                "{} {} must be a power of two between {} and {} (try {})",
                axis.label(),
                value,
                min,
                max,
                suggested
            ),
            suggested: Some(suggested),
        }
    }
}

/// Result object handed to UI code for warnings and badges.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: Option<String>,
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DimensionIssue>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: None,
            count: None,
            issues: Vec::new(),
        }
    }

    fn from_issues(issues: Vec<DimensionIssue>) -> Self {
        if issues.is_empty() {
            return Self::ok();
        }
        let message = issues
            .iter()
            .map(|i| i.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            valid: false,
            message: Some(message),
            count: None,
            issues,
        }
    }
}

/// Immutable capability descriptor of one console.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConsoleProfile {
    pub id: String,
    pub kind: ConsoleKind,
    pub name: String,
    pub space: PaletteSpace,
    /// Opaque colors allowed, transparency excluded. `None` is unlimited.
    pub max_colors: Option<usize>,
    pub dimension_rule: DimensionRule,
    pub default_canvas: (u32, u32),
    /// Exportable tile layouts; the first one is the default.
    pub tile_formats: Vec<TileFormat>,
    pub palette_format: Option<PaletteFormat>,
}

impl ConsoleProfile {
    /// Shared defaults: unconstrained, any color, nothing to export.
    pub fn base(kind: ConsoleKind) -> Self {
        Self {
            id: kind.id().to_string(),
            kind,
            name: kind.display_name().to_string(),
            space: PaletteSpace::None,
            max_colors: None,
            dimension_rule: DimensionRule::Unconstrained,
            default_canvas: (16, 16),
            tile_formats: Vec::new(),
            palette_format: None,
        }
    }

    /// Ordered colors of the fixed palette, if the console has one.
    pub fn fixed_palette(&self) -> Option<Vec<Rgb>> {
        self.space.fixed_palette().map(|p| p.colors().collect())
    }

    pub fn tile_size(&self) -> Option<u32> {
        match self.dimension_rule {
            DimensionRule::TileMultiple(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_texture(&self) -> bool {
        matches!(self.dimension_rule, DimensionRule::PowerOfTwo { .. })
    }

    pub fn default_tile_format(&self) -> Option<TileFormat> {
        self.tile_formats.first().copied()
    }

    pub fn supports(&self, format: TileFormat) -> bool {
        self.tile_formats.contains(&format)
    }

    /// Collects one issue per failing axis.
    pub fn dimension_issues(&self, width: u32, height: u32) -> Vec<DimensionIssue> {
        match self.dimension_rule {
            DimensionRule::Unconstrained => Vec::new(),
            DimensionRule::TileMultiple(tile) => [(Axis::Width, width), (Axis::Height, height)]
                .into_iter()
                .filter(|&(_, v)| v == 0 || v % tile != 0)
                .map(|(axis, v)| DimensionIssue::tile_multiple(axis, v, tile))
                .collect(),
            DimensionRule::PowerOfTwo { min, max } => {
                twiddle::texture_dimension_issues(width, height, min, max)
            }
        }
    }

    pub fn validate_dimensions(&self, width: u32, height: u32) -> ValidationResult {
        ValidationResult::from_issues(self.dimension_issues(width, height))
    }

    /// `colors` are the distinct opaque colors; the bound is inclusive.
    pub fn validate_color_count(&self, colors: &[Rgb]) -> ValidationResult {
        let count = colors.len();
        match self.max_colors {
            None => ValidationResult {
                valid: true,
                message: Some(format!("{count} colors")),
                count: Some(count),
                issues: Vec::new(),
            },
            Some(max) if count <= max => ValidationResult {
                valid: true,
                message: Some(format!("{count}/{max} colors")),
                count: Some(count),
                issues: Vec::new(),
            },
            Some(max) => ValidationResult {
                valid: false,
                message: Some(format!(
                    "{} allows {max} colors plus transparency, sprite uses {count}",
                    self.name
                )),
                count: Some(count),
                issues: Vec::new(),
            },
        }
    }

    /// Colors that are not members of the console's space. Always empty for arithmetic spaces.
    pub fn colors_outside_palette(&self, colors: &[Rgb]) -> Vec<Rgb> {
        let Some(palette) = self.space.fixed_palette() else {
            return Vec::new();
        };
        colors
            .iter()
            .copied()
            .filter(|c| !palette.contains(*c))
            .collect()
    }

    pub fn validate_palette_membership(&self, colors: &[Rgb]) -> ValidationResult {
        let outside = self.colors_outside_palette(colors);
        if outside.is_empty() {
            return ValidationResult::ok();
        }
        let list = outside
            .iter()
            .map(|c| c.to_hex())
            .collect::<Vec<_>>()
            .join(", ");
        ValidationResult {
            valid: false,
            message: Some(format!("Not in the {} palette: {list}", self.name)),
            count: Some(outside.len()),
            issues: Vec::new(),
        }
    }

    /// Dimension and color-count checks that block every export.
    pub fn check_exportable(&self, width: u32, height: u32, colors: &[Rgb]) -> Result<()> {
        let issues = self.dimension_issues(width, height);
        if !issues.is_empty() {
            return Err(CodecError::Dimension { issues });
        }
        if let Some(max) = self.max_colors {
            if colors.len() > max {
                return Err(CodecError::ColorLimit {
                    count: colors.len(),
                    max,
                });
            }
        }
        Ok(())
    }

    /// Fails on the first color that is not a member of a fixed palette.
    pub fn check_palette_membership(&self, colors: &[Rgb]) -> Result<()> {
        match self.colors_outside_palette(colors).first() {
            Some(c) => Err(CodecError::NotInPalette {
                color: c.to_hex(),
                console: self.name.clone(),
            }),
            None => Ok(()),
        }
    }
}
