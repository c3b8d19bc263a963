use serde::Serialize;
use std::collections::HashMap;

use crate::color::Rgb;
use crate::error::{CodecError, Result};
use crate::profile::ConsoleProfile;

/// Slot reserved for transparent pixels.
pub const TRANSPARENT_SLOT: u8 = 0;

/// Per-export table from opaque color to palette slot.
///
/// Slot 0 is transparency; colors occupy slots `1..=n` in the order they
/// were first seen, so identical input always yields identical slots.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ColorIndexMapping {
    colors: Vec<Rgb>,
    #[serde(skip)]
    slots: HashMap<Rgb, u8>,
}

impl ColorIndexMapping {
    /// Builds the mapping for `profile`.
    ///
    /// Fails with [`CodecError::ColorLimit`] when `colors` holds more distinct
    /// colors than the profile allows; nothing is dropped or merged.
    pub fn build(colors: &[Rgb], profile: &ConsoleProfile) -> Result<Self> {
        Self::with_limit(colors, profile.max_colors)
    }

    /// Builds a mapping capped at `max` colors (`None` means the 255 slots a byte can address).
    pub fn with_limit(colors: &[Rgb], max: Option<usize>) -> Result<Self> {
        let limit = max.unwrap_or(u8::MAX as usize).min(u8::MAX as usize);
        let mut mapping = Self::default();
        for &c in colors {
            if mapping.slots.contains_key(&c) {
                continue;
            }
            if mapping.colors.len() == limit {
                let count = distinct_count(colors);
                return Err(CodecError::ColorLimit { count, max: limit });
            }
            mapping.colors.push(c);
            mapping.slots.insert(c, mapping.colors.len() as u8);
        }
        Ok(mapping)
    }

    pub fn slot_of(&self, color: Rgb) -> Option<u8> {
        self.slots.get(&color).copied()
    }

    /// Color held by `slot`; `None` for slot 0 and unused slots.
    pub fn color_at(&self, slot: u8) -> Option<Rgb> {
        if slot == TRANSPARENT_SLOT {
            return None;
        }
        self.colors.get(slot as usize - 1).copied()
    }

    /// Opaque colors in slot order (slot 1 first).
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Number of slots in use, transparency included.
    pub fn len(&self) -> usize {
        self.colors.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Highest slot in use.
    pub fn max_slot(&self) -> u8 {
        self.colors.len() as u8
    }
}

fn distinct_count(colors: &[Rgb]) -> usize {
    let mut seen = std::collections::HashSet::new();
    colors.iter().filter(|c| seen.insert(**c)).count()
}
