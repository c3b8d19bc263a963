//! Closed color tables for consoles whose palettes are not arithmetic.
//!
//! Each entry pairs the displayed color with the value the hardware stores
//! for it: the NES palette register, the Game Boy shade number or the MSX1
//! (TMS9918) color index.

use serde::Serialize;

use crate::color::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FixedEntry {
    pub color: Rgb,
    pub code: u8,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct FixedPalette {
    pub name: &'static str,
    pub entries: &'static [FixedEntry],
}

impl FixedPalette {
    /// Exact lookup; the first entry wins when a color appears twice.
    pub fn find(&self, color: Rgb) -> Option<&FixedEntry> {
        self.entries.iter().find(|e| e.color == color)
    }

    pub fn contains(&self, color: Rgb) -> bool {
        self.find(color).is_some()
    }

    pub fn code_of(&self, color: Rgb) -> Option<u8> {
        self.find(color).map(|e| e.code)
    }

    pub fn colors(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.entries.iter().map(|e| e.color)
    }
}

const fn e(rgb: u32, code: u8) -> FixedEntry {
    FixedEntry {
        color: Rgb::from_u32(rgb),
        code,
    }
}

// Register $0F is the canonical black; the other blacks ($0D, $0E, $1D..)
// are left out so every color maps to one register.
const NES_ENTRIES: [FixedEntry; 54] = [
    e(0x666666, 0x00),
    e(0x002A88, 0x01),
    e(0x1412A7, 0x02),
    e(0x3B00A4, 0x03),
    e(0x5C007E, 0x04),
    e(0x6E0040, 0x05),
    e(0x6C0600, 0x06),
    e(0x561D00, 0x07),
    e(0x333500, 0x08),
    e(0x0B4800, 0x09),
    e(0x005200, 0x0A),
    e(0x004F08, 0x0B),
    e(0x00404D, 0x0C),
    e(0x000000, 0x0F),
    e(0xADADAD, 0x10),
    e(0x155FD9, 0x11),
    e(0x4240FF, 0x12),
    e(0x7527FE, 0x13),
    e(0xA01ACC, 0x14),
    e(0xB71E7B, 0x15),
    e(0xB53120, 0x16),
    e(0x994E00, 0x17),
    e(0x6B6D00, 0x18),
    e(0x388700, 0x19),
    e(0x0C9300, 0x1A),
    e(0x008F32, 0x1B),
    e(0x007C8D, 0x1C),
    e(0xFFFEFF, 0x20),
    e(0x64B0FF, 0x21),
    e(0x9290FF, 0x22),
    e(0xC676FF, 0x23),
    e(0xF36AFF, 0x24),
    e(0xFE6ECC, 0x25),
    e(0xFE8170, 0x26),
    e(0xEA9E22, 0x27),
    e(0xBCBE00, 0x28),
    e(0x88D800, 0x29),
    e(0x5CE430, 0x2A),
    e(0x45E082, 0x2B),
    e(0x48CDDE, 0x2C),
    e(0x4F4F4F, 0x2D),
    e(0xC0DFFF, 0x31),
    e(0xD3D2FF, 0x32),
    e(0xE8C8FF, 0x33),
    e(0xFBC2FF, 0x34),
    e(0xFEC4EA, 0x35),
    e(0xFECCC5, 0x36),
    e(0xF7D8A5, 0x37),
    e(0xE4E594, 0x38),
    e(0xCFEF96, 0x39),
    e(0xBDF4AB, 0x3A),
    e(0xB3F3CC, 0x3B),
    e(0xB5EBF2, 0x3C),
    e(0xB8B8B8, 0x3D),
];

/// NES master palette (NTSC approximation), keyed by PPU palette register.
pub static NES: FixedPalette = FixedPalette {
    name: "nes",
    entries: &NES_ENTRIES,
};

/// The four DMG shades, lightest (shade 0) to darkest (shade 3).
pub static GAME_BOY: FixedPalette = FixedPalette {
    name: "gameboy",
    entries: &[
        e(0x9BBC0F, 0),
        e(0x8BAC0F, 1),
        e(0x306230, 2),
        e(0x0F380F, 3),
    ],
};

/// TMS9918 colors 1-15. Index 0 is the transparent color and has no entry.
pub static MSX1: FixedPalette = FixedPalette {
    name: "msx1",
    entries: &[
        e(0x000000, 1),
        e(0x3EB849, 2),
        e(0x74D07D, 3),
        e(0x5955E0, 4),
        e(0x8076F1, 5),
        e(0xB95E51, 6),
        e(0x65DBEF, 7),
        e(0xDB6559, 8),
        e(0xFF897D, 9),
        e(0xCCC35E, 10),
        e(0xDED087, 11),
        e(0x3AA241, 12),
        e(0xB766B5, 13),
        e(0xCCCCCC, 14),
        e(0xFFFFFF, 15),
    ],
};

/// Renders a NES palette register the way assemblers write it (`$0F`).
pub fn nes_register_string(color: Rgb) -> Option<String> {
    NES.code_of(color).map(|code| format!("${code:02X}"))
}
