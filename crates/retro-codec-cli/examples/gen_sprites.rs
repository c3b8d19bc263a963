//! Writes small sample sprites that satisfy each built-in console profile.
//!
//! cargo run -p retro-codec-cli --example gen_sprites -- assets
//! retro-codec export assets/nes --console nes -o out -n hero

use image::{Rgba, RgbaImage};
use retro_codec_core::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

fn ensure_dir(p: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(p)?;
    Ok(())
}

fn draw_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, c: Rgb) {
    let (iw, ih) = img.dimensions();
    for yy in y.min(ih)..(y.saturating_add(h)).min(ih) {
        for xx in x.min(iw)..(x.saturating_add(w)).min(iw) {
            img.put_pixel(xx, yy, c.to_rgba());
        }
    }
}

/// Concentric squares, one ring per color, on a transparent background.
fn rings(w: u32, h: u32, colors: &[Rgb], shift: u32) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 0]));
    let step = (w.min(h) / 2 / colors.len().max(1) as u32).max(1);
    for (i, c) in colors.iter().enumerate() {
        let inset = i as u32 * step + shift % step;
        if inset * 2 >= w.min(h) {
            break;
        }
        draw_rect(&mut img, inset, inset, w - inset * 2, h - inset * 2, *c);
    }
    img
}

/// Colors that are valid for `profile`: table entries for fixed palettes,
/// snapped ramps otherwise.
fn sample_colors(profile: &ConsoleProfile) -> Vec<Rgb> {
    let n = profile.max_colors.unwrap_or(15).min(15);
    match profile.fixed_palette() {
        Some(table) => table.into_iter().rev().step_by(3).take(n).collect(),
        None => (0..n)
            .filter_map(|i| {
                let t = (i * 255 / n.max(1)) as u8;
                profile.space.quantize(Rgb::new(t, 255 - t, t / 2))
            })
            .collect(),
    }
}

fn main() -> anyhow::Result<()> {
    let root = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| "assets".into()));
    for kind in ConsoleKind::ALL {
        if kind == ConsoleKind::Default {
            continue;
        }
        let profile = kind.profile();
        let dir = root.join(kind.id());
        ensure_dir(&dir)?;
        let (w, h) = profile.default_canvas;
        let colors = sample_colors(&profile);
        for frame in 0..4u32 {
            let img = rings(w, h, &colors, frame);
            let path = dir.join(format!("frame_{frame:02}.png"));
            img.save(&path)?;
        }
        println!("{:<10} {}x{} {} colors -> {}", kind.id(), w, h, colors.len(), dir.display());
    }
    Ok(())
}
