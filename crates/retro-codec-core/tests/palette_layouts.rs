use image::{Rgba, RgbaImage};
use retro_codec_core::error::CodecError;
use retro_codec_core::palette::{bgr555, cram8, cram16, gg12, msx2, serialize_palette};
use retro_codec_core::palettes::{self, nes_register_string};
use retro_codec_core::prelude::*;

fn rgb(v: u32) -> Rgb {
    Rgb::from_u32(v)
}

#[test]
fn bgr555_is_little_endian_with_red_low() {
    assert_eq!(bgr555(rgb(0xFF0000)), [31, 0]);
    assert_eq!(bgr555(rgb(0x00FF00)), [224, 3]);
    assert_eq!(bgr555(rgb(0x0000FF)), [0, 124]);
    assert_eq!(bgr555(rgb(0xFFFFFF)), [255, 127]);
    assert_eq!(bgr555(rgb(0x000000)), [0, 0]);
}

#[test]
fn genesis_cram_word_is_big_endian() {
    assert_eq!(cram16(rgb(0xFF8040)), [4, 142]);
    assert_eq!(cram16(rgb(0xFFFFFF)), [14, 238]);
    assert_eq!(cram16(rgb(0x000000)), [0, 0]);
}

#[test]
fn master_system_cram_packs_two_bits_per_channel() {
    assert_eq!(cram8(rgb(0xFF0000)), 3);
    assert_eq!(cram8(rgb(0x00FF00)), 12);
    assert_eq!(cram8(rgb(0x0000FF)), 48);
    assert_eq!(cram8(rgb(0xFFFFFF)), 63);
    assert_eq!(cram8(rgb(0x55AAFF)), 57);
}

#[test]
fn game_gear_and_msx2_entries() {
    assert_eq!(gg12(rgb(0xFF8811)), [143, 1]);
    assert_eq!(msx2(rgb(0xFF9249)), [116, 32]);
    assert_eq!(msx2(rgb(0xFFFFFF)), [0x77, 0x70]);
}

#[test]
fn gbc_palette_has_slot_zero_blank() {
    let colors = [rgb(0xFF0000), rgb(0x00FF00), rgb(0x0000FF)];
    let profile = ConsoleKind::GameBoyColor.profile();
    let mapping = ColorIndexMapping::build(&colors, &profile).unwrap();
    let buf = serialize_palette(&profile, &mapping, 4).unwrap();
    assert_eq!(buf, vec![0, 0, 31, 0, 224, 3, 0, 124]);
}

#[test]
fn palettes_pad_to_the_format_slot_count() {
    let frames = vec![RgbaImage::from_pixel(8, 8, Rgba([0xFF, 0, 0, 255]))];
    let colors = collect_distinct_colors(&frames);
    let cfg = ExportConfig::default();

    let sms = export_sprite(&ConsoleKind::MasterSystem.profile(), &frames, &colors, &cfg).unwrap();
    assert_eq!(sms.palette.len(), 16);
    assert_eq!(sms.palette[1], 3);
    assert!(sms.palette[2..].iter().all(|&b| b == 0));

    let genesis = export_sprite(&ConsoleKind::Genesis.profile(), &frames, &colors, &cfg).unwrap();
    assert_eq!(genesis.palette.len(), 32);
    assert_eq!(&genesis.palette[2..4], &[0x00, 0x0E]);

    let linear = ExportConfig::builder().tile_format(TileFormat::Linear8).build();
    let gba = export_sprite(&ConsoleKind::Gba.profile(), &frames, &colors, &linear).unwrap();
    assert_eq!(gba.palette.len(), 512);
    assert_eq!(&gba.palette[2..4], &[31, 0]);
    assert_eq!(gba.tiles, vec![1u8; 64]);
}

#[test]
fn fixed_palettes_write_register_codes() {
    let nes = ConsoleKind::Nes.profile();
    let colors = [rgb(0x000000), rgb(0xADADAD)];
    let mapping = ColorIndexMapping::build(&colors, &nes).unwrap();
    assert_eq!(serialize_palette(&nes, &mapping, 4).unwrap(), vec![0, 0x0F, 0x10, 0]);

    let gb = ConsoleKind::GameBoy.profile();
    let mapping = ColorIndexMapping::build(&[rgb(0x0F380F), rgb(0x9BBC0F)], &gb).unwrap();
    assert_eq!(serialize_palette(&gb, &mapping, 4).unwrap(), vec![0, 3, 0, 0]);
}

#[test]
fn colors_outside_a_fixed_table_zero_their_entry() {
    let nes = ConsoleKind::Nes.profile();
    let colors = [rgb(0xFF0000), rgb(0x000000)];
    let mapping = ColorIndexMapping::build(&colors, &nes).unwrap();
    assert_eq!(serialize_palette(&nes, &mapping, 4).unwrap(), vec![0, 0, 0x0F, 0]);
}

#[test]
fn nes_registers_render_like_assembler_constants() {
    assert_eq!(nes_register_string(rgb(0x000000)).as_deref(), Some("$0F"));
    assert_eq!(nes_register_string(rgb(0x666666)).as_deref(), Some("$00"));
    assert_eq!(nes_register_string(rgb(0x123456)), None);
    assert_eq!(palettes::NES.entries.len(), 54);
}

#[test]
fn nes_table_has_one_entry_per_color_and_code() {
    let mut colors: Vec<Rgb> = palettes::NES.colors().collect();
    let mut codes: Vec<u8> = palettes::NES.entries.iter().map(|e| e.code).collect();
    colors.sort();
    colors.dedup();
    codes.sort();
    codes.dedup();
    assert_eq!(colors.len(), 54);
    assert_eq!(codes.len(), 54);
    assert!(codes.iter().all(|&c| c < 0x40));
}

#[test]
fn profiles_without_palette_format_refuse_to_serialize() {
    let profile = ConsoleKind::Default.profile();
    let mapping = ColorIndexMapping::default();
    assert!(matches!(
        serialize_palette(&profile, &mapping, 16),
        Err(CodecError::UnsupportedFormat { .. })
    ));
}

#[test]
fn mapping_larger_than_the_buffer_is_rejected() {
    let profile = ConsoleKind::Snes.profile();
    let colors: Vec<Rgb> = (0..5).map(|i| Rgb::new(i * 8, 0, 0)).collect();
    let mapping = ColorIndexMapping::build(&colors, &profile).unwrap();
    assert!(matches!(
        serialize_palette(&profile, &mapping, 4),
        Err(CodecError::InvalidInput(_))
    ));
}

#[test]
fn palette_format_names_parse_back() {
    for f in [
        PaletteFormat::Cram8,
        PaletteFormat::Cram16,
        PaletteFormat::Bgr555,
        PaletteFormat::Gg12,
        PaletteFormat::Msx2,
        PaletteFormat::Fixed,
    ] {
        assert_eq!(f.name().parse::<PaletteFormat>(), Ok(f));
        match f {
            PaletteFormat::Fixed => assert!(f.encode_color(Rgb::BLACK).is_none()),
            _ => assert_eq!(f.encode_color(Rgb::BLACK).unwrap().len(), f.bytes_per_entry()),
        }
    }
}
