use image::{Rgba, RgbaImage};
use retro_codec_core::error::CodecError;
use retro_codec_core::prelude::*;
use retro_codec_core::pvr::{
    DATA_FORMAT_RECTANGLE, DATA_FORMAT_TWIDDLED, HEADER_LEN, data_format_code, encode_texture,
    to_linear16,
};

fn u16_at(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn u32_at(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

#[test]
fn pixel_formats_pack_sixteen_bits() {
    let f = PvrPixelFormat::Argb1555;
    assert_eq!(f.pack([255, 0, 0, 255]), 0xFC00);
    assert_eq!(f.pack([255, 255, 255, 0]), 0x7FFF);
    assert_eq!(f.pack([0, 0, 0, 128]), 0x8000);

    let f = PvrPixelFormat::Rgb565;
    assert_eq!(f.pack([255, 255, 255, 255]), 0xFFFF);
    assert_eq!(f.pack([0, 255, 0, 0]), 0x07E0);

    assert_eq!(PvrPixelFormat::Argb4444.pack([0xFF, 0x80, 0x00, 0x80]), 0x8F80);
}

#[test]
fn square_texture_header_and_texels() {
    let frame = RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255]));
    let file = encode_texture(&frame, PvrPixelFormat::Argb1555, None).unwrap();
    assert_eq!(file.len(), HEADER_LEN + 128);
    assert_eq!(&file[0..4], b"PVRT");
    assert_eq!(u32_at(&file, 4), 8 + 128);
    assert_eq!(file[8], 0x00);
    assert_eq!(file[9], DATA_FORMAT_TWIDDLED);
    assert_eq!(&file[10..12], &[0, 0]);
    assert_eq!(u16_at(&file, 12), 8);
    assert_eq!(u16_at(&file, 14), 8);
    assert_eq!(&file[16..18], &[0x00, 0xFC]);
}

#[test]
fn global_index_adds_gbix_chunk() {
    let frame = RgbaImage::new(16, 16);
    let file = encode_texture(&frame, PvrPixelFormat::Rgb565, Some(7)).unwrap();
    assert_eq!(file.len(), 2 * HEADER_LEN + 16 * 16 * 2);
    assert_eq!(&file[0..4], b"GBIX");
    assert_eq!(u32_at(&file, 4), 8);
    assert_eq!(u32_at(&file, 8), 7);
    assert_eq!(&file[12..16], &[0; 4]);
    assert_eq!(&file[16..20], b"PVRT");
    assert_eq!(file[24], 0x01);
}

#[test]
fn rectangular_texture_is_block_twiddled() {
    // columns 8..16 are opaque white
    let frame = RgbaImage::from_fn(16, 8, |x, _| {
        if x >= 8 {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    let file = encode_texture(&frame, PvrPixelFormat::Argb1555, None).unwrap();
    assert_eq!(file[9], DATA_FORMAT_RECTANGLE);
    assert_eq!(u16_at(&file, 12), 16);
    assert_eq!(u16_at(&file, 14), 8);
    let texels: Vec<u16> = file[HEADER_LEN..]
        .chunks(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    assert!(texels[..64].iter().all(|&t| t == 0));
    assert!(texels[64..].iter().all(|&t| t == 0xFFFF));
}

#[test]
fn texels_follow_morton_order() {
    let frame = RgbaImage::from_fn(8, 8, |x, y| Rgba([(x * 32) as u8, (y * 32) as u8, 0, 255]));
    let linear = to_linear16(&frame, PvrPixelFormat::Rgb565);
    let file = encode_texture(&frame, PvrPixelFormat::Rgb565, None).unwrap();
    for y in 0..8 {
        for x in 0..8 {
            let at = HEADER_LEN + 2 * morton_code(x, y) as usize;
            assert_eq!(u16_at(&file, at), linear[(y * 8 + x) as usize]);
        }
    }
}

#[test]
fn non_power_of_two_texture_is_rejected() {
    let frame = RgbaImage::new(24, 16);
    assert!(matches!(
        encode_texture(&frame, PvrPixelFormat::Argb1555, None),
        Err(CodecError::Dimension { .. })
    ));
    assert_eq!(data_format_code(32, 32), DATA_FORMAT_TWIDDLED);
    assert_eq!(data_format_code(32, 64), DATA_FORMAT_RECTANGLE);
}

#[test]
fn dreamcast_export_writes_one_file_per_frame() {
    let frames = vec![
        RgbaImage::from_pixel(32, 32, Rgba([10, 20, 30, 255])),
        RgbaImage::from_pixel(32, 32, Rgba([200, 100, 50, 255])),
    ];
    let colors = collect_distinct_colors(&frames);
    let cfg = ExportConfig::builder()
        .pixel_format(PvrPixelFormat::Argb4444)
        .global_index(Some(1))
        .build();
    let out = export_sprite(&ConsoleKind::Dreamcast.profile(), &frames, &colors, &cfg).unwrap();
    assert_eq!(out.format, None);
    assert!(out.tiles.is_empty() && out.palette.is_empty());
    assert_eq!(out.textures.len(), 2);
    for t in &out.textures {
        assert_eq!(t.len(), 2 * HEADER_LEN + 32 * 32 * 2);
        assert_eq!(t[24], 0x02);
    }
    assert_ne!(out.textures[0], out.textures[1]);
    assert_eq!(out.stats.texture_bytes, 2 * out.textures[0].len());
}

#[test]
fn dreamcast_export_blocks_bad_sizes() {
    let frames = vec![RgbaImage::new(48, 32)];
    let err = export_sprite(
        &ConsoleKind::Dreamcast.profile(),
        &frames,
        &[],
        &ExportConfig::default(),
    )
    .unwrap_err();
    match err {
        CodecError::Dimension { issues } => assert_eq!(issues[0].suggested, Some(64)),
        other => panic!("expected dimension error, got {other:?}"),
    }
}

#[test]
fn pixel_format_names_parse() {
    assert_eq!("ARGB1555".parse::<PvrPixelFormat>(), Ok(PvrPixelFormat::Argb1555));
    assert_eq!("565".parse::<PvrPixelFormat>(), Ok(PvrPixelFormat::Rgb565));
    assert!("yuv422".parse::<PvrPixelFormat>().is_err());
    assert_eq!(PvrPixelFormat::default(), PvrPixelFormat::Argb1555);
}
