use std::sync::{Arc, Mutex};

use retro_codec_core::error::CodecError;
use retro_codec_core::prelude::*;
use retro_codec_core::profile::{Axis, DimensionRule};

fn distinct(n: usize) -> Vec<Rgb> {
    (0..n)
        .map(|i| Rgb::new((i * 7) as u8, (i * 13) as u8, (i * 29) as u8))
        .collect()
}

#[test]
fn master_system_rejects_sixteen_colors() {
    let sms = ConsoleKind::MasterSystem.profile();
    let result = sms.validate_color_count(&distinct(16));
    assert!(!result.valid);
    assert_eq!(result.count, Some(16));
    assert!(result.message.unwrap().contains("15"));
}

#[test]
fn color_limit_is_inclusive_for_every_finite_profile() {
    for kind in ConsoleKind::ALL {
        let profile = kind.profile();
        let Some(max) = profile.max_colors else {
            let many = profile.validate_color_count(&distinct(200));
            assert!(many.valid, "{kind} should be unlimited");
            continue;
        };
        let at = profile.validate_color_count(&distinct(max));
        assert!(at.valid, "{kind} at {max}");
        assert_eq!(at.count, Some(max));
        let over = profile.validate_color_count(&distinct(max + 1));
        assert!(!over.valid, "{kind} over {max}");
        assert_eq!(over.count, Some(max + 1));
    }
}

#[test]
fn console_limits_match_hardware() {
    let limits: Vec<(ConsoleKind, Option<usize>)> = ConsoleKind::ALL
        .iter()
        .map(|k| (*k, k.profile().max_colors))
        .collect();
    assert!(limits.contains(&(ConsoleKind::Nes, Some(3))));
    assert!(limits.contains(&(ConsoleKind::GameBoy, Some(3))));
    assert!(limits.contains(&(ConsoleKind::Genesis, Some(15))));
    assert!(limits.contains(&(ConsoleKind::Msx1, Some(1))));
    assert!(limits.contains(&(ConsoleKind::Dreamcast, None)));
    assert!(limits.contains(&(ConsoleKind::Default, None)));
}

#[test]
fn tile_consoles_report_each_misaligned_axis() {
    let nes = ConsoleKind::Nes.profile();
    assert!(nes.validate_dimensions(16, 24).valid);

    let result = nes.validate_dimensions(20, 16);
    assert!(!result.valid);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].axis, Axis::Width);
    assert_eq!(result.issues[0].suggested, Some(24));
    assert_eq!(
        result.message.as_deref(),
        Some("Width 20 is not a multiple of 8 (try 24)")
    );

    let both = nes.validate_dimensions(9, 0);
    assert_eq!(both.issues.len(), 2);
    assert_eq!(both.issues[1].suggested, Some(8));
}

#[test]
fn dreamcast_requires_power_of_two_sides() {
    let dc = ConsoleKind::Dreamcast.profile();
    assert!(dc.is_texture());
    assert_eq!(dc.default_canvas, (64, 64));
    assert!(dc.validate_dimensions(64, 256).valid);
    assert!(dc.validate_dimensions(8, 1024).valid);

    let result = dc.validate_dimensions(100, 4);
    assert_eq!(result.issues.len(), 2);
    assert_eq!(result.issues[0].suggested, Some(128));
    assert_eq!(result.issues[1].suggested, Some(8));
    assert!(!dc.validate_dimensions(2048, 64).valid);
}

#[test]
fn default_profile_accepts_anything() {
    let base = ConsoleKind::Default.profile();
    assert_eq!(base.dimension_rule, DimensionRule::Unconstrained);
    assert!(base.validate_dimensions(13, 7).valid);
    assert!(base.check_exportable(13, 7, &distinct(300)).is_ok());
    assert!(base.fixed_palette().is_none());
}

#[test]
fn membership_is_checked_only_for_fixed_tables() {
    let nes = ConsoleKind::Nes.profile();
    let colors = [Rgb::from_u32(0xFF0000), Rgb::from_u32(0x000000)];
    let report = nes.validate_palette_membership(&colors);
    assert!(!report.valid);
    assert_eq!(report.count, Some(1));
    assert!(report.message.unwrap().contains("#FF0000"));
    assert!(matches!(
        nes.check_palette_membership(&colors),
        Err(CodecError::NotInPalette { .. })
    ));

    let snes = ConsoleKind::Snes.profile();
    assert!(snes.validate_palette_membership(&colors).valid);
    assert!(snes.colors_outside_palette(&colors).is_empty());
}

#[test]
fn fixed_palette_lists_table_colors_in_order() {
    let gb = ConsoleKind::GameBoy.profile().fixed_palette().unwrap();
    assert_eq!(
        gb,
        vec![
            Rgb::from_u32(0x9BBC0F),
            Rgb::from_u32(0x8BAC0F),
            Rgb::from_u32(0x306230),
            Rgb::from_u32(0x0F380F),
        ]
    );
    assert_eq!(ConsoleKind::Msx1.profile().fixed_palette().unwrap().len(), 15);
}

#[test]
fn validate_sprite_collects_every_check() {
    let gb = ConsoleKind::GameBoy.profile();
    let report = validate_sprite(&gb, 12, 8, &distinct(4));
    assert!(!report.is_valid());
    assert!(!report.dimensions.valid);
    assert!(!report.colors.valid);
    assert_eq!(report.console, "gameboy");
}

#[test]
fn console_aliases_resolve() {
    for kind in ConsoleKind::ALL {
        assert_eq!(kind.id().parse::<ConsoleKind>().unwrap(), kind);
        assert_eq!(kind.to_string(), kind.id());
    }
    assert_eq!("Mega-Drive".parse::<ConsoleKind>().unwrap(), ConsoleKind::Genesis);
    assert_eq!("game boy".parse::<ConsoleKind>().unwrap(), ConsoleKind::GameBoy);
    assert_eq!("GG".parse::<ConsoleKind>().unwrap(), ConsoleKind::GameGear);
    assert!(matches!(
        "jaguar".parse::<ConsoleKind>(),
        Err(CodecError::UnknownProfile(_))
    ));
}

#[test]
fn builtin_registry_starts_on_default() {
    let reg = Registry::with_builtin();
    assert_eq!(reg.active().id, "default");
    assert_eq!(reg.ids().count(), ConsoleKind::ALL.len());
    assert_eq!(reg.get("md").map(|p| p.id.as_str()), Some("genesis"));
    assert!(Registry::new().get("nes").is_none());
}

#[test]
fn switching_profiles_notifies_observers() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut reg = Registry::with_builtin();
    let sink = Arc::clone(&seen);
    reg.subscribe(move |change: &ProfileChange| sink.lock().unwrap().push(change.clone()));

    let change = reg.set_active("snes").unwrap();
    assert_eq!(change.previous, "default");
    assert_eq!(change.current, "snes");
    assert_eq!(reg.active().kind, ConsoleKind::Snes);

    reg.set_active("gb").unwrap();
    assert_eq!(reg.active().id, "gameboy");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].previous, "snes");
}

#[test]
fn unknown_profile_leaves_active_unchanged() {
    let calls = Arc::new(Mutex::new(0));
    let mut reg = Registry::with_builtin();
    reg.set_active("nes").unwrap();
    let counter = Arc::clone(&calls);
    reg.subscribe(move |_| *counter.lock().unwrap() += 1);

    assert!(matches!(
        reg.set_active("atari2600"),
        Err(CodecError::UnknownProfile(_))
    ));
    assert_eq!(reg.active().id, "nes");
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[test]
fn switching_does_not_carry_constraints_over() {
    let mut reg = Registry::with_builtin();
    reg.set_active("msx1").unwrap();
    assert_eq!(reg.active().max_colors, Some(1));
    reg.set_active("dreamcast").unwrap();
    assert_eq!(reg.active().max_colors, None);
    assert!(reg.active().tile_formats.is_empty());
}

#[test]
fn registered_profiles_replace_builtins() {
    let mut reg = Registry::with_builtin();
    let mut custom = ConsoleKind::Nes.profile();
    custom.max_colors = Some(2);
    reg.register(custom);
    reg.set_active("nes").unwrap();
    assert_eq!(reg.active().max_colors, Some(2));
    assert_eq!(reg.ids().count(), ConsoleKind::ALL.len());
}

#[test]
fn separate_registries_are_isolated() {
    let mut a = Registry::with_builtin();
    let b = Registry::with_builtin();
    a.set_active("gba").unwrap();
    assert_eq!(b.active().id, "default");
}

#[test]
fn mapping_keeps_first_seen_order_and_reserves_slot_zero() {
    let colors = [Rgb::new(9, 9, 9), Rgb::new(1, 1, 1), Rgb::new(9, 9, 9), Rgb::new(5, 5, 5)];
    let mapping = ColorIndexMapping::with_limit(&colors, Some(15)).unwrap();
    assert_eq!(mapping.colors().len(), 3);
    assert_eq!(mapping.slot_of(Rgb::new(9, 9, 9)), Some(1));
    assert_eq!(mapping.slot_of(Rgb::new(5, 5, 5)), Some(3));
    assert_eq!(mapping.color_at(0), None);
    assert_eq!(mapping.color_at(2), Some(Rgb::new(1, 1, 1)));
    assert_eq!(mapping.len(), 4);
    assert_eq!(mapping, ColorIndexMapping::with_limit(&colors, Some(15)).unwrap());
}

#[test]
fn mapping_refuses_colors_past_the_limit() {
    let nes = ConsoleKind::Nes.profile();
    match ColorIndexMapping::build(&distinct(5), &nes) {
        Err(CodecError::ColorLimit { count, max }) => {
            assert_eq!(count, 5);
            assert_eq!(max, 3);
        }
        other => panic!("expected color limit, got {other:?}"),
    }
    assert!(ColorIndexMapping::with_limit(&distinct(255), None).is_ok());
    assert!(ColorIndexMapping::with_limit(&distinct(256), None).is_err());
}
