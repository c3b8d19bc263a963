use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSetBuilder};
use image::{ImageReader, RgbaImage};
use retro_codec_core::palettes::nes_register_string;
use retro_codec_core::{
    ConsoleKind, ConsoleProfile, ExportConfig, ExportOutput, MonoBlock, Registry, Rgb, TileFormat,
    collect_distinct_colors, export_active, validate_sprite,
};
use retro_codec_core::pvr::PvrPixelFormat;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "retro-codec",
    about = "Convert sprite frames into retro console tiles, palettes and textures",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --no-progress or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode frames into console tile/palette files or PVR textures
    Export(ExportArgs),
    /// Check dimensions, color count and palette membership; exits non-zero when invalid
    Validate(ValidateArgs),
    /// List the built-in console profiles
    Consoles(ConsolesArgs),
    /// Snap colors to a console's color space
    Quantize(QuantizeArgs),
}

#[derive(Parser, Debug, Clone)]
struct ExportArgs {
    // Input/Output
    /// Input frame file or directory (frames are taken in sorted path order)
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Base name of the written files
    #[arg(short, long, default_value = "sprite", help_heading = "Input/Output")]
    name: String,
    /// YAML config file path (file values override flags)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Console
    /// Console profile id or alias: nes | gameboy | gbc | sms | gamegear | genesis | snes | gba | msx1 | msx2 | dreamcast
    #[arg(short, long, default_value = "default", help_heading = "Console")]
    console: String,
    /// Tile layout (defaults to the console's first): planar2 | interleaved2 | packed4 | packed4_lsb | bitplane4 | linear8 | mono1
    #[arg(long, help_heading = "Console")]
    format: Option<String>,
    /// MSX1 sprite size: 8 | 16
    #[arg(long, default_value = "8", help_heading = "Console")]
    mono_block: String,
    /// Reject colors outside a fixed console palette instead of zeroing their entries
    #[arg(long, default_value_t = false, help_heading = "Console")]
    strict_palette: bool,
    /// Encode frames in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Console")]
    parallel: bool,

    // Texture
    /// PVR pixel format: argb1555 | rgb565 | argb4444
    #[arg(long, default_value = "argb1555", help_heading = "Texture")]
    pixel_format: String,
    /// Write a GBIX header with this global index
    #[arg(long, help_heading = "Texture")]
    global_index: Option<u32>,

    // Export
    /// Export byte counts (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: validate and encode but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct ValidateArgs {
    /// Input frame file or directory
    input: PathBuf,
    /// Console profile id or alias
    #[arg(short, long)]
    console: String,
    #[arg(long)]
    include: Vec<String>,
    #[arg(long)]
    exclude: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
struct ConsolesArgs {
    /// Print full profiles as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug, Clone)]
struct QuantizeArgs {
    /// Colors as #RRGGBB or RRGGBB
    #[arg(required = true)]
    colors: Vec<String>,
    /// Console profile id or alias
    #[arg(short, long)]
    console: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Export(args) => run_export(args, cli.progress && !cli.quiet),
        Commands::Validate(args) => run_validate(args, cli.progress && !cli.quiet),
        Commands::Consoles(args) => run_consoles(args),
        Commands::Quantize(args) => run_quantize(args),
    }
}

#[derive(Serialize)]
struct MergedConfig<'a> {
    console: &'a str,
    #[serde(flatten)]
    export: &'a ExportConfig,
}

fn run_export(cli: &ExportArgs, show_progress: bool) -> anyhow::Result<()> {
    let mut console = cli.console.clone();
    let mut cfg = ExportConfig {
        tile_format: cli.format.as_deref().map(parse_tile_format).transpose()?,
        mono_block: parse_mono_block(&cli.mono_block)?,
        pixel_format: parse_pixel_format(&cli.pixel_format)?,
        global_index: cli.global_index,
        strict_palette: cli.strict_palette,
        parallel: cli.parallel,
    };
    if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        if let Some(c) = &y.console {
            console = c.clone();
        }
        cfg = y.into_export_config(cfg)?;
    }

    if cli.print_config {
        let merged = MergedConfig {
            console: &console,
            export: &cfg,
        };
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&merged)?),
            _ => println!("{}", serde_json::to_string_pretty(&merged)?),
        }
        return Ok(());
    }

    let mut registry = Registry::with_builtin();
    let change = registry.set_active(&console)?;
    info!(console = %change.current, "profile selected");

    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude)?;
    if paths.is_empty() {
        anyhow::bail!("no frames found under {}", cli.input.display());
    }
    let frames = load_frames_with_progress(&paths, show_progress)?;
    info!(count = frames.len(), "loaded frames");

    let out = export_active(&registry, &frames, &cfg)
        .with_context(|| format!("export for {}", registry.active().name))?;
    info!(
        frames = out.stats.frames,
        tiles = out.stats.tiles,
        tile_bytes = out.stats.tile_bytes,
        palette_bytes = out.stats.palette_bytes,
        texture_bytes = out.stats.texture_bytes,
        colors = out.stats.colors,
        "stats"
    );

    if !cli.dry_run {
        fs::create_dir_all(&cli.out_dir)
            .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
        write_outputs(cli, registry.active(), &out)?;
    }

    if let Some(stats_path) = &cli.export_stats {
        let value = serde_json::json!({
            "console": out.console,
            "format": out.format.map(|f| f.name()),
            "stats": out.stats,
            "unmapped_pixels": out.unmapped_pixels,
        });
        if !cli.dry_run {
            fs::write(stats_path, serde_json::to_string_pretty(&value)?)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        } else {
            println!(
                "frames={} tiles={} tile_bytes={} palette_bytes={} texture_bytes={}",
                out.stats.frames,
                out.stats.tiles,
                out.stats.tile_bytes,
                out.stats.palette_bytes,
                out.stats.texture_bytes
            );
        }
    }
    Ok(())
}

fn tile_extension(kind: ConsoleKind) -> &'static str {
    match kind {
        ConsoleKind::Nes => "chr",
        ConsoleKind::GameBoy | ConsoleKind::GameBoyColor => "2bpp",
        _ => "bin",
    }
}

/// Files for one export, in write order.
fn planned_outputs<'a>(
    cli: &ExportArgs,
    profile: &ConsoleProfile,
    out: &'a ExportOutput,
) -> Vec<(PathBuf, &'a [u8])> {
    if profile.is_texture() {
        return out
            .textures
            .iter()
            .enumerate()
            .map(|(i, tex)| {
                let path = cli.out_dir.join(format!("{}_{}.pvr", cli.name, i));
                (path, tex.as_slice())
            })
            .collect();
    }
    let ext = tile_extension(profile.kind);
    let mut files = vec![
        (cli.out_dir.join(format!("{}.{}", cli.name, ext)), out.tiles.as_slice()),
        (cli.out_dir.join(format!("{}.pal", cli.name)), out.palette.as_slice()),
    ];
    if !out.color_table.is_empty() {
        files.push((cli.out_dir.join(format!("{}.col", cli.name)), out.color_table.as_slice()));
    }
    files
}

fn write_outputs(
    cli: &ExportArgs,
    profile: &ConsoleProfile,
    out: &ExportOutput,
) -> anyhow::Result<()> {
    write_all(&planned_outputs(cli, profile, out))
}

/// Writes every file or none: on failure the files already written are removed.
fn write_all(files: &[(PathBuf, &[u8])]) -> anyhow::Result<()> {
    for (done, (path, bytes)) in files.iter().enumerate() {
        if let Err(e) = write_bytes(path, bytes) {
            for (written, _) in &files[..done] {
                if let Err(rm) = fs::remove_file(written) {
                    warn!(path = ?written, error = %rm, "failed to remove partial output");
                }
            }
            return Err(e);
        }
    }
    Ok(())
}

fn write_bytes(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    fs::write(path, bytes).with_context(|| format!("write {}", path.display()))?;
    info!(?path, bytes = bytes.len(), "wrote");
    Ok(())
}

fn run_validate(cli: &ValidateArgs, show_progress: bool) -> anyhow::Result<()> {
    let registry = Registry::with_builtin();
    let profile = registry
        .get(&cli.console)
        .ok_or_else(|| anyhow!("unknown console profile: {}", cli.console))?;
    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude)?;
    let frames = load_frames_with_progress(&paths, show_progress)?;
    let first = frames
        .first()
        .ok_or_else(|| anyhow!("no frames found under {}", cli.input.display()))?;
    let (w, h) = first.dimensions();
    if let Some(f) = frames.iter().find(|f| f.dimensions() != (w, h)) {
        anyhow::bail!(
            "frames differ in size: {}x{} and {}x{}",
            w,
            h,
            f.width(),
            f.height()
        );
    }
    let colors = collect_distinct_colors(&frames);
    let report = validate_sprite(profile, w, h, &colors);
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.is_valid() {
        anyhow::bail!("sprite is not valid for {}", profile.name);
    }
    Ok(())
}

fn run_consoles(cli: &ConsolesArgs) -> anyhow::Result<()> {
    let registry = Registry::with_builtin();
    if cli.json {
        let profiles: Vec<&ConsoleProfile> = registry.profiles().collect();
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(());
    }
    for p in registry.profiles() {
        let colors = p
            .max_colors
            .map(|m| m.to_string())
            .unwrap_or_else(|| "any".into());
        let formats = p
            .tile_formats
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>()
            .join(",");
        let palette = p.palette_format.map(|f| f.name()).unwrap_or("-");
        println!(
            "{:<10} {:<20} space={:<7} colors={:<4} tiles={:<20} palette={}",
            p.id,
            p.name,
            p.space.tag(),
            colors,
            if formats.is_empty() { "-" } else { formats.as_str() },
            palette
        );
    }
    Ok(())
}

fn run_quantize(cli: &QuantizeArgs) -> anyhow::Result<()> {
    let kind: ConsoleKind = cli.console.parse()?;
    let profile = kind.profile();
    for s in &cli.colors {
        let c: Rgb = s.parse().with_context(|| format!("parse color {s}"))?;
        match profile.space.quantize(c) {
            Some(q) => match (kind, nes_register_string(q)) {
                (ConsoleKind::Nes, Some(reg)) => println!("{c} -> {q} ({reg})"),
                _ => println!("{c} -> {q}"),
            },
            None => {
                warn!(color = %c, console = %profile.id, "not in palette");
                println!("{c} -> not in the {} palette", profile.name);
            }
        }
    }
    Ok(())
}

fn parse_tile_format(s: &str) -> anyhow::Result<TileFormat> {
    s.parse().map_err(|_| anyhow!("unknown tile format: {}", s))
}

fn parse_mono_block(s: &str) -> anyhow::Result<MonoBlock> {
    s.parse().map_err(|_| anyhow!("unknown mono block size: {}", s))
}

fn parse_pixel_format(s: &str) -> anyhow::Result<PvrPixelFormat> {
    s.parse().map_err(|_| anyhow!("unknown pixel format: {}", s))
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    // Build glob matchers
    let mut inc_set = None;
    if !include.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in include {
            b.add(Glob::new(pat)?);
        }
        inc_set = Some(b.build()?);
    }
    let mut exc_set = None;
    if !exclude.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in exclude {
            b.add(Glob::new(pat)?);
        }
        exc_set = Some(b.build()?);
    }
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
            list.push(path.to_path_buf());
        }
    } else {
        // frame order is the sorted path order
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    Ok(list)
}

fn should_skip(
    p: &Path,
    include: Option<&globset::GlobSet>,
    exclude: Option<&globset::GlobSet>,
) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "bmp" | "tga" | "gif")
    )
}

fn load_frames_with_progress(paths: &[PathBuf], progress: bool) -> anyhow::Result<Vec<RgbaImage>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        // a missing frame would shift every later frame, so loading errors are fatal
        let frame = load_frame(p).with_context(|| format!("load frame {}", p.display()))?;
        list.push(frame);
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn load_frame(p: &Path) -> anyhow::Result<RgbaImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img.to_rgba8())
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    console: Option<String>,
    tile_format: Option<String>,
    mono_block: Option<String>,
    pixel_format: Option<String>,
    global_index: Option<u32>,
    strict_palette: Option<bool>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_export_config(self, mut cfg: ExportConfig) -> anyhow::Result<ExportConfig> {
        if let Some(v) = self.tile_format {
            cfg.tile_format = Some(parse_tile_format(&v)?);
        }
        if let Some(v) = self.mono_block {
            cfg.mono_block = parse_mono_block(&v)?;
        }
        if let Some(v) = self.pixel_format {
            cfg.pixel_format = parse_pixel_format(&v)?;
        }
        if let Some(v) = self.global_index {
            cfg.global_index = Some(v);
        }
        if let Some(v) = self.strict_palette {
            cfg.strict_palette = v;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}
