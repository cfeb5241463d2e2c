// Headless chart generation.
//
//   crochet-chart -i photo.jpg -o chart.pdf
//   crochet-chart -i photo.jpg --rows 80 --tones 5 --colors --palette Set2 -o chart.png
//   crochet-chart --config saved.json -i photo.jpg --tone-color 0=#1A1A1A -o chart.pdf

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::OnceLock;

use clap::Parser;
use regex::Regex;

use crate::colors::{parse_hex_color, ColorMode};
use crate::config::ChartConfig;
use crate::error::{ChartError, Result};
use crate::export::{encode_png, write_atomic, ExportFormat};
use crate::layout::Padding;
use crate::session::{ExportOutcome, Session};

/// Turn a photo into a printable crochet grid chart.
#[derive(Parser, Debug, Default)]
#[command(name = "crochet-chart", version)]
pub struct CliArgs {
    /// Source image (any format the image crate decodes).
    #[arg(short, long, value_name = "IMAGE")]
    pub input: Option<PathBuf>,

    /// Where to write the print-resolution chart.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Export format; inferred from --output's extension when omitted.
    #[arg(long, value_name = "png|pdf")]
    pub format: Option<ExportFormat>,

    /// Also write the on-screen preview as PNG.
    #[arg(long, value_name = "FILE")]
    pub preview: Option<PathBuf>,

    /// Chart height in stitches (rows).
    #[arg(long)]
    pub rows: Option<u32>,

    /// Chart width in stitches (columns).
    #[arg(long)]
    pub cols: Option<u32>,

    /// Let rows and columns vary independently of the image aspect ratio.
    #[arg(long)]
    pub no_aspect_lock: bool,

    /// Number of tones, 2 to 10.
    #[arg(long)]
    pub tones: Option<u8>,

    /// Brightness offset, -100 to 100.
    #[arg(long, allow_hyphen_values = true)]
    pub brightness: Option<i32>,

    /// Invert the image before quantizing.
    #[arg(long)]
    pub invert: bool,

    /// Heavy guide line every N stitches.
    #[arg(long, value_name = "N")]
    pub guide_every: Option<u32>,

    #[arg(long)]
    pub no_guides: bool,

    /// Color the chart from a qualitative palette instead of gray levels.
    #[arg(long)]
    pub colors: bool,

    /// Palette name, e.g. tab10, Set2, Pastel1.
    #[arg(long)]
    pub palette: Option<String>,

    #[arg(long)]
    pub no_legend: bool,

    /// Override one tone's color, e.g. 2=#FF8800. Repeatable.
    #[arg(long = "tone-color", value_name = "IDX=#RRGGBB", value_parser = parse_tone_color)]
    pub tone_colors: Vec<(usize, String)>,

    /// Padding in stitches as L,R,T,B.
    #[arg(long, value_name = "L,R,T,B", value_parser = parse_padding)]
    pub pad: Option<Padding>,

    /// Equal padding on all sides as a percentage of the shorter side.
    #[arg(long, value_name = "PCT", conflicts_with = "pad")]
    pub auto_pad: Option<u32>,

    /// Read chart parameters from a JSON file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the effective parameters as JSON.
    #[arg(long)]
    pub dump_config: bool,

    /// Debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

fn tone_color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\s*=\s*(#?[0-9A-Fa-f]{6})\s*$").expect("tone color pattern")
    })
}

fn padding_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*$")
            .expect("padding pattern")
    })
}

/// Parse `IDX=#RRGGBB`.
pub fn parse_tone_color(value: &str) -> std::result::Result<(usize, String), String> {
    let caps = tone_color_pattern()
        .captures(value)
        .ok_or_else(|| format!("expected IDX=#RRGGBB, got '{}'", value))?;
    let index = caps[1]
        .parse::<usize>()
        .map_err(|e| format!("bad tone index '{}': {}", &caps[1], e))?;
    Ok((index, caps[2].to_string()))
}

/// Parse `L,R,T,B`.
pub fn parse_padding(value: &str) -> std::result::Result<Padding, String> {
    let caps = padding_pattern()
        .captures(value)
        .ok_or_else(|| format!("expected L,R,T,B, got '{}'", value))?;
    let side = |i: usize| {
        caps[i]
            .parse::<u32>()
            .map_err(|e| format!("bad padding '{}': {}", &caps[i], e))
    };
    Ok(Padding {
        left: side(1)?,
        right: side(2)?,
        top: side(3)?,
        bottom: side(4)?,
    })
}

/// Set up the logger: info by default, debug with `--verbose`; `RUST_LOG` wins.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .try_init();
}

/// Build a session from the arguments, in the order a user would set things.
pub fn build_session(args: &CliArgs) -> Result<Session> {
    let config = match &args.config {
        Some(path) => ChartConfig::load(path)?,
        None => ChartConfig::default(),
    };
    let mut session = Session::new(config);

    if args.no_aspect_lock {
        session.set_aspect_lock(false);
    }
    if let Some(path) = &args.input {
        session.load_image(path)?;
    }

    // Under aspect lock an explicit --rows wins over --cols.
    match (args.rows, args.cols) {
        (Some(rows), Some(cols)) => {
            session.set_cols(cols);
            session.set_rows(rows);
        }
        (Some(rows), None) => session.set_rows(rows),
        (None, Some(cols)) => session.set_cols(cols),
        (None, None) => {}
    }

    if let Some(tones) = args.tones {
        session.set_tones(tones);
    }
    if let Some(offset) = args.brightness {
        session.set_brightness(offset);
    }
    if args.invert {
        session.set_invert(true);
    }

    let current = session.config();
    if args.no_guides || args.guide_every.is_some() {
        session.set_guides(
            current.show_guides && !args.no_guides,
            args.guide_every.unwrap_or(current.guide_every),
        );
    }

    if args.colors {
        session.set_color_mode(ColorMode::Palette);
    }
    if let Some(name) = &args.palette {
        session.set_palette(name);
    }
    if args.no_legend {
        session.set_show_legend(false);
    }
    for (index, hex) in &args.tone_colors {
        let color = parse_hex_color(hex)?;
        session.set_tone_color(*index, color)?;
    }

    if let Some(padding) = args.pad {
        session.set_padding(padding);
    } else if let Some(percent) = args.auto_pad {
        session.apply_auto_padding(percent);
    }

    Ok(session)
}

fn execute(args: &CliArgs) -> Result<()> {
    let mut session = build_session(args)?;

    if args.dump_config {
        println!("{}", session.config().to_json_pretty());
    }

    if args.input.is_none() && args.output.is_none() && args.preview.is_none() {
        return Ok(());
    }

    let preview = session.render();
    if let Some(path) = &args.preview {
        let bytes = encode_png(preview.image())?;
        write_atomic(path, &bytes)?;
        log::info!("Wrote preview to {}", path.display());
    }

    if let Some(path) = &args.output {
        match session.export(path, args.format)? {
            ExportOutcome::Written(path) => println!("{}", path.display()),
            ExportOutcome::NothingToExport => {
                eprintln!("Nothing to export: load an image with --input first.")
            }
        }
    } else if args.input.is_some() && args.preview.is_none() {
        return Err(ChartError::InvalidArgument(
            "Nothing to write: pass --output and/or --preview".to_string(),
        ));
    }
    Ok(())
}

/// Run the CLI and return an OS exit code.
pub fn run(args: CliArgs) -> ExitCode {
    init_logging(args.verbose);
    match execute(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
