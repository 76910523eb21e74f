//! Offline tooling for spell patterns
//!
//! `generate` turns stencil artwork into a value map PNG; `check` grades a
//! finished drawing against a spell collection manifest.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use inkseal_config::{ConfigError, InksealConfig, SpellMapSettings};
use painting::CanvasSnapshot;
use serde::Serialize;
use spells::{
    CategoryCounts, ClassificationReport, ClassifyError, DistanceFieldGenerator,
    PatternClassifier, SpellCollection, SpellScan, SpellbookError,
};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "inkseal-spellmap",
    about = "Generate spell value maps and check drawings against them"
)]
struct Cli {
    /// JSON configuration file; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a value map from a stencil image
    Generate(GenerateArgs),
    /// Grade a drawing against every spell of a manifest, in order
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Stencil image; pixels above the alpha threshold are filled
    input: PathBuf,

    /// Output path (default: `<stem>_ValueMap.png` next to the input)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Empty pixels farther than this from the artwork are forbidden
    #[arg(long)]
    red_min_distance: Option<u32>,

    /// Empty pixels closer than this to the artwork are bonus
    #[arg(long)]
    green_max_distance: Option<u32>,

    /// Fraction of the deepest interior distance that counts as required
    #[arg(long)]
    blue_threshold: Option<f32>,

    /// Half-width of the search window in pixels
    #[arg(long)]
    influence_size: Option<u32>,

    /// Alpha fraction (0-1) separating filled from empty pixels
    #[arg(long)]
    alpha_threshold: Option<f32>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Finished drawing (RGBA, same size as the value maps)
    drawing: PathBuf,

    /// Spell collection manifest (JSON array of spell entries)
    #[arg(long)]
    manifest: PathBuf,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error(transparent)]
    Spellbook(#[from] SpellbookError),
    #[error("Failed to read image {}: {source}", path.display())]
    ReadImage {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Failed to write image {}: {source}", path.display())]
    WriteImage {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct GenerateSummary {
    output: PathBuf,
    width: u32,
    height: u32,
    totals: CategoryCounts,
}

#[derive(Serialize)]
struct CheckSummary {
    spell: Option<String>,
    index: Option<usize>,
    report: Option<ClassificationReport>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

/// `<dir>/<stem>_ValueMap.png` for `<dir>/<stem>.<ext>`
fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}_ValueMap.png"))
}

fn apply_overrides(settings: &mut SpellMapSettings, args: &GenerateArgs) {
    if let Some(v) = args.red_min_distance {
        settings.red_min_distance = v;
    }
    if let Some(v) = args.green_max_distance {
        settings.green_max_distance = v;
    }
    if let Some(v) = args.blue_threshold {
        settings.blue_threshold = v;
    }
    if let Some(v) = args.influence_size {
        settings.influence_size = v;
    }
    if let Some(v) = args.alpha_threshold {
        settings.alpha_threshold = v;
    }
}

fn load_config(path: Option<&Path>) -> Result<InksealConfig, CliError> {
    match path {
        Some(path) => Ok(InksealConfig::load(path)?),
        None => Ok(InksealConfig::default()),
    }
}

fn read_rgba(path: &Path) -> Result<image::RgbaImage, CliError> {
    let decoded = image::open(path).map_err(|source| CliError::ReadImage {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decoded.to_rgba8())
}

fn generate(config: &InksealConfig, args: &GenerateArgs, json: bool) -> Result<(), CliError> {
    let mut settings = config.spell_map;
    apply_overrides(&mut settings, args);
    let generator = DistanceFieldGenerator::new(settings)?;

    let stencil = read_rgba(&args.input)?;
    info!(
        "Stencil {} ({} x {})",
        args.input.display(),
        stencil.width(),
        stencil.height()
    );
    let map = generator.generate_from_image(&stencil)?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.input));
    map.to_value_image()
        .save(&output)
        .map_err(|source| CliError::WriteImage {
            path: output.clone(),
            source,
        })?;
    info!("Value map written to {}", output.display());

    let summary = GenerateSummary {
        output,
        width: map.width(),
        height: map.height(),
        totals: map.counts(),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        let t = summary.totals;
        println!(
            "{}: required {}, forbidden {}, bonus {}, neutral {}",
            summary.output.display(),
            t.required,
            t.forbidden,
            t.bonus,
            t.neutral
        );
    }
    Ok(())
}

async fn check(config: &InksealConfig, args: &CheckArgs, json: bool) -> Result<(), CliError> {
    let classifier = PatternClassifier::new(config.classifier)?;
    let collection = SpellCollection::load_manifest(&args.manifest)?;
    let snapshot = CanvasSnapshot::from_image(&read_rgba(&args.drawing)?);

    let found = SpellScan::new(&classifier, &snapshot, collection.spells())
        .run_cooperative()
        .await;

    let summary = match found {
        Some(found) => CheckSummary {
            spell: Some(found.spell.name.clone()),
            index: Some(found.index),
            report: Some(classifier.measure(&snapshot, &found.spell.map)?),
        },
        None => CheckSummary {
            spell: None,
            index: None,
            report: None,
        },
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        match (&summary.spell, &summary.report) {
            (Some(name), Some(report)) => println!(
                "{name}: {:?} (required {:.2}, forbidden {:.3}, balance {:.2})",
                report.result, report.required_ratio, report.forbidden_ratio, report.balance
            ),
            _ => println!("No spell matched"),
        }
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_deref())?;
    match &cli.command {
        Command::Generate(args) => generate(&config, args, cli.json),
        Command::Check(args) => check(&config, args, cli.json).await,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
