//! castcore: cast and interaction extraction for IMSDb screenplays

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use castcore::export::{self, ExportTables};
use castcore::resolve::{enrich_registry, merge_resolved_duplicates, DirectoryResolver};
use castcore::{load_transcript, CastConfig, CastGraph, ScriptCortex};

/// Label propagation rounds for --metrics
const COMMUNITY_ITERATIONS: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Csv,
}

#[derive(Parser)]
#[command(name = "castcore")]
#[command(about = "Extract a screenplay's cast, interactions and mentions")]
#[command(version)]
struct Args {
    /// IMSDb HTML transcript
    transcript: PathBuf,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Process at most N scenes
    #[arg(long, value_name = "N")]
    nscenes: Option<usize>,

    /// Category hint passed to the name resolver
    #[arg(long, default_value = "")]
    category: String,

    /// JSON character directory used for name resolution and gender lookup
    #[arg(long, value_name = "FILE")]
    directory: Option<PathBuf>,

    /// Drop characters resolving to an already taken canonical name
    #[arg(long = "merge-resolved", requires = "directory")]
    merge_resolved: bool,

    #[arg(long, value_enum, default_value = "json")]
    format: Format,

    /// Output directory (required for csv; json goes to stdout without it)
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Only export characters appearing in at least N scenes
    #[arg(long = "min-scenes", value_name = "N")]
    min_scenes: Option<usize>,

    /// Script title stamped on exported rows and the JSON report
    #[arg(long)]
    title: Option<String>,

    /// Add centrality and community metrics to the JSON report
    #[arg(long)]
    metrics: bool,

    /// More logging (-v info, -vv debug); RUST_LOG wins when set
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(args: &Args) -> Result<CastConfig> {
    let mut config = match &args.config {
        Some(path) => CastConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => CastConfig::imsdb(),
    };
    if let Some(n) = args.nscenes {
        config.scenes.max_scenes = Some(n);
    }
    if let Some(n) = args.min_scenes {
        config.export.min_scene_appearances = n;
    }
    if let Some(title) = &args.title {
        config.export.title = Some(title.clone());
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.format == Format::Csv && args.out.is_none() {
        bail!("--format csv needs --out DIR");
    }

    let config = build_config(&args)?;
    let transcript = load_transcript(&args.transcript, &config.loader)
        .with_context(|| format!("Failed to load transcript {}", args.transcript.display()))?;

    let directory = match &args.directory {
        Some(path) => Some(
            DirectoryResolver::load(path)
                .with_context(|| format!("Failed to load directory {}", path.display()))?,
        ),
        None => None,
    };

    let cortex = ScriptCortex::new(config.clone())?;
    let analysis = cortex.analyze_with(&transcript, |registry| {
        let Some(directory) = &directory else {
            return;
        };
        let stats = enrich_registry(registry, directory, directory, &args.category);
        info!(resolved = stats.resolved, unresolved = stats.unresolved, "names resolved");
        if args.merge_resolved {
            let merged = merge_resolved_duplicates(registry);
            info!(merged, "merged characters sharing a resolved name");
        }
    })?;

    match args.format {
        Format::Csv => {
            let dir = args.out.as_deref().context("--format csv needs --out DIR")?;
            let tables = ExportTables::build(&analysis.registry, &config.export);
            let paths = export::write_csv(dir, &tables)?;
            for path in paths {
                println!("{}", path.display());
            }
        }
        Format::Json => {
            let json = if args.metrics {
                let metrics = CastGraph::from_registry(&analysis.registry).metrics(COMMUNITY_ITERATIONS);
                export::to_json_with_metrics(&analysis, &metrics)?
            } else {
                export::to_json(&analysis)?
            };
            match &args.out {
                Some(dir) => {
                    std::fs::create_dir_all(dir)
                        .with_context(|| format!("Failed to create {}", dir.display()))?;
                    let path = dir.join("analysis.json");
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("{}", path.display());
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}
