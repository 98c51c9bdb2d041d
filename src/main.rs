use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sky_atlas::artifact::decode_artifact;
use sky_atlas::scene::assemble;
use sky_atlas::source::{fetch_and_store, from_config};
use sky_atlas::state::config::{AppConfig, SourceConfig};
use sky_atlas::state::store::MetadataStore;
use sky_atlas::ui;

/// Sample field used when `fetch` gets no coordinates
const SAMPLE_COORDS: [(f64, f64); 5] = [
    (12.514, 12.393),
    (12.515, 12.394),
    (12.516, 12.395),
    (12.517, 12.396),
    (12.518, 12.397),
];

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Fetch survey cutouts and view them on the celestial sphere"
)]
struct Args {
    #[arg(short, long, global = true, help = "Config file (JSON)")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a cutout per coordinate and record each success
    Fetch {
        #[arg(short, long, help = "Metadata store to append to")]
        store: PathBuf,

        #[arg(long, value_enum, help = "Image source (defaults to the config)")]
        source: Option<SourceKind>,

        #[arg(long, help = "Survey name, e.g. dss")]
        survey: Option<String>,

        #[arg(long, help = "Cutout size in degrees")]
        size: Option<f64>,

        #[arg(short, long, help = "Directory for fetched artifacts")]
        output: Option<PathBuf>,

        #[arg(value_parser = parse_coord, help = "Coordinates as RA,DEC in degrees")]
        coords: Vec<(f64, f64)>,
    },
    /// Print every record in a store
    List {
        #[arg(short, long)]
        store: PathBuf,
    },
    /// Assemble a scene and print sprite positions
    Scene {
        #[arg(short, long)]
        store: PathBuf,

        #[arg(long, help = "Directory relative artifact paths are resolved against")]
        base: Option<PathBuf>,
    },
    /// Show one artifact as a grayscale plot
    Plot {
        file: PathBuf,

        #[arg(long, help = "Gaussian sigma in pixels (0 disables smoothing)")]
        sigma: Option<f32>,
    },
    /// Open the 3D space viewer
    View {
        #[arg(short, long)]
        store: Option<PathBuf>,

        #[arg(long)]
        base: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SourceKind {
    Http,
    Jar,
}

fn parse_coord(s: &str) -> Result<(f64, f64), String> {
    let (ra, dec) = s
        .split_once(',')
        .ok_or_else(|| format!("expected RA,DEC but got '{}'", s))?;
    let ra = ra.trim().parse::<f64>().map_err(|e| format!("bad RA '{}': {}", ra, e))?;
    let dec = dec.trim().parse::<f64>().map_err(|e| format!("bad DEC '{}': {}", dec, e))?;
    Ok((ra, dec))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = AppConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    match args.command {
        Command::Fetch {
            store,
            source,
            survey,
            size,
            output,
            coords,
        } => {
            match source {
                Some(SourceKind::Http) if !matches!(config.source, SourceConfig::Http { .. }) => {
                    config.source = SourceConfig::default();
                }
                Some(SourceKind::Jar) if !matches!(config.source, SourceConfig::Jar { .. }) => {
                    config.source = SourceConfig::default_jar();
                }
                _ => {}
            }
            if let Some(survey) = survey {
                config.fetch.survey = survey;
            }
            if let Some(size) = size {
                config.fetch.size_deg = size;
            }
            if let Some(output) = output {
                config.fetch.output_dir = output;
            }
            let coords = if coords.is_empty() {
                info!("No coordinates given, using the sample field");
                SAMPLE_COORDS.to_vec()
            } else {
                coords
            };

            let source = from_config(&config).context("Failed to set up image source")?;
            let store = MetadataStore::new(store);
            let report = fetch_and_store(source.as_ref(), &coords, &store)
                .with_context(|| format!("Failed to update {}", store.path().display()))?;

            println!(
                "Stored {} images in {}, {} failed",
                report.stored.len(),
                store.path().display(),
                report.failed.len()
            );
            for failure in &report.failed {
                println!("  failed ({}, {}): {}", failure.ra, failure.dec, failure.reason);
            }
        }
        Command::List { store } => {
            let store = MetadataStore::new(store);
            let records = store
                .load()
                .with_context(|| format!("Failed to read {}", store.path().display()))?;
            for (i, record) in records.iter().enumerate() {
                println!(
                    "{:>4}  ra={:<10} dec={:<10} {}",
                    i,
                    record.ra(),
                    record.dec(),
                    record.file()
                );
            }
            println!("{} records", records.len());
        }
        Command::Scene { store, base } => {
            if base.is_some() {
                config.scene.base_dir = base;
            }
            let store = MetadataStore::new(store);
            let scene = assemble(&store, &config.scene, config.camera)
                .with_context(|| format!("Failed to assemble {}", store.path().display()))?;

            for object in &scene.objects {
                let (rows, cols) = object.pixels.dim();
                println!(
                    "({:+.6}, {:+.6}, {:+.6})  {}x{}  {}",
                    object.position.x,
                    object.position.y,
                    object.position.z,
                    cols,
                    rows,
                    object.record.file()
                );
            }
            for skipped in &scene.skipped {
                println!(
                    "skipped #{} {}: {}",
                    skipped.index,
                    skipped.path.display(),
                    skipped.error
                );
            }
            println!(
                "camera at {:?} looking at {:?}",
                scene.camera.position, scene.camera.target
            );
        }
        Command::Plot { file, sigma } => {
            let pixels = decode_artifact(&file)
                .with_context(|| format!("Failed to open {}", file.display()))?;
            let sigma = sigma.unwrap_or(config.scene.enhance_sigma);
            ui::run_plot(&file, &pixels, sigma).context("Plot window failed")?;
        }
        Command::View { store, base } => {
            if base.is_some() {
                config.scene.base_dir = base;
            }
            ui::run_viewer(store, config).context("Viewer window failed")?;
        }
    }

    Ok(())
}
