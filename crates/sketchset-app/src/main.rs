//! `sketchset` command line entry point.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use sketchset_app::{AppConfig, CaptureOptions, CaptureRunner, CaptureScript};
use sketchset_core::labels::{CachedLabels, FileLabels, LabelProvider, StaticLabels};
use sketchset_core::session::SessionRecord;
use sketchset_core::storage::{FileStorage, SessionStore};
use sketchset_render::CpuRasterizer;

#[derive(Parser, Debug)]
#[command(name = "sketchset", version)]
struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Surface and image size in pixels.
    #[arg(long, global = true)]
    size: Option<u32>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay capture scripts and store the resulting sessions.
    Capture(CaptureArgs),
    /// Render every drawing of a saved session as PNG.
    Render(RenderArgs),
    /// Build the dataset from raw session files.
    Dataset(DatasetArgs),
}

#[derive(Parser, Debug)]
struct CaptureArgs {
    /// Capture scripts, one session each.
    #[arg(required = true)]
    scripts: Vec<PathBuf>,

    /// JSON array of labels.
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Session storage directory.
    #[arg(long)]
    sessions_dir: Option<PathBuf>,

    /// Also write PNGs of saved drawings here.
    #[arg(long)]
    images: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Saved session record.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct DatasetArgs {
    /// Raw session directory.
    #[arg(long)]
    raw: Option<PathBuf>,

    /// Dataset output directory.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    if let Some(size) = cli.size {
        config.surface_size = size;
        config.validate()?;
    }

    match cli.cmd {
        Command::Capture(args) => cmd_capture(config, args),
        Command::Render(args) => cmd_render(config, args),
        Command::Dataset(args) => cmd_dataset(config, args),
    }
}

fn cmd_capture(mut config: AppConfig, args: CaptureArgs) -> anyhow::Result<()> {
    if args.labels.is_some() {
        config.labels_file = args.labels;
    }
    if args.sessions_dir.is_some() {
        config.sessions_dir = args.sessions_dir;
    }

    let source: Box<dyn LabelProvider> = match &config.labels_file {
        Some(path) => Box::new(FileLabels::new(path)),
        None => Box::new(StaticLabels::default()),
    };
    let labels = CachedLabels::new(source);

    let store = match &config.sessions_dir {
        Some(dir) => FileStorage::new(dir.clone())?,
        None => FileStorage::default_location()?,
    };
    log::info!("Storing sessions in {}", store.base_path().display());

    let mut rasterizer = CpuRasterizer::new();
    let mut runner = CaptureRunner::new(
        &store,
        &mut rasterizer,
        CaptureOptions {
            surface_size: config.surface_size,
            image_dir: args.images,
        },
    );

    for path in &args.scripts {
        let script = CaptureScript::load(path)?;
        let report = runner.run(&labels, &script)?;
        match &report.saved {
            Some(record) => eprintln!(
                "session {}: saved {} drawings by {}",
                report.session,
                record.drawings.len(),
                record.username
            ),
            None => eprintln!(
                "session {}: not saved (ended in state {})",
                report.session, report.state
            ),
        }
        for image in &report.images {
            eprintln!("wrote {}", image.display());
        }
    }

    let stored = pollster::block_on(store.list())?;
    eprintln!(
        "{} sessions stored in {}",
        stored.len(),
        store.base_path().display()
    );
    Ok(())
}

fn cmd_render(config: AppConfig, args: RenderArgs) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("read session '{}'", args.in_path.display()))?;
    let record = SessionRecord::from_json(&json)
        .with_context(|| format!("parse session '{}'", args.in_path.display()))?;

    let written = sketchset_app::export_session_images(
        &record,
        &mut CpuRasterizer::new(),
        config.surface_size,
        &args.out,
    )?;
    for path in written {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_dataset(mut config: AppConfig, args: DatasetArgs) -> anyhow::Result<()> {
    if let Some(raw) = args.raw {
        config.raw_dir = raw;
    }
    if let Some(out) = args.out {
        config.dataset_dir = out;
    }

    let samples = sketchset_app::generate(&config, &mut CpuRasterizer::new(), std::io::stdout())?;
    eprintln!(
        "wrote {} samples to {}",
        samples.len(),
        config.dataset_dir.display()
    );
    Ok(())
}
