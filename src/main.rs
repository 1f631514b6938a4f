use anyhow::{bail, Context, Result};
use clap::Parser;
use loopcast::streams::read_stream_list;
use loopcast::{prompt, Config, Orchestrator, StreamJob};
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Loop video files to live ingestion endpoints", long_about = None)]
struct Args {
    /// Config file (without extension)
    #[arg(short, long, default_value = "config/loopcast")]
    config: String,

    /// Base directory with the videos and the stream list
    #[arg(short, long)]
    base_dir: Option<PathBuf>,

    /// Stream list file (`video_filename:stream_key` per line)
    #[arg(short, long)]
    list: Option<PathBuf>,

    /// Live duration in hours, skips the duration prompt
    #[arg(short = 'H', long)]
    hours: Option<String>,

    /// Start without asking for confirmation
    #[arg(short, long)]
    yes: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(Args::parse()).await {
        eprintln!("[✘] {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("==============================");
    println!("     LOOPCAST LIVE RESTREAM");
    println!("==============================");

    let cfg = Config::load(&args.config)?;
    let base_dir = match args.base_dir {
        Some(dir) => dir,
        None => cfg.resolve_base_dir(),
    };
    let list_path = args
        .list
        .unwrap_or_else(|| base_dir.join(&cfg.paths.stream_list));

    info!("Loopcast v{}", env!("CARGO_PKG_VERSION"));
    info!("Base directory: {}", base_dir.display());
    info!("Ingest URL: {}", cfg.ingest.url);

    if !list_path.is_file() {
        bail!("Stream list {} not found", list_path.display());
    }
    let entries = read_stream_list(&list_path)?;
    if entries.is_empty() {
        bail!("No valid `video:stream_key` entries in {}", list_path.display());
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let duration_secs = match &args.hours {
        Some(hours) => prompt::duration_or_default(hours, &mut output)?,
        None => prompt::prompt_duration(&mut input, &mut output)?,
    };

    if !args.yes && !prompt::confirm_start(entries.len(), &mut input, &mut output)? {
        println!("[✘] Live streaming cancelled.");
        return Ok(());
    }
    drop(input);

    std::fs::create_dir_all(&base_dir)
        .with_context(|| format!("Failed to create {}", base_dir.display()))?;

    let jobs = StreamJob::from_entries(entries, &cfg, duration_secs);
    info!("{} streams for {}s each", jobs.len(), duration_secs);

    let orchestrator = Orchestrator::from_config(&cfg, base_dir);
    let ctrl_c = orchestrator.shutdown().spawn_ctrl_c_handler();

    let summary = orchestrator.run_all(jobs).await;
    ctrl_c.abort();

    println!(
        "[✔] All sessions finished: {} completed, {} abandoned, {} failed",
        summary.completed(),
        summary.abandoned(),
        summary.failed()
    );
    if summary.not_started > 0 {
        println!("[!] {} streams were not started", summary.not_started);
    }

    Ok(())
}
