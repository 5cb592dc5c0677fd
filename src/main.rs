use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use relnotes::logging;
use relnotes::{Config, GenerationMode, PipelineConfig, ReleaseNotesService};

#[derive(Parser, Debug)]
#[command(name = "relnotes")]
#[command(version = "0.1.0")]
#[command(about = "Generate release notes from Jira issues and publish them to Confluence")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report whether the generator is available
    Status,
    /// Release notes for one project, or one project family, as a single section list
    Single(GenerateArgs),
    /// Release notes split per project, ordered by project priority
    Multi(GenerateArgs),
}

#[derive(ClapArgs, Debug)]
struct GenerateArgs {
    /// Jira project key or logical project name
    #[arg(short, long)]
    project: String,

    /// Fix version to collect issues for
    #[arg(short, long)]
    release_version: String,

    /// Generate without publishing; print the Markdown instead
    #[arg(long)]
    dry_run: bool,

    /// Write the Markdown to a file (implies --dry-run)
    #[arg(short, long)]
    output: Option<String>,

    /// Show a progress bar while summarizing
    #[arg(long)]
    progress: bool,
}

/// Console logging plus a daily rotating file under `LOG_DIR` when it is writable.
fn init_logging() -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::from_default_env()
        .add_directive("relnotes=info".parse()?)
        .add_directive("reqwest=warn".parse()?);

    let log_dir = std::env::var("LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(logging::DEFAULT_LOG_DIR));
    let (file_layer, guard, file_error) = match logging::file_appender(&log_dir) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        tracing::warn!(
            "Cannot write logs to {}, logging to console only: {}",
            log_dir.display(),
            e
        );
    }
    Ok(guard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let log_guard = init_logging()?;

    let cli = Cli::parse();

    let (mode, args) = match cli.command {
        Command::Status => {
            println!("{}", relnotes::service::STATUS_MESSAGE);
            return Ok(());
        }
        Command::Single(args) => (GenerationMode::SingleProject, args),
        Command::Multi(args) => (GenerationMode::MultiProject, args),
    };

    let config = Config::from_env()?;
    let mut pipeline_config = PipelineConfig::from(&config);
    pipeline_config.show_progress = args.progress;

    let service = ReleaseNotesService::from_config(&config, pipeline_config)?;
    tracing::info!(
        "Release notes requested for {} {} ({:?})",
        args.project,
        args.release_version,
        mode
    );

    if args.dry_run || args.output.is_some() {
        let document = service
            .preview(mode, &args.project, &args.release_version)
            .await?;
        match args.output {
            Some(ref path) => {
                std::fs::write(path, document.as_str())?;
                tracing::info!("Output written to: {}", path);
            }
            None => println!("{}", document),
        }
        return Ok(());
    }

    let outcome = service
        .generate(mode, &args.project, &args.release_version)
        .await;
    println!("{}", outcome);
    if !outcome.is_success() {
        // exit skips destructors; flush the file writer first
        drop(log_guard);
        std::process::exit(1);
    }

    Ok(())
}
