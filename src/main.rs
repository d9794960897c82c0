//! Terminal front end: shows video details and triggers downloads.
//! All rules live in the library; this only wires input to the two entry points.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use vidgrab::downloader::diagnostics::diagnose;
use vidgrab::{is_valid_url, logging, DownloadError, Downloader, DownloaderConfig, ToolOverrides};

#[derive(Parser)]
#[command(name = "vidgrab", version, about = "Fetch video details and download videos via yt-dlp")]
struct Cli {
    /// JSON config file (defaults to <config dir>/vidgrab/config.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the yt-dlp binary
    #[arg(long = "yt-dlp", global = true)]
    ytdlp: Option<PathBuf>,

    /// Path to the ffmpeg binary
    #[arg(long, global = true)]
    ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe binary
    #[arg(long, global = true)]
    ffprobe: Option<PathBuf>,

    /// Force IPv4 for metadata queries
    #[arg(long, global = true)]
    force_ipv4: bool,

    /// More log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show title, duration, size and thumbnail for a URL
    Info { url: String },
    /// Download a URL into the download directory
    Download {
        url: String,
        /// Output directory (defaults to the configured download directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Show where the external tools are and which versions they report
    Tools,
}

/// Config file first, then command-line flags. Runs tool detection, which blocks.
fn load_config(
    config: Option<PathBuf>,
    overrides: ToolOverrides,
    force_ipv4: bool,
) -> Result<DownloaderConfig> {
    let file = config.or_else(|| DownloaderConfig::default_path().filter(|p| p.exists()));
    let config = match file {
        Some(path) => DownloaderConfig::load_with(&path, overrides)?,
        None => DownloaderConfig::new(overrides.resolve()),
    };

    Ok(if force_ipv4 {
        config.with_force_ipv4(true)
    } else {
        config
    })
}

fn print_failure(title: &str, err: &DownloadError) {
    eprintln!("{}: {}", title, err);
    if let Some(hint) = err.detail().and_then(diagnose) {
        eprintln!("  {}. {}", hint.description(), hint.suggestion());
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let overrides = ToolOverrides {
        ytdlp: cli.ytdlp,
        ffmpeg: cli.ffmpeg,
        ffprobe: cli.ffprobe,
    };
    let (config_path, force_ipv4) = (cli.config, cli.force_ipv4);
    let config = tokio::task::spawn_blocking(move || load_config(config_path, overrides, force_ipv4))
        .await
        .context("configuration task panicked")?
        .context("loading configuration")?;
    let downloader = Downloader::new(config);

    match cli.command {
        Command::Info { url } => {
            if !is_valid_url(&url) {
                eprintln!("Invalid URL. Please enter a valid video URL.");
                return Ok(ExitCode::from(2));
            }
            match downloader.fetch_metadata(&url).await {
                Ok(details) => {
                    println!("Title:     {}", details.title);
                    println!("Duration:  {}", details.duration);
                    println!("File Size: {}", details.file_size);
                    println!("Thumbnail: {}", details.thumbnail);
                }
                Err(err) => {
                    tracing::debug!(error = ?err, "fetch failed");
                    eprintln!("Failed to fetch video title. Please check the URL.");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Download { url, dir } => {
            if !is_valid_url(&url) {
                eprintln!("Invalid URL. Please enter a valid video URL.");
                return Ok(ExitCode::from(2));
            }
            let dir = dir.unwrap_or_else(|| downloader.config().download_dir.clone());
            match downloader.download(&url, &dir).await {
                Ok(result) => {
                    println!("Download complete");
                    println!("Saved to: {}", result.downloaded_path.display());
                }
                Err(err) => {
                    print_failure("Download failed", &err);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Tools => {
            for tool in downloader.tools_status().await {
                let state = if tool.is_available { "found" } else { "missing" };
                println!(
                    "{:<8} {:<8} {} {}",
                    tool.name,
                    state,
                    tool.path.display(),
                    tool.version.unwrap_or_default()
                );
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
