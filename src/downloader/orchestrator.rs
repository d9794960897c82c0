// Download orchestration: preflight, strict query, live guard, format
// resolution, invocation, output verification. No retries, no fallbacks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::config::DownloaderConfig;
use super::errors::DownloadError;
use super::format_selector::{FormatChoice, FormatSelector};
use super::metadata::{MetadataFetcher, SortOrder};
use super::models::{DownloadResult, VideoDetails};
use super::process::{CommandRunner, TokioRunner};
use super::tools::{path_exists, ToolInfo, ToolManager};

/// Extension assumed when no recode target was selected
const DEFAULT_EXTENSION: &str = "mp4";

/// Arguments for the download invocation:
/// `-P <dir> --output <dir>/%(title)s.%(ext)s [--ffmpeg-location <path> --format <id>
/// [--recode-video <fmt>]] --print after_move:filepath <url>`
pub fn download_args(
    url: &str,
    directory: &Path,
    ffmpeg: &Path,
    choice: Option<&FormatChoice>,
) -> Vec<String> {
    let mut args = vec![
        "-P".to_string(),
        directory.to_string_lossy().into_owned(),
        "--output".to_string(),
        directory
            .join("%(title)s.%(ext)s")
            .to_string_lossy()
            .into_owned(),
    ];

    if let Some(choice) = choice {
        args.push("--ffmpeg-location".to_string());
        args.push(ffmpeg.to_string_lossy().into_owned());
        args.push("--format".to_string());
        args.push(choice.download_format.clone());
        if let Some(recode) = &choice.recode_format {
            args.push("--recode-video".to_string());
            args.push(recode.clone());
        }
    }

    args.push("--print".to_string());
    args.push("after_move:filepath".to_string());
    args.push(url.to_string());
    args
}

/// `{directory}/{title}.{recode target or mp4}`
pub fn expected_output_path(directory: &Path, title: &str, choice: Option<&FormatChoice>) -> PathBuf {
    let ext = choice
        .and_then(FormatChoice::output_extension)
        .unwrap_or(DEFAULT_EXTENSION);
    directory.join(format!("{}.{}", title, ext))
}

/// Last non-empty stdout line, which `--print after_move:filepath` fills in
fn printed_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(PathBuf::from)
}

/// A file in `directory` named `{title}.<any extension>`. Used when the
/// extension was left to yt-dlp and nothing was printed.
async fn find_by_title(directory: &Path, title: &str) -> Option<PathBuf> {
    let mut entries = tokio::fs::read_dir(directory).await.ok()?;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        let matches = path.file_stem().map_or(false, |stem| stem == title)
            && path.extension().map_or(false, |ext| ext != "part");
        if matches && path_exists(&path).await {
            return Some(path);
        }
    }
    None
}

fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}

pub struct Downloader {
    config: DownloaderConfig,
    runner: Arc<dyn CommandRunner>,
}

impl Downloader {
    pub fn new(config: DownloaderConfig) -> Self {
        let runner = TokioRunner::new().with_timeout(config.timeout_secs);
        Self::with_runner(config, Arc::new(runner))
    }

    pub fn with_runner(config: DownloaderConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }

    fn fetcher(&self) -> MetadataFetcher<'_> {
        MetadataFetcher::new(
            &self.config.tools.ytdlp,
            self.config.force_ipv4,
            self.runner.as_ref(),
        )
    }

    /// Display query for the details view
    pub async fn fetch_metadata(&self, url: &str) -> Result<VideoDetails, DownloadError> {
        self.fetcher().fetch_details(url).await
    }

    pub async fn tools_status(&self) -> Vec<ToolInfo> {
        ToolManager::status(&self.config.tools, self.runner.as_ref()).await
    }

    /// Download `url` into `directory` and verify the file landed there
    pub async fn download(&self, url: &str, directory: &Path) -> Result<DownloadResult, DownloadError> {
        let tools = &self.config.tools;
        ToolManager::ensure_installed(tools).await?;

        tracing::info!(url, "looking for video details");
        let video = self.fetcher().fetch(url, SortOrder::Strict).await?;
        tracing::info!(title = %video.title, "video found");

        if video.is_live() {
            tracing::warn!(
                live_status = %video.live_status.as_ref().map(|s| s.as_str()).unwrap_or_default(),
                "refusing live content"
            );
            return Err(DownloadError::LiveStreamUnsupported);
        }

        let choice = FormatSelector::best(&video.formats);
        match &choice {
            Some(c) => tracing::debug!(format = %c.download_format, recode = ?c.recode_format, "format selected"),
            None => tracing::debug!("no video format listed, using yt-dlp default"),
        }

        let args = download_args(url, directory, &tools.ffmpeg, choice.as_ref());
        tracing::info!(directory = %directory.display(), "downloading video");
        tracing::debug!(args = ?args, "yt-dlp download invocation");

        let output = self
            .runner
            .run(&tools.ytdlp, &args)
            .await
            .map_err(|e| DownloadError::DownloadFailed(e.to_string()))?;

        if !output.success {
            tracing::warn!(code = ?output.code, stderr = %output.stderr.trim(), "download failed");
            return Err(DownloadError::DownloadFailed(output.stderr));
        }

        let expected = expected_output_path(directory, &video.title, choice.as_ref());
        let mut downloaded = None;
        if let Some(printed) = printed_path(&output.stdout) {
            if path_exists(&printed).await {
                downloaded = Some(printed);
            } else {
                tracing::debug!(printed = %printed.display(), "printed path does not exist");
            }
        }
        if downloaded.is_none() && path_exists(&expected).await {
            downloaded = Some(expected.clone());
        }
        let extension_known = choice
            .as_ref()
            .and_then(FormatChoice::output_extension)
            .is_some();
        if downloaded.is_none() && !extension_known {
            downloaded = find_by_title(directory, &video.title).await;
        }
        let downloaded = match downloaded {
            Some(path) => absolutize(path),
            None => {
                tracing::warn!(expected = %expected.display(), "downloaded file not found");
                return Err(DownloadError::OutputNotFound(expected));
            }
        };

        let file_name = downloaded
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::info!(path = %downloaded.display(), "download complete");

        Ok(DownloadResult {
            downloaded_path: downloaded,
            file_name,
            title: video.title,
            duration: video.duration,
        })
    }
}
