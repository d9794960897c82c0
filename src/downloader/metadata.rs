// Metadata queries through `yt-dlp --dump-json`
//
// Two sort orders exist on purpose: the details view shows whatever yt-dlp
// ranks by default, while a download re-queries with a strict sort so the
// first "Video" entry is the best one.

use std::path::Path;

use super::errors::DownloadError;
use super::models::{VideoDetails, VideoMetadata};
use super::process::CommandRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// yt-dlp's default ordering
    Display,
    /// `--format-sort=resolution,ext,tbr`
    Strict,
}

pub const STRICT_FORMAT_SORT: &str = "--format-sort=resolution,ext,tbr";

/// `[--force-ipv4] --dump-json [--format-sort=...] <url>`
pub fn query_args(url: &str, force_ipv4: bool, order: SortOrder) -> Vec<String> {
    let mut args = Vec::with_capacity(4);
    if force_ipv4 {
        args.push("--force-ipv4".to_string());
    }
    args.push("--dump-json".to_string());
    if order == SortOrder::Strict {
        args.push(STRICT_FORMAT_SORT.to_string());
    }
    args.push(url.to_string());
    args
}

/// Parse the JSON object yt-dlp printed. The whole output is tried first;
/// when warnings precede the object, the first line opening an object is used.
pub fn parse_metadata(stdout: &str) -> Result<VideoMetadata, DownloadError> {
    let whole = stdout.trim();
    let err = match serde_json::from_str(whole) {
        Ok(metadata) => return Ok(metadata),
        Err(e) => e,
    };

    let line = stdout
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with('{'))
        .ok_or_else(|| DownloadError::MetadataFetch("no JSON object in output".to_string()))?;
    if line == whole {
        return Err(DownloadError::MetadataFetch(format!("Invalid JSON: {}", err)));
    }

    serde_json::from_str(line)
        .map_err(|e| DownloadError::MetadataFetch(format!("Invalid JSON: {}", e)))
}

pub struct MetadataFetcher<'a> {
    ytdlp: &'a Path,
    force_ipv4: bool,
    runner: &'a dyn CommandRunner,
}

impl<'a> MetadataFetcher<'a> {
    pub fn new(ytdlp: &'a Path, force_ipv4: bool, runner: &'a dyn CommandRunner) -> Self {
        Self {
            ytdlp,
            force_ipv4,
            runner,
        }
    }

    pub async fn fetch(&self, url: &str, order: SortOrder) -> Result<VideoMetadata, DownloadError> {
        let args = query_args(url, self.force_ipv4, order);
        tracing::debug!(program = %self.ytdlp.display(), args = ?args, "querying metadata");

        let output = self.runner.run(self.ytdlp, &args).await.map_err(|e| {
            tracing::warn!(error = %e, "metadata query could not run");
            DownloadError::MetadataFetch(e.to_string())
        })?;

        if !output.success {
            tracing::warn!(code = ?output.code, stderr = %output.stderr.trim(), "metadata query failed");
            return Err(DownloadError::MetadataFetch(output.stderr));
        }

        let metadata = parse_metadata(&output.stdout).map_err(|e| {
            tracing::warn!(detail = e.detail().unwrap_or_default(), "unusable metadata");
            e
        })?;
        tracing::info!(title = %metadata.title, duration = metadata.duration, "metadata fetched");
        Ok(metadata)
    }

    /// Display query, formatted for the details view
    pub async fn fetch_details(&self, url: &str) -> Result<VideoDetails, DownloadError> {
        self.fetch(url, SortOrder::Display).await.map(VideoDetails::from)
    }
}
