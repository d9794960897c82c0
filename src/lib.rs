//! Paste a video URL, look up its details with yt-dlp, and download it
//! re-encoded through ffmpeg.
//!
//! The two entry points a front end needs are
//! [`Downloader::fetch_metadata`] and [`Downloader::download`].

pub mod downloader;
pub mod logging;

pub use downloader::{
    is_valid_url, validate_url, DownloadError, DownloadResult, Downloader, DownloaderConfig,
    ErrorKind, ToolOverrides, ToolPaths, VideoDetails, VideoMetadata,
};
