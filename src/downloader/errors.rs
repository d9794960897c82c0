// Error types for the metadata query and download flow

use std::path::PathBuf;

use thiserror::Error;

use super::tools::ToolType;

/// Coarse error category, for callers that branch without caring about payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    ToolMissing,
    MetadataFetch,
    UnsupportedContent,
    DownloadExecution,
    OutputVerification,
}

#[derive(Debug, Error)]
pub enum DownloadError {
    /// Input text is not an absolute http(s) URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A required binary is absent at its configured path
    #[error("{0} is not installed")]
    ToolNotFound(ToolType),

    /// yt-dlp query failed or returned unusable JSON.
    /// The payload is for logs; the message shown to users stays generic.
    #[error("Failed to fetch video details")]
    MetadataFetch(String),

    /// Live (or otherwise not pre-recorded) content
    #[error("Live streams are not supported")]
    LiveStreamUnsupported,

    /// yt-dlp reported failure; carries its stderr verbatim
    #[error("Failed to download video: {0}")]
    DownloadFailed(String),

    /// yt-dlp reported success but the file is not where it should be
    #[error(
        "Could not determine downloaded file path ({}). Ensure the file was downloaded correctly.",
        .0.display()
    )]
    OutputNotFound(PathBuf),
}

impl DownloadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl(_) => ErrorKind::Validation,
            Self::ToolNotFound(_) => ErrorKind::ToolMissing,
            Self::MetadataFetch(_) => ErrorKind::MetadataFetch,
            Self::LiveStreamUnsupported => ErrorKind::UnsupportedContent,
            Self::DownloadFailed(_) => ErrorKind::DownloadExecution,
            Self::OutputNotFound(_) => ErrorKind::OutputVerification,
        }
    }

    /// Raw diagnostic text from the external tool, when there is any
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::MetadataFetch(detail) | Self::DownloadFailed(detail) => Some(detail),
            _ => None,
        }
    }
}
