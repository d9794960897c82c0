// Downloader module - yt-dlp/ffmpeg orchestration

pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod format_selector;
pub mod humanize;
pub mod metadata;
pub mod models;
pub mod orchestrator;
pub mod process;
pub mod tools;
pub mod validation;

pub use config::{ConfigError, DownloaderConfig, ToolOverrides, ToolPaths};
pub use errors::{DownloadError, ErrorKind};
pub use format_selector::{FormatChoice, FormatSelector};
pub use metadata::{MetadataFetcher, SortOrder};
pub use models::{DownloadResult, EncodingDescriptor, FormatCatalog, LiveStatus, VideoDetails, VideoMetadata};
pub use orchestrator::Downloader;
pub use process::{CommandRunner, ProcessError, ProcessOutput, TokioRunner};
pub use tools::{ToolInfo, ToolManager, ToolType};
pub use validation::{is_valid_url, validate_url};
