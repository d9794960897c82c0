use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::config::ToolPaths;
use super::errors::DownloadError;
use super::process::CommandRunner;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ToolType {
    YtDlp,
    Ffmpeg,
    Ffprobe,
}

impl ToolType {
    pub const ALL: [ToolType; 3] = [ToolType::YtDlp, ToolType::Ffmpeg, ToolType::Ffprobe];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "yt-dlp",
            ToolType::Ffmpeg => "ffmpeg",
            ToolType::Ffprobe => "ffprobe",
        }
    }

    fn version_arg(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "--version",
            // ffmpeg and ffprobe take a single dash
            ToolType::Ffmpeg | ToolType::Ffprobe => "-version",
        }
    }
}

impl fmt::Display for ToolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub tool_type: ToolType,
    pub version: Option<String>,
    pub path: PathBuf,
    pub is_available: bool,
}

pub struct ToolManager;

impl ToolManager {
    /// Locate a binary in the usual install locations, then on PATH
    pub fn detect(tool: ToolType) -> Option<PathBuf> {
        let binary_name = tool.as_str();

        let common_dirs = ["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin"];
        for dir in common_dirs {
            let candidate = Path::new(dir).join(binary_name);
            if candidate.exists() {
                return Some(candidate);
            }
        }

        if let Ok(output) = Command::new("which").arg(binary_name).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Some(PathBuf::from(path));
                }
            }
        }

        None
    }

    /// Preflight: every binary the download path needs must exist on disk.
    /// Checked in order yt-dlp, ffmpeg, ffprobe; the first missing one is reported.
    pub async fn ensure_installed(paths: &ToolPaths) -> Result<(), DownloadError> {
        for tool in ToolType::ALL {
            let path = paths.get(tool);
            if !path_exists(path).await {
                tracing::warn!(tool = %tool, path = %path.display(), "required tool missing");
                return Err(DownloadError::ToolNotFound(tool));
            }
        }
        Ok(())
    }

    /// Availability and version of each configured tool
    pub async fn status(paths: &ToolPaths, runner: &dyn CommandRunner) -> Vec<ToolInfo> {
        let mut infos = Vec::with_capacity(ToolType::ALL.len());

        for tool in ToolType::ALL {
            let path = paths.get(tool).to_path_buf();
            let is_available = path_exists(&path).await;
            let version = if is_available {
                Self::version(&path, tool, runner).await
            } else {
                None
            };

            infos.push(ToolInfo {
                name: tool.as_str().to_string(),
                tool_type: tool,
                version,
                path,
                is_available,
            });
        }

        infos
    }

    async fn version(path: &Path, tool: ToolType, runner: &dyn CommandRunner) -> Option<String> {
        let args = vec![tool.version_arg().to_string()];
        match runner.run(path, &args).await {
            // ffmpeg prints a long banner; the first line carries the version
            Ok(out) if out.success => out
                .stdout
                .lines()
                .next()
                .map(|line| line.trim().to_string())
                .filter(|line| !line.is_empty()),
            Ok(out) => {
                tracing::debug!(tool = %tool, stderr = %out.stderr, "version probe failed");
                None
            }
            Err(e) => {
                tracing::debug!(tool = %tool, error = %e, "version probe failed");
                None
            }
        }
    }
}

pub(crate) async fn path_exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn paths_in(dir: &Path) -> ToolPaths {
        ToolPaths {
            ytdlp: dir.join("yt-dlp"),
            ffmpeg: dir.join("ffmpeg"),
            ffprobe: dir.join("ffprobe"),
        }
    }

    #[tokio::test]
    async fn all_tools_present_passes_preflight() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        for tool in ToolType::ALL {
            fs::write(paths.get(tool), b"").unwrap();
        }

        assert!(ToolManager::ensure_installed(&paths).await.is_ok());
    }

    #[tokio::test]
    async fn first_missing_tool_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        fs::write(&paths.ytdlp, b"").unwrap();

        let err = ToolManager::ensure_installed(&paths).await.unwrap_err();
        assert!(matches!(err, DownloadError::ToolNotFound(ToolType::Ffmpeg)));
    }

    #[tokio::test]
    async fn probe_is_checked_even_though_it_is_never_run() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        fs::write(&paths.ytdlp, b"").unwrap();
        fs::write(&paths.ffmpeg, b"").unwrap();

        let err = ToolManager::ensure_installed(&paths).await.unwrap_err();
        assert!(matches!(err, DownloadError::ToolNotFound(ToolType::Ffprobe)));
    }

    #[test]
    fn tool_names() {
        assert_eq!(ToolType::YtDlp.to_string(), "yt-dlp");
        assert_eq!(ToolType::Ffprobe.version_arg(), "-version");
    }
}
