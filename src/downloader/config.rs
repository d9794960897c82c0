// Configuration passed explicitly into the fetcher and the orchestrator

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::tools::{ToolManager, ToolType};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Locations of the external binaries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ytdlp: PathBuf,
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl ToolPaths {
    pub fn get(&self, tool: ToolType) -> &Path {
        match tool {
            ToolType::YtDlp => &self.ytdlp,
            ToolType::Ffmpeg => &self.ffmpeg,
            ToolType::Ffprobe => &self.ffprobe,
        }
    }
}

impl Default for ToolPaths {
    fn default() -> Self {
        ToolOverrides::default().resolve()
    }
}

/// Explicitly chosen tool locations. Only the tools left unset are detected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOverrides {
    pub ytdlp: Option<PathBuf>,
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
}

impl ToolOverrides {
    /// Fill the unset fields from `fallback`
    pub fn or(self, fallback: ToolOverrides) -> Self {
        Self {
            ytdlp: self.ytdlp.or(fallback.ytdlp),
            ffmpeg: self.ffmpeg.or(fallback.ffmpeg),
            ffprobe: self.ffprobe.or(fallback.ffprobe),
        }
    }

    /// Detect the missing tools on disk. Blocks while searching PATH.
    pub fn resolve(self) -> ToolPaths {
        self.resolve_with(ToolManager::detect)
    }

    /// Unset tools fall back to `detect`, then to the bare binary name
    pub fn resolve_with(self, detect: impl Fn(ToolType) -> Option<PathBuf>) -> ToolPaths {
        let pick = |given: Option<PathBuf>, tool: ToolType| {
            given
                .or_else(|| detect(tool))
                .unwrap_or_else(|| PathBuf::from(tool.as_str()))
        };
        ToolPaths {
            ytdlp: pick(self.ytdlp, ToolType::YtDlp),
            ffmpeg: pick(self.ffmpeg, ToolType::Ffmpeg),
            ffprobe: pick(self.ffprobe, ToolType::Ffprobe),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    pub tools: ToolPaths,
    /// Pass `--force-ipv4` to metadata queries
    pub force_ipv4: bool,
    pub download_dir: PathBuf,
    /// Per-process limit; `None` waits for the tool indefinitely
    pub timeout_secs: Option<u64>,
}

impl DownloaderConfig {
    pub fn new(tools: ToolPaths) -> Self {
        Self {
            tools,
            force_ipv4: false,
            download_dir: default_download_dir(),
            timeout_secs: None,
        }
    }

    pub fn with_force_ipv4(mut self, enabled: bool) -> Self {
        self.force_ipv4 = enabled;
        self
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_ytdlp(mut self, path: impl Into<PathBuf>) -> Self {
        self.tools.ytdlp = path.into();
        self
    }

    pub fn with_ffmpeg(mut self, path: impl Into<PathBuf>) -> Self {
        self.tools.ffmpeg = path.into();
        self
    }

    pub fn with_ffprobe(mut self, path: impl Into<PathBuf>) -> Self {
        self.tools.ffprobe = path.into();
        self
    }

    /// `<config dir>/vidgrab/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vidgrab").join("config.json"))
    }

    /// Load from a JSON file. Absent keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with(path, ToolOverrides::default())
    }

    /// Load from a JSON file; `overrides` win over the file's tool paths
    pub fn load_with(path: &Path, overrides: ToolOverrides) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_with(&content, overrides).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        Self::from_json_with(content, ToolOverrides::default())
    }

    pub fn from_json_with(content: &str, overrides: ToolOverrides) -> Result<Self, serde_json::Error> {
        let file: ConfigFile = serde_json::from_str(content)?;
        Ok(file.into_config(overrides))
    }
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self::new(ToolPaths::default())
    }
}

/// On-disk shape; every key optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ConfigFile {
    ytdl_path: Option<PathBuf>,
    ffmpeg_path: Option<PathBuf>,
    ffprobe_path: Option<PathBuf>,
    force_ipv4: Option<bool>,
    download_dir: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

impl ConfigFile {
    fn into_config(self, overrides: ToolOverrides) -> DownloaderConfig {
        let from_file = ToolOverrides {
            ytdlp: self.ytdl_path,
            ffmpeg: self.ffmpeg_path,
            ffprobe: self.ffprobe_path,
        };

        let mut config = DownloaderConfig::new(overrides.or(from_file).resolve())
            .with_force_ipv4(self.force_ipv4.unwrap_or(false))
            .with_timeout(self.timeout_secs);
        if let Some(dir) = self.download_dir {
            config = config.with_download_dir(dir);
        }
        config
    }
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_keys_override_defaults() {
        let config = DownloaderConfig::from_json(
            r#"{
                "ytdlPath": "/opt/bin/yt-dlp",
                "ffmpegPath": "/opt/bin/ffmpeg",
                "ffprobePath": "/opt/bin/ffprobe",
                "forceIpv4": true,
                "downloadDir": "/tmp/videos",
                "timeoutSecs": 90
            }"#,
        )
        .unwrap();

        assert_eq!(config.tools.ytdlp, PathBuf::from("/opt/bin/yt-dlp"));
        assert_eq!(config.tools.get(ToolType::Ffprobe), Path::new("/opt/bin/ffprobe"));
        assert!(config.force_ipv4);
        assert_eq!(config.download_dir, PathBuf::from("/tmp/videos"));
        assert_eq!(config.timeout_secs, Some(90));
    }

    #[test]
    fn empty_json_uses_defaults() {
        let config = DownloaderConfig::from_json("{}").unwrap();
        assert!(!config.force_ipv4);
        assert_eq!(config.timeout_secs, None);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DownloaderConfig::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn explicit_paths_win_over_file_keys() {
        let overrides = ToolOverrides {
            ffmpeg: Some("/cli/ffmpeg".into()),
            ..Default::default()
        };
        let config = DownloaderConfig::from_json_with(
            r#"{"ytdlPath": "/opt/bin/yt-dlp", "ffmpegPath": "/opt/bin/ffmpeg", "ffprobePath": "/opt/bin/ffprobe"}"#,
            overrides,
        )
        .unwrap();

        assert_eq!(config.tools.ffmpeg, PathBuf::from("/cli/ffmpeg"));
        assert_eq!(config.tools.ytdlp, PathBuf::from("/opt/bin/yt-dlp"));
    }

    #[test]
    fn only_unset_tools_are_detected() {
        let searched = std::cell::RefCell::new(Vec::new());
        let paths = ToolOverrides {
            ytdlp: Some("/cli/yt-dlp".into()),
            ffmpeg: Some("/cli/ffmpeg".into()),
            ffprobe: None,
        }
        .resolve_with(|tool| {
            searched.borrow_mut().push(tool);
            None
        });

        assert_eq!(*searched.borrow(), vec![ToolType::Ffprobe]);
        assert_eq!(paths.ytdlp, PathBuf::from("/cli/yt-dlp"));
        assert_eq!(paths.ffprobe, PathBuf::from("ffprobe"));
    }

    #[test]
    fn fully_specified_tools_skip_detection() {
        let paths = ToolOverrides {
            ytdlp: Some("a".into()),
            ffmpeg: Some("b".into()),
            ffprobe: Some("c".into()),
        }
        .resolve_with(|tool| panic!("{} should not be searched for", tool));

        assert_eq!(paths.ffprobe, PathBuf::from("c"));
    }

    #[test]
    fn builders_replace_single_tool() {
        let config = DownloaderConfig::new(ToolPaths {
            ytdlp: "a".into(),
            ffmpeg: "b".into(),
            ffprobe: "c".into(),
        })
        .with_ffmpeg("/usr/bin/ffmpeg");

        assert_eq!(config.tools.ffmpeg, PathBuf::from("/usr/bin/ffmpeg"));
        assert_eq!(config.tools.ytdlp, PathBuf::from("a"));
    }
}
