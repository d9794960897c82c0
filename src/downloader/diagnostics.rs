// Diagnostics - classify yt-dlp error output into an actionable hint
//
// Used by the front end only. The error itself is never rewritten: a
// `DownloadFailed` still carries yt-dlp's stderr verbatim.

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureHint {
    /// HTTP 403 from the media host
    Forbidden,
    /// HTTP 429 or explicit rate limiting
    RateLimited,
    GeoBlocked,
    AgeRestricted,
    PrivateVideo,
    VideoUnavailable,
    UnsupportedUrl,
    NetworkTimeout,
}

impl FailureHint {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Forbidden => "The server refused access (HTTP 403)",
            Self::RateLimited => "Too many requests; the site is rate limiting",
            Self::GeoBlocked => "The video is not available in your country",
            Self::AgeRestricted => "The video is age-restricted",
            Self::PrivateVideo => "The video is private",
            Self::VideoUnavailable => "The video is unavailable",
            Self::UnsupportedUrl => "yt-dlp does not support this URL",
            Self::NetworkTimeout => "The connection timed out",
        }
    }

    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Forbidden => "Update yt-dlp, or try forcing IPv4.",
            Self::RateLimited => "Wait a few minutes and try again.",
            Self::GeoBlocked => "Try from a network in a region where the video is available.",
            Self::AgeRestricted | Self::PrivateVideo => {
                "The video needs a signed-in account, which is not supported."
            }
            Self::VideoUnavailable => "Check that the video still exists.",
            Self::UnsupportedUrl => "Check the URL, or update yt-dlp.",
            Self::NetworkTimeout => "Check your connection, or try forcing IPv4.",
        }
    }

    /// Whether trying again later could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited | Self::NetworkTimeout)
    }
}

lazy_static::lazy_static! {
    static ref HTTP_ERROR_RE: Regex = Regex::new(r"HTTP Error (\d{3})").unwrap();
}

/// Status code from a `HTTP Error NNN` line
pub fn http_status(stderr: &str) -> Option<u16> {
    HTTP_ERROR_RE
        .captures(stderr)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Lines yt-dlp tagged as `ERROR:`, without the tag
pub fn error_lines(stderr: &str) -> Vec<&str> {
    stderr
        .lines()
        .filter_map(|line| line.trim().strip_prefix("ERROR:"))
        .map(str::trim)
        .collect()
}

pub fn diagnose(stderr: &str) -> Option<FailureHint> {
    match http_status(stderr) {
        Some(403) => return Some(FailureHint::Forbidden),
        Some(429) => return Some(FailureHint::RateLimited),
        _ => {}
    }

    let lower = stderr.to_lowercase();
    let has = |patterns: &[&str]| patterns.iter().any(|p| lower.contains(p));

    if has(&["timed out", "timeout"]) {
        Some(FailureHint::NetworkTimeout)
    } else if has(&["rate-limit", "rate limit", "too many requests"]) {
        Some(FailureHint::RateLimited)
    } else if has(&["not available in your country", "geo restrict", "geo-restrict"]) {
        Some(FailureHint::GeoBlocked)
    } else if has(&["confirm your age", "age-restricted", "age restricted"]) {
        Some(FailureHint::AgeRestricted)
    } else if has(&["private video", "video is private"]) {
        Some(FailureHint::PrivateVideo)
    } else if has(&["unsupported url"]) {
        Some(FailureHint::UnsupportedUrl)
    } else if has(&["video unavailable", "this video is unavailable", "has been removed"]) {
        Some(FailureHint::VideoUnavailable)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_403_detection() {
        let error = "ERROR: [youtube] abc: HTTP Error 403: Forbidden";
        assert_eq!(http_status(error), Some(403));
        assert_eq!(diagnose(error), Some(FailureHint::Forbidden));
    }

    #[test]
    fn test_429_detection() {
        assert_eq!(
            diagnose("ERROR: HTTP Error 429: Too Many Requests"),
            Some(FailureHint::RateLimited)
        );
    }

    #[test]
    fn test_geo_detection() {
        let error = "ERROR: Video not available in your country";
        assert_eq!(diagnose(error), Some(FailureHint::GeoBlocked));
    }

    #[test]
    fn test_age_restricted_detection() {
        let error = "ERROR: Sign in to confirm your age";
        assert_eq!(diagnose(error), Some(FailureHint::AgeRestricted));
    }

    #[test]
    fn test_unsupported_url_detection() {
        let error = "ERROR: Unsupported URL: https://example.com/";
        assert_eq!(diagnose(error), Some(FailureHint::UnsupportedUrl));
    }

    #[test]
    fn test_timeout_detection() {
        let hint = diagnose("ERROR: Read timed out.").unwrap();
        assert_eq!(hint, FailureHint::NetworkTimeout);
        assert!(hint.is_transient());
    }

    #[test]
    fn test_unknown_error() {
        assert_eq!(diagnose("ERROR: something odd"), None);
        assert_eq!(http_status("no status here"), None);
    }

    #[test]
    fn test_error_lines() {
        let stderr = "WARNING: slow\nERROR: first\n  ERROR:  second \n";
        assert_eq!(error_lines(stderr), vec!["first", "second"]);
    }
}
