//! URL validation for user-entered text

use url::Url;

use super::errors::DownloadError;

/// Whether `text` is an absolute http(s) URL with a host. Never panics.
pub fn is_valid_url(text: &str) -> bool {
    parse_video_url(text).is_some()
}

pub fn validate_url(text: &str) -> Result<Url, DownloadError> {
    parse_video_url(text).ok_or_else(|| DownloadError::InvalidUrl(text.to_string()))
}

fn parse_video_url(text: &str) -> Option<Url> {
    let parsed = Url::parse(text).ok()?;
    let scheme = parsed.scheme();
    if (scheme == "http" || scheme == "https") && parsed.host_str().is_some_and(|h| !h.is_empty()) {
        Some(parsed)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert!(is_valid_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(is_valid_url("http://example.com/video.mp4"));
        assert!(is_valid_url("https://vimeo.com/76979871"));
    }

    #[test]
    fn rejects_non_urls() {
        for input in ["", " ", "   \t", "youtube.com/watch?v=1", "not a url", "://missing"] {
            assert!(!is_valid_url(input), "accepted {:?}", input);
        }
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(!is_valid_url("ftp://example.com/file"));
        assert!(!is_valid_url("file:///home/me/video.mp4"));
        assert!(!is_valid_url("mailto:someone@example.com"));
    }

    #[test]
    fn validate_returns_invalid_url_error() {
        let err = validate_url("nope").unwrap_err();
        assert!(matches!(err, DownloadError::InvalidUrl(ref s) if s == "nope"));
        assert!(validate_url("https://example.com").is_ok());
    }
}
