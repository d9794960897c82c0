// FormatSelector - picks the download format and recode target
//
// Relies on yt-dlp's own ordering: the metadata query for a download runs with
// `--format-sort=resolution,ext,tbr`, so the head of the "Video" category is
// the best combined video+audio option.

use super::models::{EncodingDescriptor, FormatCatalog};

/// Format to request plus the container to recode into afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatChoice {
    /// Value for `--format`
    pub download_format: String,
    /// Value for `--recode-video`; absent when the descriptor carried none
    pub recode_format: Option<String>,
}

impl FormatChoice {
    /// Split a descriptor value on its first separator
    pub fn parse(value: &str) -> Self {
        match value.split_once(EncodingDescriptor::SEPARATOR) {
            Some((download, recode)) => Self {
                download_format: download.to_string(),
                recode_format: Some(recode.to_string()).filter(|r| !r.is_empty()),
            },
            None => Self {
                download_format: value.to_string(),
                recode_format: None,
            },
        }
    }

    /// Extension the final file ends up with, when it is known in advance
    pub fn output_extension(&self) -> Option<&str> {
        self.recode_format.as_deref()
    }
}

pub struct FormatSelector;

impl FormatSelector {
    /// First entry of the "Video" category, or `None` to leave the choice to yt-dlp
    pub fn best(catalog: &FormatCatalog) -> Option<FormatChoice> {
        catalog
            .category(FormatCatalog::VIDEO)
            .first()
            .map(|descriptor| FormatChoice::parse(&descriptor.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn descriptor(id: &str) -> EncodingDescriptor {
        EncodingDescriptor {
            format_id: id.to_string(),
            ext: None,
            vcodec: None,
            acodec: None,
            height: None,
            format_note: None,
        }
    }

    fn catalog(category: &str, ids: &[&str]) -> FormatCatalog {
        let mut groups = BTreeMap::new();
        groups.insert(
            category.to_string(),
            ids.iter().map(|id| descriptor(id)).collect(),
        );
        FormatCatalog::from_groups(groups)
    }

    #[test]
    fn picks_first_video_entry() {
        let choice = FormatSelector::best(&catalog("Video", &["137+140#mp4", "22#webm"])).unwrap();
        assert_eq!(choice.download_format, "137+140");
        assert_eq!(choice.recode_format.as_deref(), Some("mp4"));
    }

    #[test]
    fn selection_is_deterministic() {
        let formats = catalog("Video", &["248+251#webm", "137+140#mp4"]);
        let first = FormatSelector::best(&formats);
        for _ in 0..5 {
            assert_eq!(FormatSelector::best(&formats), first);
        }
        assert_eq!(first.unwrap().output_extension(), Some("webm"));
    }

    #[test]
    fn empty_video_category_is_no_selection() {
        assert_eq!(FormatSelector::best(&catalog("Video", &[])), None);
        assert_eq!(FormatSelector::best(&FormatCatalog::default()), None);
    }

    #[test]
    fn other_categories_are_ignored() {
        assert_eq!(FormatSelector::best(&catalog("Audio Only", &["140#m4a"])), None);
    }

    #[test]
    fn missing_separator_leaves_recode_undefined() {
        let choice = FormatSelector::best(&catalog("Video", &["best"])).unwrap();
        assert_eq!(choice.download_format, "best");
        assert_eq!(choice.recode_format, None);
    }

    #[test]
    fn trailing_separator_is_no_recode() {
        assert_eq!(FormatChoice::parse("18#").recode_format, None);
    }
}
