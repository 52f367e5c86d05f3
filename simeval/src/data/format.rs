//! Input file formats, chosen by extension

use std::path::Path;

/// Shape of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputFormat {
    /// One trimmed, non-empty line per row
    PlainText,
    /// Tab-separated: source text, then one column per reference
    TabSeparated,
    /// One JSON object per non-empty line (`.jsonl` and `.json`)
    RecordStream,
}

impl InputFormat {
    /// Pick the format from the file extension alone.
    ///
    /// Unknown or missing extensions fall back to plain text; the content is
    /// never inspected.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("jsonl") | Some("json") => InputFormat::RecordStream,
            Some("tsv") => InputFormat::TabSeparated,
            Some("txt") => InputFormat::PlainText,
            other => {
                tracing::debug!(
                    "No parser for extension {:?} of {}, reading as plain text",
                    other,
                    path.display()
                );
                InputFormat::PlainText
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::PlainText => "text",
            InputFormat::TabSeparated => "tsv",
            InputFormat::RecordStream => "jsonl",
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_stream_extensions() {
        assert_eq!(InputFormat::from_path("out/model.jsonl"), InputFormat::RecordStream);
        assert_eq!(InputFormat::from_path("model.json"), InputFormat::RecordStream);
    }

    #[test]
    fn test_tsv_extension() {
        assert_eq!(InputFormat::from_path("asset.test.tsv"), InputFormat::TabSeparated);
    }

    #[test]
    fn test_fallback_to_plain_text() {
        assert_eq!(InputFormat::from_path("refs.txt"), InputFormat::PlainText);
        assert_eq!(InputFormat::from_path("asset.test.simp.0"), InputFormat::PlainText);
        assert_eq!(InputFormat::from_path("README"), InputFormat::PlainText);
        assert_eq!(InputFormat::from_path("data.csv"), InputFormat::PlainText);
    }

    #[test]
    fn test_extension_is_case_sensitive() {
        // Matches the dispatch exactly: only lowercase extensions are recognized
        assert_eq!(InputFormat::from_path("model.JSONL"), InputFormat::PlainText);
    }
}
