use std::path::Path;

use crate::document_parser::MediaType;

/// Running character and word totals for extracted text.
///
/// Every extractor feeds its text through one of these so that all four
/// formats share the same counting rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextTally {
    characters: usize,
    words: usize,
}

impl TextTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk of text to the totals
    pub fn push_text(&mut self, text: &str) {
        self.characters += count_characters(text);
        self.words += count_words(text);
    }

    pub fn characters(&self) -> usize {
        self.characters
    }

    pub fn words(&self) -> usize {
        self.words
    }
}

/// Count maximal runs of non-whitespace characters
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Count characters of the raw text (Unicode scalar values)
pub fn count_characters(text: &str) -> usize {
    text.chars().count()
}

/// Guess the declared media type of a file from its extension, the way a
/// browser fills in the type of a picked file.
pub fn media_type_for_path(file_path: &str) -> Option<&'static str> {
    let extension = Path::new(file_path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())?;

    let media_type = match extension.as_str() {
        "pdf" => MediaType::Pdf,
        "docx" => MediaType::Docx,
        "xlsx" => MediaType::Xlsx,
        "pptx" => MediaType::Pptx,
        _ => return None,
    };

    Some(media_type.mime())
}

/// Display name for a file path, used in log lines
pub fn file_display_name(file_path: &str) -> String {
    Path::new(file_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_path.to_string())
}
