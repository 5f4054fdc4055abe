use crate::document_parser::Outcome;

/// Language of the rendered result block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    Indonesian,
    English,
}

impl Locale {
    /// Parse a language tag such as `id` or `en`
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "id" | "id-id" | "indonesian" => Some(Locale::Indonesian),
            "en" | "en-us" | "en-gb" | "english" => Some(Locale::English),
            _ => None,
        }
    }

    fn messages(&self) -> &'static Messages {
        match self {
            Locale::Indonesian => &INDONESIAN,
            Locale::English => &ENGLISH,
        }
    }
}

struct Messages {
    heading: &'static str,
    pages: &'static str,
    characters: &'static str,
    words: &'static str,
    images: &'static str,
    no_file: &'static str,
    unsupported: &'static str,
    failed: &'static str,
}

const INDONESIAN: Messages = Messages {
    heading: "Hasil",
    pages: "Jumlah Halaman",
    characters: "Jumlah Karakter",
    words: "Jumlah Kata",
    images: "Jumlah Gambar",
    no_file: "Pilih file terlebih dahulu!",
    unsupported: "Format file tidak didukung!",
    failed: "Terjadi kesalahan saat memproses file.",
};

const ENGLISH: Messages = Messages {
    heading: "Result",
    pages: "Page count",
    characters: "Character count",
    words: "Word count",
    images: "Image count",
    no_file: "Please choose a file first!",
    unsupported: "Unsupported file format!",
    failed: "An error occurred while processing the file.",
};

/// Render an outcome as the block shown to the user
pub fn render(outcome: &Outcome, locale: Locale) -> String {
    let messages = locale.messages();

    match outcome {
        Outcome::Stats(stats) => format!(
            "{}\n{}: {}\n{}: {}\n{}: {}\n{}: {}",
            messages.heading,
            messages.pages,
            stats.page_count,
            messages.characters,
            stats.character_count,
            messages.words,
            stats.word_count,
            messages.images,
            stats.image_count
        ),
        Outcome::NoFileSelected => messages.no_file.to_string(),
        Outcome::UnsupportedFormat(_) => messages.unsupported.to_string(),
        Outcome::Failed => messages.failed.to_string(),
    }
}
