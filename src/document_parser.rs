use std::io::Cursor;

use anyhow::{Context, Result};
use calamine::{Data, Range, Reader, Xlsx};
use chrono::{NaiveDateTime, NaiveTime};
use docx_rs::{
    DocumentChild, Docx, InsertChild, Paragraph, ParagraphChild, Run, RunChild,
    StructuredDataTag, StructuredDataTagChild, Table,
};
use serde::Serialize;

use crate::fast_pdf_extractor::FastPdfExtractor;
use crate::powerpoint_parser::extract_powerpoint_stats;
use crate::shared_utils::{file_display_name, media_type_for_path, TextTally};

/// The four statistics reported for a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub page_count: usize,
    pub character_count: usize,
    pub word_count: usize,
    pub image_count: usize,
}

impl DocumentStats {
    /// Build the statistics from a text tally plus the format-specific counts
    pub fn from_tally(page_count: usize, tally: &TextTally, image_count: usize) -> Self {
        Self {
            page_count,
            character_count: tally.characters(),
            word_count: tally.words(),
            image_count,
        }
    }
}

/// Declared media types that have an extraction path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Pdf,
    Docx,
    Xlsx,
    Pptx,
}

impl MediaType {
    pub const ALL: [MediaType; 4] = [
        MediaType::Pdf,
        MediaType::Docx,
        MediaType::Xlsx,
        MediaType::Pptx,
    ];

    /// Exact match on the declared type string. No content sniffing.
    pub fn from_mime(mime: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|media_type| media_type.mime() == mime)
    }

    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::Pdf => "application/pdf",
            MediaType::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            MediaType::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            MediaType::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MediaType::Pdf => "pdf",
            MediaType::Docx => "docx",
            MediaType::Xlsx => "xlsx",
            MediaType::Pptx => "pptx",
        }
    }
}

/// A document handed in for one extraction request
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub bytes: Vec<u8>,
    pub media_type: String,
    pub file_name: String,
}

impl DocumentInput {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
            file_name: file_name.into(),
        }
    }
}

/// What a single request ends with. Written once, then rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Stats(DocumentStats),
    NoFileSelected,
    UnsupportedFormat(String),
    Failed,
}

impl Outcome {
    pub fn stats(&self) -> Option<&DocumentStats> {
        match self {
            Outcome::Stats(stats) => Some(stats),
            _ => None,
        }
    }
}

/// Select the extraction path for the declared media type and run it
pub fn extract_stats(input: &DocumentInput) -> Result<Outcome> {
    let Some(media_type) = MediaType::from_mime(&input.media_type) else {
        log::info!(
            "Unsupported media type '{}' for {}",
            input.media_type,
            input.file_name
        );
        return Ok(Outcome::UnsupportedFormat(input.media_type.clone()));
    };

    log::debug!(
        "Extracting {:?} statistics from {} ({} bytes)",
        media_type,
        input.file_name,
        input.bytes.len()
    );

    let stats = match media_type {
        MediaType::Pdf => FastPdfExtractor::extract_stats(&input.bytes),
        MediaType::Docx => extract_docx_stats(&input.bytes),
        MediaType::Xlsx => extract_xlsx_stats(&input.bytes),
        MediaType::Pptx => extract_powerpoint_stats(&input.bytes),
    }
    .with_context(|| format!("Failed to extract statistics from {}", input.file_name))?;

    Ok(Outcome::Stats(stats))
}

/// Run one request cycle. Extraction errors are logged and collapsed into
/// `Outcome::Failed`.
pub fn process_document(input: Option<DocumentInput>) -> Outcome {
    let Some(input) = input else {
        return Outcome::NoFileSelected;
    };

    match extract_stats(&input) {
        Ok(outcome) => outcome,
        Err(e) => {
            log::error!("Error processing file: {:#}", e);
            Outcome::Failed
        }
    }
}

/// Read a file from disk and run one request cycle on it.
///
/// The declared media type wins when given; otherwise it is derived from the
/// file extension. Parsing runs on the blocking thread pool.
pub async fn process_file(file_path: Option<&str>, media_type: Option<&str>) -> Outcome {
    let file_path = match file_path.map(str::trim) {
        Some(path) if !path.is_empty() => path.to_string(),
        _ => return Outcome::NoFileSelected,
    };

    let declared_type = media_type
        .map(str::to_string)
        .or_else(|| media_type_for_path(&file_path).map(str::to_string))
        .unwrap_or_default();

    if MediaType::from_mime(&declared_type).is_none() {
        log::info!("Unsupported media type '{}' for {}", declared_type, file_path);
        return Outcome::UnsupportedFormat(declared_type);
    }

    let bytes = match tokio::fs::read(&file_path)
        .await
        .with_context(|| format!("Failed to read file: {}", file_path))
    {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("Error processing file: {:#}", e);
            return Outcome::Failed;
        }
    };

    let input = DocumentInput::new(bytes, declared_type, file_display_name(&file_path));

    match tokio::task::spawn_blocking(move || process_document(Some(input))).await {
        Ok(outcome) => outcome,
        Err(e) => {
            log::error!("Extraction task for {} did not complete: {}", file_path, e);
            Outcome::Failed
        }
    }
}

/// Extract statistics from a DOCX file.
///
/// Text and pictures come from the docx-rs document tree. A DOCX carries no
/// pagination, and its converted HTML never holds section tags, so the page
/// count is always 1.
pub fn extract_docx_stats(docx_bytes: &[u8]) -> Result<DocumentStats> {
    let docx = docx_rs::read_docx(docx_bytes)
        .map_err(|e| anyhow::anyhow!("Failed to parse DOCX content: {}", e))?;

    let mut walker = DocxWalker::default();
    walker.visit_document(&docx);

    let mut tally = TextTally::new();
    tally.push_text(&walker.text);

    Ok(DocumentStats::from_tally(1, &tally, walker.image_count))
}

/// Collects raw text and picture count from a parsed DOCX
#[derive(Debug, Default)]
struct DocxWalker {
    text: String,
    image_count: usize,
}

impl DocxWalker {
    fn visit_document(&mut self, docx: &Docx) {
        for child in &docx.document.children {
            match child {
                DocumentChild::Paragraph(paragraph) => self.visit_paragraph(paragraph),
                DocumentChild::Table(table) => self.visit_table(table),
                DocumentChild::StructuredDataTag(tag) => self.visit_structured_data_tag(tag),
                _ => {}
            }
        }
    }

    // Raw text ends every paragraph with a blank line
    fn visit_paragraph(&mut self, paragraph: &Paragraph) {
        for child in &paragraph.children {
            self.visit_paragraph_child(child);
        }
        self.text.push_str("\n\n");
    }

    fn visit_paragraph_child(&mut self, child: &ParagraphChild) {
        match child {
            ParagraphChild::Run(run) => self.visit_run(run),
            ParagraphChild::Hyperlink(hyperlink) => {
                for link_child in &hyperlink.children {
                    self.visit_paragraph_child(link_child);
                }
            }
            // Tracked insertions are part of the current text, deletions are not
            ParagraphChild::Insert(insert) => {
                for insert_child in &insert.children {
                    if let InsertChild::Run(run) = insert_child {
                        self.visit_run(run);
                    }
                }
            }
            ParagraphChild::StructuredDataTag(tag) => self.visit_structured_data_tag(tag),
            _ => {}
        }
    }

    /// Content controls may wrap runs, whole paragraphs or tables
    fn visit_structured_data_tag(&mut self, tag: &StructuredDataTag) {
        for child in &tag.children {
            match child {
                StructuredDataTagChild::Run(run) => self.visit_run(run),
                StructuredDataTagChild::Paragraph(paragraph) => self.visit_paragraph(paragraph),
                StructuredDataTagChild::Table(table) => self.visit_table(table),
                StructuredDataTagChild::StructuredDataTag(nested) => {
                    self.visit_structured_data_tag(nested)
                }
                _ => {}
            }
        }
    }

    fn visit_run(&mut self, run: &Run) {
        for child in &run.children {
            match child {
                RunChild::Text(text) => self.text.push_str(&text.text),
                RunChild::Tab(_) => self.text.push('\t'),
                RunChild::Break(_) => self.text.push('\n'),
                RunChild::Drawing(drawing) => {
                    if matches!(drawing.data, Some(docx_rs::DrawingData::Pic(_))) {
                        self.image_count += 1;
                    }
                }
                _ => {}
            }
        }
    }

    fn visit_table(&mut self, table: &Table) {
        for row_child in &table.rows {
            if let docx_rs::TableChild::TableRow(row) = row_child {
                for cell_child in &row.cells {
                    if let docx_rs::TableRowChild::TableCell(cell) = cell_child {
                        for content in &cell.children {
                            match content {
                                docx_rs::TableCellContent::Paragraph(paragraph) => {
                                    self.visit_paragraph(paragraph)
                                }
                                docx_rs::TableCellContent::Table(nested) => self.visit_table(nested),
                                docx_rs::TableCellContent::StructuredDataTag(tag) => {
                                    self.visit_structured_data_tag(tag)
                                }
                                _ => {}
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Extract statistics from an XLSX workbook. Every sheet counts as a page and
/// the text is the CSV rendering of all sheets back to back.
pub fn extract_xlsx_stats(xlsx_bytes: &[u8]) -> Result<DocumentStats> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(xlsx_bytes)).context("Failed to open Excel workbook")?;

    let sheet_names = workbook.sheet_names().to_owned();
    let mut text = String::new();

    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;
        text.push_str(&range_to_csv(&range));
    }

    let mut tally = TextTally::new();
    tally.push_text(&text);

    // Embedded pictures are not read from workbooks
    Ok(DocumentStats::from_tally(sheet_names.len(), &tally, 0))
}

/// Render a sheet range as CSV: cells joined by commas, rows by newlines,
/// without a trailing newline
pub fn range_to_csv(range: &Range<Data>) -> String {
    range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| csv_field(&cell_text(cell)))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Displayed text of a cell. Dates use the default short date format
/// (`m/d/yy`, plus `h:mm` when there is a time of day) instead of the serial.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::DateTime(datetime) if !datetime.is_duration() => datetime
            .as_datetime()
            .map(format_short_date)
            .unwrap_or_else(|| cell.to_string()),
        _ => cell.to_string(),
    }
}

fn format_short_date(datetime: NaiveDateTime) -> String {
    if datetime.time() == NaiveTime::MIN {
        datetime.format("%-m/%-d/%y").to_string()
    } else {
        datetime.format("%-m/%-d/%y %-H:%M").to_string()
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
