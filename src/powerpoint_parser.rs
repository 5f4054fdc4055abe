use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use zip::ZipArchive;

use crate::document_parser::DocumentStats;
use crate::shared_utils::TextTally;

lazy_static::lazy_static! {
    /// Archive entries that hold one slide each
    static ref SLIDE_PATH_PATTERN: Regex =
        Regex::new(r"^ppt/slides/slide(\d+)\.xml$").expect("slide path pattern is valid");
}

/// Text and picture count of a single slide
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideSummary {
    pub text: String,
    pub image_count: usize,
}

/// Extract statistics from a PPTX presentation.
///
/// Every slide entry in the archive counts as a page. Text runs of all
/// slides are concatenated before counting.
pub fn extract_powerpoint_stats(pptx_bytes: &[u8]) -> Result<DocumentStats> {
    let mut archive = ZipArchive::new(Cursor::new(pptx_bytes))
        .context("Failed to read PowerPoint file as ZIP archive")?;

    let slide_files = find_slide_files(&archive);

    let mut all_text = String::new();
    let mut image_count = 0;

    for slide_file in &slide_files {
        let mut contents = String::new();
        archive
            .by_name(slide_file)
            .with_context(|| format!("Failed to open {}", slide_file))?
            .read_to_string(&mut contents)
            .with_context(|| format!("Failed to read {}", slide_file))?;

        let slide = parse_slide_xml(&contents).with_context(|| format!("Failed to parse {}", slide_file))?;
        all_text.push_str(&slide.text);
        image_count += slide.image_count;
    }

    let mut tally = TextTally::new();
    tally.push_text(&all_text);

    Ok(DocumentStats::from_tally(slide_files.len(), &tally, image_count))
}

/// Slide entry names sorted by slide number
fn find_slide_files<R: Read + std::io::Seek>(archive: &ZipArchive<R>) -> Vec<String> {
    let mut slide_files: Vec<String> = archive
        .file_names()
        .filter(|name| SLIDE_PATH_PATTERN.is_match(name))
        .map(String::from)
        .collect();

    slide_files.sort_by_key(|name| extract_slide_number(name));
    slide_files
}

/// Extract slide number from "ppt/slides/slideN.xml"
fn extract_slide_number(filename: &str) -> usize {
    SLIDE_PATH_PATTERN
        .captures(filename)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

/// Walk slide XML collecting text runs and picture fills.
///
/// Elements are matched by local name so any namespace prefix works, and
/// self-closing picture fills count the same as open ones.
pub fn parse_slide_xml(xml_content: &str) -> Result<SlideSummary> {
    let mut reader = Reader::from_str(xml_content);

    let mut summary = SlideSummary::default();
    let mut element_stack: Vec<Vec<u8>> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let local_name = e.local_name().as_ref().to_vec();
                if is_picture_fill(&local_name, &element_stack) {
                    summary.image_count += 1;
                }
                element_stack.push(local_name);
            }
            Ok(Event::Empty(ref e)) => {
                if is_picture_fill(e.local_name().as_ref(), &element_stack) {
                    summary.image_count += 1;
                }
            }
            Ok(Event::End(_)) => {
                element_stack.pop();
            }
            Ok(Event::Text(ref e)) => {
                if in_text_run(&element_stack) {
                    summary.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::CData(ref e)) => {
                if in_text_run(&element_stack) {
                    summary.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::GeneralRef(ref e)) => {
                if in_text_run(&element_stack) {
                    if let Ok(Some(ch)) = e.resolve_char_ref() {
                        summary.text.push(ch);
                    } else if let Some(value) = e
                        .decode()
                        .ok()
                        .and_then(|name| resolve_predefined_entity(&name))
                    {
                        summary.text.push_str(value);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Malformed slide XML at position {}", reader.buffer_position())
                });
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(summary)
}

// Text runs are <a:t> elements
fn in_text_run(element_stack: &[Vec<u8>]) -> bool {
    element_stack.last().is_some_and(|name| name.as_slice() == b"t")
}

// Picture fills are <p:blipFill> directly under a <p:pic>
fn is_picture_fill(local_name: &[u8], element_stack: &[Vec<u8>]) -> bool {
    local_name == b"blipFill" && element_stack.last().is_some_and(|parent| parent.as_slice() == b"pic")
}
