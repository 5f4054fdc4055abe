use anyhow::{Context, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::document_parser::DocumentStats;
use crate::shared_utils::TextTally;

/// Form XObjects may nest; stop following them past this depth
const MAX_FORM_DEPTH: usize = 8;

/// Limit on `/Parent` hops when looking up inherited page resources
const MAX_INHERITANCE_DEPTH: usize = 32;

/// PDF statistics extraction with text backend fallback.
///
/// Page and image counts always come from lopdf. Page text is taken from the
/// first backend that succeeds.
pub struct FastPdfExtractor;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PdfBackend {
    Lopdf,
    PdfExtract, // Fallback
}

impl FastPdfExtractor {
    /// Extract page, character, word and image counts from PDF bytes
    pub fn extract_stats(pdf_bytes: &[u8]) -> Result<DocumentStats> {
        let document = Document::load_mem(pdf_bytes).context("Failed to load PDF with lopdf")?;

        let pages = document.get_pages();
        let page_texts = Self::extract_page_texts(&document, pdf_bytes)?;

        let mut tally = TextTally::new();
        for page_text in &page_texts {
            tally.push_text(page_text);
        }

        let mut image_count = 0;
        for (&page_number, &page_id) in &pages {
            image_count += Self::count_page_images(&document, page_id)
                .with_context(|| format!("Failed to inspect drawing operations on page {}", page_number))?;
        }

        log::debug!(
            "PDF has {} pages, {} characters, {} words, {} images",
            pages.len(),
            tally.characters(),
            tally.words(),
            image_count
        );

        Ok(DocumentStats::from_tally(pages.len(), &tally, image_count))
    }

    /// Get list of text backends in order of preference
    pub fn get_available_backends() -> Vec<PdfBackend> {
        vec![PdfBackend::Lopdf, PdfBackend::PdfExtract]
    }

    /// Text of every page, one entry per page
    fn extract_page_texts(document: &Document, pdf_bytes: &[u8]) -> Result<Vec<String>> {
        for backend in Self::get_available_backends() {
            match Self::extract_with_backend(document, pdf_bytes, backend) {
                Ok(texts) => {
                    log::debug!("Extracted PDF text using {:?} backend", backend);
                    return Ok(texts.iter().map(|text| join_text_items(text)).collect());
                }
                Err(e) => {
                    log::warn!("Backend {:?} failed: {:#}", backend, e);
                    continue;
                }
            }
        }

        anyhow::bail!("All PDF text extraction backends failed");
    }

    fn extract_with_backend(
        document: &Document,
        pdf_bytes: &[u8],
        backend: PdfBackend,
    ) -> Result<Vec<String>> {
        match backend {
            PdfBackend::Lopdf => Self::extract_with_lopdf(document),
            PdfBackend::PdfExtract => Self::extract_with_pdf_extract(pdf_bytes),
        }
    }

    fn extract_with_lopdf(document: &Document) -> Result<Vec<String>> {
        document
            .get_pages()
            .keys()
            .map(|&page_number| {
                document
                    .extract_text(&[page_number])
                    .with_context(|| format!("Failed to extract text from page {} with lopdf", page_number))
            })
            .collect()
    }

    fn extract_with_pdf_extract(pdf_bytes: &[u8]) -> Result<Vec<String>> {
        // pdf-extract panics on some malformed input
        let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(pdf_bytes));

        match result {
            Ok(pages) => pages.context("Failed to extract text from bytes with pdf-extract"),
            Err(_) => anyhow::bail!("pdf-extract panicked while reading the document"),
        }
    }

    /// Count image-painting operations on one page
    fn count_page_images(document: &Document, page_id: ObjectId) -> Result<usize> {
        let content_data = document
            .get_page_content(page_id)
            .context("Failed to read page content stream")?;
        let content = Content::decode(&content_data).context("Failed to decode page content stream")?;

        let resources = Self::page_resources(document, page_id);

        Ok(Self::count_images_in_operations(
            document,
            &content.operations,
            resources,
            0,
        ))
    }

    /// Each `Do` that paints an image XObject counts once. Image masks are
    /// stencils, not pictures, and are skipped. Form XObjects are followed.
    fn count_images_in_operations(
        document: &Document,
        operations: &[Operation],
        resources: Option<&Dictionary>,
        depth: usize,
    ) -> usize {
        let mut count = 0;

        for operation in operations.iter().filter(|op| op.operator == "Do") {
            let Some(name) = operation.operands.first().and_then(|operand| operand.as_name().ok()) else {
                continue;
            };
            let Some(xobject) = resources.and_then(|res| Self::lookup_xobject(document, res, name)) else {
                log::debug!("XObject {} not found in resources", String::from_utf8_lossy(name));
                continue;
            };

            match xobject.dict.get(b"Subtype").and_then(Object::as_name) {
                Ok(b"Image") => {
                    let is_mask = xobject
                        .dict
                        .get(b"ImageMask")
                        .and_then(Object::as_bool)
                        .unwrap_or(false);
                    if !is_mask {
                        count += 1;
                    }
                }
                Ok(b"Form") if depth < MAX_FORM_DEPTH => {
                    count += Self::count_form_images(document, xobject, resources, depth + 1);
                }
                _ => {}
            }
        }

        count
    }

    fn count_form_images(
        document: &Document,
        form: &Stream,
        parent_resources: Option<&Dictionary>,
        depth: usize,
    ) -> usize {
        let content = match Self::stream_content(form).and_then(|data| {
            Content::decode(&data).context("Failed to decode form content stream")
        }) {
            Ok(content) => content,
            Err(e) => {
                log::debug!("Skipping unreadable form XObject: {:#}", e);
                return 0;
            }
        };

        // A form without its own resources draws with the ones it was invoked from
        let resources = form
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|res| Self::resolve(document, res))
            .and_then(|res| res.as_dict().ok())
            .or(parent_resources);

        Self::count_images_in_operations(document, &content.operations, resources, depth)
    }

    fn stream_content(stream: &Stream) -> Result<Vec<u8>> {
        if stream.dict.get(b"Filter").is_ok() {
            stream
                .decompressed_content()
                .context("Failed to decompress stream")
        } else {
            Ok(stream.content.clone())
        }
    }

    fn lookup_xobject<'a>(
        document: &'a Document,
        resources: &'a Dictionary,
        name: &[u8],
    ) -> Option<&'a Stream> {
        let xobjects = resources
            .get(b"XObject")
            .ok()
            .and_then(|obj| Self::resolve(document, obj))?
            .as_dict()
            .ok()?;

        let xobject = xobjects
            .get(name)
            .ok()
            .and_then(|obj| Self::resolve(document, obj))?;

        xobject.as_stream().ok()
    }

    /// Resources of a page, inherited from the page tree when the page has none
    fn page_resources(document: &Document, page_id: ObjectId) -> Option<&Dictionary> {
        let mut node = document.get_dictionary(page_id).ok()?;

        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(resources) = node.get(b"Resources") {
                return Self::resolve(document, resources).and_then(|res| res.as_dict().ok());
            }

            let parent_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
            node = document.get_dictionary(parent_id).ok()?;
        }

        None
    }

    fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
        match object {
            Object::Reference(id) => document.get_object(*id).ok(),
            other => Some(other),
        }
    }
}

/// Both backends end each text object with a line break. Page text is the
/// text items joined with nothing in between, so those breaks are dropped.
fn join_text_items(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '\n' | '\r')).collect()
}
