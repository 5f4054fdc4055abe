/// Office Stats MCP - A Model Context Protocol server that counts pages,
/// characters, words and images in PDF, DOCX, XLSX and PowerPoint files

pub mod config;
pub mod document_parser;
pub mod fast_pdf_extractor;
pub mod logging;
pub mod mcp_handler;
pub mod powerpoint_parser;
pub mod result_view;
pub mod shared_utils;

/// Re-export the OfficeStats server for direct usage
pub use mcp_handler::OfficeStats;

/// Re-export main functionality
pub use document_parser::{
    DocumentInput,
    DocumentStats,
    MediaType,
    Outcome,
    extract_docx_stats,
    extract_stats,
    extract_xlsx_stats,
    process_document,
    process_file,
};

/// Re-export PowerPoint functionality
pub use powerpoint_parser::{
    SlideSummary,
    extract_powerpoint_stats,
    parse_slide_xml,
};

/// Re-export fast PDF extraction
pub use fast_pdf_extractor::{FastPdfExtractor, PdfBackend};

/// Re-export presentation and configuration
pub use config::Config;
pub use result_view::{Locale, render};

/// Re-export shared utilities
pub use shared_utils::{TextTally, count_characters, count_words, media_type_for_path};
