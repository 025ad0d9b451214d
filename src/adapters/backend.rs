//! Extraction adapter traits and shared types.
//!
//! Each input format is converted by an external capability: PDF text
//! extraction and rasterization, document-markup conversion, OCR, tabular
//! parsing and markdown rendering. The pipeline only talks to these traits,
//! so engines can be swapped and tests can inject mocks.
//!
//! The [`Adapters`] bundle holds one implementation per capability.
//! [`Adapters::builtin`] wires the engines this crate ships:
//!
//! | Capability | Built-in |
//! |---|---|
//! | Markdown | [`PulldownMarkdown`](super::PulldownMarkdown) |
//! | Tabular text | [`DelimitedTableParser`](super::DelimitedTableParser) |
//! | PDF, DOCX, OCR | [`Unconfigured`], fails per file |

use image::DynamicImage;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no {0} engine is configured")]
    Unavailable(&'static str),
    #[error("{0}")]
    Failed(String),
}

/// An opened PDF document.
pub trait PdfDocument {
    /// Number of physical pages.
    fn page_count(&self) -> usize;

    /// Extract the text of a page. `page` is 1-based.
    fn page_text(&self, page: usize) -> Result<String, AdapterError>;

    /// Rasterize a page at the given scale. `page` is 1-based.
    fn render_page(&self, page: usize, scale: f32) -> Result<DynamicImage, AdapterError>;
}

/// PDF extraction engine.
pub trait PdfEngine {
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn PdfDocument + 'a>, AdapterError>;
}

/// Options for word-processor document conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Embed images as data URLs instead of dropping them.
    pub inline_images: bool,
}

/// Converts a word-processor document into a markup fragment.
pub trait DocumentConverter {
    fn convert(&self, bytes: &[u8], options: DocumentOptions) -> Result<String, AdapterError>;
}

/// Recognizes text in a raster image.
pub trait OcrEngine {
    fn recognize(&self, image: &[u8], language: &str) -> Result<String, AdapterError>;
}

/// A parsed table with an inferred header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTable {
    /// Field names in header order.
    pub fields: Vec<String>,
    /// One map per data row, keyed by field name. Rows may lack fields.
    pub records: Vec<HashMap<String, String>>,
}

impl ParsedTable {
    /// A record's cells in header order, with `""` for missing fields.
    pub fn row<'a>(&'a self, record: &'a HashMap<String, String>) -> impl Iterator<Item = &'a str> {
        self.fields
            .iter()
            .map(|f| record.get(f).map(String::as_str).unwrap_or(""))
    }
}

/// Parses delimited text with header inference.
pub trait TableParser {
    fn parse(&self, text: &str) -> Result<ParsedTable, AdapterError>;
}

/// Converts markdown source into a markup fragment.
pub trait MarkdownRenderer {
    fn render(&self, source: &str) -> Result<String, AdapterError>;
}

/// Stand-in for a capability with no engine wired in.
///
/// Every call fails with [`AdapterError::Unavailable`], which the dispatcher
/// treats like any other per-file failure.
#[derive(Debug, Clone, Copy)]
pub struct Unconfigured(pub &'static str);

impl PdfEngine for Unconfigured {
    fn open<'a>(&'a self, _bytes: &'a [u8]) -> Result<Box<dyn PdfDocument + 'a>, AdapterError> {
        Err(AdapterError::Unavailable(self.0))
    }
}

impl DocumentConverter for Unconfigured {
    fn convert(&self, _bytes: &[u8], _options: DocumentOptions) -> Result<String, AdapterError> {
        Err(AdapterError::Unavailable(self.0))
    }
}

impl OcrEngine for Unconfigured {
    fn recognize(&self, _image: &[u8], _language: &str) -> Result<String, AdapterError> {
        Err(AdapterError::Unavailable(self.0))
    }
}

/// One implementation per extraction capability.
pub struct Adapters {
    pub pdf: Box<dyn PdfEngine>,
    pub document: Box<dyn DocumentConverter>,
    pub ocr: Box<dyn OcrEngine>,
    pub table: Box<dyn TableParser>,
    pub markdown: Box<dyn MarkdownRenderer>,
}

impl Adapters {
    /// The engines shipped with this crate.
    pub fn builtin() -> Self {
        Self {
            pdf: Box::new(Unconfigured("PDF")),
            document: Box::new(Unconfigured("DOCX")),
            ocr: Box::new(Unconfigured("OCR")),
            table: Box::new(super::DelimitedTableParser::default()),
            markdown: Box::new(super::PulldownMarkdown),
        }
    }

    pub fn with_pdf(mut self, engine: impl PdfEngine + 'static) -> Self {
        self.pdf = Box::new(engine);
        self
    }

    pub fn with_document(mut self, converter: impl DocumentConverter + 'static) -> Self {
        self.document = Box::new(converter);
        self
    }

    pub fn with_ocr(mut self, engine: impl OcrEngine + 'static) -> Self {
        self.ocr = Box::new(engine);
        self
    }

    pub fn with_table(mut self, parser: impl TableParser + 'static) -> Self {
        self.table = Box::new(parser);
        self
    }

    pub fn with_markdown(mut self, renderer: impl MarkdownRenderer + 'static) -> Self {
        self.markdown = Box::new(renderer);
        self
    }
}

impl Default for Adapters {
    fn default() -> Self {
        Self::builtin()
    }
}
