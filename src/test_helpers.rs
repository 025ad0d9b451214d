//! Shared test utilities for the docsite test suite.
//!
//! Provides mock extraction engines that record how they were called, plus
//! fixture builders for input files and page stores.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let pdf = MockPdf::new(&["first page", "second page"]);
//! let adapters = Adapters::builtin().with_pdf(pdf.clone());
//! let file = memory_file("deck.pdf", "application/pdf", b"%PDF");
//!
//! let session = session::run(&[file], &Settings::default(), &adapters, None);
//! assert_eq!(session.pages().len(), 2);
//! ```

use image::{DynamicImage, Rgba, RgbaImage};
use std::sync::{Arc, Mutex};

use crate::adapters::{
    AdapterError, DocumentConverter, DocumentOptions, OcrEngine, PdfDocument, PdfEngine,
};
use crate::config::Settings;
use crate::session::ConversionSession;
use crate::types::{ByteSource, FileId, InputFile};

// =========================================================================
// Fixture builders
// =========================================================================

pub fn file_id(id: &str) -> FileId {
    FileId::new(id)
}

/// An in-memory input file with id `f0`. Use a `FileQueue` when ids matter.
pub fn memory_file(name: &str, media_type: &str, bytes: &[u8]) -> InputFile {
    InputFile {
        id: file_id("f0"),
        name: name.to_string(),
        media_type: media_type.to_string(),
        size: bytes.len() as u64,
        source: ByteSource::Memory(bytes.to_vec()),
    }
}

/// A session holding one page per `(title, body)` pair, in order.
pub fn session_with_pages(pages: &[(&str, &str)]) -> ConversionSession {
    let mut session = ConversionSession::new(Settings::default());
    for (title, body) in pages {
        session.append(title, body);
    }
    session
}

// =========================================================================
// Mock engines
// =========================================================================

/// PDF engine serving fixed page texts. Clones share recorded calls.
#[derive(Debug, Clone, Default)]
pub struct MockPdf {
    pages: Vec<String>,
    failing_page: Option<usize>,
    render_scales: Arc<Mutex<Vec<f32>>>,
}

impl MockPdf {
    pub fn new(pages: &[&str]) -> Self {
        Self {
            pages: pages.iter().map(|p| p.to_string()).collect(),
            failing_page: None,
            render_scales: Arc::default(),
        }
    }

    /// Make text extraction fail for `page` (1-based).
    pub fn failing_on(mut self, page: usize) -> Self {
        self.failing_page = Some(page);
        self
    }

    /// Scales passed to `render_page`, in call order.
    pub fn render_scales(&self) -> Vec<f32> {
        self.render_scales.lock().unwrap().clone()
    }
}

struct MockPdfDocument<'a>(&'a MockPdf);

impl PdfEngine for MockPdf {
    fn open<'a>(&'a self, _bytes: &'a [u8]) -> Result<Box<dyn PdfDocument + 'a>, AdapterError> {
        Ok(Box::new(MockPdfDocument(self)))
    }
}

impl PdfDocument for MockPdfDocument<'_> {
    fn page_count(&self) -> usize {
        self.0.pages.len()
    }

    fn page_text(&self, page: usize) -> Result<String, AdapterError> {
        if self.0.failing_page == Some(page) {
            return Err(AdapterError::Failed(format!("page {page} is unreadable")));
        }
        self.0
            .pages
            .get(page - 1)
            .cloned()
            .ok_or_else(|| AdapterError::Failed(format!("no page {page}")))
    }

    fn render_page(&self, _page: usize, scale: f32) -> Result<DynamicImage, AdapterError> {
        self.0.render_scales.lock().unwrap().push(scale);
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            2,
            2,
            Rgba([255, 255, 255, 255]),
        )))
    }
}

/// OCR engine returning fixed text. Clones share recorded languages.
#[derive(Debug, Clone, Default)]
pub struct MockOcr {
    text: String,
    languages: Arc<Mutex<Vec<String>>>,
}

impl MockOcr {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            languages: Arc::default(),
        }
    }

    pub fn languages(&self) -> Vec<String> {
        self.languages.lock().unwrap().clone()
    }
}

impl OcrEngine for MockOcr {
    fn recognize(&self, _image: &[u8], language: &str) -> Result<String, AdapterError> {
        self.languages.lock().unwrap().push(language.to_string());
        Ok(self.text.clone())
    }
}

/// Document converter that always fails.
#[derive(Debug, Clone, Copy)]
pub struct FailingConverter;

impl DocumentConverter for FailingConverter {
    fn convert(&self, _bytes: &[u8], _options: DocumentOptions) -> Result<String, AdapterError> {
        Err(AdapterError::Failed("corrupt document".to_string()))
    }
}
