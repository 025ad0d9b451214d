//! Extraction adapters: the per-format engines the pipeline calls into.
//!
//! The module is split into:
//! - **Backend**: capability traits, [`Adapters`] bundle, [`Unconfigured`] stand-in
//! - **Markdown**: [`PulldownMarkdown`], `pulldown-cmark` with raw HTML escaped
//! - **Table**: [`DelimitedTableParser`], CSV-like text with header inference
//! - **Raster**: data URL encoding for embedded images

pub mod backend;
mod markdown;
pub mod raster;
mod table;

pub use backend::{
    AdapterError, Adapters, DocumentConverter, DocumentOptions, MarkdownRenderer, OcrEngine,
    ParsedTable, PdfDocument, PdfEngine, TableParser, Unconfigured,
};
pub use markdown::PulldownMarkdown;
pub use table::DelimitedTableParser;
