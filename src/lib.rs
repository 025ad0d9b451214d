//! # docsite
//!
//! Turns a batch of heterogeneous documents (PDF, DOCX, markdown, CSV, images,
//! JSON and plain text) into a small static website with a table of contents,
//! exported as one file, split assets or one document per page, optionally
//! installable as an offline web app.
//!
//! # Pipeline
//!
//! ```text
//! FileQueue ─→ dispatch ─→ session ─→ render ─→ export ─→ Packager
//!  inputs      one policy   pages +    HTML      bundle     directory
//!              per format   stats      documents
//! ```
//!
//! Processing is sequential: files in enqueue order, PDF pages in physical
//! order. Each file is converted into drafts first and committed to the
//! session only if the whole file succeeded, so a broken input never leaves
//! partial pages or skewed statistics behind.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Input files, the file queue, pages and statistics |
//! | [`adapters`] | Per-format extraction traits and the built-in engines |
//! | [`dispatch`] | Format classification and page-body construction |
//! | [`progress`] | Conversion events and monotonic per-file progress |
//! | [`session`] | The page store: sequential runs, per-file commit, counting |
//! | [`render`] | Site assembly in the single, split and multi topologies |
//! | [`pwa`] | Web manifest, app icon and offline script |
//! | [`export`] | Bundle assembly and packaging |
//! | [`project`] | Saving and loading the project record |
//! | [`config`] | `config.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Engines Behind Traits
//!
//! PDF text extraction, DOCX conversion and OCR are large external
//! capabilities. The pipeline only sees the traits in [`adapters`]; an
//! [`adapters::Adapters`] bundle wires one implementation per capability.
//! Markdown and tabular text ship with built-in engines. Capabilities with no
//! engine wired in fail per file with a clear message instead of aborting the
//! batch.
//!
//! ## Maud for All Markup
//!
//! Page bodies and documents are built with [Maud](https://maud.lambda.xyz/).
//! Interpolated user text (file names, titles, extracted text, table cells) is
//! escaped by construction. Only markup returned by an engine is embedded
//! verbatim, and the built-in markdown renderer escapes raw HTML in its input.

pub mod adapters;
pub mod config;
pub mod dispatch;
pub mod export;
pub mod output;
pub mod progress;
pub mod project;
pub mod pwa;
pub mod render;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
