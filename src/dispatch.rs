//! Format dispatch: pick one conversion policy per input file and run it.
//!
//! Classification is an ordered rule table evaluated against the lowercased
//! declared media type and file name. The first matching rule wins, and
//! anything unmatched is treated as plain text:
//!
//! | Order | Format | Media type | Name |
//! |---|---|---|---|
//! | 1 | PDF | contains `pdf` | `.pdf` |
//! | 2 | Document | contains `word` | `.docx` |
//! | 3 | Markdown | | `.md` |
//! | 4 | Table | | `.csv` |
//! | 5 | Image | starts `image/` | `.png` `.jpg` `.jpeg` `.gif` `.webp` |
//! | 6 | Text | anything else | |
//!
//! [`convert_file`] turns one file into zero or more [`PageDraft`]s. Drafts are
//! not pages yet: the session only commits them once the whole file succeeded.
//! Page bodies are built with `maud`, so user text is escaped by construction.
//! Markup returned by the document converter and the markdown renderer is
//! embedded as-is.

use crate::adapters::raster::{image_data_url, png_data_url};
use crate::adapters::{AdapterError, Adapters, DocumentOptions};
use crate::config::Settings;
use crate::progress::FileProgress;
use crate::types::InputFile;
use maud::{PreEscaped, html};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Scale used when rasterizing PDF pages.
pub const PDF_RENDER_SCALE: f32 = 1.5;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Conversion policy selected for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pdf,
    Document,
    Markdown,
    Table,
    Image,
    Text,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Pdf => "pdf",
            Format::Document => "docx",
            Format::Markdown => "markdown",
            Format::Table => "csv",
            Format::Image => "image",
            Format::Text => "text",
        })
    }
}

struct Rule {
    format: Format,
    media_type_contains: Option<&'static str>,
    media_type_prefix: Option<&'static str>,
    extensions: &'static [&'static str],
}

impl Rule {
    fn matches(&self, media_type: &str, name: &str) -> bool {
        self.media_type_contains
            .is_some_and(|needle| media_type.contains(needle))
            || self
                .media_type_prefix
                .is_some_and(|prefix| media_type.starts_with(prefix))
            || self.extensions.iter().any(|ext| name.ends_with(ext))
    }
}

const RULES: &[Rule] = &[
    Rule {
        format: Format::Pdf,
        media_type_contains: Some("pdf"),
        media_type_prefix: None,
        extensions: &[".pdf"],
    },
    Rule {
        format: Format::Document,
        media_type_contains: Some("word"),
        media_type_prefix: None,
        extensions: &[".docx"],
    },
    Rule {
        format: Format::Markdown,
        media_type_contains: None,
        media_type_prefix: None,
        extensions: &[".md"],
    },
    Rule {
        format: Format::Table,
        media_type_contains: None,
        media_type_prefix: None,
        extensions: &[".csv"],
    },
    Rule {
        format: Format::Image,
        media_type_contains: None,
        media_type_prefix: Some("image/"),
        extensions: &[".png", ".jpg", ".jpeg", ".gif", ".webp"],
    },
];

/// Select the conversion policy for a file.
pub fn classify(file: &InputFile) -> Format {
    let media_type = file.media_type.to_lowercase();
    let name = file.name.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&media_type, &name))
        .map(|rule| rule.format)
        .unwrap_or(Format::Text)
}

/// A page produced by an adapter, not yet committed to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDraft {
    pub title: String,
    pub body: String,
    /// Raster images embedded in the body.
    pub images: usize,
}

impl PageDraft {
    fn new(title: impl Into<String>, body: String) -> Self {
        Self {
            title: title.into(),
            body,
            images: 0,
        }
    }
}

/// Convert one file into page drafts using the policy [`classify`] selects.
///
/// Progress is reported through `progress` at fixed checkpoints. The caller
/// is responsible for the start (5) and completion (100) marks.
pub fn convert_file(
    file: &InputFile,
    settings: &Settings,
    adapters: &Adapters,
    progress: &mut FileProgress<'_>,
) -> Result<Vec<PageDraft>, ConvertError> {
    let format = classify(file);
    debug!("Converting {} ({}) as {}", file.name, file.id, format);
    match format {
        Format::Pdf => convert_pdf(file, settings, adapters, progress),
        Format::Document => convert_document(file, adapters, progress),
        Format::Markdown => convert_markdown(file, adapters, progress),
        Format::Table => convert_table(file, adapters, progress),
        Format::Image => convert_image(file, settings, adapters, progress),
        Format::Text => convert_text(file, progress),
    }
}

fn convert_pdf(
    file: &InputFile,
    settings: &Settings,
    adapters: &Adapters,
    progress: &mut FileProgress<'_>,
) -> Result<Vec<PageDraft>, ConvertError> {
    let bytes = file.bytes()?;
    progress.bump(15);
    let document = adapters.pdf.open(&bytes)?;
    progress.bump(22);

    let total = document.page_count();
    let mut drafts = Vec::new();
    for n in 1..=total {
        let text = document.page_text(n)?;
        let figure = if settings.render_pdf_page_as_image {
            let raster = document.render_page(n, PDF_RENDER_SCALE)?;
            Some(png_data_url(&raster)?)
        } else {
            None
        };

        let title = format!("{} — Page {}", file.name, n);
        let body = html! {
            article {
                h1 { (title) }
                section { (text) }
                @if let Some(src) = &figure {
                    figure {
                        img src=(src) alt={ (file.name) " p" (n) } loading="lazy";
                    }
                }
            }
        };
        let mut draft = PageDraft::new(title, body.into_string());
        draft.images = usize::from(figure.is_some());
        debug!("  page {n}/{total}: {} chars", text.len());
        drafts.push(draft);

        progress.bump(22 + (n as f64 / total as f64 * 70.0).round() as u32);
        if !settings.split_pdf_pages {
            break;
        }
    }
    Ok(drafts)
}

fn convert_document(
    file: &InputFile,
    adapters: &Adapters,
    progress: &mut FileProgress<'_>,
) -> Result<Vec<PageDraft>, ConvertError> {
    let bytes = file.bytes()?;
    let markup = adapters.document.convert(
        &bytes,
        DocumentOptions {
            inline_images: true,
        },
    )?;
    progress.bump(25);
    let body = html! { article { (PreEscaped(markup)) } };
    Ok(vec![PageDraft::new(&file.name, body.into_string())])
}

fn convert_markdown(
    file: &InputFile,
    adapters: &Adapters,
    progress: &mut FileProgress<'_>,
) -> Result<Vec<PageDraft>, ConvertError> {
    let source = file.text()?;
    progress.bump(30);
    let markup = adapters.markdown.render(&source)?;
    let body = html! { article class="md" { (PreEscaped(markup)) } };
    Ok(vec![PageDraft::new(&file.name, body.into_string())])
}

fn convert_table(
    file: &InputFile,
    adapters: &Adapters,
    progress: &mut FileProgress<'_>,
) -> Result<Vec<PageDraft>, ConvertError> {
    let text = file.text()?;
    let table = adapters.table.parse(&text)?;
    progress.bump(30);
    let body = html! {
        article {
            h1 { (file.name) }
            table {
                thead {
                    tr {
                        @for field in &table.fields {
                            th { (field) }
                        }
                    }
                }
                tbody {
                    @for record in &table.records {
                        tr {
                            @for cell in table.row(record) {
                                td { (cell) }
                            }
                        }
                    }
                }
            }
        }
    };
    Ok(vec![PageDraft::new(&file.name, body.into_string())])
}

fn convert_image(
    file: &InputFile,
    settings: &Settings,
    adapters: &Adapters,
    progress: &mut FileProgress<'_>,
) -> Result<Vec<PageDraft>, ConvertError> {
    let bytes = file.bytes()?;
    let src = image_data_url(&bytes, &file.media_type, &file.name);
    progress.bump(25);
    let text = adapters.ocr.recognize(&bytes, &settings.ocr_language)?;
    let body = html! {
        article {
            h1 { (file.name) }
            img src=(src) alt=(file.name) loading="lazy";
            pre { (text) }
        }
    };
    let mut draft = PageDraft::new(&file.name, body.into_string());
    draft.images = 1;
    Ok(vec![draft])
}

fn convert_text(
    file: &InputFile,
    progress: &mut FileProgress<'_>,
) -> Result<Vec<PageDraft>, ConvertError> {
    let raw = file.text()?;
    progress.bump(55);
    let text = if file.name.to_lowercase().ends_with(".json") {
        pretty_json(&raw).unwrap_or(raw)
    } else {
        raw
    };
    let body = html! {
        article {
            h1 { (file.name) }
            pre { (text) }
        }
    };
    Ok(vec![PageDraft::new(&file.name, body.into_string())])
}

/// Re-indent JSON with two spaces, keeping key order. `None` if it does not parse.
fn pretty_json(raw: &str) -> Option<String> {
    let mut value: serde_json::Value = serde_json::from_str(raw).ok()?;
    integral_floats_as_integers(&mut value);
    serde_json::to_string_pretty(&value).ok()
}

/// Print `1.0` and `1e2` as `1` and `100`, as browsers serialize them.
fn integral_floats_as_integers(value: &mut serde_json::Value) {
    use serde_json::Value;
    // Integers above this are no longer exact in an f64
    const MAX_EXACT: f64 = 9_007_199_254_740_991.0;

    match value {
        Value::Number(n) if n.is_f64() => {
            if let Some(f) = n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() <= MAX_EXACT) {
                *n = (f as i64).into();
            }
        }
        Value::Array(items) => items.iter_mut().for_each(integral_floats_as_integers),
        Value::Object(map) => map.values_mut().for_each(integral_floats_as_integers),
        _ => {}
    }
}
