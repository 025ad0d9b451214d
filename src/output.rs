//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every entity is shown by its semantic identity first (positional index and
//! name or title) with details as indented context lines. The same pattern is
//! used for conversion progress, exports and analytics.
//!
//! # Output Format
//!
//! ## Convert
//!
//! ```text
//! Converting 3 files
//! 001 deck.pdf (pdf)
//!     → 12 pages
//! 002 notes.md (markdown)
//!     → 1 page
//! 003 letter.docx (docx)
//!     Failed: no DOCX engine is configured
//! 13 pages • 2841 words • 17012 chars • 0 images
//! 1 file failed
//! ```
//!
//! ## Export
//!
//! ```text
//! Exported 3 files (48.2 KB) → dist
//!     index.html (41.0 KB)
//!     styles.css (1.6 KB)
//!     script.js (612 B)
//! ```
//!
//! ## Stats
//!
//! ```text
//! 2 pages • 130 words • 810 chars • 1 images
//! 001 ██████████████████████████████ 120 Intro
//! 002 ██▌                             10 Scan
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::export::Bundle;
use crate::progress::ConvertEvent;
use crate::session::ConversionSession;
use std::path::Path;

/// Width of the longest bar in the word chart, in cells.
const CHART_WIDTH: usize = 30;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Human-readable byte size: `512 B`, `1.5 KB`, `2.0 MB`.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// Horizontal bar of `value / max * width` cells, in eighths.
fn bar(value: usize, max: usize, width: usize) -> String {
    const PARTIAL: [char; 8] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉'];
    if max == 0 {
        return String::new();
    }
    let eighths = (value * width * 8 + max / 2) / max;
    let eighths = if value > 0 { eighths.max(1) } else { 0 };
    let mut out = "█".repeat(eighths / 8);
    if eighths % 8 > 0 {
        out.push(PARTIAL[eighths % 8]);
    }
    out
}

// ============================================================================
// Convert
// ============================================================================

/// Format a single conversion event as display lines.
///
/// Percentage updates produce no lines; the per-file result line follows
/// soon enough.
pub fn format_convert_event(event: &ConvertEvent) -> Vec<String> {
    match event {
        ConvertEvent::RunStarted { file_count } => {
            vec![format!("Converting {}", plural(*file_count, "file", "files"))]
        }
        ConvertEvent::FileStarted {
            index,
            name,
            format,
            ..
        } => vec![format!("{} {} ({})", format_index(*index), name, format)],
        ConvertEvent::Progress { .. } => Vec::new(),
        ConvertEvent::FileConverted { pages, .. } => {
            vec![format!("{}\u{2192} {}", indent(1), plural(*pages, "page", "pages"))]
        }
        ConvertEvent::FileFailed { error, .. } => {
            vec![format!("{}Failed: {}", indent(1), error)]
        }
        ConvertEvent::RunFinished { stats, failed } => {
            let mut lines = vec![stats.to_string()];
            if *failed > 0 {
                lines.push(format!("{} failed", plural(*failed, "file", "files")));
            }
            lines
        }
    }
}

// ============================================================================
// Export
// ============================================================================

/// Summarize an export: total, destination, then one line per file.
pub fn format_bundle(bundle: &Bundle, dest: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "Exported {} ({}) \u{2192} {}",
        plural(bundle.files.len(), "file", "files"),
        human_size(bundle.size()),
        dest.display()
    )];
    for file in &bundle.files {
        lines.push(format!(
            "{}{} ({})",
            indent(1),
            file.path,
            human_size(file.contents.len() as u64)
        ));
    }
    lines
}

pub fn print_bundle(bundle: &Bundle, dest: &Path) {
    for line in format_bundle(bundle, dest) {
        println!("{}", line);
    }
}

// ============================================================================
// Analytics
// ============================================================================

/// Stats line followed by a per-page word chart.
pub fn format_analytics(session: &ConversionSession) -> Vec<String> {
    let mut lines = vec![session.stats().to_string()];
    let counts = session.page_word_counts();
    let max = counts.iter().copied().max().unwrap_or(0);
    let digits = max.to_string().len();
    for (i, (page, count)) in session.pages().iter().zip(&counts).enumerate() {
        lines.push(format!(
            "{} {:<width$} {:>digits$} {}",
            format_index(i + 1),
            bar(*count, max, CHART_WIDTH),
            count,
            page.title,
            width = CHART_WIDTH,
        ));
    }
    lines
}

pub fn print_analytics(session: &ConversionSession) {
    for line in format_analytics(session) {
        println!("{}", line);
    }
}
