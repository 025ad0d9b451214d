//! Conversion sessions: the page store and its running statistics.
//!
//! A [`ConversionSession`] owns the pages produced by one conversion run, in
//! reading order, together with [`Stats`] kept up to date as pages are added.
//! Every call to [`run`] builds a brand-new session; nothing carries over
//! from a previous run.
//!
//! ## Per-file commit
//!
//! The run loop converts a file into drafts first and commits them only if
//! the whole file succeeded. A file that fails halfway (say, page 3 of a PDF
//! cannot be read) contributes no pages and no statistics. The failure is
//! logged, recorded in [`ConversionSession::failures`] and reported as a
//! [`ConvertEvent::FileFailed`]; the remaining files are still converted.
//!
//! ## Counting
//!
//! Statistics are computed on the markup-stripped body, where every tag is
//! replaced by a single space:
//!
//! - words: whitespace-delimited tokens
//! - chars: Unicode scalar values, including the spaces left by tags
//! - images: one per embedded raster image

use crate::adapters::Adapters;
use crate::config::Settings;
use crate::dispatch::{PageDraft, classify, convert_file};
use crate::progress::{ConvertEvent, EventSender, FileProgress, emit};
use crate::types::{FileId, InputFile, Page, PageId, Stats};
use tracing::{debug, info, warn};

/// A file that could not be converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub id: FileId,
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct ConversionSession {
    settings: Settings,
    pages: Vec<Page>,
    stats: Stats,
    failures: Vec<FileFailure>,
}

impl ConversionSession {
    /// An empty session.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            pages: Vec::new(),
            stats: Stats::default(),
            failures: Vec::new(),
        }
    }

    /// Rebuild a session from previously saved pages.
    ///
    /// Page ids are kept as saved. Statistics are recomputed, counting one
    /// image per `<img` tag in the bodies.
    pub fn from_pages(settings: Settings, pages: Vec<Page>) -> Self {
        let mut stats = Stats::default();
        for page in &pages {
            let plain = strip_markup(&page.body);
            stats.word_count += word_count(&plain);
            stats.char_count += plain.chars().count();
            stats.image_count += page.body.matches("<img").count();
        }
        stats.page_count = pages.len();
        Self {
            settings,
            pages,
            stats,
            failures: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Pages in reading order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Files that failed during the run that built this session.
    pub fn failures(&self) -> &[FileFailure] {
        &self.failures
    }

    /// Add a page at the end of the store and update the text statistics.
    pub fn append(&mut self, title: &str, body: &str) -> &Page {
        let plain = strip_markup(body);
        self.stats.word_count += word_count(&plain);
        self.stats.char_count += plain.chars().count();

        let id = PageId::derive(self.pages.len(), title, body);
        self.pages.push(Page {
            id,
            title: title.to_string(),
            body: body.to_string(),
        });
        self.stats.page_count = self.pages.len();
        &self.pages[self.pages.len() - 1]
    }

    /// Append every draft of one file, in order, including its images.
    pub fn commit(&mut self, drafts: Vec<PageDraft>) {
        for draft in drafts {
            self.append(&draft.title, &draft.body);
            self.stats.image_count += draft.images;
        }
    }

    /// Word count of each page, in reading order.
    pub fn page_word_counts(&self) -> Vec<usize> {
        self.pages
            .iter()
            .map(|p| word_count(&strip_markup(&p.body)))
            .collect()
    }
}

/// Convert `files` sequentially into a new session.
///
/// Files are processed in the order given. A file that fails is skipped
/// without affecting the pages or statistics of any other file.
pub fn run(
    files: &[InputFile],
    settings: &Settings,
    adapters: &Adapters,
    events: Option<&EventSender>,
) -> ConversionSession {
    let mut session = ConversionSession::new(settings.clone());
    info!("Converting {} files", files.len());
    emit(
        events,
        ConvertEvent::RunStarted {
            file_count: files.len(),
        },
    );

    for (index, file) in files.iter().enumerate() {
        let format = classify(file);
        emit(
            events,
            ConvertEvent::FileStarted {
                index: index + 1,
                id: file.id.clone(),
                name: file.name.clone(),
                format,
            },
        );

        let mut progress = FileProgress::new(file.id.clone(), events);
        progress.bump(5);
        match convert_file(file, settings, adapters, &mut progress) {
            Ok(drafts) => {
                let pages = drafts.len();
                session.commit(drafts);
                progress.finish();
                debug!("{} → {} pages", file.name, pages);
                emit(
                    events,
                    ConvertEvent::FileConverted {
                        id: file.id.clone(),
                        name: file.name.clone(),
                        pages,
                    },
                );
            }
            Err(e) => {
                warn!("Failed to convert {}: {}", file.name, e);
                let failure = FileFailure {
                    id: file.id.clone(),
                    name: file.name.clone(),
                    error: e.to_string(),
                };
                progress.finish();
                emit(
                    events,
                    ConvertEvent::FileFailed {
                        id: failure.id.clone(),
                        name: failure.name.clone(),
                        error: failure.error.clone(),
                    },
                );
                session.failures.push(failure);
            }
        }
    }

    info!(
        "Converted {} files into {} pages ({} failed)",
        files.len() - session.failures.len(),
        session.pages.len(),
        session.failures.len()
    );
    emit(
        events,
        ConvertEvent::RunFinished {
            stats: session.stats,
            failed: session.failures.len(),
        },
    );
    session
}

/// Replace every `<...>` tag with a single space.
///
/// Entities are left as they are. A `<` with no closing `>` is kept as text.
pub fn strip_markup(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;
    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        match after.find('>') {
            Some(end) if end > 0 => {
                out.push_str(&rest[..start]);
                out.push(' ');
                rest = &after[end + 1..];
            }
            _ => {
                out.push_str(&rest[..=start]);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn word_count(plain: &str) -> usize {
    plain.split_whitespace().count()
}
