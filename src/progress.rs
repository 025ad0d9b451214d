//! Conversion events and per-file progress.
//!
//! The run loop reports what it is doing over an optional bounded channel
//! ([`EventSender`]). The CLI drains it on a printer thread; library callers
//! can forward events anywhere, or pass `None` and ignore them.
//!
//! Progress for a file is a percentage that only ever goes up and reaches 100
//! exactly once, when the file is done, whether it converted or failed.

use crate::dispatch::Format;
use crate::types::{FileId, Stats};
use std::sync::mpsc::SyncSender;

/// Sending half of the event channel.
///
/// Use `std::sync::mpsc::sync_channel` to create one.
pub type EventSender = SyncSender<ConvertEvent>;

#[derive(Debug, Clone, PartialEq)]
pub enum ConvertEvent {
    RunStarted {
        file_count: usize,
    },
    FileStarted {
        /// 1-based position in the batch.
        index: usize,
        id: FileId,
        name: String,
        format: Format,
    },
    Progress {
        id: FileId,
        percent: u8,
    },
    FileConverted {
        id: FileId,
        name: String,
        pages: usize,
    },
    FileFailed {
        id: FileId,
        name: String,
        error: String,
    },
    RunFinished {
        stats: Stats,
        failed: usize,
    },
}

/// Send an event if anyone is listening. A dropped receiver is not an error.
pub(crate) fn emit(events: Option<&EventSender>, event: ConvertEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}

/// Monotonic 0–100 progress for one file.
pub struct FileProgress<'a> {
    id: FileId,
    percent: u8,
    events: Option<&'a EventSender>,
}

impl<'a> FileProgress<'a> {
    pub fn new(id: FileId, events: Option<&'a EventSender>) -> Self {
        Self {
            id,
            percent: 0,
            events,
        }
    }

    /// Raise progress to `percent` (clamped to 100). Lower values are ignored.
    pub fn bump(&mut self, percent: u32) {
        let percent = percent.min(100) as u8;
        if percent <= self.percent {
            return;
        }
        self.percent = percent;
        emit(
            self.events,
            ConvertEvent::Progress {
                id: self.id.clone(),
                percent,
            },
        );
    }

    /// Mark the file as done.
    pub fn finish(&mut self) {
        self.bump(100);
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::file_id;
    use std::sync::mpsc::sync_channel;

    fn percents(rx: &std::sync::mpsc::Receiver<ConvertEvent>) -> Vec<u8> {
        rx.try_iter()
            .filter_map(|e| match e {
                ConvertEvent::Progress { percent, .. } => Some(percent),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn bump_is_monotonic() {
        let (tx, rx) = sync_channel(16);
        let mut progress = FileProgress::new(file_id("f1"), Some(&tx));
        progress.bump(5);
        progress.bump(30);
        progress.bump(20);
        progress.bump(30);
        progress.finish();
        assert_eq!(percents(&rx), [5, 30, 100]);
    }

    #[test]
    fn bump_clamps_to_100() {
        let (tx, rx) = sync_channel(16);
        let mut progress = FileProgress::new(file_id("f1"), Some(&tx));
        progress.bump(250);
        progress.finish();
        assert_eq!(percents(&rx), [100]);
        assert_eq!(progress.percent(), 100);
    }

    #[test]
    fn works_without_listener() {
        let mut progress = FileProgress::new(file_id("f1"), None);
        progress.bump(40);
        assert_eq!(progress.percent(), 40);
    }

    #[test]
    fn dropped_receiver_is_ignored() {
        let (tx, rx) = sync_channel(1);
        drop(rx);
        let mut progress = FileProgress::new(file_id("f1"), Some(&tx));
        progress.bump(10);
        progress.finish();
        assert_eq!(progress.percent(), 100);
    }
}
