//! Shared types used across the pipeline.
//!
//! [`InputFile`] is what the dispatcher consumes, [`Page`] is what the session
//! stores and the assembler renders. Pages are serialized into the project
//! record, so their shape is part of the persisted format.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Opaque identifier assigned to a file when it is enqueued.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileId(String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where an input file's bytes come from.
#[derive(Debug, Clone)]
pub enum ByteSource {
    Path(PathBuf),
    Memory(Vec<u8>),
}

/// A file waiting to be converted.
///
/// Immutable once enqueued: the dispatcher reads it exactly once.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub id: FileId,
    pub name: String,
    /// Declared media type. Empty when unknown, like a browser `File.type`.
    pub media_type: String,
    pub size: u64,
    pub source: ByteSource,
}

impl InputFile {
    /// Read the underlying bytes.
    pub fn bytes(&self) -> io::Result<Vec<u8>> {
        match &self.source {
            ByteSource::Path(path) => std::fs::read(path),
            ByteSource::Memory(bytes) => Ok(bytes.clone()),
        }
    }

    /// Read the bytes as text. Invalid UTF-8 sequences are replaced and a
    /// leading byte-order mark is dropped.
    pub fn text(&self) -> io::Result<String> {
        let bytes = self.bytes()?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(text.strip_prefix('\u{feff}').unwrap_or(&text).to_string())
    }
}

/// Guess a declared media type from a file name, the way a browser file
/// picker does. Returns an empty string for unknown extensions.
pub fn media_type_for_name(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "json" => "application/json",
        "txt" => "text/plain",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "",
    }
}

/// Files queued for the next conversion run, in enqueue order.
#[derive(Debug, Default)]
pub struct FileQueue {
    files: Vec<InputFile>,
    next_id: u64,
}

/// A file about to be enqueued: everything except the identifier.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub name: String,
    pub media_type: String,
    pub size: u64,
    pub source: ByteSource,
}

impl NewFile {
    /// Describe a file on disk. The media type is inferred from the extension.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let size = std::fs::metadata(path)?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            media_type: media_type_for_name(&name).to_string(),
            name,
            size,
            source: ByteSource::Path(path.to_path_buf()),
        })
    }

    /// Describe an in-memory file with an explicit media type.
    pub fn from_bytes(name: &str, media_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            media_type: media_type.to_string(),
            size: bytes.len() as u64,
            source: ByteSource::Memory(bytes),
        }
    }
}

impl FileQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append files, assigning each a fresh identifier.
    pub fn enqueue(&mut self, files: impl IntoIterator<Item = NewFile>) {
        for file in files {
            self.next_id += 1;
            self.files.push(InputFile {
                id: FileId(format!("f{}", self.next_id)),
                name: file.name,
                media_type: file.media_type,
                size: file.size,
                source: file.source,
            });
        }
    }

    /// Build a queue from filesystem paths.
    ///
    /// Directories are walked recursively and their files enqueued in file
    /// name order. Paths are otherwise enqueued in the order given.
    pub fn from_paths(paths: &[PathBuf]) -> io::Result<Self> {
        let mut queue = Self::new();
        for path in paths {
            if path.is_dir() {
                let mut found = Vec::new();
                for entry in walkdir::WalkDir::new(path).sort_by_file_name() {
                    let entry = entry.map_err(io::Error::other)?;
                    if entry.file_type().is_file() {
                        found.push(NewFile::from_path(entry.path())?);
                    }
                }
                queue.enqueue(found);
            } else {
                queue.enqueue([NewFile::from_path(path)?]);
            }
        }
        Ok(queue)
    }

    pub fn files(&self) -> &[InputFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }
}

/// Identifier of a page, unique within one page store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    /// Derive an id from the page's position and content.
    pub fn derive(ordinal: usize, title: &str, body: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(ordinal.to_le_bytes());
        hasher.update(title.as_bytes());
        hasher.update([0]);
        hasher.update(body.as_bytes());
        let hex: String = hasher
            .finalize()
            .iter()
            .take(6)
            .map(|b| format!("{b:02x}"))
            .collect();
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One normalized unit of site content.
///
/// `body` is a markup fragment. Any user text inside it has already been
/// escaped; renderers embed it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub title: String,
    pub body: String,
}

/// Aggregate statistics over a page store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub page_count: usize,
    pub word_count: usize,
    pub char_count: usize,
    pub image_count: usize,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pages • {} words • {} chars • {} images",
            self.page_count, self.word_count, self.char_count, self.image_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn text_drops_leading_byte_order_mark() {
        let file = InputFile {
            id: FileId::new("f1"),
            name: "data.json".into(),
            media_type: String::new(),
            size: 9,
            source: ByteSource::Memory(b"\xef\xbb\xbf{\"a\":1}".to_vec()),
        };
        assert_eq!(file.text().unwrap(), "{\"a\":1}");
        // Only a leading mark is dropped
        let inner = InputFile {
            source: ByteSource::Memory("a\u{feff}b".as_bytes().to_vec()),
            ..file
        };
        assert_eq!(inner.text().unwrap(), "a\u{feff}b");
    }

    #[test]
    fn media_type_known_extensions() {
        assert_eq!(media_type_for_name("report.PDF"), "application/pdf");
        assert_eq!(media_type_for_name("photo.jpeg"), "image/jpeg");
        assert_eq!(media_type_for_name("notes.md"), "text/markdown");
        assert!(media_type_for_name("letter.docx").contains("word"));
    }

    #[test]
    fn media_type_unknown_is_empty() {
        assert_eq!(media_type_for_name("archive.tar.zst"), "");
        assert_eq!(media_type_for_name("Makefile"), "");
    }

    #[test]
    fn enqueue_assigns_unique_ids_in_order() {
        let mut queue = FileQueue::new();
        queue.enqueue([
            NewFile::from_bytes("a.txt", "text/plain", b"a".to_vec()),
            NewFile::from_bytes("b.txt", "text/plain", b"b".to_vec()),
        ]);
        queue.enqueue([NewFile::from_bytes("c.txt", "", b"c".to_vec())]);

        let names: Vec<&str> = queue.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a.txt", "b.txt", "c.txt"]);
        let ids: Vec<&str> = queue.files().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["f1", "f2", "f3"]);
    }

    #[test]
    fn ids_stay_unique_after_clear() {
        let mut queue = FileQueue::new();
        queue.enqueue([NewFile::from_bytes("a.txt", "", Vec::new())]);
        queue.clear();
        queue.enqueue([NewFile::from_bytes("a.txt", "", Vec::new())]);
        assert_eq!(queue.files()[0].id.as_str(), "f2");
    }

    #[test]
    fn from_paths_walks_directories_sorted() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("docs");
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("b.md"), "# B").unwrap();
        std::fs::write(dir.join("a.csv"), "x\n1").unwrap();
        std::fs::write(dir.join("nested/c.txt"), "c").unwrap();
        let single = tmp.path().join("z.json");
        std::fs::write(&single, "{}").unwrap();

        let queue = FileQueue::from_paths(&[single, dir]).unwrap();
        let names: Vec<&str> = queue.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["z.json", "a.csv", "b.md", "c.txt"]);
        assert_eq!(queue.files()[0].media_type, "application/json");
        assert_eq!(queue.files()[0].size, 2);
    }

    #[test]
    fn text_replaces_invalid_utf8() {
        let file = InputFile {
            id: FileId("f1".into()),
            name: "bad.txt".into(),
            media_type: String::new(),
            size: 3,
            source: ByteSource::Memory(vec![b'o', 0xff, b'k']),
        };
        assert_eq!(file.text().unwrap(), "o\u{fffd}k");
    }

    #[test]
    fn page_id_depends_on_ordinal() {
        let a = PageId::derive(0, "Same", "<p>x</p>");
        let b = PageId::derive(1, "Same", "<p>x</p>");
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 12);
        assert_eq!(a, PageId::derive(0, "Same", "<p>x</p>"));
    }

    #[test]
    fn stats_display() {
        let stats = Stats {
            page_count: 2,
            word_count: 10,
            char_count: 55,
            image_count: 1,
        };
        assert_eq!(
            stats.to_string(),
            "2 pages • 10 words • 55 chars • 1 images"
        );
    }
}
