// crates/load_source/src/lib.rs

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use preview_error::{PreviewError, Result};
use walkdir::WalkDir;

/// How the bytes of a document were turned into text.
///
/// Files that are not valid UTF-8 are read as Latin-1, which maps every byte
/// to exactly one char, so [`SourceEncoding::encode`] gives the bytes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceEncoding {
    #[default]
    Utf8,
    Latin1,
}

impl SourceEncoding {
    /// Decodes `bytes`, falling back to Latin-1 when they are not UTF-8.
    pub fn decode(bytes: &[u8]) -> (String, SourceEncoding) {
        match std::str::from_utf8(bytes) {
            Ok(text) => (text.to_string(), SourceEncoding::Utf8),
            Err(_) => (
                bytes.iter().map(|&b| char::from(b)).collect(),
                SourceEncoding::Latin1,
            ),
        }
    }

    /// Turns text back into bytes. Under Latin-1 a char above U+00FF (which
    /// cannot come from a Latin-1 file) is written as UTF-8.
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            SourceEncoding::Utf8 => text.as_bytes().to_vec(),
            SourceEncoding::Latin1 => {
                let mut out = Vec::with_capacity(text.len());
                for c in text.chars() {
                    match u8::try_from(u32::from(c)) {
                        Ok(byte) => out.push(byte),
                        Err(_) => {
                            let mut buf = [0u8; 4];
                            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                        }
                    }
                }
                out
            }
        }
    }
}

/// A document loaded as an ordered list of lines.
///
/// Every line keeps its own terminator, so joining any range of lines and
/// encoding it with `encoding` gives back exactly the bytes of the original
/// file. Lines are 0-indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub lines: Vec<String>,
    pub encoding: SourceEncoding,
}

impl SourceDocument {
    /// Builds a document from in-memory text.
    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Self {
        Self {
            path: path.into(),
            lines: split_lines(text),
            encoding: SourceEncoding::Utf8,
        }
    }

    /// Builds a document from raw file contents.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: &[u8]) -> Self {
        let (text, encoding) = SourceEncoding::decode(bytes);
        Self {
            path: path.into(),
            lines: split_lines(&text),
            encoding,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Directory holding the document (`.` for bare file names).
    pub fn directory(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Concatenates lines `[begin, end)` verbatim.
    pub fn join_range(&self, begin: usize, end: usize) -> String {
        let end = end.min(self.lines.len());
        if begin >= end {
            return String::new();
        }
        self.lines[begin..end].concat()
    }
}

/// Splits text into lines that keep their `\n` terminator.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

/// True if both paths name the same file. Uses canonical paths when both
/// exist on disk, otherwise compares them with `.` components removed.
pub fn same_path(a: &Path, b: &Path) -> bool {
    if let (Ok(ca), Ok(cb)) = (fs::canonicalize(a), fs::canonicalize(b)) {
        return ca == cb;
    }
    strip_cur_dir(a) == strip_cur_dir(b)
}

fn strip_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Abstracts the file system so main-file discovery can run against an
/// in-memory file set.
pub trait DocumentStore {
    /// Loads the document at `path`.
    fn load(&self, path: &Path) -> Result<SourceDocument>;

    /// Lists files directly inside `dir` whose extension equals `extension`,
    /// sorted lexicographically.
    fn list_siblings(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>>;
}

/// Reads documents from disk.
pub struct FsDocumentStore;

impl DocumentStore for FsDocumentStore {
    fn load(&self, path: &Path) -> Result<SourceDocument> {
        let bytes = fs::read(path).map_err(|e| PreviewError::from_io(path, e))?;
        let doc = SourceDocument::from_bytes(path, &bytes);
        log::debug!(
            "Loaded {} ({} bytes, {:?})",
            path.display(),
            bytes.len(),
            doc.encoding
        );
        Ok(doc)
    }

    fn list_siblings(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "walk error"));
                PreviewError::from_io(dir, source)
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();
            let matches_ext = path
                .extension()
                .and_then(|s| s.to_str())
                .map(|ext| ext == extension)
                .unwrap_or(false);
            if matches_ext {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

/// In-memory file set keyed by path.
#[derive(Debug, Default, Clone)]
pub struct MemoryDocumentStore {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a file.
    pub fn insert(&mut self, path: impl Into<PathBuf>, text: &str) -> &mut Self {
        self.insert_bytes(path, text.as_bytes())
    }

    /// Adds (or replaces) a file given as raw bytes.
    pub fn insert_bytes(&mut self, path: impl Into<PathBuf>, bytes: &[u8]) -> &mut Self {
        self.files.insert(strip_cur_dir(&path.into()), bytes.to_vec());
        self
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn load(&self, path: &Path) -> Result<SourceDocument> {
        let key = strip_cur_dir(path);
        self.files
            .get(&key)
            .map(|bytes| SourceDocument::from_bytes(path, bytes))
            .ok_or_else(|| PreviewError::FileNotFound(path.to_path_buf()))
    }

    fn list_siblings(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        let dir = strip_cur_dir(dir);
        // BTreeMap keys are already in lexicographic order.
        Ok(self
            .files
            .keys()
            .filter(|p| p.parent().map(strip_cur_dir).as_ref() == Some(&dir))
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some(extension))
            .cloned()
            .collect())
    }
}
