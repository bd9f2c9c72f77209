// crates/find_main_file/src/lib.rs

use std::path::{Path, PathBuf};

use frame_marker::{has_preamble, LineKind, TEMP_FILE_BASENAME};
use load_source::{same_path, DocumentStore, SourceDocument};
use preview_error::{PreviewError, Result};

/// Locates the document holding the preamble for `target`.
///
/// The candidate is `explicit` when given, otherwise the target itself. If
/// the candidate declares `\documentclass` within its first lines it is the
/// main file. Otherwise the files next to the target with the same
/// extension are tried in lexicographic order, skipping the candidate, the
/// previewer's own generated file and any sibling that cannot be read.
pub fn find_main_file(
    store: &dyn DocumentStore,
    target: &SourceDocument,
    explicit: Option<&Path>,
) -> Result<SourceDocument> {
    let candidate = match explicit {
        Some(path) if !same_path(path, &target.path) => store.load(path)?,
        _ => target.clone(),
    };
    if has_preamble(&candidate.lines) {
        log::debug!("{} holds its own preamble", candidate.path.display());
        return Ok(candidate);
    }

    let directory = target.directory();
    let extension = target
        .path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("tex");

    for sibling in store.list_siblings(&directory, extension)? {
        if same_path(&sibling, &candidate.path) || is_temp_file(&sibling) {
            continue;
        }
        let doc = match store.load(&sibling) {
            Ok(doc) => doc,
            Err(err) => {
                log::warn!("Skipping {}: {}", sibling.display(), err);
                continue;
            }
        };
        if has_preamble(&doc.lines) {
            log::info!("Using preamble from {}", sibling.display());
            return Ok(doc);
        }
    }

    Err(PreviewError::PreambleNotFound {
        candidate: candidate.path,
        directory,
    })
}

fn is_temp_file(path: &Path) -> bool {
    path.file_name().and_then(|s| s.to_str()) == Some(TEMP_FILE_BASENAME)
}

/// Returns everything above the first `\begin{document}` line. A main file
/// without one contributes its whole text.
pub fn extract_preamble(main: &SourceDocument, kinds: &[LineKind]) -> String {
    let end = kinds
        .iter()
        .position(|k| *k == LineKind::DocumentOpen)
        .unwrap_or(main.len());
    main.join_range(0, end)
}

/// The preamble source and its text.
#[derive(Debug, Clone)]
pub struct MainFile {
    pub document: SourceDocument,
    pub preamble: String,
}

impl MainFile {
    pub fn path(&self) -> &Path {
        &self.document.path
    }

    /// True if the preamble lives in `target` itself.
    pub fn is_same_as(&self, target: &Path) -> bool {
        same_path(&self.document.path, target)
    }
}

/// Convenience wrapper: locate the main file and cut its preamble.
pub fn resolve_main_file(
    store: &dyn DocumentStore,
    target: &SourceDocument,
    explicit: Option<&Path>,
) -> Result<MainFile> {
    let document = find_main_file(store, target, explicit)?;
    let kinds = frame_marker::classify_lines(&document.lines);
    let preamble = extract_preamble(&document, &kinds);
    Ok(MainFile { document, preamble })
}

/// Path of the generated document for a given main file.
pub fn temp_file_for(main: &Path) -> PathBuf {
    let dir = match main.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    dir.join(TEMP_FILE_BASENAME)
}
