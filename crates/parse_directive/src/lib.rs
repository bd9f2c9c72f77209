// crates/parse_directive/src/lib.rs

//! Inline configuration directives embedded in slide sources.
//!
//! Two comment forms are recognised:
//!
//! * `%!preview[key=value,key2=value2]`: a configuration overlay.
//! * `% !TEX root = <path>`: points at the file holding the preamble.
//!
//! Discovery happens in one pass before any boundary resolution: the head
//! of the target file is searched first, then the line right above the
//! frame enclosing the target line. The frame-adjacent directive overrides
//! the head directive. Only the first frame-open marker above the target is
//! consulted; a directive above an earlier frame is not honoured.

use std::path::{Path, PathBuf};

use frame_marker::{LineKind, DIRECTIVE_WINDOW};
use load_source::SourceDocument;
use once_cell::sync::Lazy;
use preview_config::ConfigOverlay;
use preview_error::{PreviewError, Result};
use regex::Regex;

static DIRECTIVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*%!preview\[(.*)\]").unwrap());

static ROOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*%\s*!TEX\s+root\s*=\s*(.+?)\s*$").unwrap());

/// A bracket directive found in a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Directive {
    /// 0-indexed line the directive was found on.
    pub line: usize,
    pub overlay: ConfigOverlay,
}

/// Everything directive discovery found for one target line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiscoveredDirectives {
    pub head: Option<Directive>,
    pub frame: Option<Directive>,
    pub root: Option<PathBuf>,
}

impl DiscoveredDirectives {
    /// Folds the discovered directives into one overlay. The frame-adjacent
    /// directive wins over the head directive, and the root pointer only
    /// fills in a main file neither of them named.
    pub fn overlay(&self) -> ConfigOverlay {
        let head = self.head.as_ref().map(|d| d.overlay.clone()).unwrap_or_default();
        let frame = self.frame.as_ref().map(|d| d.overlay.clone()).unwrap_or_default();
        let mut merged = frame.or(head);
        if merged.mainfile.is_none() {
            merged.mainfile = self.root.clone();
        }
        merged
    }
}

/// Returns the text between the brackets if `line` is a bracket directive.
pub fn directive_body(line: &str) -> Option<&str> {
    DIRECTIVE_RE
        .captures(line)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
}

/// Parses the `key=value` list of a directive body into an overlay.
///
/// `path` and `line` (0-indexed) locate the directive for error reports;
/// relative `mainfile` values are resolved against `base_dir`.
pub fn parse_directive_body(
    body: &str,
    base_dir: &Path,
    path: &Path,
    line: usize,
) -> Result<ConfigOverlay> {
    let mut overlay = ConfigOverlay::default();
    let malformed = |text: &str, reason: &str| PreviewError::MalformedDirective {
        path: path.to_path_buf(),
        line: line + 1,
        text: text.to_string(),
        reason: reason.to_string(),
    };

    for pair in body.split(',') {
        if pair.trim().is_empty() {
            continue;
        }
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| malformed(pair.trim(), "missing '='"))?;
        let key = key.trim();
        let value = value.trim();
        let parse_count = |v: &str| {
            v.parse::<usize>()
                .map_err(|_| malformed(pair.trim(), "expected a non-negative integer"))
        };

        match key {
            "mainfile" => overlay.mainfile = Some(resolve_relative(base_dir, value)),
            "nbefore" => overlay.frames_before = Some(parse_count(value)?),
            "nafter" => overlay.frames_after = Some(parse_count(value)?),
            "include_surroundings" => overlay.include_surroundings = Some(parse_bool(value)),
            "extract_header" => overlay.extract_header = Some(parse_bool(value)),
            "previewer" => overlay.previewer = Some(value.to_string()),
            "compiler" => overlay.compiler = Some(value.to_string()),
            "nopreview" => overlay.disable_preview = Some(parse_bool(value)),
            "handout" => overlay.handout = Some(parse_bool(value)),
            "preamble" => overlay.pre_preamble = Some(value.to_string()),
            "synctex" => overlay.sync_hack = Some(parse_bool(value)),
            other => log::debug!("Ignoring unknown directive key '{}' in {}", other, path.display()),
        }
    }
    Ok(overlay)
}

fn parse_bool(value: &str) -> bool {
    value == "true" || value == "1"
}

fn resolve_relative(base_dir: &Path, value: &str) -> PathBuf {
    let candidate = PathBuf::from(value);
    if candidate.is_absolute() {
        candidate
    } else {
        base_dir.join(candidate)
    }
}

/// Scans `lines` (0-indexed, clamped to the document) and parses the first
/// bracket directive found. Later directives in the window are ignored.
pub fn scan_directive(
    doc: &SourceDocument,
    lines: std::ops::Range<usize>,
) -> Result<Option<Directive>> {
    let end = lines.end.min(doc.len());
    let base_dir = doc.directory();
    for idx in lines.start..end {
        if let Some(body) = directive_body(&doc.lines[idx]) {
            let overlay = parse_directive_body(body, &base_dir, &doc.path, idx)?;
            log::debug!("Directive at {}:{} -> {:?}", doc.path.display(), idx + 1, overlay);
            return Ok(Some(Directive { line: idx, overlay }));
        }
    }
    Ok(None)
}

/// Finds a `% !TEX root = <path>` pointer in the head of the document and
/// resolves it against the document's directory.
pub fn find_root_pointer(doc: &SourceDocument) -> Option<PathBuf> {
    let base_dir = doc.directory();
    doc.lines
        .iter()
        .take(DIRECTIVE_WINDOW)
        .find_map(|line| ROOT_RE.captures(line.trim_end()))
        .and_then(|cap| cap.get(1))
        .map(|m| resolve_relative(&base_dir, m.as_str()))
}

/// Index of the first frame-open marker at or above `target_line`, not
/// looking past the document-open marker.
pub fn enclosing_frame_open(kinds: &[LineKind], target_line: usize) -> Option<usize> {
    if target_line >= kinds.len() {
        return None;
    }
    for idx in (0..=target_line).rev() {
        match kinds[idx] {
            LineKind::FrameOpen => return Some(idx),
            LineKind::DocumentOpen => return None,
            _ => {}
        }
    }
    None
}

/// Runs the full directive discovery for `target_line` (0-indexed).
pub fn discover_directives(
    doc: &SourceDocument,
    kinds: &[LineKind],
    target_line: usize,
) -> Result<DiscoveredDirectives> {
    let head = scan_directive(doc, 0..DIRECTIVE_WINDOW)?;

    let frame = match enclosing_frame_open(kinds, target_line) {
        Some(open) if open > 0 => scan_directive(doc, open - 1..open)?,
        _ => None,
    };

    let root = find_root_pointer(doc);
    if let Some(ref root) = root {
        log::debug!("Root pointer in {} -> {}", doc.path.display(), root.display());
    }

    Ok(DiscoveredDirectives { head, frame, root })
}
