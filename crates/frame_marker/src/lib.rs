// crates/frame_marker/src/lib.rs

//! Marker text and the per-line classifier shared by every stage of the
//! frame previewer.
//!
//! Each line of a document is classified exactly once into a [`LineKind`];
//! the boundary resolver, header extractor and navigator all work over the
//! resulting slice of kinds instead of re-running patterns.

use once_cell::sync::Lazy;
use regex::Regex;

/// Line opening the document body.
pub const DOCUMENT_OPEN: &str = "\\begin{document}";

/// Line closing the document body.
pub const DOCUMENT_CLOSE: &str = "\\end{document}";

/// Class option injected ahead of the preamble in handout mode.
pub const HANDOUT_INJECTION: &str = "\\PassOptionsToClass{handout}{beamer}";

/// Base name of the generated document. Never considered as a main-file candidate.
pub const TEMP_FILE_BASENAME: &str = "beamerprevframe.tex";

/// How many leading lines are searched for a `\documentclass` declaration.
pub const PREAMBLE_SCAN_LINES: usize = 20;

/// How many leading lines of the target file are searched for directives.
pub const DIRECTIVE_WINDOW: usize = 3;

// ---------------------------------------------------------------------------
//  Regexes
// ---------------------------------------------------------------------------

static DOCUMENT_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\\begin\{document\}").unwrap());

static DOCUMENT_CLOSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\\end\{document\}").unwrap());

// `\begin{frame}` environments and the `\frame{...}` command form
static FRAME_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\\begin\{frame\}|\\frame\{)").unwrap());

static FRAME_CLOSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\\end\{frame\}").unwrap());

static SECTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\\(?:part|section|subsection|subsubsection)\*?\s*[\[{]").unwrap()
});

// `\input`, `\include`, `\includeonly` plus TeX conditionals (`\ifx`, `\else`, `\fi` ...)
static INCLUSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\\(?:input|include|includeonly|if[A-Za-z@]*|else|fi)(?:[^A-Za-z@]|$)")
        .unwrap()
});

static SURROUND_DELIMITER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*%%").unwrap());

static DOCUMENT_CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\\documentclass").unwrap());

// ---------------------------------------------------------------------------
//  Classifier
// ---------------------------------------------------------------------------

/// Structural role of a single source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    FrameOpen,
    FrameClose,
    SectionMarker,
    InclusionDirective,
    SurroundDelimiter,
    DocumentOpen,
    DocumentClose,
    Plain,
}

impl LineKind {
    /// Delimiters that end a surroundings region when scanning backward.
    pub fn bounds_surroundings_before(self) -> bool {
        matches!(
            self,
            LineKind::FrameClose
                | LineKind::InclusionDirective
                | LineKind::DocumentOpen
                | LineKind::SectionMarker
                | LineKind::SurroundDelimiter
        )
    }

    /// Delimiters that end a surroundings region when scanning forward.
    pub fn bounds_surroundings_after(self) -> bool {
        matches!(
            self,
            LineKind::FrameOpen
                | LineKind::InclusionDirective
                | LineKind::DocumentClose
                | LineKind::SectionMarker
                | LineKind::SurroundDelimiter
        )
    }
}

/// Classifies one line. Earlier rules win, so `\begin{document}` is never
/// mistaken for anything else.
pub fn classify_line(line: &str) -> LineKind {
    if DOCUMENT_OPEN_RE.is_match(line) {
        LineKind::DocumentOpen
    } else if DOCUMENT_CLOSE_RE.is_match(line) {
        LineKind::DocumentClose
    } else if FRAME_OPEN_RE.is_match(line) {
        LineKind::FrameOpen
    } else if FRAME_CLOSE_RE.is_match(line) {
        LineKind::FrameClose
    } else if SECTION_RE.is_match(line) {
        LineKind::SectionMarker
    } else if INCLUSION_RE.is_match(line) {
        LineKind::InclusionDirective
    } else if SURROUND_DELIMITER_RE.is_match(line) {
        LineKind::SurroundDelimiter
    } else {
        LineKind::Plain
    }
}

/// Classifies every line of a document, preserving order.
pub fn classify_lines<S: AsRef<str>>(lines: &[S]) -> Vec<LineKind> {
    lines.iter().map(|l| classify_line(l.as_ref())).collect()
}

/// True if the line declares the document class.
pub fn is_document_class(line: &str) -> bool {
    DOCUMENT_CLASS_RE.is_match(line)
}

/// True if a `\documentclass` line occurs within the first
/// [`PREAMBLE_SCAN_LINES`] lines.
pub fn has_preamble<S: AsRef<str>>(lines: &[S]) -> bool {
    lines
        .iter()
        .take(PREAMBLE_SCAN_LINES)
        .any(|l| is_document_class(l.as_ref()))
}
