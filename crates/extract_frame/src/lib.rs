// crates/extract_frame/src/lib.rs

//! Frame boundary resolution.
//!
//! Given a target line inside a slide source, computes the inclusive range
//! of lines holding the enclosing frame, `frames_before` frames above it,
//! `frames_after` frames below it and, optionally, the "surroundings": the
//! shared definitions sitting between frames.
//!
//! Resolution is a pure function of the classified lines and the settings;
//! directives must already have been folded into the settings.

use frame_marker::LineKind;
use load_source::SourceDocument;
use preview_error::{PreviewError, Result};

/// Settings that drive boundary resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameSelection {
    pub frames_before: usize,
    pub frames_after: usize,
    pub include_surroundings: bool,
}

/// Inclusive, 0-indexed line range to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBoundary {
    pub begin: usize,
    pub end: usize,
}

impl FrameBoundary {
    /// The lines of the range, concatenated without any reformatting.
    pub fn text(&self, doc: &SourceDocument) -> String {
        doc.join_range(self.begin, self.end + 1)
    }

    pub fn line_count(&self) -> usize {
        self.end - self.begin + 1
    }
}

/// Resolves the boundary for `target_line` (0-indexed) in `doc`.
pub fn resolve_frame_boundary(
    doc: &SourceDocument,
    kinds: &[LineKind],
    target_line: usize,
    selection: FrameSelection,
) -> Result<FrameBoundary> {
    if target_line >= kinds.len() {
        return Err(PreviewError::TargetOutOfRange {
            path: doc.path.clone(),
            line: target_line + 1,
            len: kinds.len(),
        });
    }

    let begin = scan_backward(kinds, target_line, selection.frames_before + 1).ok_or_else(|| {
        PreviewError::FrameNotFound {
            path: doc.path.clone(),
            line: target_line + 1,
        }
    })?;
    let begin = if selection.include_surroundings {
        surroundings_before(kinds, begin)
    } else {
        begin
    };

    let end = scan_forward(kinds, target_line, selection.frames_after + 1);
    let end = if selection.include_surroundings {
        surroundings_after(kinds, end)
    } else {
        end
    };

    log::debug!(
        "Resolved {}:{} to lines {}-{}",
        doc.path.display(),
        target_line + 1,
        begin + 1,
        end + 1
    );
    Ok(FrameBoundary { begin, end })
}

/// Walks up from `target` counting frame-open markers. Every new count up
/// to `wanted` moves the candidate start; the walk never crosses the
/// document-open marker. Returns the last candidate, if any.
fn scan_backward(kinds: &[LineKind], target: usize, wanted: usize) -> Option<usize> {
    let mut count = 0;
    let mut candidate = None;
    for idx in (0..=target).rev() {
        match kinds[idx] {
            LineKind::FrameOpen => {
                count += 1;
                candidate = Some(idx);
                if count == wanted {
                    break;
                }
            }
            LineKind::DocumentOpen => break,
            _ => {}
        }
    }
    candidate
}

/// Extends a start boundary upward over shared definitions. Stops right
/// after the nearest delimiter; another frame-open first keeps `open`.
fn surroundings_before(kinds: &[LineKind], open: usize) -> usize {
    for idx in (0..open).rev() {
        let kind = kinds[idx];
        if kind.bounds_surroundings_before() {
            return idx + 1;
        }
        if kind == LineKind::FrameOpen {
            return open;
        }
    }
    0
}

/// Walks down from `target` counting finished frames, up to `wanted`,
/// never crossing the document-close marker.
///
/// A frame is finished by its close marker or, when still open, by the
/// next frame-open marker (the `\frame{...}` form has no close marker).
/// The lines between a close and the next open do not count as a frame,
/// except when the target itself sits there. When the document runs out
/// inside a frame, that frame reaches the line before the document close
/// (or the last line).
fn scan_forward(kinds: &[LineKind], target: usize, wanted: usize) -> usize {
    let mut count = 0;
    let mut in_frame = true;
    let mut last_close = None;
    let mut stop = kinds.len();

    for (idx, kind) in kinds.iter().enumerate().skip(target) {
        match kind {
            LineKind::FrameOpen if idx > target => {
                if in_frame {
                    count += 1;
                    if count == wanted {
                        return idx - 1;
                    }
                }
                in_frame = true;
            }
            LineKind::FrameClose if in_frame => {
                count += 1;
                if count == wanted {
                    return idx;
                }
                last_close = Some(idx);
                in_frame = false;
            }
            LineKind::DocumentClose => {
                stop = idx;
                break;
            }
            _ => {}
        }
    }

    let end = match last_close {
        Some(close) if !in_frame => close,
        _ => stop.saturating_sub(1),
    };
    end.max(target)
}

/// Extends an end boundary downward over shared definitions. Stops right
/// before the nearest delimiter; another frame-close first keeps `close`.
fn surroundings_after(kinds: &[LineKind], close: usize) -> usize {
    for idx in close + 1..kinds.len() {
        let kind = kinds[idx];
        if kind.bounds_surroundings_after() {
            return idx - 1;
        }
        if kind == LineKind::FrameClose {
            return close;
        }
    }
    kinds.len() - 1
}

/// Classifies `doc` and resolves the boundary in one call.
pub fn extract_frame(
    doc: &SourceDocument,
    target_line: usize,
    selection: FrameSelection,
) -> Result<(FrameBoundary, String)> {
    let kinds = frame_marker::classify_lines(&doc.lines);
    let boundary = resolve_frame_boundary(doc, &kinds, target_line, selection)?;
    let text = boundary.text(doc);
    Ok((boundary, text))
}
