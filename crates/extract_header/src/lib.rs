// crates/extract_header/src/lib.rs

use extract_frame::FrameBoundary;
use frame_marker::LineKind;
use load_source::SourceDocument;

/// Returns the leading lines of `target` that sit above its first frame or
/// section marker and above the extracted range.
///
/// A file compiled through a separate main file often defines file-local
/// macros at its top; those have to travel with the extracted frames. When
/// the target is its own main file those lines already belong to the
/// preamble, so nothing is returned. Nothing is returned when `enabled` is
/// false either.
pub fn extract_header(
    target: &SourceDocument,
    kinds: &[LineKind],
    boundary: &FrameBoundary,
    main_is_target: bool,
    enabled: bool,
) -> String {
    if !enabled || main_is_target {
        return String::new();
    }
    let first_marker = kinds
        .iter()
        .position(|k| {
            matches!(
                k,
                LineKind::FrameOpen | LineKind::SectionMarker | LineKind::DocumentOpen
            )
        })
        .unwrap_or(kinds.len());
    let end = first_marker.min(boundary.begin);
    target.join_range(0, end)
}
