// crates/assemble_document/src/lib.rs

use frame_marker::{DOCUMENT_CLOSE, DOCUMENT_OPEN, HANDOUT_INJECTION};

/// Added to the padding estimate so the frame lands on the 1-indexed line
/// the compiler reports for the original source.
pub const LINE_SYNC_OFFSET: i64 = 1;

/// Everything that goes into the standalone document.
#[derive(Debug, Clone, Default)]
pub struct DocumentParts<'a> {
    /// Raw text placed before anything else (e.g. `\def\draft{1}`).
    pub pre_preamble: &'a str,
    /// Inject the beamer `handout` class option.
    pub handout: bool,
    pub preamble: &'a str,
    /// File-local definitions of a target compiled through another main file.
    pub header: &'a str,
    pub frame_text: &'a str,
    /// First and last extracted line (0-indexed) in the original source.
    pub begin_line: usize,
    pub end_line: usize,
    /// Pad with blank lines so line numbers roughly match the original.
    pub preserve_line_numbers: bool,
}

/// The generated document and where the extracted frames start inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyResult {
    pub text: String,
    /// 0-indexed line of `text` holding the first extracted line.
    pub frame_offset: usize,
}

/// Concatenates the parts into a compilable document.
pub fn assemble_document(parts: &DocumentParts) -> AssemblyResult {
    let mut out = String::new();

    push_block(&mut out, parts.pre_preamble);
    if parts.handout {
        push_block(&mut out, HANDOUT_INJECTION);
    }
    push_block(&mut out, parts.preamble);
    push_block(&mut out, DOCUMENT_OPEN);
    push_block(&mut out, parts.header);

    if parts.preserve_line_numbers {
        let padding = padding_lines(parts.begin_line, parts.end_line, line_count(&out));
        log::debug!("Padding generated document with {} blank lines", padding);
        out.push_str(&"\n".repeat(padding));
    }

    let frame_offset = line_count(&out);
    push_block(&mut out, parts.frame_text);
    push_block(&mut out, DOCUMENT_CLOSE);

    AssemblyResult {
        text: out,
        frame_offset,
    }
}

/// Number of blank lines to insert before the frame text, never negative.
pub fn padding_lines(begin_line: usize, end_line: usize, buffer_lines: usize) -> usize {
    let estimate =
        2 * begin_line as i64 - end_line as i64 - buffer_lines as i64 + LINE_SYNC_OFFSET;
    estimate.max(0) as usize
}

fn push_block(out: &mut String, block: &str) {
    if block.is_empty() {
        return;
    }
    out.push_str(block);
    if !block.ends_with('\n') {
        out.push('\n');
    }
}

fn line_count(text: &str) -> usize {
    text.matches('\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts<'a>() -> DocumentParts<'a> {
        DocumentParts {
            preamble: "\\documentclass{beamer}\n",
            frame_text: "\\begin{frame}\nx\n\\end{frame}\n",
            begin_line: 3,
            end_line: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_document() {
        let result = assemble_document(&parts());
        assert_eq!(
            result.text,
            "\\documentclass{beamer}\n\\begin{document}\n\\begin{frame}\nx\n\\end{frame}\n\\end{document}\n"
        );
        assert_eq!(result.frame_offset, 2);
    }

    #[test]
    fn test_block_order_with_every_part() {
        let p = DocumentParts {
            pre_preamble: "\\def\\draft{1}",
            handout: true,
            header: "\\newcommand{\\l}{L}\n",
            ..parts()
        };
        let result = assemble_document(&p);
        let lines: Vec<&str> = result.text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "\\def\\draft{1}",
                "\\PassOptionsToClass{handout}{beamer}",
                "\\documentclass{beamer}",
                "\\begin{document}",
                "\\newcommand{\\l}{L}",
                "\\begin{frame}",
                "x",
                "\\end{frame}",
                "\\end{document}",
            ]
        );
        assert_eq!(result.frame_offset, 5);
    }

    #[test]
    fn test_unterminated_frame_text_gets_newline() {
        let p = DocumentParts {
            frame_text: "\\begin{frame}\n\\end{frame}",
            ..parts()
        };
        assert!(assemble_document(&p).text.ends_with("\\end{frame}\n\\end{document}\n"));
    }

    #[test]
    fn test_padding_formula() {
        // 2*40 - 45 - 2 + 1
        assert_eq!(padding_lines(40, 45, 2), 34);
        // Never negative.
        assert_eq!(padding_lines(3, 5, 2), 0);
        assert_eq!(padding_lines(0, 0, 10), 0);
    }

    #[test]
    fn test_padding_only_when_preserving_line_numbers() {
        let p = DocumentParts {
            begin_line: 40,
            end_line: 45,
            ..parts()
        };
        assert_eq!(assemble_document(&p).frame_offset, 2);

        let p = DocumentParts {
            preserve_line_numbers: true,
            ..p
        };
        let result = assemble_document(&p);
        assert_eq!(result.frame_offset, 2 + 34);
        assert!(result.text.contains("\\begin{document}\n\n\n"));
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let p = DocumentParts {
            handout: true,
            preserve_line_numbers: true,
            begin_line: 20,
            end_line: 22,
            ..parts()
        };
        assert_eq!(assemble_document(&p), assemble_document(&p));
    }
}
