// crates/preview_frame/src/synctex.rs
//
// Rewrites the input records of the synctex file produced for the temporary
// document so forward/inverse search lands in the original source.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use frame_marker::TEMP_FILE_BASENAME;

/// Patches `<temp>.synctex.gz` (or the uncompressed `<temp>.synctex`) so its
/// input records point at `original`. Returns false when neither exists.
pub fn patch_synctex(temp_tex: &Path, original: &Path) -> Result<bool> {
    let original = fs::canonicalize(original).unwrap_or_else(|_| original.to_path_buf());

    let gz = temp_tex.with_extension("synctex.gz");
    if gz.is_file() {
        let mut text = String::new();
        GzDecoder::new(File::open(&gz).with_context(|| format!("Failed to open {}", gz.display()))?)
            .read_to_string(&mut text)
            .with_context(|| format!("Failed to decompress {}", gz.display()))?;

        let patched = rewrite_inputs(&text, &original);
        let mut encoder = GzEncoder::new(
            File::create(&gz).with_context(|| format!("Failed to write {}", gz.display()))?,
            Compression::default(),
        );
        encoder.write_all(patched.as_bytes())?;
        encoder.finish()?;
        log::debug!("Patched {}", gz.display());
        return Ok(true);
    }

    let plain = temp_tex.with_extension("synctex");
    if plain.is_file() {
        let text = fs::read_to_string(&plain)
            .with_context(|| format!("Failed to read {}", plain.display()))?;
        fs::write(&plain, rewrite_inputs(&text, &original))
            .with_context(|| format!("Failed to write {}", plain.display()))?;
        log::debug!("Patched {}", plain.display());
        return Ok(true);
    }

    Ok(false)
}

/// Replaces the path of every `Input:<tag>:<path>` record naming the
/// temporary file.
pub fn rewrite_inputs(text: &str, original: &Path) -> String {
    text.split_inclusive('\n')
        .map(|line| match rewrite_input_line(line, original) {
            Some(rewritten) => rewritten,
            None => line.to_string(),
        })
        .collect()
}

fn rewrite_input_line(line: &str, original: &Path) -> Option<String> {
    let rest = line.strip_prefix("Input:")?;
    let (tag, path) = rest.split_once(':')?;
    let body = path.trim_end_matches(&['\r', '\n'][..]);
    let ending = &path[body.len()..];

    let file_name = PathBuf::from(body);
    if file_name.file_name()?.to_str()? != TEMP_FILE_BASENAME {
        return None;
    }
    Some(format!("Input:{}:{}{}", tag, original.display(), ending))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SYNCTEX: &str = "\
SyncTeX Version:1
Input:1:/work/talk/beamerprevframe.tex
Input:2:/usr/share/texmf/tex/latex/beamer/beamer.cls
Output:pdf
";

    #[test]
    fn test_rewrite_only_temp_inputs() {
        let out = rewrite_inputs(SYNCTEX, Path::new("/work/talk/part.tex"));
        assert!(out.contains("Input:1:/work/talk/part.tex\n"));
        assert!(out.contains("Input:2:/usr/share/texmf/tex/latex/beamer/beamer.cls\n"));
        assert!(out.starts_with("SyncTeX Version:1\n"));
        assert!(out.ends_with("Output:pdf\n"));
    }

    #[test]
    fn test_patch_gzip_synctex() {
        let td = TempDir::new().expect("tempdir");
        let original = td.path().join("part.tex");
        fs::write(&original, "x").unwrap();
        let temp_tex = td.path().join(TEMP_FILE_BASENAME);
        let gz = td.path().join("beamerprevframe.synctex.gz");

        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        encoder
            .write_all(format!("Input:1:{}\n", temp_tex.display()).as_bytes())
            .unwrap();
        encoder.finish().unwrap();

        assert!(patch_synctex(&temp_tex, &original).unwrap());

        let mut text = String::new();
        GzDecoder::new(File::open(&gz).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        let expected = fs::canonicalize(&original).unwrap();
        assert_eq!(text, format!("Input:1:{}\n", expected.display()));
    }

    #[test]
    fn test_patch_plain_synctex() {
        let td = TempDir::new().expect("tempdir");
        let original = td.path().join("part.tex");
        fs::write(&original, "x").unwrap();
        let temp_tex = td.path().join(TEMP_FILE_BASENAME);
        let plain = td.path().join("beamerprevframe.synctex");
        fs::write(&plain, "Input:3:./beamerprevframe.tex\n").unwrap();

        assert!(patch_synctex(&temp_tex, &original).unwrap());
        let text = fs::read_to_string(&plain).unwrap();
        assert!(text.ends_with("part.tex\n"));
        assert!(!text.contains(TEMP_FILE_BASENAME));
    }

    #[test]
    fn test_no_synctex_file() {
        let td = TempDir::new().expect("tempdir");
        let temp_tex = td.path().join(TEMP_FILE_BASENAME);
        assert!(!patch_synctex(&temp_tex, Path::new("part.tex")).unwrap());
    }
}
