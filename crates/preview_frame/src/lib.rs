// crates/preview_frame/src/lib.rs

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use assemble_document::{assemble_document, AssemblyResult, DocumentParts};
use extract_frame::{resolve_frame_boundary, FrameBoundary, FrameSelection};
use extract_header::extract_header;
use find_main_file::{resolve_main_file, temp_file_for};
use load_source::{DocumentStore, SourceEncoding};
use parse_directive::discover_directives;
use preview_config::{ConfigOverlay, Configuration};
use preview_error::PreviewError;

pub mod config;
pub mod services;
pub mod synctex;

use services::{Compiler, Previewer};

/// What the caller asked for.
#[derive(Debug, Clone, Default)]
pub struct PreviewRequest {
    /// File holding the frame to preview.
    pub target: PathBuf,
    /// 1-indexed line inside the frame.
    pub line: usize,
    /// Overrides taken from the environment (lowest precedence after defaults).
    pub env: ConfigOverlay,
    /// Overrides given explicitly on the command line (highest precedence).
    pub cli: ConfigOverlay,
}

/// The fully resolved preview, ready to be written and compiled.
#[derive(Debug, Clone)]
pub struct PreviewBuild {
    pub config: Configuration,
    pub target: PathBuf,
    pub main_file: PathBuf,
    pub temp_file: PathBuf,
    pub boundary: FrameBoundary,
    pub assembly: AssemblyResult,
    /// Latin-1 when either source file was read as Latin-1.
    pub encoding: SourceEncoding,
}

impl PreviewBuild {
    /// The generated document as the bytes to write.
    pub fn encoded(&self) -> Vec<u8> {
        self.encoding.encode(&self.assembly.text)
    }

    /// PDF produced by compiling the temporary file.
    pub fn pdf_file(&self) -> PathBuf {
        self.temp_file.with_extension("pdf")
    }
}

/// Runs directive discovery, main-file lookup, boundary resolution, header
/// extraction and assembly. Touches nothing but `store`.
pub fn build_preview(
    store: &dyn DocumentStore,
    request: &PreviewRequest,
) -> preview_error::Result<PreviewBuild> {
    let target = store.load(&request.target)?;
    if request.line == 0 || request.line > target.len() {
        return Err(PreviewError::TargetOutOfRange {
            path: target.path.clone(),
            line: request.line,
            len: target.len(),
        });
    }
    let target_line = request.line - 1;
    let kinds = frame_marker::classify_lines(&target.lines);

    // Directives are settled before anything depends on the configuration.
    let discovered = discover_directives(&target, &kinds, target_line)?;
    let directive_overlay = discovered.overlay();
    let config = Configuration::layered([&request.env, &directive_overlay, &request.cli]);
    log::debug!("Effective configuration: {:?}", config);

    let main = resolve_main_file(store, &target, config.mainfile.as_deref())?;
    let main_is_target = main.is_same_as(&target.path);

    let selection = FrameSelection {
        frames_before: config.frames_before,
        frames_after: config.frames_after,
        include_surroundings: config.include_surroundings,
    };
    let boundary = resolve_frame_boundary(&target, &kinds, target_line, selection)?;
    let header = extract_header(&target, &kinds, &boundary, main_is_target, config.extract_header);
    let frame_text = boundary.text(&target);

    let assembly = assemble_document(&DocumentParts {
        pre_preamble: &config.pre_preamble,
        handout: config.handout,
        preamble: &main.preamble,
        header: &header,
        frame_text: &frame_text,
        begin_line: boundary.begin,
        end_line: boundary.end,
        preserve_line_numbers: config.sync_hack,
    });

    let encoding = if target.encoding == SourceEncoding::Latin1
        || main.document.encoding == SourceEncoding::Latin1
    {
        SourceEncoding::Latin1
    } else {
        SourceEncoding::Utf8
    };

    Ok(PreviewBuild {
        encoding,
        temp_file: temp_file_for(main.path()),
        main_file: main.path().to_path_buf(),
        target: target.path,
        config,
        boundary,
        assembly,
    })
}

/// Writes the generated document next to the main file.
pub fn write_preview(build: &PreviewBuild) -> Result<&Path> {
    fs::write(&build.temp_file, build.encoded())
        .with_context(|| format!("Failed to write {}", build.temp_file.display()))?;
    log::info!(
        "Wrote {} (lines {}-{} of {})",
        build.temp_file.display(),
        build.boundary.begin + 1,
        build.boundary.end + 1,
        build.target.display()
    );
    Ok(build.temp_file.as_path())
}

/// Writes, compiles and (unless disabled) opens the preview.
pub fn run_preview(
    build: &PreviewBuild,
    compiler: &dyn Compiler,
    previewer: &dyn Previewer,
) -> Result<PathBuf> {
    let temp_file = write_preview(build)?;
    compiler
        .compile(temp_file)
        .with_context(|| format!("Failed to compile {}", temp_file.display()))?;

    if build.config.sync_hack {
        let patched = synctex::patch_synctex(temp_file, &build.target)
            .context("Failed to patch synctex data")?;
        if !patched {
            log::warn!("--synctex given but no synctex file was produced");
        }
    }

    let pdf = build.pdf_file();
    if build.config.disable_preview {
        log::info!("Preview disabled; {} generated", pdf.display());
    } else {
        previewer
            .open(&pdf)
            .with_context(|| format!("Failed to open {}", pdf.display()))?;
    }
    Ok(pdf)
}
