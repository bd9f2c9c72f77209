// crates/preview_frame/src/main.rs

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use std::env;
use std::io::{self, Write};

use load_source::{DocumentStore, FsDocumentStore};
use navigate_frames::{adjacent_frame_row, Direction};
use preview_frame::config::{build_command, overlay_from_env, CliOptions};
use preview_frame::services::{ProcessCompiler, ProcessPreviewer};
use preview_frame::{build_preview, run_preview, PreviewRequest};

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter));
    builder.target(Target::Stderr);
    // A second init (e.g. in tests) is harmless.
    let _ = builder.try_init();
}

fn goto(opts: &CliOptions, direction: Direction) -> Result<()> {
    let store = FsDocumentStore;
    let doc = store.load(&opts.texfile)?;
    let kinds = frame_marker::classify_lines(&doc.lines);
    let cursor = opts.line.saturating_sub(1);
    let row = match adjacent_frame_row(&kinds, cursor, direction) {
        Some(row) => row,
        None => {
            log::info!("No {:?} frame from line {}", direction, opts.line);
            cursor
        }
    };
    println!("{}", row + 1);
    Ok(())
}

fn main() -> Result<()> {
    let matches = build_command().get_matches();
    let opts = CliOptions::from_matches(&matches)?;
    init_logging(opts.verbose);

    if let Some(direction) = opts.goto {
        return goto(&opts, direction);
    }

    let request = PreviewRequest {
        target: opts.texfile.clone(),
        line: opts.line,
        env: overlay_from_env(|key| env::var(key).ok()),
        cli: opts.overlay.clone(),
    };
    let build = build_preview(&FsDocumentStore, &request)
        .with_context(|| format!("Cannot preview {}:{}", opts.texfile.display(), opts.line))?;

    if opts.dry_run {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(&build.encoded())
            .context("Failed to write to stdout")?;
        return Ok(());
    }

    let compiler = ProcessCompiler {
        command: build.config.compiler.clone(),
        timeout: opts.timeout,
    };
    let previewer = ProcessPreviewer {
        command: build.config.previewer.clone(),
    };
    let pdf = run_preview(&build, &compiler, &previewer)?;
    log::info!("Preview ready: {}", pdf.display());
    Ok(())
}
