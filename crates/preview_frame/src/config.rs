// crates/preview_frame/src/config.rs

use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::time::Duration;

use navigate_frames::Direction;
use preview_config::ConfigOverlay;

pub const COMPILER_ENV: &str = "PREVIEW_FRAME_COMPILER";
pub const PREVIEWER_ENV: &str = "PREVIEW_FRAME_PREVIEWER";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Everything the binary takes from its command line.
#[derive(Clone, Debug)]
pub struct CliOptions {
    pub texfile: PathBuf,
    /// 1-indexed.
    pub line: usize,
    pub timeout: Duration,
    pub verbose: bool,
    pub dry_run: bool,
    pub goto: Option<Direction>,
    /// Only the settings given explicitly on the command line.
    pub overlay: ConfigOverlay,
}

pub fn build_command() -> Command {
    Command::new("preview_frame")
        .version("0.1.0")
        .about("Compiles and previews the beamer frame(s) around a source line")
        .arg(
            Arg::new("line")
                .short('l')
                .long("line")
                .required(true)
                .value_parser(clap::value_parser!(usize))
                .help("Line (1-indexed) inside the frame to preview"),
        )
        .arg(
            Arg::new("texfile")
                .short('t')
                .long("texfile")
                .required(true)
                .help("File holding the frame"),
        )
        .arg(
            Arg::new("mainfile")
                .short('m')
                .long("mainfile")
                .help("File whose preamble is used"),
        )
        .arg(
            Arg::new("nbefore")
                .short('a')
                .long("nbefore")
                .value_parser(clap::value_parser!(usize))
                .help("Number of frames to include before the current one"),
        )
        .arg(
            Arg::new("nafter")
                .short('d')
                .long("nafter")
                .value_parser(clap::value_parser!(usize))
                .help("Number of frames to include after the current one"),
        )
        .arg(
            Arg::new("include_surroundings")
                .short('s')
                .long("include-surroundings")
                .action(ArgAction::SetTrue)
                .help("Extend the range to the nearest %% or section delimiters"),
        )
        .arg(
            Arg::new("no_header")
                .long("no-header")
                .action(ArgAction::SetTrue)
                .help("Do not copy the lines above the first frame"),
        )
        .arg(
            Arg::new("previewer")
                .short('p')
                .long("previewer")
                .help("PDF viewer command"),
        )
        .arg(
            Arg::new("compiler")
                .short('c')
                .long("compiler")
                .help("LaTeX compiler command"),
        )
        .arg(
            Arg::new("nopreview")
                .short('n')
                .long("nopreview")
                .action(ArgAction::SetTrue)
                .help("Compile only, do not open a viewer"),
        )
        .arg(
            Arg::new("synctex")
                .long("synctex")
                .action(ArgAction::SetTrue)
                .help("Keep line numbers aligned and patch synctex data"),
        )
        .arg(
            Arg::new("pre_preamble")
                .long("pre-preamble")
                .help("Text inserted before the preamble"),
        )
        .arg(
            Arg::new("handout")
                .long("handout")
                .action(ArgAction::SetTrue)
                .help("Compile with the beamer handout option"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_parser(clap::value_parser!(u64))
                .default_value("120")
                .help("Seconds before the compiler is killed"),
        )
        .arg(
            Arg::new("goto")
                .long("goto")
                .value_parser(["next", "previous", "n", "prev", "p"])
                .help("Print the line of the next/previous frame and exit"),
        )
        .arg(
            Arg::new("dry_run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Print the generated document instead of compiling it"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable verbose logging"),
        )
}

impl CliOptions {
    pub fn from_matches(matches: &ArgMatches) -> Result<CliOptions> {
        let texfile = matches
            .get_one::<String>("texfile")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("--texfile is required"))?;
        let line = *matches
            .get_one::<usize>("line")
            .ok_or_else(|| anyhow!("--line is required"))?;
        let timeout = matches
            .get_one::<u64>("timeout")
            .copied()
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let goto = match matches.get_one::<String>("goto") {
            Some(dir) => Some(dir.parse::<Direction>().map_err(|e| anyhow!(e))?),
            None => None,
        };

        Ok(CliOptions {
            texfile,
            line,
            timeout: Duration::from_secs(timeout),
            verbose: matches.get_flag("verbose"),
            dry_run: matches.get_flag("dry_run"),
            goto,
            overlay: overlay_from_matches(matches),
        })
    }
}

/// Flags only count when passed; an absent flag leaves the lower layers alone.
fn overlay_from_matches(matches: &ArgMatches) -> ConfigOverlay {
    let flag = |id: &str| matches.get_flag(id).then_some(true);
    let text = |id: &str| matches.get_one::<String>(id).cloned();

    ConfigOverlay {
        mainfile: matches.get_one::<String>("mainfile").map(PathBuf::from),
        frames_before: matches.get_one::<usize>("nbefore").copied(),
        frames_after: matches.get_one::<usize>("nafter").copied(),
        include_surroundings: flag("include_surroundings"),
        extract_header: matches.get_flag("no_header").then_some(false),
        previewer: text("previewer"),
        compiler: text("compiler"),
        disable_preview: flag("nopreview"),
        handout: flag("handout"),
        pre_preamble: text("pre_preamble"),
        sync_hack: flag("synctex"),
    }
}

/// Command defaults from the environment. Empty values are ignored.
pub fn overlay_from_env<F>(get: F) -> ConfigOverlay
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());
    ConfigOverlay {
        compiler: non_empty(COMPILER_ENV),
        previewer: non_empty(PREVIEWER_ENV),
        ..Default::default()
    }
}
