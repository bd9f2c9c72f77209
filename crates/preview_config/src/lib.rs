// crates/preview_config/src/lib.rs

//! Runtime configuration of a single preview run.
//!
//! Values are layered: built-in defaults, then directive overlays found in
//! the document, then explicit command-line flags. Each layer is a
//! [`ConfigOverlay`] where `None` means "not specified here". Once merged
//! the resulting [`Configuration`] is treated as an immutable snapshot.

use std::path::PathBuf;

pub const DEFAULT_COMPILER: &str = "pdflatex -interaction=nonstopmode";
pub const DEFAULT_PREVIEWER: &str = "evince";

/// Fully resolved settings for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Configuration {
    pub mainfile: Option<PathBuf>,
    pub frames_before: usize,
    pub frames_after: usize,
    pub include_surroundings: bool,
    pub extract_header: bool,
    pub previewer: String,
    pub compiler: String,
    pub disable_preview: bool,
    pub handout: bool,
    pub pre_preamble: String,
    pub sync_hack: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            mainfile: None,
            frames_before: 0,
            frames_after: 0,
            include_surroundings: false,
            extract_header: true,
            previewer: DEFAULT_PREVIEWER.to_string(),
            compiler: DEFAULT_COMPILER.to_string(),
            disable_preview: false,
            handout: false,
            pre_preamble: String::new(),
            sync_hack: false,
        }
    }
}

/// A partial set of overrides. Produced by directives and by the CLI.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigOverlay {
    pub mainfile: Option<PathBuf>,
    pub frames_before: Option<usize>,
    pub frames_after: Option<usize>,
    pub include_surroundings: Option<bool>,
    pub extract_header: Option<bool>,
    pub previewer: Option<String>,
    pub compiler: Option<String>,
    pub disable_preview: Option<bool>,
    pub handout: Option<bool>,
    pub pre_preamble: Option<String>,
    pub sync_hack: Option<bool>,
}

impl ConfigOverlay {
    /// True if the overlay sets nothing.
    pub fn is_empty(&self) -> bool {
        *self == ConfigOverlay::default()
    }

    /// Returns `self` with every unset field filled from `lower`.
    pub fn or(self, lower: ConfigOverlay) -> ConfigOverlay {
        ConfigOverlay {
            mainfile: self.mainfile.or(lower.mainfile),
            frames_before: self.frames_before.or(lower.frames_before),
            frames_after: self.frames_after.or(lower.frames_after),
            include_surroundings: self.include_surroundings.or(lower.include_surroundings),
            extract_header: self.extract_header.or(lower.extract_header),
            previewer: self.previewer.or(lower.previewer),
            compiler: self.compiler.or(lower.compiler),
            disable_preview: self.disable_preview.or(lower.disable_preview),
            handout: self.handout.or(lower.handout),
            pre_preamble: self.pre_preamble.or(lower.pre_preamble),
            sync_hack: self.sync_hack.or(lower.sync_hack),
        }
    }
}

impl Configuration {
    /// Applies an overlay on top of the current values.
    pub fn apply(mut self, overlay: &ConfigOverlay) -> Configuration {
        if let Some(ref path) = overlay.mainfile {
            self.mainfile = Some(path.clone());
        }
        if let Some(n) = overlay.frames_before {
            self.frames_before = n;
        }
        if let Some(n) = overlay.frames_after {
            self.frames_after = n;
        }
        if let Some(flag) = overlay.include_surroundings {
            self.include_surroundings = flag;
        }
        if let Some(flag) = overlay.extract_header {
            self.extract_header = flag;
        }
        if let Some(ref cmd) = overlay.previewer {
            self.previewer = cmd.clone();
        }
        if let Some(ref cmd) = overlay.compiler {
            self.compiler = cmd.clone();
        }
        if let Some(flag) = overlay.disable_preview {
            self.disable_preview = flag;
        }
        if let Some(flag) = overlay.handout {
            self.handout = flag;
        }
        if let Some(ref text) = overlay.pre_preamble {
            self.pre_preamble = text.clone();
        }
        if let Some(flag) = overlay.sync_hack {
            self.sync_hack = flag;
        }
        self
    }

    /// Merges layers lowest-precedence first.
    pub fn layered<'a, I>(layers: I) -> Configuration
    where
        I: IntoIterator<Item = &'a ConfigOverlay>,
    {
        layers
            .into_iter()
            .fold(Configuration::default(), |config, overlay| config.apply(overlay))
    }
}
