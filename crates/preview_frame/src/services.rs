// crates/preview_frame/src/services.rs
//
// Side-effecting collaborators: the document compiler and the PDF viewer.
// Both are traits so the pipeline can be exercised without a TeX install.

use anyhow::{anyhow, bail, Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

use preview_error::PreviewError;

/// Splits a command string on whitespace into program and arguments.
pub fn split_command(command: &str) -> preview_error::Result<(String, Vec<String>)> {
    let mut parts = command.split_whitespace().map(str::to_string);
    let program = parts
        .next()
        .ok_or_else(|| PreviewError::InvalidCommand(format!("empty command '{}'", command)))?;
    Ok((program, parts.collect()))
}

/// Compiles a generated document.
pub trait Compiler {
    fn compile(&self, tex_file: &Path) -> Result<()>;
}

/// Opens a produced PDF.
pub trait Previewer {
    fn open(&self, pdf_file: &Path) -> Result<()>;
}

/// Runs a compiler command in the document's directory, killing it once
/// `timeout` has elapsed.
pub struct ProcessCompiler {
    pub command: String,
    pub timeout: Duration,
}

impl Compiler for ProcessCompiler {
    fn compile(&self, tex_file: &Path) -> Result<()> {
        let (program, args) = split_command(&self.command)?;
        let file_name = tex_file
            .file_name()
            .ok_or_else(|| anyhow!("Not a file: {}", tex_file.display()))?;
        let dir = match tex_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        log::info!("Running {} {:?} {:?} in {}", program, args, file_name, dir.display());
        let mut child = Command::new(&program)
            .args(&args)
            .arg(file_name)
            .current_dir(dir)
            .stdin(Stdio::null())
            .spawn()
            .with_context(|| format!("Error running {}", program))?;

        let Some(status) = child
            .wait_timeout(self.timeout)
            .with_context(|| format!("Failed to wait on {}", program))?
        else {
            let _ = child.kill();
            let _ = child.wait();
            bail!("{} timed out after {}s", program, self.timeout.as_secs());
        };
        if !status.success() {
            bail!("{} exited with status {}", program, status);
        }
        Ok(())
    }
}

/// Launches a viewer and returns without waiting for it.
pub struct ProcessPreviewer {
    pub command: String,
}

impl Previewer for ProcessPreviewer {
    fn open(&self, pdf_file: &Path) -> Result<()> {
        let (program, args) = split_command(&self.command)?;
        log::info!("Launching {} {:?} {}", program, args, pdf_file.display());
        Command::new(&program)
            .args(&args)
            .arg(pdf_file)
            .stdin(Stdio::null())
            .spawn()
            .with_context(|| format!("Error running {}", program))?;
        Ok(())
    }
}
