// crates/preview_frame/tests/cli.rs

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

const MAIN: &str = "\
\\documentclass{beamer}
\\usetheme{metropolis}
\\begin{document}
\\input{part}
\\end{document}
";

// Frames open on lines 3, 5 and 7.
const PART: &str = "\
%!preview[nbefore=2]
\\newcommand{\\local}{L}
\\begin{frame}{A}
\\end{frame}
\\begin{frame}{B}
\\end{frame}
\\begin{frame}{C}
\\end{frame}

%
";

fn talk() -> TempDir {
    let dir = TempDir::new().unwrap();
    dir.child("main.tex").write_str(MAIN).unwrap();
    dir.child("part.tex").write_str(PART).unwrap();
    dir
}

/// On Unix systems, creates a dummy executable (a shell script) in the given temporary directory.
#[cfg(unix)]
fn create_dummy_executable(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.path().join(name);
    fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

fn preview_frame(dir: &TempDir, line: usize) -> Command {
    let mut cmd = Command::cargo_bin("preview_frame").unwrap();
    cmd.env_remove("PREVIEW_FRAME_COMPILER")
        .env_remove("PREVIEW_FRAME_PREVIEWER")
        .env_remove("RUST_LOG")
        .arg("--texfile")
        .arg(dir.child("part.tex").path())
        .arg("--line")
        .arg(line.to_string());
    cmd
}

fn wait_for(path: &Path) -> bool {
    let started = Instant::now();
    while started.elapsed() < Duration::from_secs(5) {
        if path.exists() {
            return true;
        }
        thread::sleep(Duration::from_millis(50));
    }
    false
}

#[test]
fn test_dry_run_prints_document_with_sibling_preamble() {
    let dir = talk();
    preview_frame(&dir, 5)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "\\documentclass{beamer}\n\\usetheme{metropolis}\n\\begin{document}\n",
        ))
        .stdout(predicate::str::contains("\\newcommand{\\local}{L}\n"))
        .stdout(predicate::str::ends_with("\\end{document}\n"))
        .stdout(predicate::str::contains("\\input{part}").not());

    // Dry runs never touch the file system.
    assert!(!dir.child("beamerprevframe.tex").path().exists());
}

#[test]
fn test_head_directive_reaches_back_two_frames() {
    let dir = talk();
    preview_frame(&dir, 5)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("\\begin{frame}{A}\n\\end{frame}\n\\begin{frame}{B}\n\\end{frame}\n"))
        .stdout(predicate::str::contains("{C}").not());
}

#[test]
fn test_cli_flag_beats_directive() {
    let dir = talk();
    preview_frame(&dir, 5)
        .args(["--dry-run", "--nbefore", "0", "--nafter", "1", "--no-header"])
        .assert()
        .success()
        .stdout(predicate::str::contains("{A}").not())
        .stdout(predicate::str::contains("\\begin{frame}{C}"))
        .stdout(predicate::str::contains("\\local").not());
}

#[test]
fn test_handout_and_pre_preamble_lead_the_document() {
    let dir = talk();
    preview_frame(&dir, 7)
        .args(["--dry-run", "--handout", "--pre-preamble", "\\def\\draft{1}"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "\\def\\draft{1}\n\\PassOptionsToClass{handout}{beamer}\n\\documentclass{beamer}\n",
        ));
}

#[test]
fn test_missing_preamble_fails_without_output() {
    let dir = TempDir::new().unwrap();
    dir.child("part.tex").write_str(PART).unwrap();
    dir.child("notes.tex").write_str("no class here\n").unwrap();

    preview_frame(&dir, 5)
        .arg("--nopreview")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No preamble found"));
    assert!(!dir.child("beamerprevframe.tex").path().exists());
}

#[test]
fn test_line_outside_document_fails() {
    let dir = talk();
    preview_frame(&dir, 99)
        .arg("--dry-run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside"));
}

#[test]
fn test_malformed_directive_is_reported() {
    let dir = talk();
    dir.child("part.tex")
        .write_str("%!preview[nbefore=many]\n\\begin{frame}\n\\end{frame}\n")
        .unwrap();
    preview_frame(&dir, 2)
        .arg("--dry-run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed directive"))
        .stderr(predicate::str::contains("line 1"));
}

#[test]
fn test_latin1_source_is_previewed_byte_for_byte() {
    let dir = talk();
    let frame: &[u8] = b"\\begin{frame}{Introdu\xe7\xe3o}\nol\xe1 mundo\n\\end{frame}\n";
    let mut source = b"\\newcommand{\\local}{L}\n".to_vec();
    source.extend_from_slice(frame);
    dir.child("latin1.tex").write_binary(&source).unwrap();

    let output = Command::cargo_bin("preview_frame")
        .unwrap()
        .env_remove("RUST_LOG")
        .arg("--texfile")
        .arg(dir.child("latin1.tex").path())
        .args(["--line", "3", "--dry-run"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.windows(frame.len()).any(|w| w == frame));
    assert!(output.stdout.ends_with(b"\\end{document}\n"));
}

#[test]
#[cfg(unix)]
fn test_compiles_temp_file_next_to_main() {
    let dir = talk();
    let compiler = create_dummy_executable(&dir, "fakelatex", "cp \"$1\" compiled.tex\n");

    preview_frame(&dir, 7)
        .arg("--compiler")
        .arg(&compiler)
        .arg("--nopreview")
        .assert()
        .success();

    let written = fs::read_to_string(dir.child("beamerprevframe.tex").path()).unwrap();
    let compiled = fs::read_to_string(dir.child("compiled.tex").path()).unwrap();
    assert_eq!(written, compiled);
    assert!(written.contains("\\begin{frame}{C}"));
}

#[test]
#[cfg(unix)]
fn test_compiler_from_environment() {
    let dir = talk();
    let compiler = create_dummy_executable(&dir, "envlatex", "touch env-ran\n");

    preview_frame(&dir, 7)
        .env("PREVIEW_FRAME_COMPILER", &compiler)
        .arg("--nopreview")
        .assert()
        .success();
    assert!(dir.child("env-ran").path().exists());
}

#[test]
#[cfg(unix)]
fn test_failing_compiler_is_fatal() {
    let dir = talk();
    let compiler = create_dummy_executable(&dir, "brokenlatex", "exit 1\n");

    preview_frame(&dir, 7)
        .arg("--compiler")
        .arg(&compiler)
        .arg("--nopreview")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to compile"));
}

#[test]
#[cfg(unix)]
fn test_previewer_receives_pdf() {
    let dir = talk();
    let compiler = create_dummy_executable(&dir, "fakelatex", "exit 0\n");
    let viewed = dir.child("viewed.txt");
    let previewer = create_dummy_executable(
        &dir,
        "fakeviewer",
        &format!("echo \"$1\" > \"{}\"\n", viewed.path().display()),
    );

    preview_frame(&dir, 7)
        .arg("--compiler")
        .arg(&compiler)
        .arg("--previewer")
        .arg(&previewer)
        .assert()
        .success();

    assert!(wait_for(viewed.path()));
    // The viewer may still be writing; wait for the newline.
    let started = Instant::now();
    let mut text = String::new();
    while started.elapsed() < Duration::from_secs(5) {
        text = fs::read_to_string(viewed.path()).unwrap_or_default();
        if text.ends_with('\n') {
            break;
        }
        thread::sleep(Duration::from_millis(50));
    }
    assert!(text.trim_end().ends_with("beamerprevframe.pdf"));
}

#[test]
#[cfg(unix)]
fn test_synctex_points_back_at_source() {
    let dir = talk();
    let compiler = create_dummy_executable(
        &dir,
        "synclatex",
        "printf 'SyncTeX Version:1\\nInput:1:./beamerprevframe.tex\\n' > beamerprevframe.synctex\n",
    );

    preview_frame(&dir, 7)
        .arg("--compiler")
        .arg(&compiler)
        .args(["--nopreview", "--synctex"])
        .assert()
        .success();

    let synctex = fs::read_to_string(dir.child("beamerprevframe.synctex").path()).unwrap();
    assert!(synctex.contains("part.tex\n"));
    assert!(!synctex.contains("beamerprevframe.tex"));
}

#[test]
fn test_goto_next_and_previous() {
    let dir = talk();
    preview_frame(&dir, 4)
        .args(["--goto", "next"])
        .assert()
        .success()
        .stdout("6\n");
    preview_frame(&dir, 6)
        .args(["--goto", "previous"])
        .assert()
        .success()
        .stdout("4\n");
}
