// ── Launching companion tools ─────────────────────────────────────────────────
//
// Turns a resolved tool (or its absence) into a fire-and-forget launch.  An
// absent tool means the OS default handler opens the file instead.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use crate::{
    platform,
    process::{split_command_line, Launcher, ProcessResult, ProcessSpec, WaitPolicy},
};

use super::ToolLookup;

/// Placeholder in the terminal command template replaced by the directory.
pub const DIR_PLACEHOLDER: &str = "$(DIR)";

/// Open `file` in `tool`, or with the OS default handler when the tool was
/// not found.
pub fn open_with<L: Launcher + ?Sized>(launcher: &L, tool: &ToolLookup, file: &Path) -> ProcessResult {
    let spec = match tool {
        ToolLookup::Found(exe) => tool_spec(exe, [file.as_os_str()]),
        ToolLookup::NotFound => handler_spec(file.as_os_str()),
    };
    launcher.launch(spec.wait(WaitPolicy::NoWait))
}

/// Compare two files in the diff tool.  There is no OS default for diffing,
/// so `NotFound` is reported as a launch failure.
pub fn diff_files<L: Launcher + ?Sized>(
    launcher: &L,
    tool: &ToolLookup,
    left: &Path,
    right: &Path,
) -> ProcessResult {
    let ToolLookup::Found(exe) = tool else {
        tracing::warn!("no diff tool configured or installed");
        return ProcessResult::launch_failed();
    };
    let spec = tool_spec(exe, [left.as_os_str(), right.as_os_str()]);
    launcher.launch(spec.wait(WaitPolicy::NoWait))
}

/// Open a terminal in `dir` using a command template such as
/// `wt.exe -d "$(DIR)"`.  The first word is the program.
pub fn open_terminal<L: Launcher + ?Sized>(launcher: &L, template: &str, dir: &Path) -> ProcessResult {
    let dir_text = dir.to_string_lossy();
    let mut words = split_command_line(template).into_iter().map(|word| {
        word.to_string_lossy()
            .replace(DIR_PLACEHOLDER, &dir_text)
    });
    let Some(program) = words.next() else {
        tracing::warn!("terminal command template is empty");
        return ProcessResult::launch_failed();
    };
    let spec = ProcessSpec::new(program)
        .args(words)
        .working_dir(dir)
        .wait(WaitPolicy::NoWait);
    launcher.launch(spec)
}

/// Open `url` in the configured browser, or the OS default browser.
pub fn open_url<L: Launcher + ?Sized>(launcher: &L, browser: Option<&Path>, url: &str) -> ProcessResult {
    let spec = match browser {
        Some(exe) => ProcessSpec::new(exe).arg(url),
        None => handler_spec(OsStr::new(url)),
    };
    launcher.launch(spec.wait(WaitPolicy::NoWait))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn tool_spec<'a>(exe: &Path, targets: impl IntoIterator<Item = &'a OsStr>) -> ProcessSpec {
    let mut targets = targets.into_iter();
    // Application bundles are directories; `open -a` launches them.
    if exe.is_dir() {
        if let Some(first) = targets.next() {
            let (program, args) = platform::bundle_handler(exe, first);
            return ProcessSpec::new(program).args(args).args(targets);
        }
    }
    ProcessSpec::new(PathBuf::from(exe)).args(targets)
}

fn handler_spec(target: &OsStr) -> ProcessSpec {
    let (program, args) = platform::default_handler(target);
    ProcessSpec::new(program).args(args)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
