// ── Platform abstraction layer ────────────────────────────────────────────────
//
// This module defines the capability interfaces the rest of the crate uses to
// talk to the OS.  No `unsafe` lives here; all Win32 FFI is confined to the
// `win32` sub-module and never leaks outward.  The implementation is chosen at
// build time: `win32` on Windows, `portable` everywhere else.

use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::Command,
};

use crate::{error::Result, process::WindowHint};

#[cfg(not(windows))]
mod portable;
#[cfg(windows)]
mod win32;

#[cfg(not(windows))]
pub use portable::{NativeFolders, NativeTrash};
#[cfg(windows)]
pub use win32::{NativeFolders, NativeTrash};

// ── Capabilities ──────────────────────────────────────────────────────────────

/// Well-known install roots that companion tools live under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialFolder {
    /// Native-bitness program files (`C:\Program Files`).
    ProgramFiles,
    /// 32-bit program files on 64-bit Windows (`C:\Program Files (x86)`).
    ProgramFilesX86,
    /// Per-user local application data (`%LOCALAPPDATA%`).
    LocalAppData,
    /// The OS system directory (`C:\Windows\System32`).
    System,
}

/// Maps a `SpecialFolder` to a directory on this machine.
pub trait SpecialFolderResolver {
    /// `None` when the folder does not exist on this platform or could not
    /// be resolved.
    fn resolve(&self, folder: SpecialFolder) -> Option<PathBuf>;
}

/// Moves filesystem entries to the recycle bin / trash.
///
/// Implementations must be silent (no confirmation dialog) and recoverable
/// (the user can restore the entry).
pub trait TrashFacility {
    fn move_to_trash(&self, path: &Path) -> Result<()>;
}

// ── Process helpers ───────────────────────────────────────────────────────────

/// Apply `hint` to a command about to be spawned.
#[cfg(windows)]
pub(crate) fn apply_window_hint(cmd: &mut Command, hint: WindowHint) {
    win32::apply_window_hint(cmd, hint);
}

/// Apply `hint` to a command about to be spawned.  No console windows exist
/// off Windows.
#[cfg(not(windows))]
pub(crate) fn apply_window_hint(_cmd: &mut Command, _hint: WindowHint) {}

/// Program and arguments that hand `target` (a file or URL) to the OS
/// default handler.
pub(crate) fn default_handler(target: &OsStr) -> (PathBuf, Vec<OsString>) {
    if cfg!(windows) {
        // The empty string is `start`'s window title; without it a quoted
        // target would be taken as the title.
        (
            PathBuf::from("cmd"),
            vec!["/C".into(), "start".into(), "".into(), target.to_owned()],
        )
    } else if cfg!(target_os = "macos") {
        (PathBuf::from("open"), vec![target.to_owned()])
    } else {
        (PathBuf::from("xdg-open"), vec![target.to_owned()])
    }
}

/// Program and arguments that open `target` with an application bundle
/// (a directory such as `Fork.app`) rather than an executable file.
pub(crate) fn bundle_handler(bundle: &Path, target: &OsStr) -> (PathBuf, Vec<OsString>) {
    (
        PathBuf::from("open"),
        vec!["-a".into(), bundle.as_os_str().to_owned(), target.to_owned()],
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
