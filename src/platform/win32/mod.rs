// ── Win32 platform implementation ─────────────────────────────────────────────
//
// This is the only module in the crate where `unsafe` code is permitted.
// Every `unsafe` block MUST carry a `// SAFETY:` comment that states:
//   • which invariant makes the operation sound, and
//   • what the caller is responsible for maintaining.
//
// Nothing in this module is `pub` beyond what callers genuinely need; keep the
// unsafe surface as small as possible.

#![allow(unsafe_code)]

use std::{os::windows::process::CommandExt, process::Command};

use windows::Win32::System::Threading::CREATE_NO_WINDOW;

use crate::process::WindowHint;

// ── Sub-modules ───────────────────────────────────────────────────────────────

mod known_folders; // SHGetKnownFolderPath
mod recycle_bin; // SHFileOperationW(FO_DELETE)

pub use known_folders::NativeFolders;
pub use recycle_bin::NativeTrash;

/// Suppress the console window of console-subsystem children (git, cmd).
pub(crate) fn apply_window_hint(cmd: &mut Command, hint: WindowHint) {
    if hint == WindowHint::Hidden {
        cmd.creation_flags(CREATE_NO_WINDOW.0);
    }
}
