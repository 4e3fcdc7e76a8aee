// ── Non-Windows platform implementation ──────────────────────────────────────
//
// Linux, the BSDs and macOS.  Install roots come from `dirs`; the trash is the
// freedesktop.org trash (or the Finder trash on macOS) via the `trash` crate.
// No `unsafe`.

use std::path::{Path, PathBuf};

use crate::{
    error::{HostError, Result},
    platform::{SpecialFolder, SpecialFolderResolver, TrashFacility},
};

/// `SpecialFolderResolver` for Unix-like desktops.
///
/// There is no 32-bit program-files split and no system directory holding
/// bundled GUI tools, so those two resolve to `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFolders;

impl SpecialFolderResolver for NativeFolders {
    fn resolve(&self, folder: SpecialFolder) -> Option<PathBuf> {
        match folder {
            SpecialFolder::ProgramFiles if cfg!(target_os = "macos") => {
                Some(PathBuf::from("/Applications"))
            }
            SpecialFolder::ProgramFiles => Some(PathBuf::from("/opt")),
            SpecialFolder::LocalAppData => dirs::data_local_dir(),
            SpecialFolder::ProgramFilesX86 | SpecialFolder::System => None,
        }
    }
}

/// `TrashFacility` backed by the desktop trash.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeTrash;

impl TrashFacility for NativeTrash {
    fn move_to_trash(&self, path: &Path) -> Result<()> {
        trash::delete(path).map_err(|e| HostError::Trash {
            path: path.to_owned(),
            reason: e.to_string(),
        })
    }
}
