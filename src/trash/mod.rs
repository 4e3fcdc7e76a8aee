// ── Recycle bin ───────────────────────────────────────────────────────────────
//
// Recoverable deletion for the editor's "delete file" command.  Silent: no
// confirmation, progress or error UI from the OS.  Failures are logged and
// reported as `false`.

use std::path::Path;

use crate::platform::{NativeTrash, TrashFacility};

/// Move `path` to the OS trash.  `true` only if the OS reports success.
pub fn move_to_trash(path: &Path) -> bool {
    move_to_trash_with(&NativeTrash, path)
}

/// `move_to_trash` against an explicit facility.
pub fn move_to_trash_with(facility: &dyn TrashFacility, path: &Path) -> bool {
    if path.as_os_str().is_empty() {
        tracing::warn!("refusing to trash an empty path");
        return false;
    }
    match facility.move_to_trash(path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "moved to trash");
            true
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "move to trash failed");
            false
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
