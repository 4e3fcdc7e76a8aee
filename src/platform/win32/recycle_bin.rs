// ── Recycle bin ───────────────────────────────────────────────────────────────
//
// `SHFileOperationW(FO_DELETE)` with `FOF_ALLOWUNDO` sends the entry to the
// Recycle Bin.  The remaining flags keep the shell from showing progress,
// confirmation or error UI: the editor reports failures itself.

#![allow(unsafe_code)]

use std::{os::windows::ffi::OsStrExt, path::Path};

use windows::{
    core::PCWSTR,
    Win32::UI::Shell::{
        SHFileOperationW, FOF_ALLOWUNDO, FOF_NOCONFIRMATION, FOF_NOERRORUI, FOF_SILENT,
        FO_DELETE, SHFILEOPSTRUCTW,
    },
};

use crate::{
    error::{HostError, Result},
    platform::TrashFacility,
};

/// `TrashFacility` backed by the Windows Recycle Bin.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeTrash;

impl TrashFacility for NativeTrash {
    fn move_to_trash(&self, path: &Path) -> Result<()> {
        // The shell resolves relative paths against its own idea of the
        // current directory and never accepts `\\?\` prefixes, so pass a
        // plain absolute path.
        let absolute = std::path::absolute(path)?;

        // pFrom is a list of paths: each null-terminated, the list ending
        // with an extra null.
        let from: Vec<u16> = absolute
            .as_os_str()
            .encode_wide()
            .chain([0, 0])
            .collect();

        let mut op = SHFILEOPSTRUCTW {
            wFunc: FO_DELETE,
            pFrom: PCWSTR(from.as_ptr()),
            fFlags: (FOF_ALLOWUNDO | FOF_NOCONFIRMATION | FOF_SILENT | FOF_NOERRORUI).0 as u16,
            ..Default::default()
        };

        // SAFETY: `op` is fully initialised; `from` is double-null-terminated
        // and outlives the call.  No owner window is needed because every UI
        // flag is suppressed.
        let rc = unsafe { SHFileOperationW(&mut op) };

        if rc != 0 {
            return Err(HostError::Win32 {
                function: "SHFileOperationW",
                code: rc as u32,
            });
        }
        if op.fAnyOperationsAborted.as_bool() {
            return Err(HostError::Trash {
                path: absolute,
                reason: "operation aborted".to_owned(),
            });
        }
        Ok(())
    }
}
