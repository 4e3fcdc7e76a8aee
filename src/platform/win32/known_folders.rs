// ── Known folders ─────────────────────────────────────────────────────────────
//
// Resolves install roots through `SHGetKnownFolderPath` rather than
// environment variables, which a 32-bit process sees redirected.

#![allow(unsafe_code)]

use std::{ffi::OsString, os::windows::ffi::OsStringExt, path::PathBuf};

use windows::{
    core::GUID,
    Win32::{
        Foundation::HANDLE,
        System::Com::CoTaskMemFree,
        UI::Shell::{
            FOLDERID_LocalAppData, FOLDERID_ProgramFiles, FOLDERID_ProgramFilesX86,
            FOLDERID_System, SHGetKnownFolderPath, KF_FLAG_DEFAULT,
        },
    },
};

use crate::{
    error::Result,
    platform::{SpecialFolder, SpecialFolderResolver},
};

/// `SpecialFolderResolver` backed by the Shell known-folder API.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFolders;

impl SpecialFolderResolver for NativeFolders {
    fn resolve(&self, folder: SpecialFolder) -> Option<PathBuf> {
        let id = match folder {
            SpecialFolder::ProgramFiles => &FOLDERID_ProgramFiles,
            SpecialFolder::ProgramFilesX86 => &FOLDERID_ProgramFilesX86,
            SpecialFolder::LocalAppData => &FOLDERID_LocalAppData,
            SpecialFolder::System => &FOLDERID_System,
        };
        match known_folder(id) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::debug!(?folder, error = %e, "known folder unavailable");
                None
            }
        }
    }
}

fn known_folder(id: &GUID) -> Result<PathBuf> {
    // SAFETY: `id` points to a static FOLDERID GUID.  A null token asks for
    // the current user.  On success the shell returns a CoTaskMem-allocated,
    // null-terminated string that we free below.
    let raw = unsafe { SHGetKnownFolderPath(id, KF_FLAG_DEFAULT, HANDLE::default()) }?;

    // SAFETY: `raw` is a valid null-terminated UTF-16 string (see above) and
    // is not freed until after the copy is taken.
    let path = OsString::from_wide(unsafe { raw.as_wide() });

    // SAFETY: `raw` was allocated by SHGetKnownFolderPath with CoTaskMemAlloc
    // and is freed exactly once; it is not used afterwards.
    unsafe { CoTaskMemFree(Some(raw.0 as *const _)) };

    Ok(PathBuf::from(path))
}
