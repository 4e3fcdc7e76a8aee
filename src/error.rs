// ── Central error type ────────────────────────────────────────────────────────
//
// Internal helpers return `error::Result<T>`.  The public component
// operations (process runner, git workflow, trash, tool lookup) convert these
// into their own result types at the boundary; callers never see a panic or
// have to unwind a stack trace.

use std::path::PathBuf;

/// Every error that rivet-host can produce internally.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// A Win32 API call returned a failure code.
    #[error("{function} failed (error {code:#010x})")]
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    /// A standard I/O error (file open, read, write, …).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The host configuration file could not be encoded or decoded.
    #[error("config error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required configuration value is missing or unusable.
    #[error("config error: {0}")]
    Config(String),

    /// The platform trash facility refused the move.
    #[error("could not move {} to the trash: {reason}", path.display())]
    Trash { path: PathBuf, reason: String },
}

// Convert a windows-crate error (HRESULT) directly into a HostError so that
// `?` can be used on `windows::core::Result<T>` throughout the platform module.
#[cfg(windows)]
impl From<windows::core::Error> for HostError {
    fn from(e: windows::core::Error) -> Self {
        // HRESULT.0 is i32; reinterpret bits as u32 for display purposes.
        // Win32 errors appear as 0x8007xxxx HRESULTs.
        Self::Win32 {
            function: "windows",
            code: e.code().0 as u32,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HostError>;

// ── Tests ─────────────────────────────────────────────────────────────────────
