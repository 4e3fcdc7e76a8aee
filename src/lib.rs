// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except:
//   • `platform::win32` – Win32 / WinAPI FFI (known folders, recycle bin)
// Each unsafe block in that module MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

//! Host-integration layer for the Rivet editor.
//!
//! Five independent pieces the editor calls into when it has to talk to the
//! machine it runs on:
//!
//! * [`encoding`] sniffs a file's text encoding from its leading bytes.
//! * [`tools`] finds companion executables (image editor, diff tool, …).
//! * [`process`] launches and supervises child processes.
//! * [`git`] commits (and optionally pushes) a single file.
//! * [`trash`] moves files to the recycle bin instead of deleting them.
//!
//! None of them keep state between calls.  Configuration is supplied by the
//! caller, usually through [`config::HostConfig`].

pub mod config;
pub mod encoding;
pub mod error;
pub mod git;
pub mod logging;
pub mod platform;
pub mod process;
pub mod tools;
pub mod trash;

pub use config::HostConfig;
pub use encoding::{detect_encoding, TextEncoding};
pub use error::{HostError, Result};
pub use git::{CommitOutcome, CwdMode, DocumentSaver, GitWorkflow};
pub use process::{
    Launcher, OutputLine, ProcessResult, ProcessRunner, ProcessSpec, ProcessStatus, WaitPolicy,
    WindowHint, LAUNCH_FAILED_EXIT_CODE, TIMEOUT_EXIT_CODE,
};
pub use tools::{ToolKind, ToolLookup};
pub use trash::{move_to_trash, move_to_trash_with};
