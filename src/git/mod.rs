// ── Git commit / push workflow ────────────────────────────────────────────────
//
// Commits the file behind the active document, optionally pushes, and turns
// every outcome into a message the editor can show as-is.
//
// Git runs in the file's own directory.  By default that directory is passed
// to the child process; `CwdMode::ProcessWide` switches the process current
// directory instead, for launchers that cannot take a working directory.

mod cwd;

use std::{
    panic::{self, AssertUnwindSafe},
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    process::{Launcher, ProcessSpec, ProcessStatus, WaitPolicy, WindowHint},
};

pub use cwd::WorkingDirScope;

/// Bound on each git step.
pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(10);

// ── Collaborators ─────────────────────────────────────────────────────────────

/// The editor's "save the active document" command.  `false` means the save
/// failed or was cancelled.
pub trait DocumentSaver {
    fn save_active_document(&self) -> bool;
}

impl<F: Fn() -> bool> DocumentSaver for F {
    fn save_active_document(&self) -> bool {
        self()
    }
}

/// Where git's working directory comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CwdMode {
    /// Pass the directory to the child process.
    #[default]
    PerProcess,
    /// Switch the process current directory for the duration of the
    /// operation.  Not safe for concurrent git operations.
    ProcessWide,
}

// ── CommitOutcome ─────────────────────────────────────────────────────────────

/// Result of `commit_file`.  A success never carries a message; a failure
/// always does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    success: bool,
    message: String,
}

impl CommitOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: String::new(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            "Git operation failed.".to_owned()
        } else {
            message
        };
        Self {
            success: false,
            message,
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    /// User-facing text; empty on success.
    pub fn message(&self) -> &str {
        &self.message
    }
}

// ── GitWorkflow ───────────────────────────────────────────────────────────────

pub struct GitWorkflow<L, S> {
    launcher: L,
    saver: S,
    git: PathBuf,
    timeout: Duration,
    cwd_mode: CwdMode,
}

impl<L: Launcher, S: DocumentSaver> GitWorkflow<L, S> {
    pub fn new(launcher: L, saver: S) -> Self {
        Self {
            launcher,
            saver,
            git: PathBuf::from("git"),
            timeout: DEFAULT_GIT_TIMEOUT,
            cwd_mode: CwdMode::default(),
        }
    }

    /// Use a specific git executable instead of `git` from `PATH`.
    pub fn git_program(mut self, git: impl Into<PathBuf>) -> Self {
        self.git = git.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cwd_mode(mut self, mode: CwdMode) -> Self {
        self.cwd_mode = mode;
        self
    }

    /// Commit exactly `path`, then push if asked.
    ///
    /// Checks, in order, each ending the operation with its own message:
    /// the active document saves; the file exists; its directory exists.
    ///
    /// A commit that does not exit with 0 (including a timeout) is reported
    /// as "nothing to commit", since an unmodified file is by far the most
    /// common cause.  A push failure is logged but does not change the
    /// outcome.
    pub fn commit_file(&self, path: &Path, push: bool) -> CommitOutcome {
        let name = file_name(path);

        // The saver and launcher are caller-supplied; a panic in either must
        // not escape into the editor's command handler.
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| self.try_commit(path, &name, push)));
        match attempt {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                tracing::warn!(path = %path.display(), error = %e, "git commit failed");
                CommitOutcome::failed(format!("Git failed for {name}: {e}"))
            }
            Err(_) => {
                tracing::warn!(path = %path.display(), "git commit panicked");
                CommitOutcome::failed(format!("Git failed for {name}: unexpected error"))
            }
        }
    }

    fn try_commit(&self, path: &Path, name: &str, push: bool) -> Result<CommitOutcome> {
        if !self.saver.save_active_document() {
            return Ok(CommitOutcome::failed(format!("Couldn't save {name} before committing.")));
        }

        let file = std::path::absolute(path)?;
        if !file.is_file() {
            return Ok(CommitOutcome::failed(format!("File {name} doesn't exist.")));
        }
        match file.parent() {
            Some(dir) if dir.is_dir() => self.commit_in(dir, name, push),
            other => {
                let shown = other.map_or_else(|| file.display().to_string(), |d| d.display().to_string());
                Ok(CommitOutcome::failed(format!("Directory {shown} doesn't exist.")))
            }
        }
    }

    fn commit_in(&self, dir: &Path, name: &str, push: bool) -> Result<CommitOutcome> {
        let _scope = match self.cwd_mode {
            CwdMode::ProcessWide => Some(WorkingDirScope::enter(dir)?),
            CwdMode::PerProcess => None,
        };

        let commit = self.launcher.launch(
            self.git_step(dir)
                .arg("commit")
                .arg("-m")
                .arg(format!("Update {name}"))
                .arg("--")
                .arg(name),
        );
        if commit.status != ProcessStatus::Exited(0) {
            tracing::info!(file = name, status = ?commit.status, "nothing committed");
            return Ok(CommitOutcome::failed(format!("Nothing to commit for {name}.")));
        }

        if push {
            let pushed = self.launcher.launch(self.git_step(dir).arg("push"));
            // Push failures are deliberately not surfaced; see DESIGN.md.
            if !pushed.success() {
                tracing::warn!(file = name, status = ?pushed.status, "git push failed");
            }
        }

        tracing::info!(file = name, push, "committed");
        Ok(CommitOutcome::ok())
    }

    fn git_step(&self, dir: &Path) -> ProcessSpec {
        let spec = ProcessSpec::new(&self.git)
            .wait(WaitPolicy::WaitUpTo(self.timeout))
            .window(WindowHint::Hidden);
        match self.cwd_mode {
            CwdMode::PerProcess => spec.working_dir(dir),
            CwdMode::ProcessWide => spec,
        }
    }
}

/// Base name for messages; falls back to the whole path.
fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
