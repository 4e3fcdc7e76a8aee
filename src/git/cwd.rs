// ── Scoped working directory ──────────────────────────────────────────────────
//
// Process-wide state.  Only one scope may be live at a time; git operations
// that use it must be serialised by the caller.

use std::{
    env,
    path::{Path, PathBuf},
};

use crate::error::Result;

/// Switches the process current directory and restores the previous one
/// when dropped, whether the scope ends normally, by `?`, or by unwinding.
#[derive(Debug)]
pub struct WorkingDirScope {
    previous: PathBuf,
}

impl WorkingDirScope {
    pub fn enter(dir: &Path) -> Result<Self> {
        let previous = env::current_dir()?;
        env::set_current_dir(dir)?;
        tracing::debug!(dir = %dir.display(), previous = %previous.display(), "entered working directory");
        Ok(Self { previous })
    }

    /// The directory that will be restored.
    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for WorkingDirScope {
    fn drop(&mut self) {
        // One attempt only; a failure here cannot be reported to anyone.
        if let Err(e) = env::set_current_dir(&self.previous) {
            tracing::warn!(dir = %self.previous.display(), error = %e, "could not restore working directory");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn cwd() -> PathBuf {
        env::current_dir()
            .and_then(|d| d.canonicalize())
            .expect("current dir")
    }

    #[test]
    #[serial(cwd)]
    fn restores_on_drop() {
        let before = cwd();
        let dir = tempfile::tempdir().expect("temp dir");
        {
            let scope = WorkingDirScope::enter(dir.path()).expect("enter");
            assert_eq!(cwd(), dir.path().canonicalize().expect("canonical"));
            assert_eq!(scope.previous().canonicalize().expect("canonical"), before);
        }
        assert_eq!(cwd(), before);
    }

    #[test]
    #[serial(cwd)]
    fn restores_when_unwinding() {
        let before = cwd();
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().to_path_buf();
        let outcome = std::panic::catch_unwind(move || {
            let _scope = WorkingDirScope::enter(&path).expect("enter");
            panic!("boom");
        });
        assert!(outcome.is_err());
        assert_eq!(cwd(), before);
    }

    #[test]
    #[serial(cwd)]
    fn missing_directory_leaves_cwd_alone() {
        let before = cwd();
        let err = WorkingDirScope::enter(Path::new("/no/such/rivet/dir")).unwrap_err();
        assert!(matches!(err, crate::error::HostError::Io(_)));
        assert_eq!(cwd(), before);
    }
}
