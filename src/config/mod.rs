// ── Host settings ─────────────────────────────────────────────────────────────
//
// Reads and writes `<config dir>/Rivet/host.json` (`%APPDATA%\Rivet\host.json`
// on Windows).  Every field is optional; a missing, unreadable or
// wrong-version file means "use defaults".

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{HostError, Result},
    git::{CwdMode, DocumentSaver, GitWorkflow, DEFAULT_GIT_TIMEOUT},
    platform::SpecialFolderResolver,
    process::ProcessRunner,
    tools::{find_tool, ToolKind, ToolLookup},
};

// ── Format version ────────────────────────────────────────────────────────────

const CONFIG_VERSION: u32 = 1;

/// Terminal template used when none is configured.
#[cfg(windows)]
pub const DEFAULT_TERMINAL: &str = "cmd.exe /K cd /d \"$(DIR)\"";
#[cfg(target_os = "macos")]
pub const DEFAULT_TERMINAL: &str = "open -a Terminal \"$(DIR)\"";
#[cfg(all(not(windows), not(target_os = "macos")))]
pub const DEFAULT_TERMINAL: &str = "x-terminal-emulator";

// ── On-disk type ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub version: u32,
    pub image_editor: Option<PathBuf>,
    pub image_viewer: Option<PathBuf>,
    pub diff_tool: Option<PathBuf>,
    pub git_gui: Option<PathBuf>,
    /// Git executable; `git` from `PATH` when unset.
    pub git: Option<PathBuf>,
    /// Command line with a `$(DIR)` placeholder.
    pub terminal_command: Option<String>,
    pub browser: Option<PathBuf>,
    /// Bound on each git step.  0 means the default.
    pub git_timeout_secs: u64,
    pub cwd_mode: CwdMode,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            image_editor: None,
            image_viewer: None,
            diff_tool: None,
            git_gui: None,
            git: None,
            terminal_command: None,
            browser: None,
            git_timeout_secs: DEFAULT_GIT_TIMEOUT.as_secs(),
            cwd_mode: CwdMode::default(),
        }
    }
}

// ── Path ──────────────────────────────────────────────────────────────────────

/// `<config dir>/Rivet/host.json`, or `None` if the platform has no config
/// directory.
pub fn config_path() -> Option<PathBuf> {
    let mut p = dirs::config_dir()?;
    p.push("Rivet");
    p.push("host.json");
    Some(p)
}

impl HostConfig {
    // ── Load / save ───────────────────────────────────────────────────────────

    pub fn load() -> Option<Self> {
        Self::load_from(&config_path()?)
    }

    /// `None` on any error: file missing, JSON parse failure, or an
    /// unrecognised version number.
    pub fn load_from(path: &Path) -> Option<Self> {
        let data = fs::read(path).ok()?;
        let config: Self = match serde_json::from_slice(&data) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable host config");
                return None;
            }
        };
        if config.version != CONFIG_VERSION {
            tracing::warn!(path = %path.display(), version = config.version, "ignoring host config with unknown version");
            return None;
        }
        Some(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = config_path().ok_or_else(|| HostError::Config("no config directory on this platform".into()))?;
        self.save_to(&path)
    }

    /// Creates the parent directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    // ── Tools ─────────────────────────────────────────────────────────────────

    pub fn tool_path(&self, kind: ToolKind) -> Option<&Path> {
        match kind {
            ToolKind::ImageEditor => self.image_editor.as_deref(),
            ToolKind::ImageViewer => self.image_viewer.as_deref(),
            ToolKind::GitGui => self.git_gui.as_deref(),
            ToolKind::DiffTool => self.diff_tool.as_deref(),
        }
    }

    fn tool_slot(&mut self, kind: ToolKind) -> &mut Option<PathBuf> {
        match kind {
            ToolKind::ImageEditor => &mut self.image_editor,
            ToolKind::ImageViewer => &mut self.image_viewer,
            ToolKind::GitGui => &mut self.git_gui,
            ToolKind::DiffTool => &mut self.diff_tool,
        }
    }

    /// The configured path if it still exists, otherwise a fresh search.
    pub fn resolve_tool(&self, kind: ToolKind, folders: &dyn SpecialFolderResolver) -> ToolLookup {
        if let Some(path) = self.tool_path(kind) {
            if path.exists() {
                return ToolLookup::Found(path.to_path_buf());
            }
            tracing::debug!(?kind, path = %path.display(), "configured tool is gone; searching");
        }
        find_tool(kind, folders)
    }

    /// Record a found tool so the next lookup skips the search.  Returns
    /// whether anything changed; `NotFound` never clears a setting.
    pub fn remember_tool(&mut self, kind: ToolKind, lookup: &ToolLookup) -> bool {
        let ToolLookup::Found(path) = lookup else {
            return false;
        };
        let slot = self.tool_slot(kind);
        if slot.as_deref() == Some(path.as_path()) {
            return false;
        }
        *slot = Some(path.clone());
        true
    }

    // ── Terminal / git ────────────────────────────────────────────────────────

    pub fn terminal_template(&self) -> &str {
        self.terminal_command
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(DEFAULT_TERMINAL)
    }

    pub fn git_timeout(&self) -> Duration {
        match self.git_timeout_secs {
            0 => DEFAULT_GIT_TIMEOUT,
            secs => Duration::from_secs(secs),
        }
    }

    /// A workflow that runs real git with these settings.
    pub fn git_workflow<S: DocumentSaver>(&self, saver: S) -> GitWorkflow<ProcessRunner, S> {
        let workflow = GitWorkflow::new(ProcessRunner, saver)
            .timeout(self.git_timeout())
            .cwd_mode(self.cwd_mode);
        match &self.git {
            Some(git) => workflow.git_program(git),
            None => workflow,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
