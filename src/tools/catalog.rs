// ── Companion-tool catalog ────────────────────────────────────────────────────
//
// Where each supported companion tool installs itself, in probe order.  Pure
// data; the probing lives in `tools::mod`.

use crate::platform::SpecialFolder::{self, LocalAppData, ProgramFiles, ProgramFilesX86, System};

use super::ToolKind;

/// What has to exist under a root for a candidate to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Probe {
    /// An executable file at this relative path.
    File(&'static str),
    /// A directory at this relative path (application bundles).
    Directory(&'static str),
    /// Subdirectories of `parent` named `<prefix><version>`, each holding
    /// `exe`.  The most recently modified one wins.
    Versioned {
        parent: &'static str,
        prefix: &'static str,
        exe: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub(crate) root: SpecialFolder,
    pub(crate) probe: Probe,
}

const fn file(root: SpecialFolder, rel: &'static str) -> Candidate {
    Candidate {
        root,
        probe: Probe::File(rel),
    }
}

const fn bundle(root: SpecialFolder, rel: &'static str) -> Candidate {
    Candidate {
        root,
        probe: Probe::Directory(rel),
    }
}

const fn versioned(
    root: SpecialFolder,
    parent: &'static str,
    prefix: &'static str,
    exe: &'static str,
) -> Candidate {
    Candidate {
        root,
        probe: Probe::Versioned {
            parent,
            prefix,
            exe,
        },
    }
}

// ── Candidate lists ───────────────────────────────────────────────────────────

const IMAGE_EDITORS: &[Candidate] = &[
    file(ProgramFiles, "paint.net/PaintDotNet.exe"),
    file(ProgramFiles, "Krita (x64)/bin/krita.exe"),
    file(ProgramFiles, "GIMP 2/bin/gimp-2.10.exe"),
    bundle(ProgramFiles, "GIMP.app"),
];

const IMAGE_VIEWERS: &[Candidate] = &[
    file(ProgramFiles, "IrfanView/i_view64.exe"),
    file(ProgramFilesX86, "IrfanView/i_view32.exe"),
    file(ProgramFiles, "XnViewMP/xnviewmp.exe"),
    file(ProgramFiles, "nomacs/bin/nomacs.exe"),
];

const GIT_GUIS: &[Candidate] = &[
    file(ProgramFiles, "TortoiseGit/bin/TortoiseGitProc.exe"),
    versioned(LocalAppData, "GitHubDesktop", "app-", "GitHubDesktop.exe"),
    file(LocalAppData, "Fork/Fork.exe"),
    versioned(LocalAppData, "SourceTree", "app-", "SourceTree.exe"),
    file(ProgramFiles, "Git/cmd/git-gui.exe"),
    bundle(ProgramFiles, "Fork.app"),
    bundle(ProgramFiles, "GitHub Desktop.app"),
];

const DIFF_TOOLS: &[Candidate] = &[
    file(ProgramFiles, "WinMerge/WinMergeU.exe"),
    file(ProgramFilesX86, "WinMerge/WinMergeU.exe"),
    file(LocalAppData, "Programs/WinMerge/WinMergeU.exe"),
    file(ProgramFiles, "Meld/Meld.exe"),
    file(ProgramFilesX86, "Meld/Meld.exe"),
    file(ProgramFiles, "KDiff3/kdiff3.exe"),
    bundle(ProgramFiles, "Meld.app"),
];

/// Ordered candidates for `kind`.
pub(crate) fn candidates(kind: ToolKind) -> &'static [Candidate] {
    match kind {
        ToolKind::ImageEditor => IMAGE_EDITORS,
        ToolKind::ImageViewer => IMAGE_VIEWERS,
        ToolKind::GitGui => GIT_GUIS,
        ToolKind::DiffTool => DIFF_TOOLS,
    }
}

/// What to return when no candidate exists: a root plus a file that is
/// assumed present whenever the root resolves.  Only the image editor has
/// one (Paint ships with Windows).
pub(crate) fn fallback(kind: ToolKind) -> Option<(SpecialFolder, &'static str)> {
    match kind {
        ToolKind::ImageEditor => Some((System, "mspaint.exe")),
        ToolKind::ImageViewer | ToolKind::GitGui | ToolKind::DiffTool => None,
    }
}
