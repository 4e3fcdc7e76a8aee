// ── Companion-tool discovery ──────────────────────────────────────────────────
//
// Best-effort search for optional external tools (image editor, image viewer,
// git GUI, diff tool).  Filesystem probing only: no installation, registry or
// network lookups, and no state between calls.

mod catalog;
pub mod launch;

use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use serde::{Deserialize, Serialize};

use crate::platform::{NativeFolders, SpecialFolderResolver};

use catalog::{Candidate, Probe};

// ── Types ─────────────────────────────────────────────────────────────────────

/// The companion tools the editor can hand files to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    ImageEditor,
    ImageViewer,
    GitGui,
    DiffTool,
}

impl ToolKind {
    /// Human-readable name for menus and messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::ImageEditor => "image editor",
            Self::ImageViewer => "image viewer",
            Self::GitGui => "git client",
            Self::DiffTool => "diff tool",
        }
    }

    /// Search this machine's install roots for the tool.
    pub fn locate(self) -> ToolLookup {
        find_tool(self, &NativeFolders)
    }
}

/// Result of a tool search.  `NotFound` means "use the OS default handler".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ToolLookup {
    Found(PathBuf),
    #[default]
    NotFound,
}

impl ToolLookup {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Found(path) => Some(path),
            Self::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

// ── Per-kind entry points ─────────────────────────────────────────────────────

/// Paint.NET, Krita or GIMP; falls back to Paint in the system folder.
pub fn find_image_editor(folders: &dyn SpecialFolderResolver) -> ToolLookup {
    find_tool(ToolKind::ImageEditor, folders)
}

/// IrfanView, XnView MP or nomacs; `NotFound` otherwise.
pub fn find_image_viewer(folders: &dyn SpecialFolderResolver) -> ToolLookup {
    find_tool(ToolKind::ImageViewer, folders)
}

/// TortoiseGit, GitHub Desktop, Fork, Sourcetree or git-gui; `NotFound`
/// otherwise.
pub fn find_git_gui(folders: &dyn SpecialFolderResolver) -> ToolLookup {
    find_tool(ToolKind::GitGui, folders)
}

/// WinMerge, Meld or KDiff3; `NotFound` otherwise.
pub fn find_diff_tool(folders: &dyn SpecialFolderResolver) -> ToolLookup {
    find_tool(ToolKind::DiffTool, folders)
}

/// Probe the candidates for `kind` in order and return the first that
/// exists, else the kind's fallback, else `NotFound`.
///
/// Candidates whose root the resolver cannot supply are skipped.
pub fn find_tool(kind: ToolKind, folders: &dyn SpecialFolderResolver) -> ToolLookup {
    for candidate in catalog::candidates(kind) {
        if let Some(path) = probe(candidate, folders) {
            tracing::debug!(?kind, path = %path.display(), "found companion tool");
            return ToolLookup::Found(path);
        }
    }

    match catalog::fallback(kind)
        .and_then(|(root, rel)| Some(join_rel(&folders.resolve(root)?, rel)))
    {
        Some(path) => {
            tracing::debug!(?kind, path = %path.display(), "using bundled fallback");
            ToolLookup::Found(path)
        }
        None => {
            tracing::debug!(?kind, "no companion tool installed");
            ToolLookup::NotFound
        }
    }
}

// ── Probing ───────────────────────────────────────────────────────────────────

fn probe(candidate: &Candidate, folders: &dyn SpecialFolderResolver) -> Option<PathBuf> {
    let root = folders.resolve(candidate.root)?;
    match candidate.probe {
        Probe::File(rel) => Some(join_rel(&root, rel)).filter(|p| p.is_file()),
        Probe::Directory(rel) => Some(join_rel(&root, rel)).filter(|p| p.is_dir()),
        Probe::Versioned {
            parent,
            prefix,
            exe,
        } => newest_versioned(&join_rel(&root, parent), prefix, exe),
    }
}

/// Among `parent`'s subdirectories named `<prefix>…`, newest modification
/// time first, return `exe` inside the first one that has it.
fn newest_versioned(parent: &Path, prefix: &str, exe: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(parent).ok()?;
    let mut dirs: Vec<(SystemTime, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(prefix))
        })
        .filter_map(|entry| {
            let path = entry.path();
            let meta = fs::metadata(&path).ok()?;
            if !meta.is_dir() {
                return None;
            }
            Some((meta.modified().ok()?, path))
        })
        .collect();

    dirs.sort_by(|a, b| b.0.cmp(&a.0));
    dirs.into_iter()
        .map(|(_, dir)| dir.join(exe))
        .find(|path| path.is_file())
}

/// Join a `/`-separated relative path so the result uses native separators.
fn join_rel(root: &Path, rel: &str) -> PathBuf {
    rel.split('/')
        .filter(|part| !part.is_empty())
        .fold(root.to_path_buf(), |path, part| path.join(part))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::platform::SpecialFolder;

    /// Resolver that maps folders to subdirectories of a temp dir.
    struct FakeFolders {
        _tmp: tempfile::TempDir,
        roots: HashMap<SpecialFolder, PathBuf>,
    }

    impl FakeFolders {
        fn new(folders: &[SpecialFolder]) -> Self {
            let tmp = tempfile::tempdir().expect("temp dir");
            let roots = folders
                .iter()
                .map(|&folder| {
                    let root = tmp.path().join(format!("{folder:?}"));
                    fs::create_dir_all(&root).expect("create root");
                    (folder, root)
                })
                .collect();
            Self { _tmp: tmp, roots }
        }

        fn all() -> Self {
            Self::new(&[
                SpecialFolder::ProgramFiles,
                SpecialFolder::ProgramFilesX86,
                SpecialFolder::LocalAppData,
                SpecialFolder::System,
            ])
        }

        fn root(&self, folder: SpecialFolder) -> &Path {
            &self.roots[&folder]
        }

        fn touch(&self, folder: SpecialFolder, rel: &str) -> PathBuf {
            let path = join_rel(self.root(folder), rel);
            fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
            fs::write(&path, b"").expect("touch");
            path
        }
    }

    impl SpecialFolderResolver for FakeFolders {
        fn resolve(&self, folder: SpecialFolder) -> Option<PathBuf> {
            self.roots.get(&folder).cloned()
        }
    }

    #[test]
    fn nothing_installed_is_not_found() {
        let folders = FakeFolders::all();
        assert_eq!(find_diff_tool(&folders), ToolLookup::NotFound);
        assert_eq!(find_git_gui(&folders), ToolLookup::NotFound);
        assert_eq!(find_image_viewer(&folders), ToolLookup::NotFound);
    }

    #[test]
    fn first_existing_candidate_wins() {
        let folders = FakeFolders::all();
        let meld = folders.touch(SpecialFolder::ProgramFiles, "Meld/Meld.exe");
        assert_eq!(find_diff_tool(&folders), ToolLookup::Found(meld));

        // WinMerge is earlier in the list.
        let winmerge = folders.touch(SpecialFolder::ProgramFilesX86, "WinMerge/WinMergeU.exe");
        assert_eq!(find_diff_tool(&folders), ToolLookup::Found(winmerge));
    }

    #[test]
    fn file_probe_rejects_a_directory() {
        let folders = FakeFolders::all();
        fs::create_dir_all(folders.root(SpecialFolder::ProgramFiles).join("IrfanView/i_view64.exe"))
            .expect("mkdir");
        assert_eq!(find_image_viewer(&folders), ToolLookup::NotFound);
    }

    #[test]
    fn directory_probe_accepts_a_bundle() {
        let folders = FakeFolders::all();
        let bundle = folders.root(SpecialFolder::ProgramFiles).join("Fork.app");
        fs::create_dir_all(&bundle).expect("mkdir");
        assert_eq!(find_git_gui(&folders), ToolLookup::Found(bundle));
    }

    #[test]
    fn unresolvable_roots_are_skipped() {
        let folders = FakeFolders::new(&[SpecialFolder::LocalAppData]);
        let winmerge = folders.touch(SpecialFolder::LocalAppData, "Programs/WinMerge/WinMergeU.exe");
        assert_eq!(find_diff_tool(&folders), ToolLookup::Found(winmerge));
    }

    #[test]
    fn image_editor_falls_back_to_paint() {
        let folders = FakeFolders::all();
        let expected = folders.root(SpecialFolder::System).join("mspaint.exe");
        assert_eq!(find_image_editor(&folders), ToolLookup::Found(expected));
    }

    #[test]
    fn image_editor_without_system_folder_is_not_found() {
        let folders = FakeFolders::new(&[SpecialFolder::ProgramFiles]);
        assert_eq!(find_image_editor(&folders), ToolLookup::NotFound);
    }

    #[test]
    fn installed_editor_beats_fallback() {
        let folders = FakeFolders::all();
        let krita = folders.touch(SpecialFolder::ProgramFiles, "Krita (x64)/bin/krita.exe");
        assert_eq!(find_image_editor(&folders), ToolLookup::Found(krita));
    }

    #[test]
    fn versioned_dir_without_exe_falls_through() {
        let folders = FakeFolders::all();
        fs::create_dir_all(
            folders
                .root(SpecialFolder::LocalAppData)
                .join("GitHubDesktop/app-3.4.0"),
        )
        .expect("mkdir");
        let fork = folders.touch(SpecialFolder::LocalAppData, "Fork/Fork.exe");
        assert_eq!(find_git_gui(&folders), ToolLookup::Found(fork));
    }

    #[test]
    fn versioned_prefix_must_match() {
        let folders = FakeFolders::all();
        folders.touch(SpecialFolder::LocalAppData, "GitHubDesktop/packages/GitHubDesktop.exe");
        assert_eq!(find_git_gui(&folders), ToolLookup::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn versioned_scan_picks_most_recently_modified() {
        use std::time::Duration;

        let folders = FakeFolders::all();
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        // Name order and mtime order disagree on purpose.
        let ages = [("app-3.0.0", 10), ("app-2.9.0", 30), ("app-3.1.0", 20)];
        for (dir, age) in ages {
            folders.touch(
                SpecialFolder::LocalAppData,
                &format!("GitHubDesktop/{dir}/GitHubDesktop.exe"),
            );
            let path = folders.root(SpecialFolder::LocalAppData).join("GitHubDesktop").join(dir);
            fs::File::open(&path)
                .and_then(|f| f.set_modified(base + Duration::from_secs(age)))
                .expect("set mtime");
        }

        let expected = folders
            .root(SpecialFolder::LocalAppData)
            .join("GitHubDesktop/app-2.9.0/GitHubDesktop.exe");
        assert_eq!(find_git_gui(&folders), ToolLookup::Found(expected));
    }

    #[test]
    fn lookup_accessors() {
        let found = ToolLookup::Found(PathBuf::from("tool"));
        assert_eq!(found.path(), Some(Path::new("tool")));
        assert!(found.is_found());
        assert_eq!(ToolLookup::NotFound.path(), None);
        assert!(!ToolLookup::default().is_found());
    }
}
