use crate::domain::model::ChangeLog;
use crate::domain::ports::ContentFixer;
use crate::utils::error::{MigrateError, Result};
use crate::utils::validation::{validate_file_name, validate_relative_path};
use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const CONTENT_DIR: &str = "content";

/// What happened to a file handed to [`Mover::replace_in_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Changed,
    Unchanged,
    /// The fixer failed; the original content was kept.
    Failed,
    /// Trial run, nothing was read or written.
    Skipped,
}

/// Filesystem operations of a migration, all relative to one project root.
///
/// Every copy, move and rename is recorded in the change log. In trial mode
/// the operations are only recorded.
#[derive(Debug)]
pub struct Mover {
    project_root: PathBuf,
    trial: bool,
    changes: ChangeLog,
}

impl Mover {
    pub fn new(project_root: impl Into<PathBuf>, trial: bool) -> Result<Self> {
        let project_root = project_root.into();
        if !project_root.is_absolute() {
            return Err(MigrateError::InvalidPath {
                path: project_root.display().to_string(),
                reason: "project root must be absolute".to_string(),
            });
        }

        Ok(Self {
            project_root,
            trial,
            changes: ChangeLog::new(),
        })
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn is_trial(&self) -> bool {
        self.trial
    }

    pub fn content_path(&self) -> PathBuf {
        self.project_root.join(CONTENT_DIR)
    }

    pub fn changes(&self) -> &ChangeLog {
        &self.changes
    }

    pub fn into_changes(self) -> ChangeLog {
        self.changes
    }

    pub fn log_change(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.changes.record(from, to);
    }

    /// Joins a relative path onto the project root.
    pub fn abs_path(&self, rel: &str) -> Result<PathBuf> {
        validate_relative_path("path", rel).map_err(|e| MigrateError::InvalidPath {
            path: rel.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.project_root.join(rel))
    }

    fn abs_from_to(&self, from: &str, to: &str) -> Result<(PathBuf, PathBuf)> {
        Ok((self.abs_path(from)?, self.abs_path(to)?))
    }

    fn log_paths(&mut self, from: &Path, to: &Path) {
        self.changes
            .record(from.display().to_string(), to.display().to_string());
    }

    /// Copies the tree under `from` into `to`, overwriting files that exist.
    pub fn copy_dir(&mut self, from: &str, to: &str) -> Result<usize> {
        let (from, to) = self.abs_from_to(from, to)?;
        self.log_paths(&from, &to);
        if self.trial {
            return Ok(0);
        }

        let copied = copy_tree(&from, &to)?;
        tracing::info!("📁 Copied {} files from {} to {}", copied, from.display(), to.display());
        Ok(copied)
    }

    /// Replaces `to` with the directory at `from`.
    pub fn move_dir(&mut self, from: &str, to: &str) -> Result<()> {
        let (from, to) = self.abs_from_to(from, to)?;
        self.log_paths(&from, &to);
        if self.trial {
            return Ok(());
        }

        if !from.is_dir() {
            return Err(MigrateError::MissingSource { path: from });
        }

        match fs::remove_dir_all(&to) {
            Ok(()) => tracing::debug!("Removed existing {}", to.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(MigrateError::io_at(&to, e)),
        }
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).map_err(|e| MigrateError::io_at(parent, e))?;
        }
        fs::rename(&from, &to).map_err(|e| MigrateError::io_at(&from, e))?;

        tracing::info!("📦 Moved {} to {}", from.display(), to.display());
        Ok(())
    }

    pub fn rename_file(&mut self, from: &str, to: &str) -> Result<()> {
        let (from, to) = self.abs_from_to(from, to)?;
        self.log_paths(&from, &to);
        if self.trial {
            return Ok(());
        }

        if !from.is_file() {
            return Err(MigrateError::MissingSource { path: from });
        }
        fs::rename(&from, &to).map_err(|e| MigrateError::io_at(&from, e))
    }

    /// Renames every file below `content/` whose path matches `pattern` to
    /// `rename_to` in the same directory. Returns the number of renames.
    pub fn rename_content_files(&mut self, pattern: &str, rename_to: &str) -> Result<usize> {
        let re = Regex::new(pattern)?;
        validate_file_name("rename_to", rename_to)?;

        let matches: Vec<PathBuf> = self
            .content_files()?
            .into_iter()
            .filter(|path| re.is_match(&path.to_string_lossy()))
            .filter(|path| path.file_name().is_some_and(|name| name != rename_to))
            .collect();

        for path in &matches {
            let target = path.with_file_name(rename_to);
            self.log_paths(path, &target);
            if self.trial {
                continue;
            }

            if target.exists() {
                tracing::warn!("⚠️ {} replaces existing {}", path.display(), target.display());
            }
            fs::rename(path, &target).map_err(|e| MigrateError::io_at(path, e))?;
        }

        tracing::info!("🔁 Renamed {} files matching '{}' to {}", matches.len(), pattern, rename_to);
        Ok(matches.len())
    }

    /// Regular files below `content/`, in a stable order.
    fn content_files(&self) -> Result<Vec<PathBuf>> {
        let content = self.content_path();
        if !content.is_dir() {
            if self.trial {
                tracing::warn!("{} does not exist yet, nothing to scan", content.display());
                return Ok(Vec::new());
            }
            return Err(MigrateError::MissingSource { path: content });
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&content).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Rewrites one file through `fixer`.
    ///
    /// A fixer error is logged with the path and the file keeps its original
    /// content; I/O errors are returned.
    pub fn replace_in_file(&self, path: &Path, fixer: &dyn ContentFixer) -> Result<FileOutcome> {
        if self.trial {
            tracing::debug!("Would rewrite {}", path.display());
            return Ok(FileOutcome::Skipped);
        }

        let original = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                tracing::warn!("{}\t{}", path.display(), e);
                return Ok(FileOutcome::Failed);
            }
            Err(e) => return Err(MigrateError::io_at(path, e)),
        };

        match fixer.fix(path, &original) {
            Ok(fixed) if fixed == original => Ok(FileOutcome::Unchanged),
            Ok(fixed) => {
                fs::write(path, fixed).map_err(|e| MigrateError::io_at(path, e))?;
                Ok(FileOutcome::Changed)
            }
            Err(e) => {
                // 內容保持原樣，需要人工處理
                tracing::warn!("{}\t{}", path.display(), e);
                Ok(FileOutcome::Failed)
            }
        }
    }

    pub fn replace_in_file_rel(&self, rel: &str, fixer: &dyn ContentFixer) -> Result<FileOutcome> {
        let path = self.abs_path(rel)?;
        if !self.trial && !path.is_file() {
            return Err(MigrateError::MissingSource { path });
        }
        self.replace_in_file(&path, fixer)
    }

    /// Runs `fixers` over every content file whose path matches `pattern`.
    pub fn apply_content_fixers(&self, fixers: &dyn ContentFixer, pattern: &str) -> Result<FixSummary> {
        let re = Regex::new(pattern)?;
        let mut summary = FixSummary::default();

        for path in self.content_files()? {
            if !re.is_match(&path.to_string_lossy()) {
                continue;
            }
            match self.replace_in_file(&path, fixers)? {
                FileOutcome::Changed => summary.changed += 1,
                FileOutcome::Unchanged | FileOutcome::Skipped => summary.unchanged += 1,
                FileOutcome::Failed => summary.failed += 1,
            }
        }

        Ok(summary)
    }

    pub fn rel_file_exists(&self, rel: &str) -> Result<bool> {
        let path = self.abs_path(rel)?;
        match fs::metadata(&path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(MigrateError::io_at(path, e)),
        }
    }

    /// Creates a file, and its parent directories, with `content`.
    pub fn write_new_file(&mut self, rel: &str, content: &str) -> Result<()> {
        let path = self.abs_path(rel)?;
        self.log_change("(generated)", path.display().to_string());
        if self.trial {
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| MigrateError::io_at(parent, e))?;
        }
        fs::write(&path, content).map_err(|e| MigrateError::io_at(&path, e))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixSummary {
    pub changed: usize,
    pub unchanged: usize,
    pub failed: usize,
}

/// Recursive copy with merge semantics. Returns the number of files copied.
pub fn copy_tree(from: &Path, to: &Path) -> Result<usize> {
    if !from.is_dir() {
        return Err(MigrateError::MissingSource {
            path: from.to_path_buf(),
        });
    }

    // 先收集來源清單，目標在來源底下時才不會複製到剛建立的目錄
    let entries = WalkDir::new(from)
        .follow_links(true)
        .into_iter()
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut copied = 0;
    for entry in entries {
        let rel = entry
            .path()
            .strip_prefix(from)
            .map_err(|_| MigrateError::InvalidPath {
                path: entry.path().display().to_string(),
                reason: format!("not below {}", from.display()),
            })?;
        let target = to.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| MigrateError::io_at(&target, e))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| MigrateError::io_at(parent, e))?;
            }
            fs::copy(entry.path(), &target).map_err(|e| MigrateError::io_at(entry.path(), e))?;
            copied += 1;
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixers::add_weight;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_abs_path_rejects_escaping_paths() {
        let temp_dir = TempDir::new().unwrap();
        let mover = Mover::new(temp_dir.path(), false).unwrap();

        assert_eq!(mover.abs_path("docs").unwrap(), temp_dir.path().join("docs"));
        assert!(mover.abs_path("").is_err());
        assert!(mover.abs_path("../outside").is_err());
        assert!(mover.abs_path("/etc/passwd").is_err());
    }

    #[test]
    fn test_relative_project_root_is_rejected() {
        assert!(Mover::new("relative/root", false).is_err());
    }

    #[test]
    fn test_copy_dir_merges_into_existing_tree() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "docs/a.md", "new a");
        write(root, "docs/nested/b.md", "b");
        write(root, "content/en/docs/a.md", "old a");
        write(root, "content/en/docs/keep.md", "keep");

        let mut mover = Mover::new(root, false).unwrap();
        let copied = mover.copy_dir("docs", "content/en/docs").unwrap();

        assert_eq!(copied, 2);
        assert_eq!(fs::read_to_string(root.join("content/en/docs/a.md")).unwrap(), "new a");
        assert_eq!(fs::read_to_string(root.join("content/en/docs/nested/b.md")).unwrap(), "b");
        assert_eq!(fs::read_to_string(root.join("content/en/docs/keep.md")).unwrap(), "keep");
        assert_eq!(mover.changes().len(), 1);
    }

    #[test]
    fn test_copy_dir_missing_source_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut mover = Mover::new(temp_dir.path(), false).unwrap();

        let err = mover.copy_dir("docs", "content/en/docs").unwrap_err();
        assert!(matches!(err, MigrateError::MissingSource { .. }));
    }

    #[test]
    fn test_move_dir_replaces_target() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "content/en/docs/reference/generated/kubectl.html", "new");
        write(root, "static/reference/generated/stale.html", "stale");

        let mut mover = Mover::new(root, false).unwrap();
        mover
            .move_dir("content/en/docs/reference/generated", "static/reference/generated")
            .unwrap();

        assert!(!root.join("content/en/docs/reference/generated").exists());
        assert!(root.join("static/reference/generated/kubectl.html").exists());
        assert!(!root.join("static/reference/generated/stale.html").exists());
    }

    #[test]
    fn test_rename_content_files_only_touches_matches() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "content/en/docs/index.md", "docs");
        write(root, "content/en/docs/setup/index.md", "setup");
        write(root, "content/en/docs/setup/install.md", "install");
        write(root, "content/en/docs/tasks/_index.md", "tasks");
        write(root, "content/en/docs/tasks/index.html", "html");

        let mut mover = Mover::new(root, false).unwrap();
        let renamed = mover.rename_content_files(r"/index\.md$", "_index.md").unwrap();

        assert_eq!(renamed, 2);
        assert!(root.join("content/en/docs/_index.md").exists());
        assert!(root.join("content/en/docs/setup/_index.md").exists());
        assert!(!root.join("content/en/docs/setup/index.md").exists());
        assert!(root.join("content/en/docs/setup/install.md").exists());
        assert!(root.join("content/en/docs/tasks/index.html").exists());
        assert_eq!(fs::read_to_string(root.join("content/en/docs/tasks/_index.md")).unwrap(), "tasks");
        assert_eq!(mover.changes().len(), 2);
    }

    #[test]
    fn test_trial_mode_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "docs/a.md", "a");
        write(root, "content/en/index.md", "---\ntitle: A\n---\n");

        let mut mover = Mover::new(root, true).unwrap();
        mover.copy_dir("docs", "content/en/docs").unwrap();
        mover.rename_content_files(r"index\.md$", "_index.md").unwrap();
        let outcome = mover
            .replace_in_file_rel("content/en/index.md", &add_weight(10))
            .unwrap();

        assert_eq!(outcome, FileOutcome::Skipped);
        assert!(!root.join("content/en/docs").exists());
        assert!(root.join("content/en/index.md").exists());
        assert_eq!(fs::read_to_string(root.join("content/en/index.md")).unwrap(), "---\ntitle: A\n---\n");
        assert_eq!(mover.changes().len(), 2);
    }

    #[test]
    fn test_failed_fix_keeps_original_content() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "content/en/plain.md", "no front matter here\n");
        write(root, "content/en/page.md", "---\ntitle: Page\n---\n");

        let mut mover = Mover::new(root, false).unwrap();
        let summary = mover.apply_content_fixers(&add_weight(10), r"\.md$").unwrap();

        assert_eq!(summary.changed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(
            fs::read_to_string(root.join("content/en/plain.md")).unwrap(),
            "no front matter here\n"
        );
        assert_eq!(
            fs::read_to_string(root.join("content/en/page.md")).unwrap(),
            "---\ntitle: Page\nweight: 10\n---\n"
        );
    }

    #[test]
    fn test_rel_file_exists() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "content/en/a.md", "a");
        let mover = Mover::new(temp_dir.path(), false).unwrap();

        assert!(mover.rel_file_exists("content/en/a.md").unwrap());
        assert!(!mover.rel_file_exists("content/en/b.md").unwrap());

        // a.md is a file, so stat fails with something other than NotFound
        let err = mover.rel_file_exists("content/en/a.md/child.md").unwrap_err();
        assert!(matches!(err, MigrateError::PathIoError { .. }));
    }

    #[test]
    fn test_copy_dir_into_own_subdirectory_terminates() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "docs/a.md", "a");
        write(root, "docs/nested/b.md", "b");

        let mut mover = Mover::new(root, false).unwrap();
        let copied = mover.copy_dir("docs", "docs/sub").unwrap();

        assert_eq!(copied, 2);
        assert_eq!(fs::read_to_string(root.join("docs/sub/a.md")).unwrap(), "a");
        assert_eq!(fs::read_to_string(root.join("docs/sub/nested/b.md")).unwrap(), "b");
        assert!(!root.join("docs/sub/sub").exists());
    }

    #[test]
    fn test_non_utf8_file_is_a_per_file_failure() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let bytes = b"---\ntitle: \xff\n---\n";
        fs::create_dir_all(root.join("content/en")).unwrap();
        fs::write(root.join("content/en/latin1.md"), bytes).unwrap();

        let mover = Mover::new(root, false).unwrap();
        let summary = mover.apply_content_fixers(&add_weight(10), r"\.md$").unwrap();

        assert_eq!(
            summary,
            FixSummary {
                changed: 0,
                unchanged: 0,
                failed: 1
            }
        );
        assert_eq!(fs::read(root.join("content/en/latin1.md")).unwrap(), bytes);
    }

    #[cfg(unix)]
    #[test]
    fn test_rewrite_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "content/en/run.md", "---\ntitle: Run\n---\n");
        let path = root.join("content/en/run.md");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o750)).unwrap();

        let mover = Mover::new(root, false).unwrap();
        let outcome = mover
            .replace_in_file_rel("content/en/run.md", &add_weight(10))
            .unwrap();

        assert_eq!(outcome, FileOutcome::Changed);
        assert_eq!(fs::read_to_string(&path).unwrap(), "---\ntitle: Run\nweight: 10\n---\n");
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o750);
    }
}
