//! Git branch lookup without spawning a subprocess.
//!
//! The statusline sits in a latency-sensitive refresh loop, so we read
//! `.git/HEAD` directly instead of shelling out to git. Any failure along
//! the way degrades to None and the branch segment is simply omitted.

use std::path::{Path, PathBuf};

use fs_err as fs;

/// Returns the current branch for the repository containing `dir`, walking
/// up parent directories to find the repository root.
///
/// A symbolic ref yields the branch name; a detached HEAD yields the short
/// commit hash.
pub fn current_branch(dir: &str) -> Option<String> {
    if dir.is_empty() {
        return None;
    }

    let mut current = Some(Path::new(dir));
    while let Some(path) = current {
        let git_path = path.join(".git");
        if git_path.exists() {
            return read_head(&git_dir(&git_path)?);
        }
        current = path.parent();
    }
    None
}

/// Resolves `.git` to the actual git directory. Worktrees and submodules
/// use a `.git` file containing a `gitdir:` pointer instead of a directory.
fn git_dir(git_path: &Path) -> Option<PathBuf> {
    if git_path.is_dir() {
        return Some(git_path.to_path_buf());
    }
    let content = fs::read_to_string(git_path).ok()?;
    let target = content.trim().strip_prefix("gitdir:")?.trim();
    Some(PathBuf::from(target))
}

fn read_head(git_dir: &Path) -> Option<String> {
    let head = fs::read_to_string(git_dir.join("HEAD")).ok()?;
    let head = head.trim();

    if let Some(reference) = head.strip_prefix("ref:") {
        let name = reference.trim().strip_prefix("refs/heads/")?;
        if name.is_empty() {
            return None;
        }
        return Some(name.to_string());
    }

    // Detached HEAD: the file holds a commit hash.
    if head.len() >= 7 && head.chars().all(|c| c.is_ascii_hexdigit()) {
        return Some(head[..7].to_string());
    }
    None
}
