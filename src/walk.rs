use ignore::WalkBuilder;
use log::warn;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::inspect::is_archive_path;

/// Exact-match path exclusions, fixed for the duration of one scan.
///
/// A matching directory is pruned with its whole subtree; a matching file
/// is skipped. Paths that merely share a prefix with an entry are kept.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    paths: HashSet<PathBuf>,
}

impl ExclusionSet {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Walks `root` and returns every archive file under it.
///
/// `root` may itself be a file, in which case it is tested directly.
/// Unreadable entries are logged and skipped; one bad entry never aborts
/// the walk.
pub fn find_archives(root: &Path, excludes: &ExclusionSet) -> Vec<PathBuf> {
    if excludes.contains(root) {
        return Vec::new();
    }

    let excludes = excludes.clone();
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .follow_links(false)
        .filter_entry(move |entry| !excludes.contains(entry.path()))
        .build();

    let mut archives = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) => {
                let is_file = entry.file_type().is_some_and(|t| t.is_file());
                if is_file && is_archive_path(entry.path()) {
                    archives.push(entry.path().to_path_buf());
                }
            }
            Err(err) => {
                warn!("skipping unreadable entry under {}: {err}", root.display());
            }
        }
    }
    archives
}
