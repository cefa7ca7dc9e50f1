use ignore::{Walk, WalkBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::cancel::CancelToken;
use crate::config::SearchRequest;
use crate::errors::SearchResult;
use crate::filters::FileFilter;

/// Depth of the files visited by a non-recursive walk: the base directory is
/// depth 0, its subdirectories depth 1, their files depth 2.
const SHALLOW_FILE_DEPTH: usize = 2;

/// One step of a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkItem {
    /// The walk is now producing files from this directory
    Directory(PathBuf),
    /// A file that passed the filename filter
    File(PathBuf),
}

/// Lists candidate files below a base directory.
///
/// A non-recursive walk looks only at files inside the immediate
/// subdirectories of the base; files directly in the base are not visited.
/// A recursive walk covers the whole tree, the base directory included.
/// Hidden files and `.gitignore`-style rules are not honoured: anything on
/// disk with a matching name is a candidate. Symbolic links are followed;
/// link cycles are reported once and skipped.
#[derive(Debug, Clone)]
pub struct FileEnumerator {
    root: PathBuf,
    filter: FileFilter,
    recursive: bool,
}

impl FileEnumerator {
    pub fn new(root: impl Into<PathBuf>, filter: FileFilter, recursive: bool) -> Self {
        Self {
            root: root.into(),
            filter,
            recursive,
        }
    }

    pub fn from_request(request: &SearchRequest) -> SearchResult<Self> {
        Ok(Self::new(
            &request.root_path,
            request.file_filter()?,
            request.recursive,
        ))
    }

    /// Starts a lazy walk that ends early once `cancel` fires
    pub fn walk<'a>(&self, cancel: &'a CancelToken) -> Candidates<'a> {
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false)
            .follow_links(true)
            .sort_by_file_name(|a, b| a.cmp(b));

        if !self.recursive {
            builder.max_depth(Some(SHALLOW_FILE_DEPTH));
        }

        Candidates {
            inner: builder.build(),
            filter: self.filter.clone(),
            recursive: self.recursive,
            cancel,
            current_dir: None,
            pending: None,
        }
    }

    /// Collects the candidates, reporting each directory as it is entered
    pub fn files<F>(&self, cancel: &CancelToken, mut on_directory: F) -> Vec<PathBuf>
    where
        F: FnMut(&Path),
    {
        let mut files = Vec::new();
        for item in self.walk(cancel) {
            match item {
                WalkItem::Directory(dir) => on_directory(&dir),
                WalkItem::File(path) => files.push(path),
            }
        }
        files
    }
}

/// Iterator returned by [`FileEnumerator::walk`]
pub struct Candidates<'a> {
    inner: Walk,
    filter: FileFilter,
    recursive: bool,
    cancel: &'a CancelToken,
    current_dir: Option<PathBuf>,
    pending: Option<PathBuf>,
}

impl Candidates<'_> {
    fn visits_directory(&self, depth: usize) -> bool {
        self.recursive || depth == SHALLOW_FILE_DEPTH - 1
    }

    fn visits_file(&self, depth: usize) -> bool {
        self.recursive || depth == SHALLOW_FILE_DEPTH
    }

    fn enter(&mut self, dir: PathBuf) -> WalkItem {
        debug!("Entering directory: {}", dir.display());
        self.current_dir = Some(dir.clone());
        WalkItem::Directory(dir)
    }
}

impl Iterator for Candidates<'_> {
    type Item = WalkItem;

    fn next(&mut self) -> Option<WalkItem> {
        if self.cancel.is_cancelled() {
            return None;
        }
        if let Some(path) = self.pending.take() {
            return Some(WalkItem::File(path));
        }

        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Skipping unreadable entry: {}", err);
                    continue;
                }
            };
            if self.cancel.is_cancelled() {
                return None;
            }

            let depth = entry.depth();
            let Some(file_type) = entry.file_type() else {
                continue;
            };

            if file_type.is_dir() {
                if self.visits_directory(depth) {
                    return Some(self.enter(entry.into_path()));
                }
                continue;
            }

            if !file_type.is_file()
                || !self.visits_file(depth)
                || !self.filter.should_include_file(entry.path())
            {
                continue;
            }

            // Siblings sorted after a subdirectory come back after its
            // contents, so the parent has to be announced again.
            let path = entry.into_path();
            let reentered = path
                .parent()
                .filter(|parent| self.current_dir.as_deref() != Some(*parent))
                .map(Path::to_path_buf);
            if let Some(parent) = reentered {
                self.pending = Some(path);
                return Some(self.enter(parent));
            }
            return Some(WalkItem::File(path));
        }
    }
}
