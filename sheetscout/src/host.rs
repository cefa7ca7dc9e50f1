use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{SearchError, SearchResult};

/// Hands `target` to `launch` once it is known to exist
fn hand_off<F>(target: &Path, launch: F) -> SearchResult<()>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    if !target.exists() {
        return Err(SearchError::file_not_found(target));
    }
    launch(target).map_err(|e| SearchError::from_io(target, e))
}

/// Opens `path` with the application registered for its type
pub fn open_with_default_app(path: &Path) -> SearchResult<()> {
    debug!("Opening {}", path.display());
    hand_off(path, |target| open::that(target))
}

/// Folder shown when a result for `path` is activated
pub fn containing_folder(path: &Path) -> PathBuf {
    if path.is_dir() {
        return path.to_path_buf();
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Opens the folder that contains `path` in the file manager
pub fn reveal_in_file_manager(path: &Path) -> SearchResult<()> {
    let folder = containing_folder(path);
    debug!("Revealing {}", folder.display());
    hand_off(&folder, |target| open::that(target))
}
