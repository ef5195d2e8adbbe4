use std::fs;
use std::io;
use std::path::Path;

/// Create the parent directory of `path` (and its ancestors) if missing.
///
/// A bare file name has no parent to create.
pub(crate) fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
