//! Host filesystem primitives used by dotfile and repository operations.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest as _, Sha256};

use crate::error::DotfileError;

/// How newly created symlinks store their destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkStyle {
    /// Destination relative to the link's parent directory.
    #[default]
    Relative,
    /// Absolute destination path.
    Absolute,
}

/// Whether something (including a dangling symlink) exists at `path`.
#[must_use]
pub fn lexists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Whether `path` itself is a symlink.
#[must_use]
pub fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata()
        .is_ok_and(|meta| meta.file_type().is_symlink())
}

/// Directories that must be created before `path` can be written,
/// outermost first.
#[must_use]
pub fn missing_parents(path: &Path) -> Vec<PathBuf> {
    let mut missing: Vec<PathBuf> = path
        .ancestors()
        .skip(1)
        .take_while(|dir| !dir.as_os_str().is_empty() && !lexists(dir))
        .map(Path::to_path_buf)
        .collect();
    missing.reverse();
    missing
}

/// Create a single directory.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn create_dir(dir: &Path) -> Result<(), DotfileError> {
    fs::create_dir(dir).map_err(DotfileError::io("creating directory", dir))
}

/// The destination string stored in a link at `link` pointing to `target`.
#[must_use]
pub fn link_destination(link: &Path, target: &Path, style: LinkStyle) -> PathBuf {
    match style {
        LinkStyle::Absolute => target.to_path_buf(),
        LinkStyle::Relative => link
            .parent()
            .and_then(|base| pathdiff::diff_paths(target, base))
            .unwrap_or_else(|| target.to_path_buf()),
    }
}

/// Create a symlink at `link` whose stored destination is `destination`.
///
/// # Errors
///
/// Returns an error if the symlink cannot be created.
pub fn create_symlink(destination: &Path, link: &Path) -> Result<(), DotfileError> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(destination, link)
            .map_err(DotfileError::io("creating symlink", link))
    }

    #[cfg(windows)]
    {
        let resolved = link
            .parent()
            .map_or_else(|| destination.to_path_buf(), |p| p.join(destination));
        let result = if resolved.is_dir() {
            std::os::windows::fs::symlink_dir(destination, link)
        } else {
            std::os::windows::fs::symlink_file(destination, link)
        };
        result.map_err(DotfileError::io("creating symlink", link))
    }
}

/// Remove a symlink without touching what it points to.
///
/// On Windows, directory symlinks must be removed with `remove_dir`.
///
/// # Errors
///
/// Returns an error if the link cannot be removed.
pub fn remove_symlink(path: &Path) -> Result<(), DotfileError> {
    let meta = fs::symlink_metadata(path).map_err(DotfileError::io("reading metadata", path))?;
    if is_dir_like(&meta) {
        fs::remove_dir(path).map_err(DotfileError::io("removing symlink", path))
    } else {
        fs::remove_file(path).map_err(DotfileError::io("removing symlink", path))
    }
}

/// Check if metadata represents a directory-like entry.
/// On Windows, `symlink_metadata().is_dir()` returns `false` for directory symlinks,
/// so we check the raw `FILE_ATTRIBUTE_DIRECTORY` bit instead.
fn is_dir_like(meta: &fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt as _;
        meta.file_attributes() & 0x10 != 0
    }
    #[cfg(not(windows))]
    {
        meta.is_dir()
    }
}

/// Move `from` to `to`, copying then deleting when a rename would cross
/// filesystems.
///
/// # Errors
///
/// Returns an error if neither the rename nor the copy fallback succeeds.
pub fn move_path(from: &Path, to: &Path) -> Result<(), DotfileError> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            let meta = fs::symlink_metadata(from).map_err(DotfileError::io("reading metadata", from))?;
            if meta.is_dir() {
                copy_dir_recursive(from, to)?;
                fs::remove_dir_all(from).map_err(DotfileError::io("removing directory", from))
            } else {
                copy_entry(from, to, &meta)?;
                fs::remove_file(from).map_err(DotfileError::io("removing file", from))
            }
        }
        Err(e) => Err(DotfileError::io("moving", from)(e)),
    }
}

/// Recursively copy a directory tree, recreating symlinks rather than
/// following them.
///
/// # Errors
///
/// Returns an error if the destination directory cannot be created, a source
/// entry cannot be read, or a file cannot be copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), DotfileError> {
    fs::create_dir_all(dst).map_err(DotfileError::io("creating directory", dst))?;
    for entry in fs::read_dir(src).map_err(DotfileError::io("reading directory", src))? {
        let entry = entry.map_err(DotfileError::io("reading entry in", src))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        let meta =
            fs::symlink_metadata(&src_path).map_err(DotfileError::io("reading metadata", &src_path))?;
        if meta.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            copy_entry(&src_path, &dst_path, &meta)?;
        }
    }
    Ok(())
}

fn copy_entry(src: &Path, dst: &Path, meta: &fs::Metadata) -> Result<(), DotfileError> {
    if meta.file_type().is_symlink() {
        let destination = fs::read_link(src).map_err(DotfileError::io("reading symlink", src))?;
        create_symlink(&destination, dst)
    } else {
        fs::copy(src, dst)
            .map(|_| ())
            .map_err(DotfileError::io("copying", src))
    }
}

/// Whether `a` and `b` resolve to the same file once all symlinks are
/// followed. Paths that cannot be resolved are never equal.
#[must_use]
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (dunce::canonicalize(a), dunce::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Whether two regular files hold byte-identical content.
///
/// # Errors
///
/// Returns an error if either file cannot be read.
pub fn same_content(a: &Path, b: &Path) -> io::Result<bool> {
    if fs::metadata(a)?.len() != fs::metadata(b)?.len() {
        return Ok(false);
    }
    Ok(sha256_file(a)? == sha256_file(b)?)
}

/// Compute the SHA-256 hex digest of a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect())
}
