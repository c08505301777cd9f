//! Path resolution against the catalog root.
//!
//! Paths are normalized lexically (`.` and `..` folded, symlinks untouched),
//! so a catalog entry can be resolved before its file exists.

use crate::config::InspectConfig;
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};
use url::Url;

/// Make `path` absolute against the current directory, folding `.` and `..`.
pub fn absolute_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    match path.absolutize() {
        Ok(abs) => abs.into_owned(),
        Err(_) => path.to_path_buf(),
    }
}

/// Resolve `path` against `root` into an absolute, normalized path.
///
/// Absolute inputs ignore `root`.
pub fn normalize_absolute_path(root: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        absolute_path(path)
    } else {
        absolute_path(root.join(path))
    }
}

/// Express `path` relative to `root` when it lives under it.
///
/// Paths outside the root are returned absolute; the catalog accepts both.
pub fn relative_to_root(root: &Path, path: &Path) -> String {
    let root = normalize_absolute_path(root, "");
    let path = normalize_absolute_path(&root, path);
    path.strip_prefix(&root)
        .unwrap_or(&path)
        .to_string_lossy()
        .into_owned()
}

/// Build a `file://` URI for a local path.
///
/// Falls back to plain string construction when the path cannot be encoded
/// as a URL.
pub fn to_file_uri(path: &Path) -> String {
    let abs = match path.absolutize() {
        Ok(abs) => abs.to_path_buf(),
        Err(_) => path.to_path_buf(),
    };
    match Url::from_file_path(&abs) {
        Ok(url) => url.to_string(),
        Err(()) => {
            let raw = abs.to_string_lossy().replace('\\', "/");
            if raw.starts_with('/') {
                format!("file://{}", raw)
            } else {
                format!("file:///{}", raw)
            }
        }
    }
}

/// File size in MiB, or 0.0 when the file cannot be read.
pub fn file_size_mb(path: impl AsRef<Path>) -> f64 {
    std::fs::metadata(path)
        .map(|m| m.len() as f64 / InspectConfig::BYTES_PER_MB)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    #[test]
    fn test_normalize_absolute_path() {
        let root = Path::new("/root");
        assert_eq!(
            normalize_absolute_path(root, "sub/a.png"),
            PathBuf::from("/root/sub/a.png")
        );
        assert_eq!(
            normalize_absolute_path(root, "/abs/a.png"),
            PathBuf::from("/abs/a.png")
        );
        assert_eq!(
            normalize_absolute_path(root, "sub/../other/./b.txt"),
            PathBuf::from("/root/other/b.txt")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_to_root() {
        let root = Path::new("/srv/hub");
        assert_eq!(
            relative_to_root(root, Path::new("/srv/hub/img/a.png")),
            "img/a.png"
        );
        assert_eq!(relative_to_root(root, Path::new("/etc/passwd")), "/etc/passwd");
    }

    #[cfg(unix)]
    #[test]
    fn test_to_file_uri() {
        assert_eq!(to_file_uri(Path::new("/srv/hub/a.png")), "file:///srv/hub/a.png");
        assert_eq!(
            to_file_uri(Path::new("/srv/hub/my file.txt")),
            "file:///srv/hub/my%20file.txt"
        );
    }

    #[test]
    fn test_absolute_path_uses_current_dir_once() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolute_path("hub/./a.png"), cwd.join("hub").join("a.png"));
        assert_eq!(absolute_path(cwd.join("hub")), cwd.join("hub"));
    }

    #[test]
    fn test_file_size_mb() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("half.bin");
        std::fs::write(&path, vec![0u8; 524_288]).unwrap();
        assert!((file_size_mb(&path) - 0.5).abs() < f64::EPSILON);
        assert_eq!(file_size_mb(temp_dir.path().join("missing")), 0.0);
    }
}
