//! Path helpers: the platform default data directory and the normalization
//! applied to path-valued settings.

use std::path::{Path, PathBuf};

/// Platform default data directory for `app_name`: the OS data dir
/// (`~/.local/share` on Linux, `~/Library/Application Support` on macOS,
/// `AppData\Roaming` on Windows) joined with the app name. Falls back to the
/// filesystem root when no home directory can be determined.
pub fn default_data_dir(app_name: &str) -> PathBuf {
    match directories::BaseDirs::new() {
        Some(dirs) => dirs.data_dir().join(app_name),
        None => PathBuf::from("/"),
    }
}

/// Normalize a path-valued setting: strip trailing separators unless the
/// whole path is a root.
pub fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() && !raw.is_empty() {
        // "/", "//", ... — the root itself.
        return PathBuf::from(&raw[..1]);
    }
    PathBuf::from(trimmed)
}

/// Absolute form of `path`, resolved against the current directory without
/// touching the filesystem.
pub fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
