//! The durable settings file: a JSON object mapping setting name → value.
//!
//! Reading collects every problem it finds into a list instead of stopping
//! at the first. Writing is crash-safe: serialize to a temporary sibling
//! path, then rename it over the real file, so readers never observe a
//! partially written file and a failure at any step leaves the previous
//! file untouched. Pure path-in, data-out functions; the manager owns path
//! selection and the backup-suffix convention.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::value::SettingsValue;

pub type SettingsMap = BTreeMap<String, SettingsValue>;

/// Append a literal suffix to a path (`settings.json` → `settings.json.tmp`).
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut joined = OsString::from(path.as_os_str());
    joined.push(suffix);
    PathBuf::from(joined)
}

/// Read the settings file at `path`. A missing file is an empty store; any
/// other failure returns the full list of problems found.
pub fn read_settings(path: &Path) -> Result<SettingsMap, Vec<String>> {
    if !path.exists() {
        return Ok(SettingsMap::new());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| vec![format!("Failed reading settings file {}: {e}", path.display())])?;
    let parsed: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| vec![format!("Unable to parse settings file {}: {e}", path.display())])?;
    let serde_json::Value::Object(object) = parsed else {
        return Err(vec![format!(
            "Found non-object value in settings file {}",
            path.display()
        )]);
    };

    let mut values = SettingsMap::new();
    let mut errors = Vec::new();
    for (key, value) in object {
        match SettingsValue::from_json(value) {
            Ok(value) => {
                values.insert(key, value);
            }
            Err(reason) => errors.push(format!(
                "Invalid setting {key} in {}: {reason}",
                path.display()
            )),
        }
    }

    if errors.is_empty() { Ok(values) } else { Err(errors) }
}

/// Serialize `values` to `path` as pretty-printed JSON. This writes in
/// place; callers wanting atomic replacement write to a temporary path and
/// [`rename_over`] the real one.
pub fn write_settings(path: &Path, values: &SettingsMap) -> Result<(), Vec<String>> {
    let mut content = serde_json::to_string_pretty(values)
        .map_err(|e| vec![format!("Failed serializing settings: {e}")])?;
    content.push('\n');

    fs::write(path, content)
        .map_err(|e| vec![format!("Failed writing settings file {}: {e}", path.display())])
}

/// Atomically replace `path` with `tmp_path`.
pub fn rename_over(tmp_path: &Path, path: &Path) -> Result<(), Vec<String>> {
    fs::rename(tmp_path, path).map_err(|e| {
        vec![format!(
            "Failed renaming settings file {} to {}: {e}",
            tmp_path.display(),
            path.display()
        )]
    })
}
