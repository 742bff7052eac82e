//! The settings manager: one explicitly constructed value owning the
//! argument registry, the four-layer settings store, the active network
//! name, and the derived-path cache.
//!
//! There is no hidden global. Construct a [`SettingsManager`] at startup,
//! register every argument, then pass the manager by reference to each
//! consumer. Every public operation takes the single internal lock for its
//! duration — the containers' invariants are cross-cutting (the path cache
//! depends on resolved settings), so one coarse lock guards them all.
//! Nothing holds the lock across anything slower than the synchronous file
//! read or write itself, and there is no cross-process coordination: two
//! processes sharing a settings path can race.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use crate::config_file::{self, ConfigLine, SectionInfo};
use crate::error::ArgsError;
use crate::network;
use crate::parse::{self, setting_name};
use crate::paths;
use crate::persist;
use crate::registry::{ArgCategory, Registry, flags};
use crate::store::{self, LookupOptions, Settings};
use crate::value::{SettingsValue, interpret_bool};

/// Default file name of the persisted read/write settings store, relative
/// to the network-specific data directory.
pub const SETTINGS_FILENAME: &str = "settings.json";

pub struct SettingsManager {
    inner: Mutex<Inner>,
}

struct Inner {
    app_name: String,
    registry: Registry,
    settings: Settings,
    network: String,
    config_sections: Vec<SectionInfo>,
    cached_datadir: Option<PathBuf>,
    cached_network_datadir: Option<PathBuf>,
    cached_blocks_dir: Option<PathBuf>,
}

impl SettingsManager {
    /// `app_name` names the platform default data directory used when no
    /// `-datadir` override is set.
    pub fn new(app_name: &str) -> Self {
        Self {
            inner: Mutex::new(Inner {
                app_name: app_name.to_string(),
                registry: Registry::default(),
                settings: Settings::default(),
                network: String::new(),
                config_sections: Vec::new(),
                cached_datadir: None,
                cached_network_datadir: None,
                cached_blocks_dir: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // --- Registration ---

    /// Register one argument. See [`Registry::register`] for the name
    /// grammar; duplicate registration panics.
    pub fn register_arg(&self, name: &str, help: &str, arg_flags: u32, category: ArgCategory) {
        self.lock().registry.register(name, help, arg_flags, category);
    }

    /// Register a batch of names that accept anything and show no help.
    pub fn register_hidden_args(&self, names: &[&str]) {
        self.lock().registry.register_hidden(names);
    }

    // --- Command line ---

    /// Parse command-line tokens (without the program name) into the store.
    ///
    /// The previous command-line layer is cleared first, so a failed batch
    /// leaves no partial state. Parsing stops without error at the first
    /// token that is not an option: a bare `-` or anything without the
    /// marker prefix — the remaining tokens belong to the caller.
    pub fn parse_parameters<I, S>(&self, tokens: I) -> Result<(), ArgsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inner = self.lock();
        inner.settings.command_line.clear();

        for token in tokens {
            let token = token.as_ref();
            if token == "-" {
                break;
            }
            let Some((key, value)) = parse::parse_key_value(token) else {
                break;
            };

            let option = parse::interpret_option(setting_name(&key), value.as_deref());

            // Section-qualified keys are config-file-only, and unknown keys
            // are rejected outright.
            if option.section.is_some() {
                return Err(ArgsError::InvalidParameter {
                    token: token.to_string(),
                });
            }
            let Some(flag_bits) = inner.registry.flags_of(&option.key) else {
                return Err(ArgsError::InvalidParameter {
                    token: token.to_string(),
                });
            };
            if option.value.is_bool() && flag_bits & flags::ALLOW_BOOL == 0 {
                return Err(ArgsError::NegationForbidden { key: option.key });
            }

            inner
                .settings
                .command_line
                .entry(option.key)
                .or_default()
                .push(option.value);
        }

        // -includeconf is config-file-only. The check runs after the full
        // batch so the error can name every supplied value.
        let includes: Vec<String> = inner
            .settings
            .command_line
            .get("includeconf")
            .map(|values| {
                values
                    .iter()
                    .filter_map(|value| match value {
                        SettingsValue::Str(s) => Some(s.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        if !includes.is_empty() {
            return Err(ArgsError::IncludeConfFromCommandLine { values: includes });
        }
        Ok(())
    }

    // --- Config file ---

    /// Parse config-file `content` and merge it into the store. Section
    /// headers are collected for [`unrecognized_sections`](Self::unrecognized_sections);
    /// unknown keys are errors unless `ignore_invalid_keys` downgrades them
    /// to a logged diagnostic.
    pub fn read_config_string(
        &self,
        content: &str,
        file_name: &str,
        ignore_invalid_keys: bool,
    ) -> Result<(), ArgsError> {
        let (lines, sections) = config_file::read_config(content, file_name)?;
        self.merge_config_lines(lines, sections, ignore_invalid_keys)
    }

    /// Merge pre-parsed config entries, for callers substituting their own
    /// reader.
    pub fn merge_config_lines(
        &self,
        lines: Vec<ConfigLine>,
        sections: Vec<SectionInfo>,
        ignore_invalid_keys: bool,
    ) -> Result<(), ArgsError> {
        let mut inner = self.lock();
        inner.config_sections.extend(sections);

        for line in lines {
            let option = parse::interpret_option(&line.name, line.value.as_deref());
            let Some(flag_bits) = inner.registry.flags_of(&option.key) else {
                if ignore_invalid_keys {
                    warn!("Ignoring unknown configuration value {}", line.name);
                    continue;
                }
                return Err(ArgsError::InvalidParameter { token: line.name });
            };
            if option.value.is_bool() && flag_bits & flags::ALLOW_BOOL == 0 {
                return Err(ArgsError::NegationForbidden { key: option.key });
            }

            inner
                .settings
                .config_by_section
                .entry(option.section.unwrap_or_default())
                .or_default()
                .entry(option.key)
                .or_default()
                .push(option.value);
        }
        Ok(())
    }

    /// Select which config-file section is active for resolution.
    pub fn select_network(&self, network: &str) {
        self.lock().network = network.to_string();
    }

    pub fn network(&self) -> String {
        self.lock().network.clone()
    }

    // --- Resolution ---

    /// The effective value of `name`, or `Null` when unset anywhere.
    pub fn get_setting(&self, name: &str) -> SettingsValue {
        self.lock().get_setting(name)
    }

    /// The full ordered value list of `name` for multi-valued settings.
    pub fn get_settings_list(&self, name: &str) -> Vec<SettingsValue> {
        let inner = self.lock();
        let bare = setting_name(name);
        store::get_settings_list(
            &inner.settings,
            &inner.network,
            bare,
            !inner.use_default_section(bare),
        )
    }

    /// What `name` would resolve to from persistent sources only (config
    /// file and the read/write store — what survives a restart).
    pub fn persistent_setting(&self, name: &str) -> SettingsValue {
        let inner = self.lock();
        let bare = setting_name(name);
        store::get_setting(
            &inner.settings,
            &inner.network,
            bare,
            LookupOptions {
                ignore_default_section: !inner.use_default_section(bare),
                ignore_nonpersistent: true,
                chain_name_mode: false,
            },
        )
    }

    pub fn is_arg_set(&self, name: &str) -> bool {
        !self.get_setting(name).is_null()
    }

    /// Whether `name` was negated (`-noname`). Negating an option that is
    /// not normally boolean is how callers disable it entirely.
    pub fn is_arg_negated(&self, name: &str) -> bool {
        self.get_setting(name).is_false()
    }

    pub fn get_arg(&self, name: &str) -> Option<String> {
        self.get_setting(name).to_setting_string()
    }

    pub fn get_arg_or(&self, name: &str, default: &str) -> String {
        self.get_arg(name).unwrap_or_else(|| default.to_string())
    }

    pub fn get_int_arg(&self, name: &str) -> Option<i64> {
        self.get_setting(name).to_setting_int()
    }

    pub fn get_int_arg_or(&self, name: &str, default: i64) -> i64 {
        self.get_int_arg(name).unwrap_or(default)
    }

    pub fn get_bool_arg(&self, name: &str) -> Option<bool> {
        self.get_setting(name).to_setting_bool()
    }

    pub fn get_bool_arg_or(&self, name: &str, default: bool) -> bool {
        self.get_bool_arg(name).unwrap_or(default)
    }

    /// Every value of a multi-valued setting as strings, booleans mapped to
    /// `"0"`/`"1"`.
    pub fn get_args(&self, name: &str) -> Vec<String> {
        self.get_settings_list(name)
            .iter()
            .filter_map(SettingsValue::to_setting_string)
            .collect()
    }

    /// A path-valued setting: trailing separators are stripped unless the
    /// result is a root, a negated setting is an empty path, and an unset
    /// one is `default` unchanged.
    pub fn get_path_arg(&self, name: &str, default: &Path) -> PathBuf {
        self.lock().get_path(name, default)
    }

    // --- Mutation ---

    /// Set `name` unless it already resolves to something. Returns whether
    /// the value was written.
    pub fn soft_set_arg(&self, name: &str, value: &str) -> bool {
        let mut inner = self.lock();
        if !inner.get_setting(name).is_null() {
            return false;
        }
        inner.force_set(name, SettingsValue::Str(value.to_string()));
        true
    }

    pub fn soft_set_bool_arg(&self, name: &str, value: bool) -> bool {
        self.soft_set_arg(name, if value { "1" } else { "0" })
    }

    /// Unconditionally override `name` above every other source.
    pub fn force_set_arg(&self, name: &str, value: &str) {
        self.lock()
            .force_set(name, SettingsValue::Str(value.to_string()));
    }

    /// Multi-valued forced override.
    pub fn force_set_multi_arg(&self, name: &str, values: &[&str]) {
        let list = values
            .iter()
            .map(|v| SettingsValue::Str((*v).to_string()))
            .collect();
        self.lock().force_set(name, SettingsValue::List(list));
    }

    pub fn clear_forced_arg(&self, name: &str) {
        self.lock().settings.forced.remove(setting_name(name));
    }

    /// Write a value into the read/write store. Becomes durable on the next
    /// [`save_settings`](Self::save_settings).
    pub fn set_persistent_setting(&self, name: &str, value: SettingsValue) {
        self.lock()
            .settings
            .persisted_rw
            .insert(setting_name(name).to_string(), value);
    }

    pub fn clear_persistent_setting(&self, name: &str) {
        self.lock().settings.persisted_rw.remove(setting_name(name));
    }

    // --- Persistence ---

    /// Path of the durable settings file, or `None` when persistence is
    /// disabled with `-nosettings`.
    pub fn settings_path(&self) -> Result<Option<PathBuf>, ArgsError> {
        self.lock().settings_path(false, false)
    }

    /// Replace the read/write store with the durable file's contents. A
    /// missing file or disabled persistence leaves the store empty and
    /// succeeds; a corrupt file leaves the store empty and reports every
    /// error found. Loaded keys unknown to the registry warn but are kept.
    pub fn load_settings(&self) -> Result<(), ArgsError> {
        self.lock().load_settings()
    }

    /// Persist the read/write store: write a temporary sibling file, then
    /// rename it over the real one, so a failure at either step leaves the
    /// previous file untouched.
    ///
    /// # Panics
    ///
    /// Panics when persistence is disabled — saving after `-nosettings` is
    /// a programming error, not a recoverable condition.
    pub fn save_settings(&self) -> Result<(), ArgsError> {
        self.lock().write_settings_file(false)
    }

    /// Like [`save_settings`](Self::save_settings), writing the `.bak`
    /// sibling instead.
    pub fn backup_settings(&self) -> Result<(), ArgsError> {
        self.lock().write_settings_file(true)
    }

    /// Startup convenience: create the data directories, then load and
    /// rewrite the settings file so it is normalized on disk.
    pub fn init_settings(&self) -> Result<(), ArgsError> {
        let mut inner = self.lock();
        inner.ensure_data_dir()?;
        if inner.settings_path(false, false)?.is_none() {
            return Ok(());
        }
        inner.load_settings()?;
        inner.write_settings_file(false)
    }

    /// Create both data directory flavors if missing.
    pub fn ensure_data_dir(&self) -> Result<(), ArgsError> {
        self.lock().ensure_data_dir()
    }

    // --- Paths ---

    /// The data directory, resolved once per flavor and cached. A `-datadir`
    /// override must name an existing directory.
    pub fn data_dir(&self, net_specific: bool) -> Result<PathBuf, ArgsError> {
        self.lock().data_dir(net_specific)
    }

    /// The blocks directory, created on first resolution so callers can
    /// write into it immediately.
    pub fn blocks_dir(&self) -> Result<PathBuf, ArgsError> {
        self.lock().blocks_dir()
    }

    /// Drop every cached path so the next query re-resolves.
    pub fn clear_path_cache(&self) {
        let mut inner = self.lock();
        inner.cached_datadir = None;
        inner.cached_network_datadir = None;
        inner.cached_blocks_dir = None;
    }

    // --- Network selection ---

    /// The chain selected by `-regtest`/`-testnet`/`-chain`, defaulting to
    /// the primary network. Setting more than one selector is a fatal
    /// configuration conflict, reported before anything else resolves.
    pub fn chain_name(&self) -> Result<String, ArgsError> {
        let inner = self.lock();
        let get_net = |arg: &str| {
            let value = store::get_setting(
                &inner.settings,
                "",
                setting_name(arg),
                LookupOptions {
                    chain_name_mode: true,
                    ..Default::default()
                },
            );
            match value {
                SettingsValue::Null => false,
                SettingsValue::Bool(b) => b,
                SettingsValue::Num(n) => n != 0,
                SettingsValue::Str(ref s) => interpret_bool(s),
                SettingsValue::List(_) => false,
            }
        };

        let regtest = get_net("-regtest");
        let testnet = get_net("-testnet");
        let chain_arg_set = !inner.get_setting("-chain").is_null();

        if usize::from(regtest) + usize::from(testnet) + usize::from(chain_arg_set) > 1 {
            return Err(ArgsError::ChainSelectionConflict);
        }
        if regtest {
            return Ok(network::REGTEST.to_string());
        }
        if testnet {
            return Ok(network::TESTNET.to_string());
        }
        Ok(inner
            .get_setting("-chain")
            .to_setting_string()
            .unwrap_or_else(|| network::MAIN.to_string()))
    }

    // --- Diagnostics ---

    /// Config-file sections outside the recognized set, with provenance.
    pub fn unrecognized_sections(&self) -> Vec<SectionInfo> {
        self.lock()
            .config_sections
            .iter()
            .filter(|section| !network::KNOWN_SECTIONS.contains(&section.name.as_str()))
            .cloned()
            .collect()
    }

    /// Network-only settings found only in the default config section while
    /// a non-primary network is active — a portability warning: those
    /// values are invisible to the active network.
    pub fn unsuitable_section_only_args(&self) -> BTreeSet<String> {
        let inner = self.lock();
        if inner.network.is_empty() || inner.network == network::MAIN {
            return BTreeSet::new();
        }
        inner
            .registry
            .network_only()
            .iter()
            .filter(|name| {
                store::only_has_default_section_setting(&inner.settings, &inner.network, name)
            })
            .cloned()
            .collect()
    }

    /// Log every recognized setting per source. `SENSITIVE` values are
    /// redacted.
    pub fn log_args(&self) {
        let inner = self.lock();
        let shown = |name: &str, value: &SettingsValue| {
            match inner.registry.flags_of(name) {
                Some(bits) if bits & flags::SENSITIVE != 0 => Some("****".to_string()),
                Some(_) => Some(value.to_string()),
                None => None,
            }
        };

        for (section, args) in &inner.settings.config_by_section {
            for (name, values) in args {
                for value in values {
                    if let Some(text) = shown(name, value) {
                        if section.is_empty() {
                            info!("Config file arg: {name}={text}");
                        } else {
                            info!("Config file arg: [{section}] {name}={text}");
                        }
                    }
                }
            }
        }
        for (name, value) in &inner.settings.persisted_rw {
            info!("Setting file arg: {name} = {value}");
        }
        for (name, values) in &inner.settings.command_line {
            for value in values {
                if let Some(text) = shown(name, value) {
                    info!("Command-line arg: {name}={text}");
                }
            }
        }
    }
}

impl Inner {
    fn use_default_section(&self, name: &str) -> bool {
        self.network == network::MAIN || !self.registry.network_only().contains(name)
    }

    fn get_setting(&self, arg: &str) -> SettingsValue {
        let name = setting_name(arg);
        store::get_setting(
            &self.settings,
            &self.network,
            name,
            LookupOptions {
                ignore_default_section: !self.use_default_section(name),
                ..Default::default()
            },
        )
    }

    fn is_set(&self, arg: &str) -> bool {
        !self.get_setting(arg).is_null()
    }

    fn get_path(&self, arg: &str, default: &Path) -> PathBuf {
        let value = self.get_setting(arg);
        if value.is_false() {
            return PathBuf::new();
        }
        let text = value.to_setting_string().unwrap_or_default();
        if text.is_empty() {
            return default.to_path_buf();
        }
        paths::normalize_path(&text)
    }

    fn force_set(&mut self, arg: &str, value: SettingsValue) {
        self.settings
            .forced
            .insert(setting_name(arg).to_string(), value);
    }

    fn data_dir(&mut self, net_specific: bool) -> Result<PathBuf, ArgsError> {
        let cached = if net_specific {
            &self.cached_network_datadir
        } else {
            &self.cached_datadir
        };
        if let Some(path) = cached {
            return Ok(path.clone());
        }

        let override_dir = self.get_path("-datadir", Path::new(""));
        let mut path = if override_dir.as_os_str().is_empty() {
            paths::default_data_dir(&self.app_name)
        } else {
            let absolute = paths::absolute(&override_dir);
            if !absolute.is_dir() {
                return Err(ArgsError::DataDirNotFound { path: absolute });
            }
            absolute
        };

        if net_specific {
            let subdir = network::data_subdir(&self.network);
            if !subdir.is_empty() {
                path.push(subdir);
            }
        }

        // Failures are not cached: a later call may succeed once the
        // directory exists or the override changes.
        if net_specific {
            self.cached_network_datadir = Some(path.clone());
        } else {
            self.cached_datadir = Some(path.clone());
        }
        Ok(path)
    }

    fn blocks_dir(&mut self) -> Result<PathBuf, ArgsError> {
        if let Some(path) = &self.cached_blocks_dir {
            return Ok(path.clone());
        }

        let mut path = if self.is_set("-blocksdir") {
            let override_dir = paths::absolute(&self.get_path("-blocksdir", Path::new("")));
            if !override_dir.is_dir() {
                return Err(ArgsError::BlocksDirNotFound { path: override_dir });
            }
            override_dir
        } else {
            self.data_dir(false)?
        };

        let subdir = network::data_subdir(&self.network);
        if !subdir.is_empty() {
            path.push(subdir);
        }
        path.push("blocks");

        fs::create_dir_all(&path).map_err(|e| ArgsError::IoError {
            path: path.clone(),
            source: e,
        })?;

        self.cached_blocks_dir = Some(path.clone());
        Ok(path)
    }

    fn ensure_data_dir(&mut self) -> Result<(), ArgsError> {
        for net_specific in [false, true] {
            let path = self.data_dir(net_specific)?;
            if !path.exists() {
                fs::create_dir_all(&path).map_err(|e| ArgsError::IoError {
                    path: path.clone(),
                    source: e,
                })?;
            }
        }
        Ok(())
    }

    fn settings_path(&mut self, temp: bool, backup: bool) -> Result<Option<PathBuf>, ArgsError> {
        let mut file = self.get_path("-settings", Path::new(SETTINGS_FILENAME));
        if file.as_os_str().is_empty() {
            return Ok(None); // -nosettings: persistence disabled
        }
        if backup {
            file = persist::with_suffix(&file, ".bak");
        }
        if temp {
            file = persist::with_suffix(&file, ".tmp");
        }
        let base = self.data_dir(true)?;
        Ok(Some(base.join(file)))
    }

    fn load_settings(&mut self) -> Result<(), ArgsError> {
        let Some(path) = self.settings_path(false, false)? else {
            return Ok(());
        };
        self.settings.persisted_rw.clear();

        let values = persist::read_settings(&path)
            .map_err(|errors| ArgsError::SettingsRead { errors })?;
        for key in values.keys() {
            // Split off any section prefix before the registry lookup, the
            // same way a config-file key is interpreted.
            let option = parse::interpret_option(key, None);
            if self.registry.flags_of(&option.key).is_none() {
                warn!("Ignoring unknown setting {key} in settings file");
            }
        }
        self.settings.persisted_rw = values;
        Ok(())
    }

    fn write_settings_file(&mut self, backup: bool) -> Result<(), ArgsError> {
        let path = self.settings_path(false, backup)?;
        let tmp_path = self.settings_path(true, backup)?;
        let (Some(path), Some(tmp_path)) = (path, tmp_path) else {
            panic!("attempt to write the settings file while dynamic settings are disabled");
        };

        persist::write_settings(&tmp_path, &self.settings.persisted_rw)
            .map_err(|errors| ArgsError::SettingsWrite { errors })?;
        persist::rename_over(&tmp_path, &path)
            .map_err(|errors| ArgsError::SettingsWrite { errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::manager;
    use crate::value::SettingsValue::{Bool, Str};
    use tempfile::TempDir;

    fn parse(args: &SettingsManager, tokens: &[&str]) {
        args.parse_parameters(tokens).unwrap();
    }

    // --- Command-line parsing ---

    #[test]
    fn plain_option_resolves_to_empty_string() {
        let args = manager();
        parse(&args, &["-verbose"]);
        assert!(args.is_arg_set("-verbose"));
        assert_eq!(args.get_arg("-verbose").unwrap(), "");
        assert!(args.get_bool_arg_or("-verbose", false));
    }

    #[test]
    fn value_option_resolves_to_its_text() {
        let args = manager();
        parse(&args, &["-port=8555"]);
        assert_eq!(args.get_arg_or("-port", ""), "8555");
        assert_eq!(args.get_int_arg_or("-port", 0), 8555);
    }

    #[test]
    fn double_marker_is_normalized() {
        let args = manager();
        parse(&args, &["--port=8555"]);
        assert_eq!(args.get_int_arg_or("-port", 0), 8555);
    }

    #[test]
    fn repeated_option_keeps_every_occurrence_last_wins() {
        let args = manager();
        parse(&args, &["-connect=a", "-connect=b"]);
        assert_eq!(args.get_arg_or("-connect", ""), "b");
        assert_eq!(args.get_args("-connect"), vec!["a", "b"]);
    }

    #[test]
    fn negation_yields_false() {
        let args = manager();
        parse(&args, &["-noverbose"]);
        assert!(args.is_arg_negated("-verbose"));
        assert!(!args.get_bool_arg_or("-verbose", true));
        assert_eq!(args.get_arg("-verbose").unwrap(), "0");
    }

    #[test]
    fn double_negation_yields_true() {
        let args = manager();
        parse(&args, &["-noverbose=0"]);
        assert!(!args.is_arg_negated("-verbose"));
        assert!(args.get_bool_arg_or("-verbose", false));
    }

    #[test]
    fn negation_forbidden_without_allow_bool() {
        let args = manager();
        args.register_arg(
            "-strict=<n>",
            "",
            flags::ALLOW_INT,
            ArgCategory::DebugTest,
        );
        let result = args.parse_parameters(["-nostrict"]);
        assert!(matches!(
            result,
            Err(ArgsError::NegationForbidden { key }) if key == "strict"
        ));
    }

    #[test]
    fn unknown_option_is_invalid() {
        let args = manager();
        let result = args.parse_parameters(["-bogus=1"]);
        assert!(matches!(
            result,
            Err(ArgsError::InvalidParameter { token }) if token == "-bogus=1"
        ));
    }

    #[test]
    fn section_qualified_option_is_invalid_even_for_known_names() {
        let args = manager();
        let result = args.parse_parameters(["-main.port=1"]);
        assert!(matches!(result, Err(ArgsError::InvalidParameter { .. })));

        // Even when the part before the dot is itself a registered name.
        let result = args.parse_parameters(["-port.verbose=1"]);
        assert!(matches!(result, Err(ArgsError::InvalidParameter { .. })));
    }

    #[test]
    fn failed_batch_leaves_no_command_line_state() {
        let args = manager();
        parse(&args, &["-port=1"]);
        assert!(args.is_arg_set("-port"));
        // The container is cleared up front, so the earlier value is gone
        // even though this batch fails.
        assert!(args.parse_parameters(["-bogus"]).is_err());
        assert!(!args.is_arg_set("-port"));
    }

    #[test]
    fn bare_marker_stops_parsing() {
        let args = manager();
        parse(&args, &["-port=1", "-", "-bogus"]);
        assert_eq!(args.get_int_arg_or("-port", 0), 1);
        assert!(!args.is_arg_set("-bogus"));
    }

    #[test]
    fn non_option_token_stops_parsing() {
        let args = manager();
        parse(&args, &["-port=1", "positional", "-verbose"]);
        assert!(args.is_arg_set("-port"));
        assert!(!args.is_arg_set("-verbose"));
    }

    #[test]
    fn includeconf_rejected_from_command_line() {
        let args = manager();
        let result = args.parse_parameters(["-includeconf=extra.conf", "-includeconf=more.conf"]);
        match result {
            Err(ArgsError::IncludeConfFromCommandLine { values }) => {
                assert_eq!(values, vec!["extra.conf", "more.conf"]);
            }
            other => panic!("expected IncludeConfFromCommandLine, got {other:?}"),
        }
    }

    #[test]
    fn negated_includeconf_is_tolerated() {
        let args = manager();
        assert!(args.parse_parameters(["-noincludeconf"]).is_ok());
    }

    // --- Precedence ---

    #[test]
    fn forced_beats_everything_and_falls_through_when_cleared() {
        let args = manager();
        args.select_network(network::TESTNET);
        parse(&args, &["-port=2"]);
        args.read_config_string("[testnet]\nport=3\nport=4\n", "t.conf", false)
            .unwrap();
        args.read_config_string("port=5\n", "t.conf", false).unwrap();
        args.set_persistent_setting("-port", Str("6".into()));
        args.force_set_arg("-port", "1");

        assert_eq!(args.get_arg_or("-port", ""), "1");
        args.clear_forced_arg("-port");
        assert_eq!(args.get_arg_or("-port", ""), "2");
        parse(&args, &[] as &[&str]); // clear command line
        // First occurrence wins inside a config section.
        assert_eq!(args.get_arg_or("-port", ""), "3");
        args.select_network(network::MAIN);
        assert_eq!(args.get_arg_or("-port", ""), "5");
    }

    #[test]
    fn persisted_value_is_lowest_precedence() {
        let args = manager();
        args.set_persistent_setting("-port", Str("9".into()));
        assert_eq!(args.get_arg_or("-port", ""), "9");
        parse(&args, &["-port=2"]);
        assert_eq!(args.get_arg_or("-port", ""), "2");
    }

    #[test]
    fn persistent_setting_skips_command_line() {
        let args = manager();
        parse(&args, &["-port=2"]);
        args.set_persistent_setting("-port", Str("9".into()));
        assert_eq!(args.get_arg_or("-port", ""), "2");
        assert_eq!(args.persistent_setting("-port"), Str("9".into()));
    }

    #[test]
    fn network_only_setting_hidden_from_default_section_off_main() {
        let args = manager();
        args.read_config_string("wallet=w1\nport=1\n", "t.conf", false)
            .unwrap();

        args.select_network(network::MAIN);
        assert_eq!(args.get_arg_or("-wallet", "none"), "w1");

        args.select_network(network::TESTNET);
        // Plain settings still fall back to the default section...
        assert_eq!(args.get_arg_or("-port", "none"), "1");
        // ...but network-only ones do not leak across networks.
        assert_eq!(args.get_arg_or("-wallet", "none"), "none");
    }

    #[test]
    fn network_section_applies_off_main() {
        let args = manager();
        args.read_config_string("[testnet]\nwallet=tw\n", "t.conf", false)
            .unwrap();
        args.select_network(network::TESTNET);
        assert_eq!(args.get_arg_or("-wallet", "none"), "tw");
    }

    // --- Soft and forced setting ---

    #[test]
    fn soft_set_is_a_no_op_when_already_set() {
        let args = manager();
        assert!(args.soft_set_arg("-port", "1"));
        assert!(!args.soft_set_arg("-port", "2"));
        assert_eq!(args.get_arg_or("-port", ""), "1");
    }

    #[test]
    fn soft_set_bool_writes_digits() {
        let args = manager();
        assert!(args.soft_set_bool_arg("-verbose", true));
        assert_eq!(args.get_arg_or("-verbose", ""), "1");
        assert!(args.get_bool_arg_or("-verbose", false));
    }

    #[test]
    fn force_set_multi_resolves_as_list() {
        let args = manager();
        args.force_set_multi_arg("-connect", &["a", "b"]);
        assert_eq!(args.get_args("-connect"), vec!["a", "b"]);
    }

    // --- Paths ---

    #[test]
    fn path_arg_strips_trailing_separator() {
        let args = manager();
        parse(&args, &["-datadir=/tmp/x/"]);
        assert_eq!(
            args.get_path_arg("-datadir", Path::new("/default")),
            PathBuf::from("/tmp/x")
        );
    }

    #[test]
    fn path_arg_unset_returns_default_unchanged() {
        let args = manager();
        assert_eq!(
            args.get_path_arg("-datadir", Path::new("/default/")),
            PathBuf::from("/default/")
        );
    }

    #[test]
    fn path_arg_negated_is_empty() {
        let args = manager();
        parse(&args, &["-nosettings"]);
        assert_eq!(
            args.get_path_arg("-settings", Path::new("settings.json")),
            PathBuf::new()
        );
    }

    #[test]
    fn datadir_override_must_exist() {
        let args = manager();
        parse(&args, &["-datadir=/definitely/not/a/real/dir"]);
        assert!(matches!(
            args.data_dir(false),
            Err(ArgsError::DataDirNotFound { .. })
        ));
    }

    #[test]
    fn datadir_is_cached_until_cleared() {
        let dir = TempDir::new().unwrap();
        let args = manager();
        args.force_set_arg("-datadir", dir.path().to_str().unwrap());
        let first = args.data_dir(false).unwrap();

        let other = TempDir::new().unwrap();
        args.force_set_arg("-datadir", other.path().to_str().unwrap());
        // Still the cached value.
        assert_eq!(args.data_dir(false).unwrap(), first);

        args.clear_path_cache();
        assert_eq!(args.data_dir(false).unwrap(), other.path());
    }

    #[test]
    fn network_datadir_appends_subdirectory() {
        let dir = TempDir::new().unwrap();
        let args = manager();
        args.force_set_arg("-datadir", dir.path().to_str().unwrap());

        args.select_network(network::MAIN);
        assert_eq!(args.data_dir(true).unwrap(), dir.path());

        args.clear_path_cache();
        args.select_network(network::REGTEST);
        assert_eq!(args.data_dir(true).unwrap(), dir.path().join("regtest"));
    }

    #[test]
    fn blocks_dir_is_created_on_first_resolution() {
        let dir = TempDir::new().unwrap();
        let args = manager();
        args.force_set_arg("-datadir", dir.path().to_str().unwrap());
        args.select_network(network::TESTNET);

        let blocks = args.blocks_dir().unwrap();
        assert_eq!(blocks, dir.path().join("testnet").join("blocks"));
        assert!(blocks.is_dir());
    }

    // --- Persistence ---

    #[test]
    fn settings_round_trip_through_fresh_manager() {
        let dir = TempDir::new().unwrap();
        let datadir = dir.path().to_str().unwrap().to_string();

        let args = manager();
        args.force_set_arg("-datadir", &datadir);
        args.set_persistent_setting("-wallet", Str("w1".into()));
        args.set_persistent_setting(
            "-connect",
            SettingsValue::List(vec![Str("a".into()), Str("b".into())]),
        );
        args.save_settings().unwrap();

        let fresh = manager();
        fresh.force_set_arg("-datadir", &datadir);
        fresh.load_settings().unwrap();
        assert_eq!(fresh.persistent_setting("-wallet"), Str("w1".into()));
        assert_eq!(fresh.get_args("-connect"), vec!["a", "b"]);
    }

    #[test]
    fn unknown_persisted_key_round_trips() {
        let dir = TempDir::new().unwrap();
        let datadir = dir.path().to_str().unwrap().to_string();

        let args = manager();
        args.force_set_arg("-datadir", &datadir);
        args.set_persistent_setting("relic", Str("kept".into()));
        args.save_settings().unwrap();

        let fresh = manager();
        fresh.force_set_arg("-datadir", &datadir);
        fresh.load_settings().unwrap();
        fresh.save_settings().unwrap();

        let again = manager();
        again.force_set_arg("-datadir", &datadir);
        again.load_settings().unwrap();
        assert_eq!(again.persistent_setting("relic"), Str("kept".into()));
    }

    #[test]
    fn load_replaces_previous_contents_entirely() {
        let dir = TempDir::new().unwrap();
        let args = manager();
        args.force_set_arg("-datadir", dir.path().to_str().unwrap());
        args.save_settings().unwrap(); // empty file on disk

        args.set_persistent_setting("-wallet", Str("volatile".into()));
        args.load_settings().unwrap();
        assert!(args.persistent_setting("-wallet").is_null());
    }

    #[test]
    fn corrupt_settings_file_reports_and_leaves_store_empty() {
        let dir = TempDir::new().unwrap();
        let args = manager();
        args.force_set_arg("-datadir", dir.path().to_str().unwrap());

        let path = args.settings_path().unwrap().unwrap();
        fs::write(&path, "garbage{").unwrap();

        args.set_persistent_setting("-wallet", Str("old".into()));
        let result = args.load_settings();
        assert!(matches!(result, Err(ArgsError::SettingsRead { .. })));
        assert!(args.persistent_setting("-wallet").is_null());
    }

    #[test]
    fn disabled_persistence_makes_load_a_no_op() {
        let args = manager();
        parse(&args, &["-nosettings"]);
        assert!(args.settings_path().unwrap().is_none());
        args.load_settings().unwrap();
    }

    #[test]
    #[should_panic(expected = "dynamic settings are disabled")]
    fn saving_while_disabled_is_a_programming_error() {
        let args = manager();
        parse(&args, &["-nosettings"]);
        let _ = args.save_settings();
    }

    #[test]
    fn backup_writes_the_bak_sibling() {
        let dir = TempDir::new().unwrap();
        let args = manager();
        args.force_set_arg("-datadir", dir.path().to_str().unwrap());
        args.set_persistent_setting("-wallet", Str("w".into()));
        args.backup_settings().unwrap();

        let path = args.settings_path().unwrap().unwrap();
        assert!(persist::with_suffix(&path, ".bak").exists());
        assert!(!path.exists());
    }

    #[test]
    fn init_settings_creates_directories_and_file() {
        let dir = TempDir::new().unwrap();
        let datadir = dir.path().join("data");
        fs::create_dir(&datadir).unwrap();
        let args = manager();
        args.force_set_arg("-datadir", datadir.to_str().unwrap());
        args.select_network(network::REGTEST);

        args.init_settings().unwrap();
        assert!(datadir.join("regtest").is_dir());
        assert!(datadir.join("regtest").join(SETTINGS_FILENAME).exists());
    }

    // --- Network selection ---

    #[test]
    fn chain_defaults_to_main() {
        let args = manager();
        assert_eq!(args.chain_name().unwrap(), network::MAIN);
    }

    #[test]
    fn chain_selector_precedence() {
        let args = manager();
        parse(&args, &["-regtest"]);
        assert_eq!(args.chain_name().unwrap(), network::REGTEST);

        parse(&args, &["-testnet"]);
        assert_eq!(args.chain_name().unwrap(), network::TESTNET);

        parse(&args, &["-chain=testnet"]);
        assert_eq!(args.chain_name().unwrap(), network::TESTNET);
    }

    #[test]
    fn conflicting_selectors_are_fatal() {
        let args = manager();
        parse(&args, &["-regtest", "-chain=main"]);
        assert!(matches!(
            args.chain_name(),
            Err(ArgsError::ChainSelectionConflict)
        ));

        parse(&args, &["-regtest", "-testnet"]);
        assert!(matches!(
            args.chain_name(),
            Err(ArgsError::ChainSelectionConflict)
        ));
    }

    #[test]
    fn negated_selector_does_not_conflict() {
        let args = manager();
        parse(&args, &["-noregtest", "-chain=testnet"]);
        assert_eq!(args.chain_name().unwrap(), network::TESTNET);
    }

    // --- Diagnostics ---

    #[test]
    fn unrecognized_sections_are_collected_not_fatal() {
        let args = manager();
        args.read_config_string(
            "[testnet]\nport=1\n[exotic]\nport=2\n",
            "odd.conf",
            false,
        )
        .unwrap();

        let sections = args.unrecognized_sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, "exotic");
        assert_eq!(sections[0].file, "odd.conf");
        assert_eq!(sections[0].line, 3);
    }

    #[test]
    fn unknown_config_key_is_an_error_unless_ignored() {
        let args = manager();
        let result = args.read_config_string("bogus=1\n", "t.conf", false);
        assert!(matches!(result, Err(ArgsError::InvalidParameter { .. })));

        args.read_config_string("bogus=1\nport=2\n", "t.conf", true)
            .unwrap();
        assert_eq!(args.get_int_arg_or("-port", 0), 2);
    }

    #[test]
    fn section_only_portability_warning() {
        let args = manager();
        args.read_config_string("wallet=w1\n", "t.conf", false)
            .unwrap();

        args.select_network(network::MAIN);
        assert!(args.unsuitable_section_only_args().is_empty());

        args.select_network(network::TESTNET);
        let unsuitable = args.unsuitable_section_only_args();
        assert!(unsuitable.contains("wallet"));

        // An explicit network-section value clears the warning.
        args.read_config_string("[testnet]\nwallet=w2\n", "t.conf", false)
            .unwrap();
        assert!(args.unsuitable_section_only_args().is_empty());
    }

    #[test]
    fn log_args_redacts_without_panicking() {
        let args = manager();
        parse(&args, &["-rpcpassword=secret", "-port=1"]);
        args.read_config_string("port=2\n", "t.conf", false).unwrap();
        args.set_persistent_setting("-wallet", Str("w".into()));
        args.log_args();
    }

    #[test]
    fn negated_setting_list_is_empty() {
        let args = manager();
        parse(&args, &["-connect=a", "-noconnect"]);
        assert!(args.is_arg_negated("-connect"));
        assert!(args.get_args("-connect").is_empty());
        assert_eq!(args.get_setting("-connect"), Bool(false));
    }
}
