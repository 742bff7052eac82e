//! The settings store and the precedence walk over it.
//!
//! Four independent containers, pure data: forced overrides, command-line
//! values, config-file values keyed by section, and the persisted read/write
//! store. Resolution walks them in a fixed order:
//!
//! ```text
//! forced overrides          force_set_arg()
//!        ↓ else
//! command line              last occurrence wins
//!        ↓ else
//! network config section    first occurrence wins
//!        ↓ else
//! default config section    hidden from network-only settings when a
//!        ↓ else             non-primary network is active
//! persisted settings        the read/write store
//! ```
//!
//! Persistent-only lookups skip the two non-durable sources at the top
//! (forced and command line) and walk the rest unchanged.
//!
//! Operates on pre-loaded data with no I/O, so the full walk is testable
//! with synthetic inputs.
//!
//! Two compatibility rules are carried deliberately. Within a config-file
//! section the *first* occurrence of a repeated key wins, the reverse of the
//! command line. And a `Bool(false)` left behind by a negated option erases
//! every earlier occurrence in the same source: single-value resolution
//! yields `false`, multi-value resolution yields only the values that came
//! after the last negation.

use std::collections::BTreeMap;

use crate::value::SettingsValue;

/// The four value containers. Keys are bare setting names: no option marker,
/// no `no` negation prefix (negation is resolved into a boolean at parse
/// time).
#[derive(Debug, Default)]
pub struct Settings {
    /// Highest-precedence single values, set programmatically.
    pub forced: BTreeMap<String, SettingsValue>,
    /// Values parsed from the command line, in order of appearance.
    pub command_line: BTreeMap<String, Vec<SettingsValue>>,
    /// Config-file values by section; section `""` is the default section.
    pub config_by_section: BTreeMap<String, BTreeMap<String, Vec<SettingsValue>>>,
    /// The persisted read/write store, loaded from and saved to disk.
    pub persisted_rw: BTreeMap<String, SettingsValue>,
}

/// How a lookup walks the store. Plain lookups use `Default`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LookupOptions {
    /// Hide the default config section (network-only setting resolved off
    /// the primary network).
    pub ignore_default_section: bool,
    /// Skip forced and command-line sources; used when reading what would
    /// survive a restart.
    pub ignore_nonpersistent: bool,
    /// Chain-name resolution: a negated command-line selector reads as
    /// unset, and config-file occurrences use last-wins like the command
    /// line.
    pub chain_name_mode: bool,
}

/// Number of leading values erased by negation: everything up to and
/// including the last `Bool(false)`.
fn negated_prefix(values: &[SettingsValue]) -> usize {
    values
        .iter()
        .rposition(SettingsValue::is_false)
        .map_or(0, |idx| idx + 1)
}

fn last_negated(values: &[SettingsValue]) -> bool {
    values.last().is_some_and(SettingsValue::is_false)
}

/// The single effective value of a source's occurrence list, or `None` when
/// the list is empty. A trailing negation resolves to `Bool(false)`.
fn effective(values: &[SettingsValue], first_wins: bool) -> Option<SettingsValue> {
    if values.is_empty() {
        return None;
    }
    if last_negated(values) {
        return Some(SettingsValue::Bool(false));
    }
    let live = &values[negated_prefix(values)..];
    let pick = if first_wins { 0 } else { live.len() - 1 };
    Some(live[pick].clone())
}

/// Resolve the single effective value of `name` for `network`, walking the
/// precedence order described in the module docs. Returns `Null` when no
/// source has the setting.
pub fn get_setting(
    settings: &Settings,
    network: &str,
    name: &str,
    options: LookupOptions,
) -> SettingsValue {
    if !options.ignore_nonpersistent {
        if let Some(value) = settings.forced.get(name) {
            return value.clone();
        }
        if let Some(values) = settings.command_line.get(name) {
            let skip = options.chain_name_mode && last_negated(values);
            if !skip {
                if let Some(value) = effective(values, false) {
                    return value;
                }
            }
        }
    }

    let config_first_wins = !options.chain_name_mode;
    if !network.is_empty() {
        if let Some(value) = settings
            .config_by_section
            .get(network)
            .and_then(|section| section.get(name))
            .and_then(|values| effective(values, config_first_wins))
        {
            return value;
        }
    }

    if !options.ignore_default_section {
        if let Some(value) = settings
            .config_by_section
            .get("")
            .and_then(|section| section.get(name))
            .and_then(|values| effective(values, config_first_wins))
        {
            return value;
        }
    }

    settings
        .persisted_rw
        .get(name)
        .cloned()
        .unwrap_or(SettingsValue::Null)
}

/// Resolve the full ordered value list of `name` for `network`.
///
/// The highest-precedence source holding the setting supplies the whole
/// list; one level of nested lists is flattened. A source whose occurrence
/// list ends in a negation contributes an empty list (the setting resolves
/// as explicitly unset).
pub fn get_settings_list(
    settings: &Settings,
    network: &str,
    name: &str,
    ignore_default_section: bool,
) -> Vec<SettingsValue> {
    if let Some(value) = settings.forced.get(name) {
        return flatten(std::slice::from_ref(value));
    }
    if let Some(values) = settings.command_line.get(name) {
        return flatten(&values[negated_prefix(values)..]);
    }
    if !network.is_empty() {
        if let Some(values) = settings
            .config_by_section
            .get(network)
            .and_then(|section| section.get(name))
        {
            return flatten(&values[negated_prefix(values)..]);
        }
    }
    if !ignore_default_section {
        if let Some(values) = settings
            .config_by_section
            .get("")
            .and_then(|section| section.get(name))
        {
            return flatten(&values[negated_prefix(values)..]);
        }
    }
    if let Some(value) = settings.persisted_rw.get(name) {
        return flatten(std::slice::from_ref(value));
    }
    Vec::new()
}

fn flatten(values: &[SettingsValue]) -> Vec<SettingsValue> {
    let mut result = Vec::new();
    for value in values {
        match value {
            SettingsValue::List(items) => result.extend(items.iter().cloned()),
            other => result.push(other.clone()),
        }
    }
    result
}

/// Whether `name` is set in the default config section and nowhere else.
/// Drives the portability warning for network-only settings found outside a
/// network section.
pub fn only_has_default_section_setting(
    settings: &Settings,
    network: &str,
    name: &str,
) -> bool {
    let in_default = settings
        .config_by_section
        .get("")
        .and_then(|section| section.get(name))
        .is_some_and(|values| !values.is_empty());
    if !in_default {
        return false;
    }

    let elsewhere = settings.forced.contains_key(name)
        || settings
            .command_line
            .get(name)
            .is_some_and(|values| !values.is_empty())
        || (!network.is_empty()
            && settings
                .config_by_section
                .get(network)
                .and_then(|section| section.get(name))
                .is_some_and(|values| !values.is_empty()))
        || settings.persisted_rw.contains_key(name);
    !elsewhere
}
