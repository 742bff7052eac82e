//! Command-line token interpretation: marker stripping, `key=value`
//! splitting, section qualification, and `no`-prefix negation.
//!
//! These are pure token-level functions; [`crate::manager::SettingsManager`]
//! drives them over a full token batch and owns the registry checks.

use tracing::warn;

use crate::value::{SettingsValue, interpret_bool};

/// Strip one leading option marker, if present: `"-foo"` → `"foo"`.
pub fn setting_name(arg: &str) -> &str {
    arg.strip_prefix('-').unwrap_or(arg)
}

/// Split a raw token into its key and optional value.
///
/// Splits on the first `=`; normalizes a double marker (`--foo`) to a single
/// one. Returns `None` when the key does not start with the option marker —
/// the caller treats that token as the end of option parsing.
pub fn parse_key_value(token: &str) -> Option<(String, Option<String>)> {
    let (key, value) = match token.split_once('=') {
        Some((k, v)) => (k, Some(v.to_string())),
        None => (token, None),
    };

    if !key.starts_with('-') {
        return None;
    }

    // Transform --foo to -foo
    let key = if key.starts_with("--") { &key[1..] } else { key };
    Some((key.to_string(), value))
}

/// A token's key interpreted into store form.
pub struct InterpretedOption {
    /// Section qualifier split off a dotted key (`section.key`), if any.
    pub section: Option<String>,
    /// Bare setting name: no marker, no `no` prefix.
    pub key: String,
    /// The value to store. Negation is already folded into a boolean here.
    pub value: SettingsValue,
}

/// Interpret a bare key (marker already stripped) and its raw value.
///
/// A `no` prefix negates: `-nofoo` stores `foo = false`. A falsy value on a
/// negated key is a double negation (`-nofoo=0` → `foo = true`), supported
/// but discouraged, so it logs a diagnostic. A key without a value stores
/// the empty string, which the boolean coercion reads as true.
pub fn interpret_option(raw_key: &str, raw_value: Option<&str>) -> InterpretedOption {
    let (section, key) = match raw_key.split_once('.') {
        Some((section, rest)) => (Some(section.to_string()), rest),
        None => (None, raw_key),
    };

    if let Some(bare) = key.strip_prefix("no") {
        let value = raw_value.unwrap_or("");
        if !interpret_bool(value) {
            warn!("parsed potentially confusing double-negative -{bare}={value}");
            return InterpretedOption {
                section,
                key: bare.to_string(),
                value: SettingsValue::Bool(true),
            };
        }
        return InterpretedOption {
            section,
            key: bare.to_string(),
            value: SettingsValue::Bool(false),
        };
    }

    InterpretedOption {
        section,
        key: key.to_string(),
        value: SettingsValue::Str(raw_value.unwrap_or("").to_string()),
    }
}
