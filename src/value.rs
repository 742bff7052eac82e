//! The settings value type and its coercion rules.
//!
//! Every layer of the stack — forced overrides, command-line options, config
//! file sections, the persisted settings store — holds [`SettingsValue`]s. The
//! variant set is closed: null, boolean, integer, string, or a one-level list
//! of the former. Values are built during parsing or forcing and read-only
//! afterwards.
//!
//! The typed coercions (`to_setting_string`, `to_setting_int`,
//! `to_setting_bool`) implement the fixed conversion table the query surface
//! is built on. The string-to-boolean rule in [`interpret_bool`] is
//! asymmetric on purpose: an empty string means "flag present with no value"
//! and reads as true, text with a leading numeric zero reads as false, and
//! any other text reads as true. Compatibility behavior — do not tidy it.

use std::fmt;

use serde::ser::{Serialize, SerializeSeq, Serializer};

/// A single setting value as stored in any layer of the settings stack.
///
/// Lists hold scalars only in this system's usage; one level of nesting is
/// flattened during multi-value resolution and anything deeper never occurs.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsValue {
    Null,
    Bool(bool),
    Num(i64),
    Str(String),
    List(Vec<SettingsValue>),
}

impl SettingsValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SettingsValue::Null)
    }

    /// True exactly for `Bool(false)` — the marker a negated option leaves
    /// behind in the store.
    pub fn is_false(&self) -> bool {
        matches!(self, SettingsValue::Bool(false))
    }

    pub fn is_true(&self) -> bool {
        matches!(self, SettingsValue::Bool(true))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, SettingsValue::Bool(_))
    }

    /// Coerce to the string form used by the query surface.
    ///
    /// `false` → `"0"`, `true` → `"1"`, numbers → decimal text, strings pass
    /// through, null → `None` ("unset").
    ///
    /// # Panics
    ///
    /// Panics on a list value: callers resolve single values before coercing,
    /// so a list here is a programming error, not a data error.
    pub fn to_setting_string(&self) -> Option<String> {
        match self {
            SettingsValue::Null => None,
            SettingsValue::Bool(false) => Some("0".into()),
            SettingsValue::Bool(true) => Some("1".into()),
            SettingsValue::Num(n) => Some(n.to_string()),
            SettingsValue::Str(s) => Some(s.clone()),
            SettingsValue::List(_) => panic!("settings list cannot be coerced to a string"),
        }
    }

    /// Coerce to an integer. Strings use a best-effort leading-integer parse
    /// where non-numeric text reads as 0 rather than failing.
    ///
    /// # Panics
    ///
    /// Panics on a list value, as [`to_setting_string`](Self::to_setting_string).
    pub fn to_setting_int(&self) -> Option<i64> {
        match self {
            SettingsValue::Null => None,
            SettingsValue::Bool(false) => Some(0),
            SettingsValue::Bool(true) => Some(1),
            SettingsValue::Num(n) => Some(*n),
            SettingsValue::Str(s) => Some(parse_leading_i64(s).unwrap_or(0)),
            SettingsValue::List(_) => panic!("settings list cannot be coerced to an integer"),
        }
    }

    /// Coerce to a boolean. Booleans pass through; strings go through
    /// [`interpret_bool`]; numbers are true when nonzero.
    ///
    /// # Panics
    ///
    /// Panics on a list value, as [`to_setting_string`](Self::to_setting_string).
    pub fn to_setting_bool(&self) -> Option<bool> {
        match self {
            SettingsValue::Null => None,
            SettingsValue::Bool(b) => Some(*b),
            SettingsValue::Num(n) => Some(*n != 0),
            SettingsValue::Str(s) => Some(interpret_bool(s)),
            SettingsValue::List(_) => panic!("settings list cannot be coerced to a boolean"),
        }
    }

    /// Convert from the JSON representation used by the persisted settings
    /// file. Objects and non-integral numbers have no [`SettingsValue`]
    /// equivalent and are reported as errors.
    pub fn from_json(value: serde_json::Value) -> Result<Self, String> {
        match value {
            serde_json::Value::Null => Ok(SettingsValue::Null),
            serde_json::Value::Bool(b) => Ok(SettingsValue::Bool(b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(SettingsValue::Num)
                .ok_or_else(|| format!("unsupported non-integer number {n}")),
            serde_json::Value::String(s) => Ok(SettingsValue::Str(s)),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(SettingsValue::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(SettingsValue::List),
            serde_json::Value::Object(_) => Err("unsupported object value".into()),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            SettingsValue::Null => serde_json::Value::Null,
            SettingsValue::Bool(b) => serde_json::Value::Bool(*b),
            SettingsValue::Num(n) => serde_json::Value::from(*n),
            SettingsValue::Str(s) => serde_json::Value::String(s.clone()),
            SettingsValue::List(items) => {
                serde_json::Value::Array(items.iter().map(SettingsValue::to_json).collect())
            }
        }
    }
}

impl fmt::Display for SettingsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Serialize for SettingsValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SettingsValue::Null => serializer.serialize_unit(),
            SettingsValue::Bool(b) => serializer.serialize_bool(*b),
            SettingsValue::Num(n) => serializer.serialize_i64(*n),
            SettingsValue::Str(s) => serializer.serialize_str(s),
            SettingsValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// Interpret a string argument as a boolean.
///
/// An empty string means the option was supplied with no value and reads as
/// true. Text with a leading integer reads as that integer's truthiness.
/// Non-numeric text reads as true. The non-numeric case is a documented
/// compatibility quirk: `-foo=false` therefore enables `-foo`.
pub fn interpret_bool(text: &str) -> bool {
    if text.is_empty() {
        return true;
    }
    parse_leading_i64(text).is_none_or(|n| n != 0)
}

/// Parse the leading integer of `text`, `strtoll`-style: optional leading
/// whitespace and sign, then a digit run; anything after the run is ignored.
/// Returns `None` when no digits are present. Saturates on overflow.
pub fn parse_leading_i64(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let mut acc: i64 = 0;
    for b in digits[..end].bytes() {
        let digit = i64::from(b - b'0');
        acc = match acc.checked_mul(10).and_then(|a| a.checked_add(digit)) {
            Some(v) => v,
            None => return Some(if negative { i64::MIN } else { i64::MAX }),
        };
    }
    Some(if negative { -acc } else { acc })
}
