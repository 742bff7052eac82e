//! The argument registry: which settings exist, their flags, and their help
//! metadata.
//!
//! Populated once at startup by the owning process and read thereafter.
//! Registration mistakes (the same name registered twice in a category) are
//! startup-time programming errors and panic rather than returning a result.

use std::collections::{BTreeMap, BTreeSet};

use crate::parse::setting_name;

/// Flag bits accepted by [`Registry::register`].
pub mod flags {
    /// Negating the option (`-nofoo`) is legal.
    pub const ALLOW_BOOL: u32 = 1 << 0;
    /// Integer values are legal.
    pub const ALLOW_INT: u32 = 1 << 1;
    /// String values are legal.
    pub const ALLOW_STRING: u32 = 1 << 2;
    /// Accept any value shape, including negation.
    pub const ALLOW_ANY: u32 = ALLOW_BOOL | ALLOW_INT | ALLOW_STRING;
    /// Hidden from help output unless debug help is requested.
    pub const DEBUG_ONLY: u32 = 1 << 8;
    /// Must not be set only in the default config section when a
    /// non-primary network is active.
    pub const NETWORK_ONLY: u32 = 1 << 9;
    /// Value is redacted in logs.
    pub const SENSITIVE: u32 = 1 << 10;
}

/// Help-display category an argument is registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ArgCategory {
    Options,
    Connection,
    ChainParams,
    DebugTest,
    Hidden,
}

/// A registered argument: help metadata plus behavior flags.
#[derive(Debug, Clone)]
pub struct Arg {
    pub help_param: String,
    pub help_text: String,
    pub flags: u32,
}

/// All registered arguments, grouped by category.
///
/// Lookup scans every category; registration is small and static, so a
/// linear scan is fine.
#[derive(Debug, Default)]
pub struct Registry {
    categories: BTreeMap<ArgCategory, BTreeMap<String, Arg>>,
    network_only: BTreeSet<String>,
}

impl Registry {
    /// Register one argument. `name` may carry a help-display hint after an
    /// `=` (`"-datadir=<dir>"`); the hint is split off and stored separately.
    /// The leading option marker, if present, is stripped before storing.
    ///
    /// # Panics
    ///
    /// Panics if the bare name is already registered in `category`.
    pub fn register(&mut self, name: &str, help: &str, flags: u32, category: ArgCategory) {
        let (raw_name, help_param) = match name.find('=') {
            Some(idx) => (&name[..idx], &name[idx..]),
            None => (name, ""),
        };
        let bare = setting_name(raw_name).to_string();

        let previous = self.categories.entry(category).or_default().insert(
            bare.clone(),
            Arg {
                help_param: help_param.to_string(),
                help_text: help.to_string(),
                flags,
            },
        );
        assert!(
            previous.is_none(),
            "argument -{bare} registered twice in {category:?}"
        );

        if flags & flags::NETWORK_ONLY != 0 {
            self.network_only.insert(bare);
        }
    }

    /// Register a batch of names that accept anything and show no help.
    pub fn register_hidden(&mut self, names: &[&str]) {
        for name in names {
            self.register(name, "", flags::ALLOW_ANY, ArgCategory::Hidden);
        }
    }

    /// Flags of a registered argument, or `None` for unknown names.
    /// Accepts the name with or without its leading marker.
    pub fn flags_of(&self, name: &str) -> Option<u32> {
        let bare = setting_name(name);
        self.categories
            .values()
            .find_map(|args| args.get(bare).map(|arg| arg.flags))
    }

    /// Names registered with `NETWORK_ONLY`, without markers.
    pub fn network_only(&self) -> &BTreeSet<String> {
        &self.network_only
    }

    /// Iterate every category with its argument map, in category order.
    pub fn categories(&self) -> impl Iterator<Item = (ArgCategory, &BTreeMap<String, Arg>)> {
        self.categories.iter().map(|(cat, args)| (*cat, args))
    }
}
