//! Layered runtime settings for long-running services. Register your
//! arguments, feed in the command line and config file, and every consumer
//! reads one coherent answer to "what is the value of setting X?".
//!
//! ```ignore
//! let args = SettingsManager::new("myd");
//! args.register_arg("-port=<port>", "Listen on <port>", flags::ALLOW_ANY, ArgCategory::Connection);
//! args.parse_parameters(std::env::args().skip(1))?;
//! args.read_config_string(&conf_text, "myd.conf", false)?;
//! args.select_network(&args.chain_name()?);
//! let port = args.get_int_arg_or("-port", 8555);
//! ```
//!
//! # Why argstack
//!
//! A service of any size accumulates tunables, and the same tunable soon
//! arrives from several directions at once: a flag on the command line, a
//! line in a config file, a value persisted by an earlier run, a test
//! harness forcing an override. The typical approach wires each source by
//! hand and resolves conflicts ad hoc — and the answer to "which value
//! wins?" quietly varies from setting to setting.
//!
//! Argstack replaces that with one store and one rule. Every source writes
//! into its own layer; every read walks the layers in a fixed order. Adding
//! a source to a deployment never changes how the others are interpreted.
//!
//! # Layer precedence
//!
//! ```text
//! Forced overrides       force_set_arg(), highest — tests, subsystems
//!        ↑ overridden by nothing
//! Command line           -key=value; repeats accumulate, last wins
//!        ↑
//! Network section        [testnet] lines in the config file
//!        ↑
//! Default section        top-of-file lines in the config file
//!        ↑
//! Persisted settings     settings.json, written back at runtime
//! ```
//!
//! Every layer is sparse: a setting absent from one layer falls through to
//! the next, and a setting absent everywhere resolves to null ("unset").
//!
//! # Negation
//!
//! Any boolean-capable option can be switched off with the `no` prefix:
//! `-noverbose` stores `verbose = false`. This also works for options that
//! are not normally boolean — `-nosettings` is how persistence is disabled
//! entirely — and is queryable with
//! [`is_arg_negated`](manager::SettingsManager::is_arg_negated). A double
//! negation (`-noverbose=0`) flips back to true and logs a diagnostic.
//!
//! # Network sections
//!
//! A config file is organized into sections, one per network, with the
//! unsectioned head of the file as the default section. Resolution consults
//! the active network's section first, then the default section — except
//! that settings registered `NETWORK_ONLY` are hidden from the default
//! section whenever a non-primary network is active, so a value meant for
//! the main network cannot leak into a test network by omission. The
//! [`unsuitable_section_only_args`](manager::SettingsManager::unsuitable_section_only_args)
//! diagnostic reports exactly those near-misses, and sections with
//! unrecognized names are collected rather than rejected.
//!
//! # Persistence
//!
//! The read/write layer round-trips through a JSON settings file. Saving is
//! crash-safe: the store is serialized to a temporary sibling and renamed
//! over the real file, so a crash at any point leaves either the old file
//! or the new one, never a torn mixture. Loading replaces the layer
//! wholesale and reports every problem it finds in one pass; keys no
//! registered argument claims are warned about but kept, so foreign keys
//! survive a load/save cycle.
//!
//! # Concurrency
//!
//! One [`SettingsManager`] value owns everything — the four store layers,
//! the argument registry, the derived-path cache — behind a single
//! exclusive lock taken per call. There is no global instance and no
//! cross-process coordination; compose external locking if two processes
//! must share a settings path.
//!
//! # Errors
//!
//! Recoverable failures return [`ArgsError`] with user-facing messages: a
//! malformed or unknown token aborts the whole command-line batch (no
//! partial state is kept), file problems carry every error found rather
//! than the first, and conflicting network selectors fail before anything
//! else resolves. Programming errors — registering the same argument
//! twice, saving after persistence was disabled — panic instead of
//! returning, deliberately.

pub mod config_file;
pub mod error;
pub mod manager;
pub mod network;
pub mod registry;
pub mod store;
pub mod value;

mod parse;
mod paths;
mod persist;

#[cfg(test)]
mod fixtures;

pub use config_file::{ConfigLine, SectionInfo};
pub use error::ArgsError;
pub use manager::{SETTINGS_FILENAME, SettingsManager};
pub use registry::{Arg, ArgCategory, flags};
pub use value::SettingsValue;
