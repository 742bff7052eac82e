//! Network names and the fixed set of recognized config sections.

/// The primary network. Its config section and the default section are the
/// same namespace, and its data lives at the top of the data directory.
pub const MAIN: &str = "main";
pub const TESTNET: &str = "testnet";
pub const REGTEST: &str = "regtest";

/// Section names recognized in a config file; anything else is collected
/// and reported as unrecognized.
pub const KNOWN_SECTIONS: [&str; 3] = [MAIN, TESTNET, REGTEST];

/// Subdirectory of the data directory that holds a network's data. The
/// primary network uses the top level.
pub fn data_subdir(network: &str) -> &str {
    if network == MAIN { "" } else { network }
}
