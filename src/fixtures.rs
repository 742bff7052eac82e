#[cfg(test)]
pub mod test {
    use crate::manager::SettingsManager;
    use crate::registry::{ArgCategory, flags};

    /// Manager with the canonical argument set shared across test modules.
    pub fn manager() -> SettingsManager {
        let args = SettingsManager::new("argstack-test");
        args.register_arg(
            "-datadir=<dir>",
            "Specify data directory",
            flags::ALLOW_ANY,
            ArgCategory::Options,
        );
        args.register_arg(
            "-blocksdir=<dir>",
            "Specify directory to hold the blocks subdirectory",
            flags::ALLOW_ANY,
            ArgCategory::Options,
        );
        args.register_arg(
            "-settings=<file>",
            "Specify path to dynamic settings data file",
            flags::ALLOW_ANY,
            ArgCategory::Options,
        );
        args.register_arg(
            "-conf=<file>",
            "Specify configuration file",
            flags::ALLOW_ANY,
            ArgCategory::Options,
        );
        args.register_arg(
            "-includeconf=<file>",
            "Specify additional configuration file",
            flags::ALLOW_ANY,
            ArgCategory::Options,
        );
        args.register_arg(
            "-verbose",
            "Verbose output",
            flags::ALLOW_BOOL,
            ArgCategory::Options,
        );
        args.register_arg(
            "-rpcpassword=<pw>",
            "Password for RPC connections",
            flags::ALLOW_ANY | flags::SENSITIVE,
            ArgCategory::Options,
        );
        args.register_arg(
            "-wallet=<name>",
            "Specify wallet name",
            flags::ALLOW_ANY | flags::NETWORK_ONLY,
            ArgCategory::Options,
        );
        args.register_arg(
            "-port=<port>",
            "Listen on <port>",
            flags::ALLOW_ANY,
            ArgCategory::Connection,
        );
        args.register_arg(
            "-connect=<host>",
            "Connect only to the specified node; can be used multiple times",
            flags::ALLOW_ANY,
            ArgCategory::Connection,
        );
        args.register_arg(
            "-checklevel=<n>",
            "How thorough the block verification is",
            flags::ALLOW_ANY | flags::DEBUG_ONLY,
            ArgCategory::DebugTest,
        );
        args.register_arg(
            "-chain=<chain>",
            "Use the chain <chain>",
            flags::ALLOW_ANY,
            ArgCategory::ChainParams,
        );
        args.register_arg(
            "-testnet",
            "Use the test chain",
            flags::ALLOW_ANY,
            ArgCategory::ChainParams,
        );
        args.register_arg(
            "-regtest",
            "Enter regression test mode",
            flags::ALLOW_ANY,
            ArgCategory::ChainParams,
        );
        args.register_hidden_args(&["-h", "-help"]);
        args
    }

    #[test]
    fn fixture_registers_the_base_set() {
        let args = manager();
        assert!(args.parse_parameters(["-port=1", "-verbose"]).is_ok());
        assert_eq!(args.chain_name().unwrap(), crate::network::MAIN);
    }
}
