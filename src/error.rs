use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArgsError {
    #[error("Invalid parameter {token}")]
    InvalidParameter { token: String },

    #[error("Negating of -{key} is meaningless and therefore forbidden")]
    NegationForbidden { key: String },

    #[error("-includeconf cannot be used from commandline; -includeconf={}", .values.join(" -includeconf="))]
    IncludeConfFromCommandLine { values: Vec<String> },

    #[error("Invalid combination of -regtest, -testnet and -chain. Can use at most one.")]
    ChainSelectionConflict,

    #[error("Error reading configuration file: parse error on line {line}: {text}")]
    ConfigParse { line: usize, text: String },

    #[error("Failed loading settings file:\n- {}", .errors.join("\n- "))]
    SettingsRead { errors: Vec<String> },

    #[error("Failed saving settings file:\n- {}", .errors.join("\n- "))]
    SettingsWrite { errors: Vec<String> },

    #[error("Specified data directory \"{}\" does not exist", .path.display())]
    DataDirNotFound { path: PathBuf },

    #[error("Specified blocks directory \"{}\" does not exist", .path.display())]
    BlocksDirNotFound { path: PathBuf },

    #[error("Failed to access {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
}
