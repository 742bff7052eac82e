//! Line-oriented config file reading.
//!
//! The format is a sectioned key-value file:
//!
//! ```text
//! # comment
//! key=value
//! flag                  # bare key, reads as boolean true
//! [testnet]
//! key=per-network value
//! main.other=1          # dotted keys target a section explicitly
//! ```
//!
//! Reading only tokenizes: it yields every assignment with its
//! section-qualified name plus the provenance of every section header seen.
//! Which sections are recognized is decided at query time by the manager,
//! so unknown sections are collected here, not rejected.

use crate::error::ArgsError;

/// Provenance of a config-file section header, kept for diagnosing
/// unrecognized sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionInfo {
    pub name: String,
    pub file: String,
    pub line: usize,
}

/// One assignment read from a config file. `name` carries the section
/// qualifier as a dot prefix when the line was inside a section (or used a
/// dotted key itself). `value` is `None` for a bare key line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLine {
    pub name: String,
    pub value: Option<String>,
    pub line: usize,
}

const TRIM: &[char] = &[' ', '\t', '\r'];

/// Tokenize config-file `content` into assignments and section headers.
///
/// `#` starts a comment for the rest of the line. A line starting with the
/// option marker is a parse error: options in a configuration file are
/// written without it. A malformed section header (opening bracket without a
/// closing one) is a parse error too.
pub fn read_config(
    content: &str,
    file_name: &str,
) -> Result<(Vec<ConfigLine>, Vec<SectionInfo>), ArgsError> {
    let mut entries = Vec::new();
    let mut sections = Vec::new();
    let mut prefix = String::new();

    for (idx, raw_line) in content.lines().enumerate() {
        let line_number = idx + 1;
        let line = match raw_line.find('#') {
            Some(pos) => &raw_line[..pos],
            None => raw_line,
        };
        let line = line.trim_matches(TRIM);
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            let Some(section) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) else {
                return Err(ArgsError::ConfigParse {
                    line: line_number,
                    text: line.to_string(),
                });
            };
            sections.push(SectionInfo {
                name: section.to_string(),
                file: file_name.to_string(),
                line: line_number,
            });
            prefix = format!("{section}.");
            continue;
        }

        if line.starts_with('-') {
            return Err(ArgsError::ConfigParse {
                line: line_number,
                text: format!(
                    "{line}, options in configuration file must be specified without leading -"
                ),
            });
        }

        let (name, value) = match line.split_once('=') {
            Some((key, value)) => (
                format!("{prefix}{}", key.trim_matches(TRIM)),
                Some(value.trim_matches(TRIM).to_string()),
            ),
            None => (format!("{prefix}{line}"), None),
        };

        // A dotted key names its section inline; record it like a header so
        // unrecognized-section diagnostics see it.
        if let Some(pos) = name.rfind('.') {
            if prefix.len() <= pos {
                sections.push(SectionInfo {
                    name: name[..pos].to_string(),
                    file: file_name.to_string(),
                    line: line_number,
                });
            }
        }

        entries.push(ConfigLine {
            name,
            value,
            line: line_number,
        });
    }

    Ok((entries, sections))
}
