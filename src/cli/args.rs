//! CLI argument structs.

use clap::{Parser, ValueEnum};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One line per call: path:line, category, callee, mocked member, hint
    #[default]
    Text,
    /// JSON array of call entries
    Json,
}

#[derive(Parser, Debug, Clone)]
pub struct ScanArgs {
    /// Files or directories to scan; all matched files form one compilation
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// File extensions to include, comma-separated
    #[arg(short, long, default_value = "cs")]
    pub ext: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also list calls that are not Moq fluent calls
    #[arg(long)]
    pub all: bool,

    /// Include hidden files
    #[arg(long)]
    pub hidden: bool,

    /// Include .gitignore'd files
    #[arg(long)]
    pub no_ignore: bool,

    /// Log level: error, warn, info, debug, trace (RUST_LOG overrides)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl ScanArgs {
    /// Lower-cased extensions without leading dots.
    pub fn extensions(&self) -> Vec<String> {
        self.ext
            .split(',')
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_defaults() {
        let args = ScanArgs::try_parse_from(["scan", "src"]).unwrap();
        assert_eq!(args.paths, vec!["src"]);
        assert_eq!(args.extensions(), vec!["cs"]);
        assert_eq!(args.format, OutputFormat::Text);
        assert_eq!(args.log_level, "warn");
        assert!(!args.all);
    }

    #[test]
    fn test_scan_requires_path() {
        assert!(ScanArgs::try_parse_from(["scan"]).is_err());
    }

    #[test]
    fn test_extension_list_is_normalized() {
        let args = ScanArgs::try_parse_from(["scan", ".", "-e", "CS, .csx", "--format", "json"]).unwrap();
        assert_eq!(args.extensions(), vec!["cs", "csx"]);
        assert_eq!(args.format, OutputFormat::Json);
    }
}
