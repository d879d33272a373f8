use std::path::PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "ciphertrace", version, about = "Investigation workbench: simulated scans, case history and exports")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database path (overrides storage.db_path)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the available tools
    Tools,
    /// Run a scan with one tool
    Scan(ScanArgs),
    /// List stored sessions
    History(HistoryArgs),
    /// Show one stored session
    Show(ShowArgs),
    /// Export a session as JSON, CSV or a text report
    Export(ExportArgs),
    /// Clear a tool's current session (history is kept)
    Reset(ResetArgs),
    /// Start the HTTP API server
    Serve(ServeArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone)]
pub struct ScanArgs {
    /// Tool name, e.g. phishing-detector
    pub tool: String,

    /// Text to analyze
    #[arg(short, long, conflicts_with_all = ["file", "stdin"])]
    pub text: Option<String>,

    /// File to analyze (repeatable)
    #[arg(short, long, conflicts_with = "stdin")]
    pub file: Vec<PathBuf>,

    /// Read the text to analyze from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Fixed RNG seed for reproducible results
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the session as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct HistoryArgs {
    /// Restrict to one tool
    pub tool: Option<String>,

    /// Show at most this many sessions
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct ShowArgs {
    /// Tool name
    pub tool: String,

    /// Session ID (omit for the current session)
    pub session_id: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct ExportArgs {
    /// Tool name
    pub tool: String,

    /// json, csv or text
    #[arg(short, long, default_value = "json")]
    pub format: String,

    /// Session ID (omit for the current session)
    #[arg(short, long)]
    pub session: Option<String>,

    /// Only records at this risk level
    #[arg(long)]
    pub risk: Option<String>,

    /// Only records in this category
    #[arg(long)]
    pub category: Option<String>,

    /// Only records matching this text
    #[arg(long)]
    pub search: Option<String>,

    /// Only these record ids (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<String>,

    /// Output directory (defaults to storage.export_dir)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Write to stdout instead of a file
    #[arg(long, conflicts_with = "out")]
    pub stdout: bool,
}

#[derive(Args, Clone)]
pub struct ResetArgs {
    /// Tool name
    pub tool: String,
}

#[derive(Args, Clone)]
pub struct ServeArgs {
    /// Listen port (overrides server.port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Listen address (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Config file to validate
    #[arg(value_name = "CONFIG")]
    pub file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan_with_files() {
        let cli = Cli::try_parse_from([
            "ciphertrace", "--db", "/tmp/x.db", "scan", "voice-identifier", "-f", "a.wav", "-f", "b.mp3", "--seed", "9",
        ])
        .unwrap();
        assert_eq!(cli.db.as_deref(), Some("/tmp/x.db"));
        match cli.command {
            Commands::Scan(args) => {
                assert_eq!(args.tool, "voice-identifier");
                assert_eq!(args.file.len(), 2);
                assert_eq!(args.seed, Some(9));
            }
            _ => panic!("expected scan"),
        }
    }

    #[test]
    fn test_text_conflicts_with_file() {
        assert!(Cli::try_parse_from(["ciphertrace", "scan", "email-checker", "-t", "hi", "-f", "x.eml"]).is_err());
    }

    #[test]
    fn test_validate_takes_positional_file() {
        let cli = Cli::try_parse_from(["ciphertrace", "validate", "ciphertrace.yaml"]).unwrap();
        match cli.command {
            Commands::Validate(args) => assert_eq!(args.file, PathBuf::from("ciphertrace.yaml")),
            _ => panic!("expected validate"),
        }
    }

    #[test]
    fn test_export_selection_is_comma_split() {
        let cli = Cli::try_parse_from([
            "ciphertrace", "export", "call-tracer", "--format", "csv", "--select", "PH-001,PH-003", "--log-format", "json",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Commands::Export(args) => assert_eq!(args.select, vec!["PH-001", "PH-003"]),
            _ => panic!("expected export"),
        }
    }
}
