//! CLI argument structures and parsing.

use std::path::PathBuf;

use chalice_exec::GuestLanguage;
use chalice_mcp::DetailLevel;
use clap::{Args, Parser, Subcommand};

/// Log verbosity level for CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors
    Warn,
    /// Show informational messages, warnings, and errors
    Info,
    /// Show debug messages and above
    Debug,
    /// Show all messages including trace-level details
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Chalice - tool dispatch, discovery and guest code execution
#[derive(Debug, Parser)]
#[command(name = "chalice")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a config file (default: $CHALICE_HOME/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Set log verbosity level
    #[arg(long = "log-level", short = 'L', global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Shorthand for --log-level debug
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long = "log-file", global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List, describe and call tools in the flat registry
    #[command(subcommand)]
    Tools(ToolsCommand),

    /// Browse and call tools through the discovery servers
    #[command(subcommand)]
    Mcp(McpCommand),

    /// Run guest code in a child process
    Exec(ExecArgs),

    /// Inspect the command safety policy
    #[command(subcommand)]
    Policy(PolicyCommand),
}

// ============================================================================
// tools
// ============================================================================

#[derive(Debug, Subcommand)]
pub enum ToolsCommand {
    /// List registered tools
    #[command(visible_alias = "ls")]
    List {
        /// Print definitions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print every tool in the function-calling schema format
    Schema,

    /// Call a tool by name
    Call(CallArgs),
}

#[derive(Debug, Args)]
pub struct CallArgs {
    /// Tool name
    pub name: String,

    /// Arguments as a JSON object
    #[arg(long, short, value_name = "JSON")]
    pub args: Option<String>,
}

// ============================================================================
// mcp
// ============================================================================

#[derive(Debug, Subcommand)]
pub enum McpCommand {
    /// List discovery servers
    Servers {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a server's tool names and descriptions
    Manifest {
        server: String,
    },

    /// Search tools by keyword
    Search(SearchArgs),

    /// Show one tool's full definition
    Show {
        server: String,
        tool: String,
    },

    /// Call a tool on a server
    Call(McpCallArgs),

    /// Write the discovery tree to disk as JSON stubs
    Generate {
        /// Output directory (default: $CHALICE_HOME/servers)
        #[arg(long, short, value_name = "DIR")]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Case-insensitive text matched against tool names and descriptions
    pub query: String,

    /// Restrict to one server
    #[arg(long, short)]
    pub server: Option<String>,

    /// Detail level: name, summary or full
    #[arg(long, short, default_value = "summary", value_parser = parse_detail)]
    pub detail: DetailLevel,
}

fn parse_detail(s: &str) -> Result<DetailLevel, String> {
    s.parse()
}

#[derive(Debug, Args)]
pub struct McpCallArgs {
    pub server: String,
    pub tool: String,

    /// Arguments as a JSON object
    #[arg(long, short, value_name = "JSON")]
    pub args: Option<String>,
}

// ============================================================================
// exec
// ============================================================================

/// Guest language selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LanguageArg {
    #[value(alias = "py")]
    Python,
    #[value(aliases = ["js", "node"])]
    Javascript,
    #[value(aliases = ["shell", "sh"])]
    Bash,
}

impl From<LanguageArg> for GuestLanguage {
    fn from(lang: LanguageArg) -> Self {
        match lang {
            LanguageArg::Python => GuestLanguage::Python,
            LanguageArg::Javascript => GuestLanguage::JavaScript,
            LanguageArg::Bash => GuestLanguage::Shell,
        }
    }
}

#[derive(Debug, Args)]
pub struct ExecArgs {
    /// Guest language
    #[arg(value_enum)]
    pub language: LanguageArg,

    /// Source code (or shell command line); `-` reads stdin
    #[arg(conflicts_with = "file")]
    pub source: Option<String>,

    /// Read the source from a file
    #[arg(long, short, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Timeout in seconds, clamped to 1..=300
    #[arg(long, short, allow_negative_numbers = true)]
    pub timeout: Option<i64>,

    /// Data piped to the guest's stdin
    #[arg(long)]
    pub stdin: Option<String>,

    /// Working directory for the guest
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

// ============================================================================
// policy
// ============================================================================

#[derive(Debug, Subcommand)]
pub enum PolicyCommand {
    /// Check whether a command would be allowed
    Check(PolicyCheckArgs),

    /// Print the effective deny, allow and pattern lists
    Show,
}

#[derive(Debug, Args)]
pub struct PolicyCheckArgs {
    /// Command and arguments
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,

    /// Treat the words as one shell command line
    #[arg(long)]
    pub shell: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["chalice", "tools", "list", "-v", "--log-level", "trace"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.log_level, Some(LogLevel::Trace));
        assert!(matches!(cli.command, Commands::Tools(ToolsCommand::List { json: false })));
    }

    #[test]
    fn test_mcp_search_detail() {
        let cli = Cli::try_parse_from(["chalice", "mcp", "search", "git", "--detail", "name"])
            .unwrap();
        let Commands::Mcp(McpCommand::Search(args)) = cli.command else {
            panic!("expected mcp search");
        };
        assert_eq!(args.query, "git");
        assert_eq!(args.detail, DetailLevel::NameOnly);

        let cli = Cli::try_parse_from(["chalice", "mcp", "search", "x"]).unwrap();
        let Commands::Mcp(McpCommand::Search(args)) = cli.command else {
            panic!("expected mcp search");
        };
        assert_eq!(args.detail, DetailLevel::NameAndDescription);

        assert!(Cli::try_parse_from(["chalice", "mcp", "search", "x", "-d", "verbose"]).is_err());
    }

    #[test]
    fn test_exec_args() {
        let cli = Cli::try_parse_from([
            "chalice", "exec", "py", "print(1)", "--timeout", "-5", "--stdin", "data",
        ])
        .unwrap();
        let Commands::Exec(args) = cli.command else {
            panic!("expected exec");
        };
        assert_eq!(GuestLanguage::from(args.language), GuestLanguage::Python);
        assert_eq!(args.source.as_deref(), Some("print(1)"));
        assert_eq!(args.timeout, Some(-5));

        assert!(
            Cli::try_parse_from(["chalice", "exec", "bash", "ls", "--file", "x.sh"]).is_err()
        );
    }

    #[test]
    fn test_policy_check_keeps_hyphen_args() {
        let cli = Cli::try_parse_from(["chalice", "policy", "check", "rm", "-rf", "/"]).unwrap();
        let Commands::Policy(PolicyCommand::Check(args)) = cli.command else {
            panic!("expected policy check");
        };
        assert_eq!(args.command, vec!["rm", "-rf", "/"]);
        assert!(!args.shell);
    }

    #[test]
    fn test_debug_assert() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
