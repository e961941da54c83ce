//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// bgdl - Background download session adapter
#[derive(Parser)]
#[command(name = "bgdl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Start, resume and stop background downloads")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to the log directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Root directory for app-data destinations
    #[arg(long, global = true, value_name = "PATH")]
    pub app_data: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Download a file, resuming a transfer already running for the source
    Fetch {
        /// Source URI (http or https)
        source: String,

        /// Destination: a local path, a file:// URI or an app-data:/// URI
        dest: String,

        /// User agent for a newly created transfer
        #[arg(long, value_name = "UA")]
        user_agent: Option<String>,

        /// Extra request header, repeatable
        #[arg(long = "header", short = 'H', value_name = "NAME=VALUE", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Treat running transfers as the same download when the first match
        /// of this pattern is equal in both URIs
        #[arg(long, value_name = "REGEX")]
        uri_matcher: Option<String>,
    },

    /// Serve the callback bridge as JSON lines over stdin and stdout
    Serve,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got `{raw}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("X-Token = abc").unwrap(),
            ("X-Token".to_string(), "abc".to_string())
        );
        assert_eq!(
            parse_header("X-Empty=").unwrap(),
            ("X-Empty".to_string(), String::new())
        );
        assert!(parse_header("novalue").is_err());
        assert!(parse_header("=abc").is_err());
    }

    #[test]
    fn test_fetch_arguments() {
        let cli = Cli::parse_from([
            "bgdl",
            "--json",
            "fetch",
            "https://example.com/f.bin",
            "out.bin",
            "--user-agent",
            "MyAgent/1.0",
            "-H",
            "X-Token=abc",
        ]);
        assert!(cli.global.json);
        match cli.command {
            Commands::Fetch {
                source,
                user_agent,
                headers,
                ..
            } => {
                assert_eq!(source, "https://example.com/f.bin");
                assert_eq!(user_agent.as_deref(), Some("MyAgent/1.0"));
                assert_eq!(headers.len(), 1);
            }
            Commands::Serve => panic!("expected fetch"),
        }
    }
}
