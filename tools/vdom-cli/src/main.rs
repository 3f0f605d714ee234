//! Command line front end for the vdom engine.
//!
//! ## Usage
//!
//! ```bash
//! # Parse and re-serialize a page
//! vdom render page.html --tidy
//!
//! # Print the links of a page
//! vdom query 'a[href^="https"]' page.html --attr href
//!
//! # Read from stdin
//! curl -s https://example.com | vdom text -
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;
use vdom_common::{init_logging, LogConfig, LogFormat, Result};

mod commands;

use commands::{QueryOutput, RenderOptions};

#[derive(Parser)]
#[command(name = "vdom")]
#[command(about = "Parse, query and render HTML with the vdom engine")]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log format (pretty, compact, json)
    #[arg(long, global = true, default_value = "compact")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a document and render it again
    Render {
        /// Input file, or `-` for stdin
        input: PathBuf,
        /// Render with XML conventions
        #[arg(long)]
        xml: bool,
        /// Put block-level elements on their own indented lines
        #[arg(long)]
        tidy: bool,
        /// Drop whitespace-only text while parsing
        #[arg(long)]
        strip_whitespace: bool,
    },

    /// Print the elements matching a CSS selector
    Query {
        /// Selector list, e.g. `ul > li.item`
        selector: String,
        /// Input file, or `-` for stdin
        input: PathBuf,
        /// Print text content instead of markup
        #[arg(long, conflicts_with_all = ["attr", "count"])]
        text: bool,
        /// Print this attribute of each match
        #[arg(long, conflicts_with = "count")]
        attr: Option<String>,
        /// Print only the number of matches
        #[arg(long)]
        count: bool,
    },

    /// Print the text content of a document
    Text {
        /// Input file, or `-` for stdin
        input: PathBuf,
    },

    /// Print the document title
    Title {
        /// Input file, or `-` for stdin
        input: PathBuf,
    },
}

fn run(command: Commands) -> Result<String> {
    match command {
        Commands::Render {
            input,
            xml,
            tidy,
            strip_whitespace,
        } => {
            let html = commands::read_input(&input)?;
            let options = RenderOptions {
                xml,
                tidy,
                strip_whitespace,
            };
            commands::render(&html, options)
        }

        Commands::Query {
            selector,
            input,
            text,
            attr,
            count,
        } => {
            let html = commands::read_input(&input)?;
            let output = match (text, attr, count) {
                (_, _, true) => QueryOutput::Count,
                (_, Some(name), _) => QueryOutput::Attribute(name),
                (true, _, _) => QueryOutput::Text,
                _ => QueryOutput::Html,
            };
            commands::query(&html, &selector, &output)
        }

        Commands::Text { input } => Ok(commands::text(&commands::read_input(&input)?)),

        Commands::Title { input } => commands::title(&commands::read_input(&input)?),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match LogConfig::default().with_level_name(&cli.log_level) {
        Ok(config) => config.with_format(cli.log_format),
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(e.exit_code() as u8);
        }
    };
    init_logging(&config);

    match run(cli.command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(category = e.category(), "command failed");
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_query_args() {
        let cli = Cli::try_parse_from(["vdom", "query", "a", "-", "--attr", "href", "--log-format", "json"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Commands::Query { selector, attr, .. } => {
                assert_eq!(selector, "a");
                assert_eq!(attr.as_deref(), Some("href"));
            }
            _ => panic!("expected query"),
        }
    }

    #[test]
    fn test_conflicting_query_flags() {
        assert!(Cli::try_parse_from(["vdom", "query", "a", "-", "--text", "--count"]).is_err());
    }
}
