//! StreamQL CLI - Command line interface for the StreamQL query compiler

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use streamql_cli::config::Config;
use streamql_cli::{render_error, render_schema, render_tokens, summarize};
use streamql_core::Registry;
use streamql_parser::parse;

#[derive(Parser)]
#[command(name = "streamql")]
#[command(author = "StreamQL Contributors")]
#[command(version)]
#[command(about = "StreamQL - continuous query compiler for windowed event streams", long_about = None)]
struct Cli {
    /// Path to configuration file (YAML or TOML)
    #[arg(short, long, global = true, env = "STREAMQL_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct QueryInput {
    /// Inline query text
    query: Option<String>,

    /// Read the query from a file instead
    #[arg(short, long, conflicts_with = "query")]
    file: Option<PathBuf>,
}

impl QueryInput {
    fn read(&self) -> Result<String> {
        if let Some(ref path) = self.file {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read query file {}", path.display()))
        } else if let Some(ref query) = self.query {
            Ok(query.clone())
        } else {
            anyhow::bail!("Either a query or --file must be provided");
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ConfigFormat {
    Yaml,
    Toml,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a query and print the resulting statement
    Parse {
        #[command(flatten)]
        input: QueryInput,

        /// Print the statement as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a query and report the first error
    Check {
        #[command(flatten)]
        input: QueryInput,
    },

    /// Show the token stream of a query
    Tokens {
        #[command(flatten)]
        input: QueryInput,

        /// Include whitespace tokens
        #[arg(long)]
        whitespace: bool,
    },

    /// List the registered event types
    Schema,

    /// Print an example configuration file
    Config {
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config, cli.verbose)?;

    match cli.command {
        Commands::Parse { input, json } => {
            let query = input.read()?;
            let registry = config.registry()?;
            parse_and_show(&query, &registry, json)?;
        }

        Commands::Check { input } => {
            let query = input.read()?;
            let registry = config.registry()?;
            check_query(&query, &registry)?;
        }

        Commands::Tokens { input, whitespace } => {
            let query = input.read()?;
            print!("{}", render_tokens(&query, whitespace));
        }

        Commands::Schema => {
            let registry = config.registry()?;
            print!("{}", render_schema(&registry));
        }

        Commands::Config { format } => match format {
            ConfigFormat::Yaml => print!("{}", Config::example_yaml()),
            ConfigFormat::Toml => print!("{}", Config::example_toml()),
        },
    }

    Ok(())
}

/// Load the configuration file, or fall back to the example schemas.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None => Ok(Config::example()),
    }
}

fn init_logging(config: &Config, verbose: bool) -> Result<()> {
    let level = if verbose {
        Level::DEBUG
    } else {
        Level::from_str(&config.logging.level)
            .with_context(|| format!("Invalid log level '{}'", config.logging.level))?
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    debug!(%level, "logging initialized");
    Ok(())
}

fn parse_and_show(query: &str, registry: &Registry, json: bool) -> Result<()> {
    match parse(query, registry) {
        Ok(statement) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&statement)?);
            } else {
                println!("{}\n", statement);
                println!("{:#?}", statement);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", render_error(query, &e));
            anyhow::bail!("Parse failed");
        }
    }
}

fn check_query(query: &str, registry: &Registry) -> Result<()> {
    match parse(query, registry) {
        Ok(statement) => {
            println!("Query OK");
            print!("{}", summarize(&statement));
            Ok(())
        }
        Err(e) => {
            println!("Query error");
            println!("   {}", render_error(query, &e));
            anyhow::bail!("Query check failed");
        }
    }
}
