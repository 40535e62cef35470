//! Thicket CLI - Inspect model trees described by manifest files

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{completions, config as config_cmd, query, tree, QueryArgs};
use config::Config;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "thicket")]
#[command(author, version, about = "Query hierarchical model trees")]
pub struct Cli {
    /// Output format: table, json (default from config)
    #[arg(short, long, global = true)]
    pub format: Option<String>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Output format from the flag, falling back to the config file
    pub fn output_format(&self, config: &Config) -> OutputFormat {
        OutputFormat::from(self.format.as_deref().unwrap_or(&config.format))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the tree in traversal order
    Tree(tree::TreeArgs),
    /// Find components under the root block
    Components(QueryArgs),
    /// List the root block and every block beneath it
    Blocks(QueryArgs),
    /// Collect the categories present in the tree
    Categories(QueryArgs),
    /// Generate fully qualified names
    Names {
        #[command(flatten)]
        query: QueryArgs,

        /// Prefix for every generated name
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Manage CLI configuration
    Config(config_cmd::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting thicket CLI");

    let config = Config::load();
    let format = cli.output_format(&config);

    match &cli.command {
        Commands::Tree(args) => tree::run(args, format, &config)?,
        Commands::Components(args) => query::run_components(args, format, &config)?,
        Commands::Blocks(args) => query::run_blocks(args, format, &config)?,
        Commands::Categories(args) => query::run_categories(args, format, &config)?,
        Commands::Names { query: args, prefix } => {
            query::run_names(args, prefix.as_deref(), format, &config)?
        }
        Commands::Config(args) => config_cmd::run(args)?,
        Commands::Completions(args) => completions::run(args)?,
    }

    Ok(())
}
