use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use rdb_search::catalog::{load_catalog, SearchModel};
use rdb_search::config::Config;
use rdb_search::logging::init_logging;
use rdb_search::submit::Transport;

mod cli;

#[derive(Parser)]
#[command(name = "rdbq")]
#[command(author, version, about = "Build, validate and encode advanced inventory searches")]
struct Cli {
    /// Model to search (inventory, part, build, assembly)
    #[arg(long, short = 'm', global = true)]
    model: Option<SearchModel>,

    /// Field catalog file (JSON or YAML) overriding the built-in one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List searchable fields and their legal lookups
    Fields,

    /// Encode a search (saved-cards JSON file or query string) as parameters
    Encode {
        input: String,
    },

    /// Decode a query string into saved-cards JSON
    Decode {
        query: String,

        /// Fail on the first malformed parameter instead of skipping it
        #[arg(long)]
        strict: bool,
    },

    /// Check a search for problems
    Validate {
        input: String,
    },

    /// Validate and encode a search into the request to send
    Submit {
        input: String,

        /// Send as a POST form body instead of a GET query string
        #[arg(long)]
        post: bool,
    },

    /// Show the cards and rows of a search
    Render {
        input: String,

        /// Emit the view model as JSON
        #[arg(long)]
        json: bool,
    },

    /// Expand a search-bar query into a full search request
    Quick {
        text: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let model = cli.model.or(config.model).unwrap_or(SearchModel::Inventory);
    let catalog = load_catalog(model, cli.catalog.as_deref(), config.catalog_dir.as_deref())?;
    let action = config.action_url(model);

    match cli.command {
        Commands::Fields => cli::commands::fields(&catalog),
        Commands::Encode { input } => cli::commands::encode_search(&input, &catalog),
        Commands::Decode { query, strict } => cli::commands::decode_search(&query, &catalog, strict),
        Commands::Validate { input } => cli::commands::validate_search(&input, &catalog),
        Commands::Submit { input, post } => {
            let transport = if post { Transport::Post } else { config.transport };
            cli::commands::submit_search(&input, &catalog, &action, transport)
        }
        Commands::Render { input, json } => cli::commands::render(&input, &catalog, json),
        Commands::Quick { text } => cli::commands::quick(&text, &catalog, &action, config.transport),
    }
}
