//! `dsm-linker` command-line entry point.
//!
//! # Usage
//!
//! ```bash
//! # Where does a legacy URL go?
//! dsm-linker lookup https://web.musc.edu/about
//!
//! # Load a DSM row and summarize its page (cached after the first run)
//! dsm-linker check --domain Enterprise --row 10
//!
//! # Map every internal link of the page onto the new site
//! dsm-linker links --url https://medicine.musc.edu/departments --sidebar
//!
//! # Counts for every pending row of a progress CSV
//! dsm-linker bulk-check batch.csv
//!
//! # Interactive session
//! dsm-linker shell
//! ```
//!
//! # Environment Variables
//!
//! See [`dsm_linker::config::Config`]. A `.env` file in the working
//! directory is read first.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dsm_linker::commands::{App, PageContext, parse_load_args, render, shell};
use dsm_linker::config;
use dsm_linker::error::AppError;
use dsm_linker::infrastructure::cache::JsonFileCache;
use dsm_linker::infrastructure::scraper::HttpPageScraper;
use dsm_linker::logging;

/// Maps legacy pages onto the new site using the Digital Site Map.
#[derive(Parser)]
#[command(name = "dsm-linker")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Print results and errors as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Find a URL in the DSM and show its proposed location
    Lookup {
        /// Legacy page URL
        url: String,
    },

    /// Load a DSM row and show its URLs
    Load {
        /// Domain name or alias, then the row number as shown in the spreadsheet
        #[arg(required = true, num_args = 2.., value_name = "DOMAIN... ROW")]
        args: Vec<String>,
    },

    /// Summarize a page's links, PDFs and embeds
    Check {
        #[command(flatten)]
        context: ContextArgs,
        /// Ignore the cache and scrape again
        #[arg(long)]
        refresh: bool,
    },

    /// Resolve a page's internal links against the DSM
    Links {
        #[command(flatten)]
        context: ContextArgs,
        /// Ignore the cache and scrape again
        #[arg(long)]
        refresh: bool,
    },

    /// List configured domains
    Domains,

    /// Check every pending DSM row listed in a progress CSV
    BulkCheck {
        /// CSV file; a template is created when it does not exist
        #[arg(default_value = dsm_linker::commands::bulk::DEFAULT_CSV)]
        csv: PathBuf,
    },

    /// Page cache operations
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Start the interactive shell
    Shell,
}

/// Cache subcommands.
#[derive(Subcommand)]
enum CacheAction {
    /// Show which cache file fits the given page and whether it is usable
    Status {
        #[command(flatten)]
        context: ContextArgs,
    },
}

/// Page selection shared by page commands.
#[derive(Args)]
struct ContextArgs {
    /// Page URL
    #[arg(long, conflicts_with = "domain")]
    url: Option<String>,

    /// DSM domain of the page (requires --row)
    #[arg(long, requires = "row")]
    domain: Option<String>,

    /// DSM row of the page (requires --domain)
    #[arg(long, requires = "domain")]
    row: Option<usize>,

    /// CSS selector for the main content
    #[arg(long)]
    selector: Option<String>,

    /// Also extract the sidebar
    #[arg(long)]
    sidebar: bool,
}

impl From<ContextArgs> for PageContext {
    fn from(args: ContextArgs) -> Self {
        Self {
            url: args.url,
            domain: args.domain,
            row: args.row,
            selector: args.selector,
            sidebar: args.sidebar,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;
    let logs = logging::init(&config, cli.debug)?;

    let mut app = App::from_config(&config, cli.json)?;

    if let Commands::Shell = cli.command {
        config.print_summary();
        return shell::run(&mut app, Some(&logs), cli.debug).await;
    }

    if let Err(e) = run(&mut app, cli.command).await {
        render::error(&e, cli.json);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(app: &mut App<HttpPageScraper, JsonFileCache>, command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Lookup { url } => app.lookup(&url),
        Commands::Load { args } => {
            let (domain, row) = parse_load_args(&args)?;
            app.load(&domain, row)
        }
        Commands::Check { context, refresh } => {
            app.apply_context(&context.into())?;
            app.check(refresh).await.map(|_| ())
        }
        Commands::Links { context, refresh } => {
            app.apply_context(&context.into())?;
            app.links(refresh).await
        }
        Commands::Domains => {
            app.domains();
            Ok(())
        }
        Commands::BulkCheck { csv } => app.bulk_check(Some(&csv)).await.map(|_| ()),
        Commands::Cache {
            action: CacheAction::Status { context },
        } => {
            app.apply_context(&context.into())?;
            app.cache_status();
            Ok(())
        }
        Commands::Shell => Ok(()),
    }
}
