//! Storefront CLI: product search from the terminal.
//!
//! Calls `storefront-core` directly with no server in between.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use storefront_core::config::StorefrontConfig;
use storefront_core::search::{run_search, PageState, SearchController, SearchOutcome};
use storefront_core::types::{ViewItem, MSG_LOADING, MSG_NO_PRODUCTS};
use storefront_core::{connect, Backend};

/// Storefront CLI: search the product catalog from the terminal.
#[derive(Parser)]
#[command(name = "sfs", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Load settings from a TOML config file (default: ./storefront.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Search a local JSON catalog instead of the content lake
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Content lake project ID
    #[arg(long, global = true)]
    project_id: Option<String>,

    /// Content lake dataset
    #[arg(long, global = true)]
    dataset: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one search and print the matching products
    Search {
        /// Search query
        query: String,

        /// Output as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
    /// Read queries from stdin, one per line, and print each result
    Interactive,
}

fn resolve_backend(cli: &Cli) -> Backend {
    let mut config = StorefrontConfig::discover(cli.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    if let Some(catalog) = &cli.catalog {
        config.catalog = Some(catalog.clone());
    }
    if let Some(project_id) = &cli.project_id {
        config.project_id = Some(project_id.clone());
    }
    if let Some(dataset) = &cli.dataset {
        config.dataset = dataset.clone();
    }
    connect(&config.with_env_token()).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    })
}

fn print_item(item: &ViewItem) {
    println!("  {:<40} {:>10}  {}", item.title, item.display_price(), item.image_url);
}

fn print_state(state: &PageState) {
    match state {
        PageState::Loading => println!("{MSG_LOADING}"),
        PageState::Error(message) => println!("{message}"),
        PageState::Ready(items) if items.is_empty() => println!("{MSG_NO_PRODUCTS}"),
        PageState::Ready(items) => {
            println!("{} product(s):", items.len());
            for item in items {
                print_item(item);
            }
        }
    }
}

async fn search_once(backend: &Backend, query: &str, json: bool) {
    let outcome = run_search(backend.client.as_ref(), &backend.images, Some(query)).await;

    if json {
        let items = serde_json::to_value(outcome.items()).unwrap_or_default();
        let body = serde_json::json!({
            "query": outcome.query().map(|q| q.to_string()),
            "message": outcome.message(),
            "items": items,
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        print_state(&PageState::from(&outcome));
    }

    if !matches!(&outcome, SearchOutcome::Found { items, .. } if !items.is_empty()) {
        std::process::exit(1);
    }
}

async fn interactive(backend: Backend) {
    let controller = Arc::new(SearchController::new(backend.client, backend.images));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = Vec::new();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error: {e}");
                break;
            }
        };
        // Tickets are issued here, in input order, before any fetch runs.
        let Some(ticket) = controller.begin(Some(&line)) else {
            debug!(line = line.as_str(), "Query unchanged, nothing to fetch");
            continue;
        };
        println!("{MSG_LOADING}");
        let controller = Arc::clone(&controller);
        // Fetches overlap freely; the controller drops any that were superseded.
        pending.push(tokio::spawn(async move {
            if let Some(state) = controller.complete(ticket).await {
                print_state(&state);
            }
        }));
    }

    for handle in pending {
        let _ = handle.await;
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("storefront=warn".parse().unwrap()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let backend = resolve_backend(&cli);

    match cli.command {
        Commands::Search { query, json } => search_once(&backend, &query, json).await,
        Commands::Interactive => interactive(backend).await,
    }
}
