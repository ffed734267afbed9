//! Storefront binary: thin CLI shell over [`storefront_http`] and [`storefront_core`].

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use storefront_core::config::StorefrontConfig;
use storefront_http::AppContext;

// ---------------------------------------------------------------------------
// CLI definition (clap derive)
// ---------------------------------------------------------------------------

/// Storefront search server: server-rendered product search over a content-lake catalog.
#[derive(Parser)]
#[command(name = "storefront", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Load settings from a TOML config file (default: ./storefront.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serve from a local JSON catalog instead of the content lake
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Content lake project ID
    #[arg(long)]
    project_id: Option<String>,

    /// Content lake dataset
    #[arg(long)]
    dataset: Option<String>,

    /// Content lake API version (e.g. 2024-01-01)
    #[arg(long)]
    api_version: Option<String>,

    /// Query the live API instead of the CDN
    #[arg(long)]
    no_cdn: bool,

    /// Bind to 0.0.0.0 instead of 127.0.0.1 (localhost)
    #[arg(long)]
    bind_all: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Cli {
    /// Config file values with command-line overrides applied.
    fn resolve_config(&self) -> StorefrontConfig {
        let mut config = StorefrontConfig::discover(self.config.as_deref()).unwrap_or_else(|e| {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        });
        if let Some(catalog) = &self.catalog {
            config.catalog = Some(catalog.clone());
        }
        if let Some(project_id) = &self.project_id {
            config.project_id = Some(project_id.clone());
        }
        if let Some(dataset) = &self.dataset {
            config.dataset = dataset.clone();
        }
        if let Some(version) = &self.api_version {
            config.api_version = version.clone();
        }
        if self.no_cdn {
            config.use_cdn = false;
        }
        config.with_env_token()
    }
}

// ---------------------------------------------------------------------------
// Graceful shutdown signal
// ---------------------------------------------------------------------------

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(
            tokio::signal::unix::SignalKind::terminate(),
        ) {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "Failed to register SIGTERM handler");
                let _ = ctrl_c.await;
                return;
            }
        };
        tokio::select! {
            _ = ctrl_c => info!("Received SIGINT, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        info!("Received Ctrl+C, shutting down...");
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("storefront=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "storefront", &mut std::io::stdout());
        return;
    }

    let config = cli.resolve_config();
    let backend = storefront_core::connect(&config).unwrap_or_else(|e| {
        error!(error = %e, "Could not start backend");
        std::process::exit(1);
    });
    let backend_name = backend.client.backend();

    let app = storefront_http::routes(AppContext::new(backend))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive());

    // Bind address: 127.0.0.1 by default, --bind-all for 0.0.0.0
    let bind_addr = if cli.bind_all { "0.0.0.0" } else { "127.0.0.1" };

    let explicit_port: Option<u16> = std::env::var("PORT").ok().and_then(|p| p.parse().ok());

    let listener = if let Some(port) = explicit_port {
        tokio::net::TcpListener::bind(format!("{bind_addr}:{port}")).await.unwrap_or_else(|e| {
            error!(port = port, error = %e, "Could not bind to port");
            eprintln!("  PORT={port} was set explicitly. Choose a different port.");
            std::process::exit(1);
        })
    } else {
        // Auto-scan: try 8480..=8489
        const BASE: u16 = 8480;
        const RANGE: u16 = 10;
        let mut found = None;
        for port in BASE..BASE + RANGE {
            if let Ok(l) = tokio::net::TcpListener::bind(format!("{bind_addr}:{port}")).await {
                found = Some(l);
                break;
            }
        }
        found.unwrap_or_else(|| {
            error!(range_start = BASE, range_end = BASE + RANGE - 1, "No free port found");
            eprintln!("  Try: PORT=<port> storefront");
            std::process::exit(1);
        })
    };

    let port = match listener.local_addr() {
        Ok(addr) => addr.port(),
        Err(e) => {
            error!(error = %e, "Could not read listener address");
            std::process::exit(1);
        }
    };

    info!(backend = backend_name, "Serving storefront search");
    info!(port = port, "http://localhost:{port}/search");

    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
