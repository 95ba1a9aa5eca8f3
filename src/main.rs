//! Query parameter store demo.
//!
//! Loads a route table, attaches a store to an in-memory router, navigates
//! the given URLs in order and prints every resolved state.
//!
//! ```text
//! query-params-store --config demos/routes.toml '/shop?page=abc&sort=desc' /plain?x=1
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use query_params_store::config::{load_config, StoreConfig};
use query_params_store::observability::init_logging;
use query_params_store::{MemoryRouter, QueryParamsStore};

#[derive(Parser)]
#[command(name = "query-params-store")]
#[command(about = "Resolve query parameter state for a sequence of navigations", long_about = None)]
struct Cli {
    /// Route table (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How long to wait for a navigation to publish, in milliseconds
    #[arg(short, long, default_value_t = 500)]
    wait_ms: u64,

    /// URLs to navigate to, in order
    #[arg(required = true)]
    urls: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => StoreConfig::default(),
    };
    init_logging(&config.observability)?;

    tracing::info!(
        routes = config.routes.len(),
        event_capacity = config.router.event_capacity,
        "Configuration loaded"
    );

    let router = Arc::new(MemoryRouter::from_config(&config));
    let store = QueryParamsStore::new();
    store.attach(router.clone());

    let mut states = store.subscribe();
    let wait = Duration::from_millis(cli.wait_ms);

    for url in &cli.urls {
        match router.navigate_by_url(url) {
            Ok(true) => {}
            Ok(false) => {
                println!("{url} -> already current");
                continue;
            }
            Err(e) => {
                println!("{url} -> navigation failed: {e}");
                continue;
            }
        }

        match tokio::time::timeout(wait, states.next()).await {
            Ok(Some(state)) => println!("{url} -> {} (at {})", serde_json::to_string(&*state)?, router.url()),
            Ok(None) => break,
            Err(_) => println!("{url} -> no state published (at {})", router.url()),
        }
    }

    store.detach();
    tracing::info!(history = ?router.history(), "Done");
    Ok(())
}
