//! `join-store` -- local JSON document store for the Join board.
//!
//! # Usage
//!
//! ```bash
//! # Run on the default address 127.0.0.1:9100
//! cargo run --bin join-store
//!
//! # Start from a fixture database
//! cargo run --bin join-store -- --seed-file demo.json
//!
//! # Or via environment variable
//! JOIN_STORE_ADDR=0.0.0.0:8080 cargo run --bin join-store
//! ```

use std::sync::Arc;

use clap::Parser;
use join_store::config::{StoreCliArgs, StoreConfig};
use join_store::server::{self, StoreState};

#[tokio::main]
async fn main() {
    let cli = StoreCliArgs::parse();

    let config = match StoreConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let tree = match config.initial_tree() {
        Ok(tree) => tree,
        Err(e) => {
            tracing::error!(error = %e, "failed to load seed data");
            std::process::exit(1);
        }
    };

    tracing::info!(addr = %config.bind_addr, seeded = config.seed_file.is_some(), "starting join document store");

    let state = Arc::new(StoreState::with_config(config.max_body_size, tree));

    match server::start_server_with_state(&config.bind_addr, state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "document store listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "document store task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start document store");
            std::process::exit(1);
        }
    }
}
