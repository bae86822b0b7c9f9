mod autosave;
mod cli;
mod config;
mod history;
mod model;
mod session;
mod storage;

use std::process;

use tracing_subscriber::EnvFilter;

use config::Config;
use storage::Storage;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });

    let path = config
        .database
        .clone()
        .or_else(Storage::default_path)
        .unwrap_or_else(|| {
            eprintln!("Could not determine home directory.");
            process::exit(1);
        });

    let storage = match Storage::open(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to initialize storage: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = cli::run(&config, &storage).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Logs go to stderr, filtered by `JOURNEE_LOG` (default `journee=info`).
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("JOURNEE_LOG").unwrap_or_else(|_| EnvFilter::new("journee=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
