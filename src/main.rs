//! HTTP front of a malware analysis platform. Clients create scans, upload samples, launch
//! detection probes on them and read back the results:
//! - scan lifecycle routes under `/scan` (see [controllers::scan_controller])
//! - search of already scanned files and download of their content (see [controllers::search_controller])
//! - probe scheduling delegated to the brain (see [external_api::scan_control])
//! - launch notifications posted to the task broker by a background queue (see [queue])
//! - configuration file handling (see [configuration])
//! - logging
//!
//! # Startup
//! 1. Start a MySQL database, or set `context = "sqlite"` in the `[database]` table.
//! 2. Configure `<path-to-project>/application.toml`.
//! 3. (optional) Configure the logging framework via `<path-to-project>/log4rs.yml`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info};
use tokio::net::TcpListener;

use crate::configuration::config::{get_config, Config};
use crate::controllers::scan_controller::ScanController;
use crate::database::connection::set_up_db;
use crate::database::service::DatabaseImplementation;
use crate::external_api::scan_control::BrainClient;
use crate::filesystem::file_storage::FileStorage;
use crate::queue::queue_service::start_task_queue;
use crate::web::routes::create_router;
use crate::web::state::AppState;

mod configuration;
mod controllers;
mod database;
mod errors;
mod external_api;
mod filesystem;
mod helpers;
mod queue;
#[cfg(test)]
mod test_support;
mod web;

/// Multipart framing on top of the file contents
const BODY_OVERHEAD_IN_BYTES: usize = 1024 * 1024;

/// Initializes the logging framework and [starts][start] the app
#[tokio::main]
async fn main() {
    if let Err(err) = log4rs::init_file("log4rs.yml", Default::default()) {
        eprintln!("Error deserializing log4rs! {}", err);
    }

    if let Err(err) = start(get_config()).await {
        error!("Application stopped! Error: {:#}", err);
        std::process::exit(1);
    }
}

/// Starts the main application logic
async fn start(config: Config) -> Result<()> {
    info!("Starting scan frontend version {}.", config.version);

    let db = DatabaseImplementation {
        db: set_up_db(&config)
            .await
            .context("Database Connection setup failed")?,
    };
    info!("Setting up Database Connection finished successfully.");
    db.create_tables()
        .await
        .context("Could not create database tables")?;

    let brain = BrainClient::new(&config).context("Could not build brain client")?;
    let (tasks, _queue) = start_task_queue(&config);
    let scans = ScanController::new(
        Arc::new(brain),
        Arc::new(tasks),
        FileStorage::new(config.base_save_path.clone()),
        config.brain_timeout(),
        config.file_size_limit_in_bytes(),
    );
    let state = AppState {
        db,
        scans: Arc::new(scans),
    };
    let router = create_router(
        state,
        config.file_size_limit_in_bytes() + BODY_OVERHEAD_IN_BYTES,
    );

    let address = format!("{}:{}", config.http_host, config.http_port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Could not bind {}", address))?;
    info!("Listening on {}.", address);
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("HTTP server failed")?;
    Ok(())
}
