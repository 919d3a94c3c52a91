//! Interactive mode for the server.
//!
//! Prompts for the dataset, bind address, and port before starting the
//! server.

use std::path::PathBuf;

use dialoguer::{Confirm, Input};

use crate::ServerConfig;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Defaults come from the environment (see [`ServerConfig::from_env`]);
/// the answers override them for this run only.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Texas Traffic Stops Server");
    println!();

    let mut config = ServerConfig::from_env();

    let dataset: String = Input::new()
        .with_prompt("Dataset CSV")
        .default(config.dashboard.dataset.display().to_string())
        .interact_text()
        .unwrap_or_else(|_| config.dashboard.dataset.display().to_string());
    config.dashboard.dataset = PathBuf::from(dataset);

    config.bind_addr = Input::new()
        .with_prompt("Bind address")
        .default(config.bind_addr.clone())
        .interact_text()
        .unwrap_or_else(|_| config.bind_addr.clone());

    config.port = Input::new()
        .with_prompt("Port")
        .default(config.port)
        .interact_text()
        .unwrap_or(config.port);

    if !config.dashboard.dataset.is_file() {
        log::warn!(
            "{} does not exist yet; summary requests will fail until it does",
            config.dashboard.dataset.display()
        );
    }

    if !Confirm::new()
        .with_prompt(format!(
            "Start server on {}:{}?",
            config.bind_addr, config.port
        ))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server(config).await
}
