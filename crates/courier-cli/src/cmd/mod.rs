//! CLI command modules.

pub mod report;
pub mod send;
pub mod upload;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use courier_core::CourierConfig;
use courier_delivery::{Dispatcher, RateLimiter, Uploader};

/// Build the delivery stack shared by every sending command.
pub fn build_dispatcher(config: &CourierConfig) -> Result<Dispatcher> {
    if config.delivery.url.is_empty() {
        bail!(
            "no endpoint configured — set delivery.url in {} or pass --url",
            CourierConfig::file_path().display()
        );
    }

    let limiter = Arc::new(RateLimiter::new(config.delivery.requests_per_second));
    let uploader =
        Uploader::new(&config.delivery, limiter).context("failed to build http client")?;
    Ok(Dispatcher::new(
        Arc::new(uploader),
        config.delivery.max_workers,
    ))
}

/// `courier config`: print the resolved configuration.
pub fn show_config(config: &CourierConfig, explicit_path: Option<&Path>) -> Result<()> {
    let path = explicit_path
        .map(Path::to_path_buf)
        .unwrap_or_else(CourierConfig::file_path);

    println!("Config file : {}", path.display());
    let url = if config.delivery.url.is_empty() {
        "(unset)"
    } else {
        config.delivery.url.as_str()
    };
    println!("Endpoint    : {}", url);
    println!("Max message : {} chars", config.delivery.max_message_length);
    println!("Max file    : {} bytes", config.delivery.max_file_size);
    println!("Workers     : {}", config.delivery.max_workers);
    println!("Rate        : {} req/s", config.delivery.requests_per_second);
    println!("Timeout     : {}s", config.delivery.request_timeout_secs);

    Ok(())
}
