//! courier: command-line webhook delivery tool.
//!
//! Ships text messages and files to one configured endpoint, chunked to
//! the endpoint's limits and paced to its rate.

use std::path::PathBuf;

use anyhow::{Context, Result};

use courier_core::CourierConfig;

mod cmd;

fn print_usage() {
    println!("Usage: courier [--config <path>] [--url <url>] <command>");
    println!();
    println!("Commands:");
    println!("  send <text>       Deliver a message ('-' or no text reads stdin)");
    println!("  upload <path>...  Deliver one or more files");
    println!("  report            Sample host metrics and deliver a status report");
    println!("  config            Print the resolved configuration");
    println!();
    println!("Options:");
    println!("  --config <path>   Explicit config file (default: {})", CourierConfig::file_path().display());
    println!("  --url <url>       Override the endpoint URL for this run");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    // Parse global options
    let mut config_path: Option<PathBuf> = None;
    let mut url_override: Option<String> = None;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--config" {
            i += 1;
            config_path = Some(args.get(i).context("--config requires a path")?.into());
        } else if args[i] == "--url" {
            i += 1;
            url_override = Some(args.get(i).context("--url requires a value")?.clone());
        } else {
            remaining.push(&args[i]);
        }
        i += 1;
    }

    let mut config = match &config_path {
        // An explicit path that fails to load is fatal, not a fallback.
        Some(path) => CourierConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => {
            if let Err(e) = CourierConfig::write_default_if_missing() {
                tracing::warn!(error = %e, "failed to write default config");
            }
            CourierConfig::load().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to load config, using defaults");
                CourierConfig::default()
            })
        }
    };
    if let Some(url) = url_override {
        config.delivery.url = url;
    }

    match remaining.as_slice() {
        ["send"]                            => cmd::send::run(&config, None).await,
        ["send", text]                      => cmd::send::run(&config, Some(text)).await,
        ["upload", paths @ ..] if !paths.is_empty() => cmd::upload::run(&config, paths).await,
        ["report"]                          => cmd::report::run(&config).await,
        ["config"]                          => cmd::show_config(&config, config_path.as_deref()),
        ["help"] | ["--help"] | ["-h"] | [] => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
