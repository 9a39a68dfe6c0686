//! Send a text message through the endpoint.

use anyhow::{bail, Context, Result};

use courier_core::CourierConfig;

use super::build_dispatcher;

pub async fn run(config: &CourierConfig, text: Option<&str>) -> Result<()> {
    let message = match text {
        Some("-") | None => std::io::read_to_string(std::io::stdin())
            .context("failed to read message from stdin")?,
        Some(t) => t.to_string(),
    };

    if message.trim().is_empty() {
        bail!("nothing to send");
    }

    let dispatcher = build_dispatcher(config)?;
    let summary = dispatcher
        .dispatch_message(&message, config.delivery.max_message_length)
        .await;

    println!("Delivered {}/{} chunks.", summary.delivered, summary.total());
    if !summary.is_clean() {
        bail!(
            "{} chunks were not delivered",
            summary.gave_up + summary.failed
        );
    }
    Ok(())
}
