//! Upload files through the endpoint.

use std::path::PathBuf;

use anyhow::{bail, Result};

use courier_core::CourierConfig;

use super::build_dispatcher;

pub async fn run(config: &CourierConfig, paths: &[&str]) -> Result<()> {
    let paths: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();

    let dispatcher = build_dispatcher(config)?;
    let summary = dispatcher.dispatch_files(paths).await;

    println!("Uploaded {}/{} files.", summary.delivered, summary.total());
    if !summary.is_clean() {
        bail!(
            "{} files were not fully delivered",
            summary.gave_up + summary.failed
        );
    }
    Ok(())
}
