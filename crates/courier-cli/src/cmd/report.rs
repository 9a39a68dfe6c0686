//! Compose and deliver a host status report.
//!
//! Sampling happens here so courier-core stays free of system probes; the
//! rendered text then rides the normal message pipeline.

use std::path::Path;

use anyhow::{bail, Result};
use chrono::Local;
use sysinfo::{Disks, System};

use courier_core::report::{render_report, HostMetrics};
use courier_core::CourierConfig;

use super::build_dispatcher;

pub async fn run(config: &CourierConfig) -> Result<()> {
    let metrics = sample_host_metrics(config.report.include_hostname).await;
    let message = render_report(&metrics, &[]);

    let dispatcher = build_dispatcher(config)?;
    let summary = dispatcher
        .dispatch_message(&message, config.delivery.max_message_length)
        .await;

    println!(
        "Status report sent ({}/{} chunks).",
        summary.delivered,
        summary.total()
    );
    if !summary.is_clean() {
        bail!("report was not fully delivered");
    }
    Ok(())
}

/// Sample CPU, memory, and disk usage. CPU usage needs two refreshes with
/// a delay between them to produce a meaningful delta.
async fn sample_host_metrics(include_hostname: bool) -> HostMetrics {
    let mut sys = System::new_all();
    sys.refresh_all();
    tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
    sys.refresh_cpu();

    let memory_percent = if sys.total_memory() == 0 {
        0.0
    } else {
        sys.used_memory() as f32 / sys.total_memory() as f32 * 100.0
    };

    HostMetrics {
        cpu_percent: sys.global_cpu_info().cpu_usage(),
        memory_percent,
        disk_percent: root_disk_percent(),
        os_name: System::name().unwrap_or_else(|| "unknown".to_string()),
        os_version: System::os_version().unwrap_or_else(|| "unknown".to_string()),
        hostname: if include_hostname {
            System::host_name()
        } else {
            None
        },
        timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

/// Usage of the filesystem mounted at `/`, falling back to the first
/// listed disk. 0 when nothing is listed (containers, stripped hosts).
fn root_disk_percent() -> f32 {
    let disks = Disks::new_with_refreshed_list();
    let disk = disks
        .list()
        .iter()
        .find(|d| d.mount_point() == Path::new("/"))
        .or_else(|| disks.list().first());

    match disk {
        Some(d) if d.total_space() > 0 => {
            let used = d.total_space() - d.available_space();
            used as f32 / d.total_space() as f32 * 100.0
        }
        _ => 0.0,
    }
}
