//! Status report composition: plain text rendering of host metrics.
//!
//! Sampling is the caller's job (the CLI does it with sysinfo); this module
//! only shapes text, so it stays trivially testable.

/// Point-in-time host snapshot, ready for rendering.
#[derive(Debug, Clone)]
pub struct HostMetrics {
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub disk_percent: f32,
    pub os_name: String,
    pub os_version: String,
    pub hostname: Option<String>,
    /// Preformatted local time, e.g. `2026-03-01 14:05:00`.
    pub timestamp: String,
}

/// A titled block of lines appended after the metrics header.
#[derive(Debug, Clone)]
pub struct ReportSection {
    pub title: String,
    pub lines: Vec<String>,
}

impl ReportSection {
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }
}

/// Render the status report: fixed metrics header, then each non-empty
/// section as a titled block. Long reports are chunked downstream like any
/// other message.
pub fn render_report(metrics: &HostMetrics, sections: &[ReportSection]) -> String {
    let mut out = format!(
        "System Status Update: {}\nCPU Usage: {:.1}%\nMemory Usage: {:.1}%\nDisk Usage: {:.1}%\nSystem: {} {}\n",
        metrics.timestamp,
        metrics.cpu_percent,
        metrics.memory_percent,
        metrics.disk_percent,
        metrics.os_name,
        metrics.os_version,
    );
    if let Some(hostname) = &metrics.hostname {
        out.push_str("Host: ");
        out.push_str(hostname);
        out.push('\n');
    }

    for section in sections {
        if section.lines.is_empty() {
            continue;
        }
        out.push_str("\n\n");
        out.push_str(&section.title);
        out.push_str(":\n");
        out.push_str(&section.lines.join("\n"));
    }

    out
}
