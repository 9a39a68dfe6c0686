//! courier-core: configuration and payload shaping shared by all courier
//! crates.

pub mod chunk;
pub mod config;
pub mod report;

pub use chunk::{split_file, split_message};
pub use config::{ConfigError, CourierConfig, DeliveryConfig, ReportConfig};
pub use report::{render_report, HostMetrics, ReportSection};
