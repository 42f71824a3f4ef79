pub mod config;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod reporting;

pub use config::{Config, HistoryEntry, State};
pub use dataset::load_dataset;
pub use error::{PtrsError, Result};
pub use metrics::{calculate_invoice_metrics, Invoice, MetricsReport, ReportType};
pub use reporting::{generate_report, GeneratedReport};
