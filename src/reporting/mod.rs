mod generator;

pub use generator::{
    format_report_number, generate_report, resolve_report_number, GeneratedReport,
};
