use chrono::{DateTime, Datelike, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{
    load_config, load_state, resolve_output_dir, save_state, HistoryEntry, State,
};
use crate::dataset::load_dataset;
use crate::error::{PtrsError, Result};
use crate::metrics::{calculate_invoice_metrics, MetricsReport, ReportType};

/// Result of writing a report to disk
#[derive(Debug)]
pub struct GeneratedReport {
    pub number: String,
    pub path: PathBuf,
    pub report: MetricsReport,
}

/// Format report number from template
pub fn format_report_number(format: &str, year: u32, seq: u32) -> String {
    format
        .replace("{year}", &year.to_string())
        .replace("{seq:04}", &format!("{:04}", seq))
        .replace("{seq:05}", &format!("{:05}", seq))
        .replace("{seq:03}", &format!("{:03}", seq))
}

/// Resolve a report reference to its number.
/// Accepts either a 1-based index from 'list' (newest first) or the full number.
pub fn resolve_report_number(state: &State, reference: &str) -> Result<String> {
    if let Ok(idx) = reference.parse::<usize>() {
        let reports: Vec<_> = state.history.iter().rev().collect();
        if idx == 0 || idx > reports.len() {
            return Err(PtrsError::InvalidReportIndex(reference.to_string()));
        }
        return Ok(reports[idx - 1].number.clone());
    }

    if state.history.iter().any(|e| e.number == reference) {
        Ok(reference.to_string())
    } else {
        Err(PtrsError::ReportNotFound(reference.to_string()))
    }
}

/// Compute a report from `dataset_path` and store it in the output directory.
/// A `modified_from` reference marks the report as an amendment of an earlier one.
pub fn generate_report(
    cfg_dir: &Path,
    dataset_path: &Path,
    report_type: Option<ReportType>,
    modified_from: Option<&str>,
    now: DateTime<Utc>,
) -> Result<GeneratedReport> {
    let config = load_config(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;

    let modified_from = modified_from
        .map(|reference| resolve_report_number(&state, reference))
        .transpose()?;

    let invoices = load_dataset(dataset_path)?;
    let report_type = report_type.unwrap_or_else(|| config.report.report_type());

    let mut report =
        calculate_invoice_metrics(&invoices, &report_type, modified_from.is_some(), now);
    if report.entity_details.is_none() && report_type != ReportType::NilReporter {
        report.entity_details = Some(config.entity.details());
    }

    let year = now.year() as u32;
    let seq = state.counter.next_seq(year);
    let number = format_report_number(&config.report.number_format, year, seq);

    let output_dir = resolve_output_dir(&config.output.output_dir, cfg_dir);
    fs::create_dir_all(&output_dir)?;
    let file = format!("{number}.json");
    let path = output_dir.join(&file);
    fs::write(&path, serde_json::to_string_pretty(&report)?)?;
    log::info!("wrote {} to {}", number, path.display());

    state.counter.last_number = seq;
    state.counter.last_year = year;
    state.history.push(HistoryEntry {
        number: number.clone(),
        report_type: report_type.to_string(),
        date: now.date_naive(),
        file,
        dataset: dataset_path.display().to_string(),
        modified_from,
        invoices: report.tcp_dataset.len(),
        sbtcp_invoices: report.sbtcp_dataset.len(),
        trade_credit_percentage: report.metrics.small_business_trade_credit_percentage,
    });
    save_state(cfg_dir, &state)?;

    Ok(GeneratedReport {
        number,
        path,
        report,
    })
}
