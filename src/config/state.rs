use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct State {
    pub counter: Counter,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Counter {
    pub last_number: u32,
    pub last_year: u32,
}

impl Default for Counter {
    fn default() -> Self {
        Self {
            last_number: 0,
            last_year: chrono::Utc::now().year() as u32,
        }
    }
}

impl Counter {
    /// Sequence number for the next report in `year`; restarts at 1 each year
    pub fn next_seq(&self, year: u32) -> u32 {
        if self.last_year == year {
            self.last_number + 1
        } else {
            1
        }
    }
}

/// A report written to the output directory
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HistoryEntry {
    pub number: String,
    pub report_type: String,
    pub date: NaiveDate,
    pub file: String,
    /// Dataset the report was computed from
    pub dataset: String,
    /// Report this one amends
    #[serde(default)]
    pub modified_from: Option<String>,
    #[serde(default)]
    pub invoices: usize,
    #[serde(default)]
    pub sbtcp_invoices: usize,
    #[serde(default)]
    pub trade_credit_percentage: f64,
}
