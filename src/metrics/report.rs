use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::buckets::{classify, to_cents, Bucket, Exclusion};
use super::entity::{validate_entities, EntityValidationResult};
use super::invoice::{EntityDetails, Invoice};
use super::stats::{
    payment_time_percentages, peppol_enabled_percentage, percentage_within_terms,
    small_business_trade_credit_percentage, total_value, PaymentTimePercentages,
    MIN_TRADE_CREDIT_PERCENTAGE,
};
use super::timing::{payment_times, PaymentTimes};

/// Report classification chosen by the reporting entity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReportType {
    #[default]
    Standard,
    NilReporter,
    ExternalAdministration,
    /// Any unrecognized label; computed like a standard report
    Other(String),
}

impl ReportType {
    pub fn as_str(&self) -> &str {
        match self {
            ReportType::Standard => "Standard PTR",
            ReportType::NilReporter => "Nil Reporter",
            ReportType::ExternalAdministration => "External Administration",
            ReportType::Other(label) => label,
        }
    }
}

impl FromStr for ReportType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "Standard PTR" => ReportType::Standard,
            "Nil Reporter" => ReportType::NilReporter,
            "External Administration" => ReportType::ExternalAdministration,
            other => ReportType::Other(other.to_string()),
        })
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ReportType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReportType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(label.parse().unwrap_or_default())
    }
}

/// Statistics block of a report
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMetrics {
    pub payment_times: PaymentTimes,
    pub percentage_within_terms: f64,
    pub payment_time_percentages: PaymentTimePercentages,
    pub small_business_trade_credit_percentage: f64,
    pub peppol_enabled_percentage: f64,
    pub total_tcp_value: Decimal,
    pub total_sbtcp_value: Decimal,
}

impl Default for PaymentMetrics {
    fn default() -> Self {
        Self {
            payment_times: PaymentTimes::default(),
            percentage_within_terms: 0.0,
            payment_time_percentages: PaymentTimePercentages::default(),
            small_business_trade_credit_percentage: MIN_TRADE_CREDIT_PERCENTAGE,
            peppol_enabled_percentage: 0.0,
            total_tcp_value: to_cents(Decimal::ZERO),
            total_sbtcp_value: to_cents(Decimal::ZERO),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub report_type: ReportType,
    pub tcp_dataset: Vec<Invoice>,
    pub sbtcp_dataset: Vec<Invoice>,
    #[serde(flatten)]
    pub metrics: PaymentMetrics,
    pub paid_buckets: Vec<Bucket>,
    pub unpaid_buckets: Vec<Bucket>,
    pub entity_validation: Vec<EntityValidationResult>,
    pub entity_details: Option<EntityDetails>,
    pub exclusions: Vec<Exclusion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_statement: Option<bool>,
}

impl MetricsReport {
    fn nil(report_type: ReportType, is_modified_report: bool) -> Self {
        Self {
            report_type,
            tcp_dataset: Vec::new(),
            sbtcp_dataset: Vec::new(),
            metrics: PaymentMetrics::default(),
            paid_buckets: Vec::new(),
            unpaid_buckets: Vec::new(),
            entity_validation: Vec::new(),
            entity_details: None,
            exclusions: Vec::new(),
            declaration: Some(false),
            confirmation_statement: is_modified_report.then_some(false),
        }
    }
}

/// Compute the full payment times report for `dataset`.
///
/// `now` ages unpaid invoices; pass a fixed instant for reproducible output.
/// A Nil report skips every computation and ignores the dataset.
pub fn calculate_invoice_metrics(
    dataset: &[Invoice],
    report_type: &ReportType,
    is_modified_report: bool,
    now: DateTime<Utc>,
) -> MetricsReport {
    match report_type {
        ReportType::NilReporter => {
            log::debug!("nil report, skipping {} invoices", dataset.len());
            return MetricsReport::nil(report_type.clone(), is_modified_report);
        }
        ReportType::ExternalAdministration => {
            log::debug!("external administration report computed as standard");
        }
        ReportType::Standard | ReportType::Other(_) => {}
    }

    let tcp_dataset = dataset.to_vec();
    let (sbtcp_dataset, excluded_partials): (Vec<Invoice>, Vec<Invoice>) = dataset
        .iter()
        .filter(|inv| inv.is_small_business)
        .cloned()
        .partition(Invoice::is_sbtcp);

    let metrics = PaymentMetrics {
        payment_times: payment_times(&sbtcp_dataset),
        percentage_within_terms: percentage_within_terms(&sbtcp_dataset),
        payment_time_percentages: payment_time_percentages(&sbtcp_dataset),
        small_business_trade_credit_percentage: small_business_trade_credit_percentage(
            &tcp_dataset,
            &sbtcp_dataset,
            &excluded_partials,
        ),
        peppol_enabled_percentage: peppol_enabled_percentage(&sbtcp_dataset),
        total_tcp_value: to_cents(total_value(&tcp_dataset)),
        total_sbtcp_value: to_cents(total_value(&sbtcp_dataset)),
    };

    let (paid_buckets, unpaid_buckets, exclusions) = if sbtcp_dataset.is_empty() {
        (Vec::new(), Vec::new(), Vec::new())
    } else {
        let classification = classify(&sbtcp_dataset, now);
        (
            classification.paid,
            classification.unpaid,
            classification.exclusions,
        )
    };

    let entity_details = dataset
        .first()
        .map(|inv| inv.payer.clone())
        .filter(|details| !details.is_empty());

    MetricsReport {
        report_type: report_type.clone(),
        entity_validation: validate_entities(&tcp_dataset),
        tcp_dataset,
        sbtcp_dataset,
        metrics,
        paid_buckets,
        unpaid_buckets,
        entity_details,
        exclusions,
        declaration: None,
        confirmation_statement: None,
    }
}
