use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::invoice::Invoice;
use super::timing::{days_to_pay, overdue_days};

/// The six day ranges shared by the paid and unpaid bucket sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayRange {
    UpTo20,
    From21To30,
    From31To60,
    From61To90,
    From91To120,
    Over120,
}

impl DayRange {
    pub const ALL: [DayRange; 6] = [
        DayRange::UpTo20,
        DayRange::From21To30,
        DayRange::From31To60,
        DayRange::From61To90,
        DayRange::From91To120,
        DayRange::Over120,
    ];

    /// Range containing `days`; `None` for negative counts
    pub fn for_days(days: i64) -> Option<Self> {
        match days {
            0..=20 => Some(DayRange::UpTo20),
            21..=30 => Some(DayRange::From21To30),
            31..=60 => Some(DayRange::From31To60),
            61..=90 => Some(DayRange::From61To90),
            91..=120 => Some(DayRange::From91To120),
            d if d > 120 => Some(DayRange::Over120),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    pub fn paid_label(self) -> &'static str {
        match self {
            DayRange::UpTo20 => "Invoices paid within 20 days of receipt",
            DayRange::From21To30 => "Invoices paid between 21 and 30 days",
            DayRange::From31To60 => "Invoices paid between 31 and 60 days",
            DayRange::From61To90 => "Invoices paid between 61 and 90 days",
            DayRange::From91To120 => "Invoices paid between 91 and 120 days",
            DayRange::Over120 => "Invoices paid in more than 120 days",
        }
    }

    pub fn unpaid_label(self) -> &'static str {
        match self {
            DayRange::UpTo20 => "Unpaid invoices overdue by 0 to 20 days",
            DayRange::From21To30 => "Unpaid invoices overdue by 21 to 30 days",
            DayRange::From31To60 => "Unpaid invoices overdue by 31 to 60 days",
            DayRange::From61To90 => "Unpaid invoices overdue by 61 to 90 days",
            DayRange::From91To120 => "Unpaid invoices overdue by 91 to 120 days",
            DayRange::Over120 => "Unpaid invoices overdue by more than 120 days",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Bucket {
    pub label: String,
    pub number: usize,
    pub value: Decimal,
}

impl Bucket {
    fn empty(label: &str) -> Self {
        Self {
            label: label.to_string(),
            number: 0,
            value: Decimal::ZERO,
        }
    }

    fn add(&mut self, amount: Decimal) {
        self.number += 1;
        self.value += amount;
    }
}

/// Two fractional digits, as the regulator's export expects
pub fn to_cents(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Why an invoice was left out of every bucket
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Marked paid but carries no paid date
    MissingPaidDate,
    /// Unpaid and not yet past its due date
    NotYetOverdue,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Exclusion {
    pub invoice_number: String,
    pub reason: ExclusionReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub paid: Vec<Bucket>,
    pub unpaid: Vec<Bucket>,
    pub exclusions: Vec<Exclusion>,
}

impl Classification {
    pub fn bucketed_count(&self) -> usize {
        self.paid.iter().chain(&self.unpaid).map(|b| b.number).sum()
    }
}

/// Assign every invoice to at most one of the twelve buckets in a single pass.
/// Unpaid invoices are aged against `now`.
pub fn classify(invoices: &[Invoice], now: DateTime<Utc>) -> Classification {
    let mut paid: Vec<Bucket> = DayRange::ALL.iter().map(|r| Bucket::empty(r.paid_label())).collect();
    let mut unpaid: Vec<Bucket> = DayRange::ALL.iter().map(|r| Bucket::empty(r.unpaid_label())).collect();
    let mut exclusions = Vec::new();

    for invoice in invoices {
        let (target, days, reason) = if invoice.paid_status {
            (&mut paid, days_to_pay(invoice), ExclusionReason::MissingPaidDate)
        } else {
            (&mut unpaid, overdue_days(invoice, now), ExclusionReason::NotYetOverdue)
        };

        match days.and_then(DayRange::for_days) {
            Some(range) => target[range.index()].add(invoice.invoice_amount),
            None => {
                log::debug!("excluding {} from buckets: {:?}", invoice.invoice_number, reason);
                exclusions.push(Exclusion {
                    invoice_number: invoice.invoice_number.clone(),
                    reason,
                });
            }
        }
    }

    for bucket in paid.iter_mut().chain(unpaid.iter_mut()) {
        bucket.value = to_cents(bucket.value);
    }

    Classification {
        paid,
        unpaid,
        exclusions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_boundaries_are_inclusive() {
        assert_eq!(DayRange::for_days(0), Some(DayRange::UpTo20));
        assert_eq!(DayRange::for_days(20), Some(DayRange::UpTo20));
        assert_eq!(DayRange::for_days(21), Some(DayRange::From21To30));
        assert_eq!(DayRange::for_days(60), Some(DayRange::From31To60));
        assert_eq!(DayRange::for_days(120), Some(DayRange::From91To120));
        assert_eq!(DayRange::for_days(121), Some(DayRange::Over120));
        assert_eq!(DayRange::for_days(-1), None);
    }

    #[test]
    fn cents_are_padded() {
        assert_eq!(to_cents(Decimal::ZERO).to_string(), "0.00");
        assert_eq!(to_cents(Decimal::new(12345, 3)).to_string(), "12.35");
    }
}
