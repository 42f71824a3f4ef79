//! Per-invoice payment timing and the order statistics computed over it.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::invoice::Invoice;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Round half up, matching how the reporting portal rounds day counts
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Days from due date to payment, clamped at zero for early payments.
/// `None` for unpaid invoices and for paid invoices missing a paid date.
pub fn days_to_pay(invoice: &Invoice) -> Option<i64> {
    if !invoice.paid_status {
        return None;
    }
    let paid = invoice.paid_date?;
    Some((paid - invoice.due_date).num_days().max(0))
}

/// Days an unpaid invoice is past its due date as of `now` (negative if not yet due)
pub fn overdue_days(invoice: &Invoice, now: DateTime<Utc>) -> Option<i64> {
    if invoice.paid_status {
        return None;
    }
    let due = invoice.due_date.and_time(NaiveTime::MIN).and_utc();
    let elapsed = (now - due).num_milliseconds() as f64 / MILLIS_PER_DAY;
    Some(round_half_up(elapsed) as i64)
}

/// Arithmetic mean rounded to two decimals, 0 when empty
pub fn average(days: &[i64]) -> f64 {
    if days.is_empty() {
        return 0.0;
    }
    let total: i64 = days.iter().sum();
    round2(total as f64 / days.len() as f64)
}

/// Median of an ascending slice rounded to two decimals, 0 when empty
pub fn median(sorted: &[i64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    let mid = n / 2;
    let value = if n % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    } else {
        sorted[mid] as f64
    };
    round2(value)
}

/// Nearest-rank percentile of an ascending slice, 0 when the rank falls outside it
pub fn percentile(sorted: &[i64], p: f64) -> i64 {
    let rank = (p / 100.0 * sorted.len() as f64).ceil() as i64 - 1;
    usize::try_from(rank)
        .ok()
        .and_then(|idx| sorted.get(idx))
        .copied()
        .unwrap_or(0)
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTimes {
    pub average_payment_time: f64,
    pub median_payment_time: f64,
    pub percentile80: i64,
    pub percentile95: i64,
}

/// Summary statistics over every invoice with a known days-to-pay
pub fn payment_times(invoices: &[Invoice]) -> PaymentTimes {
    let mut days: Vec<i64> = invoices.iter().filter_map(days_to_pay).collect();
    days.sort_unstable();

    PaymentTimes {
        average_payment_time: average(&days),
        median_payment_time: median(&days),
        percentile80: percentile(&days, 80.0),
        percentile95: percentile(&days, 95.0),
    }
}
