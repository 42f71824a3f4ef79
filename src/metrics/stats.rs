use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::invoice::Invoice;
use super::timing::{days_to_pay, round2};

/// Reporting floor for the small business trade credit share
pub const MIN_TRADE_CREDIT_PERCENTAGE: f64 = 0.01;

/// `part / whole` as a percentage rounded to two decimals; 0 when `whole` is 0
pub fn percentage_of(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(part as f64 / whole as f64 * 100.0)
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTimePercentages {
    pub within30_days: f64,
    pub between31_and60_days: f64,
    pub over60_days: f64,
}

/// Share of invoices paid no later than their agreed payment term
pub fn percentage_within_terms(sbtcp: &[Invoice]) -> f64 {
    let within = sbtcp
        .iter()
        .filter(|inv| match (inv.payment_term, days_to_pay(inv)) {
            (Some(term), Some(days)) if term > 0 => days <= i64::from(term),
            _ => false,
        })
        .count();
    percentage_of(within, sbtcp.len())
}

/// Three-way split of payment times; independent of the twelve buckets
pub fn payment_time_percentages(sbtcp: &[Invoice]) -> PaymentTimePercentages {
    let (mut within30, mut mid, mut over60) = (0, 0, 0);
    for days in sbtcp.iter().filter_map(days_to_pay) {
        match days {
            d if d <= 30 => within30 += 1,
            31..=60 => mid += 1,
            _ => over60 += 1,
        }
    }

    PaymentTimePercentages {
        within30_days: percentage_of(within30, sbtcp.len()),
        between31_and60_days: percentage_of(mid, sbtcp.len()),
        over60_days: percentage_of(over60, sbtcp.len()),
    }
}

pub fn peppol_enabled_percentage(sbtcp: &[Invoice]) -> f64 {
    let enabled = sbtcp.iter().filter(|inv| inv.is_peppol_enabled).count();
    percentage_of(enabled, sbtcp.len())
}

pub fn total_value(invoices: &[Invoice]) -> Decimal {
    invoices.iter().map(|inv| inv.invoice_amount).sum()
}

/// Small business share of all trade credit by value. Partial payments left out
/// of the SBTCP subset still count towards the small business value.
/// Kept within 0.01 and 100 even when credit notes carry negative amounts.
pub fn small_business_trade_credit_percentage(
    tcp: &[Invoice],
    sbtcp: &[Invoice],
    excluded_partials: &[Invoice],
) -> f64 {
    let total = total_value(tcp);
    if total.is_zero() {
        return MIN_TRADE_CREDIT_PERCENTAGE;
    }

    let small_business = total_value(sbtcp) + total_value(excluded_partials);
    let share = (small_business / total * dec!(100))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0);

    share.clamp(MIN_TRADE_CREDIT_PERCENTAGE, 100.0)
}
