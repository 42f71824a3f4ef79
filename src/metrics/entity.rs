use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::invoice::Invoice;

static ABN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{11}$").unwrap());
static NINE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{9}$").unwrap());

/// Identifier format checks for one invoice's payee
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct EntityValidationResult {
    #[serde(rename = "invoiceNumber")]
    pub invoice_number: String,
    #[serde(rename = "isValidABN")]
    pub is_valid_abn: bool,
    #[serde(rename = "isValidACN")]
    pub is_valid_acn: bool,
    #[serde(rename = "isValidARBN")]
    pub is_valid_arbn: bool,
}

impl EntityValidationResult {
    pub fn is_valid(&self) -> bool {
        self.is_valid_abn && self.is_valid_acn && self.is_valid_arbn
    }
}

/// ABN must be exactly 11 digits
pub fn is_valid_abn(abn: Option<&str>) -> bool {
    abn.is_some_and(|v| ABN_PATTERN.is_match(v))
}

/// ACN and ARBN are optional; when present they must be exactly 9 digits
pub fn is_valid_company_number(number: Option<&str>) -> bool {
    number.map_or(true, |v| NINE_DIGITS.is_match(v))
}

pub fn validate_entity(invoice: &Invoice) -> EntityValidationResult {
    EntityValidationResult {
        invoice_number: invoice.invoice_number.clone(),
        is_valid_abn: is_valid_abn(invoice.payee.abn.as_deref()),
        is_valid_acn: is_valid_company_number(invoice.payee.acn.as_deref()),
        is_valid_arbn: is_valid_company_number(invoice.payee.arbn.as_deref()),
    }
}

pub fn validate_entities(invoices: &[Invoice]) -> Vec<EntityValidationResult> {
    let results: Vec<_> = invoices.iter().map(validate_entity).collect();

    let invalid = results.iter().filter(|r| !r.is_valid()).count();
    if invalid > 0 {
        log::warn!("{invalid} of {} invoices have malformed payee identifiers", results.len());
    }

    results
}
