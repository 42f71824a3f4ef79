use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{PtrsError, Result};

/// Date format used for every date crossing the crate boundary
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `yyyy-MM-dd` date
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| PtrsError::InvalidDate(input.to_string()))
}

/// One invoice row as it arrives in an uploaded dataset (JSON or CSV)
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub payee_entity_name: Option<String>,
    #[serde(default)]
    pub payee_entity_abn: Option<String>,
    #[serde(default)]
    pub payee_entity_acn: Option<String>,
    #[serde(default)]
    pub payee_entity_arbn: Option<String>,
    #[serde(default)]
    pub payer_entity_name: Option<String>,
    #[serde(default)]
    pub payer_entity_abn: Option<String>,
    #[serde(default)]
    pub payer_entity_acn_arbn: Option<String>,
    #[serde(default)]
    pub invoice_amount: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub paid_status: bool,
    #[serde(default)]
    pub paid_date: Option<String>,
    #[serde(default)]
    pub payment_term: Option<i64>,
    #[serde(default)]
    pub is_peppol_enabled: Option<bool>,
    #[serde(default)]
    pub is_small_business: Option<bool>,
    #[serde(default)]
    pub is_partial_payment: Option<bool>,
}

/// The entity a payment was made to
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Payee {
    pub name: Option<String>,
    pub abn: Option<String>,
    pub acn: Option<String>,
    pub arbn: Option<String>,
}

/// The reporting entity, as recorded on each dataset row
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EntityDetails {
    pub name: Option<String>,
    pub abn: Option<String>,
    pub acn_arbn: Option<String>,
}

impl EntityDetails {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.abn.is_none() && self.acn_arbn.is_none()
    }
}

/// A validated trade credit payment
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub invoice_number: String,
    pub payee: Payee,
    pub payer: EntityDetails,
    pub invoice_amount: Decimal,
    pub due_date: NaiveDate,
    pub paid_status: bool,
    pub paid_date: Option<NaiveDate>,
    /// Agreed payment term in calendar days
    pub payment_term: Option<u32>,
    pub is_peppol_enabled: bool,
    pub is_small_business: bool,
    pub is_partial_payment: bool,
}

impl Invoice {
    /// An unpaid small-business invoice with no counterparty details
    pub fn new(invoice_number: impl Into<String>, invoice_amount: Decimal, due_date: NaiveDate) -> Self {
        Self {
            invoice_number: invoice_number.into(),
            payee: Payee::default(),
            payer: EntityDetails::default(),
            invoice_amount,
            due_date,
            paid_status: false,
            paid_date: None,
            payment_term: None,
            is_peppol_enabled: false,
            is_small_business: true,
            is_partial_payment: false,
        }
    }

    /// Part of the small business trade credit payment subset
    pub fn is_sbtcp(&self) -> bool {
        self.is_small_business && !self.is_partial_payment
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl InvoiceRecord {
    /// Convert into a typed invoice. `row` is the 1-based dataset row used in errors.
    pub fn into_invoice(self, row: usize) -> Result<Invoice> {
        let invoice_number = self.invoice_number.trim().to_string();
        if invoice_number.is_empty() {
            return Err(PtrsError::InvalidInput {
                row,
                field: "invoiceNumber",
                reason: "must not be empty".to_string(),
            });
        }

        let invoice_amount =
            Decimal::from_str(self.invoice_amount.trim()).map_err(|_| PtrsError::InvalidInput {
                row,
                field: "invoiceAmount",
                reason: format!("'{}' is not a decimal amount", self.invoice_amount),
            })?;
        if invoice_amount < Decimal::ZERO {
            return Err(PtrsError::InvalidInput {
                row,
                field: "invoiceAmount",
                reason: format!("{invoice_amount} must not be negative"),
            });
        }

        let due_date = parse_date(&self.due_date).map_err(|_| PtrsError::InvalidInput {
            row,
            field: "dueDate",
            reason: format!("'{}' is not a YYYY-MM-DD date", self.due_date),
        })?;

        let paid_date = match non_blank(self.paid_date) {
            Some(s) => Some(parse_date(&s).map_err(|_| PtrsError::InvalidInput {
                row,
                field: "paidDate",
                reason: format!("'{s}' is not a YYYY-MM-DD date"),
            })?),
            None => None,
        };

        let payment_term = match self.payment_term {
            Some(term) => Some(u32::try_from(term).map_err(|_| PtrsError::InvalidInput {
                row,
                field: "paymentTerm",
                reason: format!("{term} is not a number of days"),
            })?),
            None => None,
        };

        Ok(Invoice {
            invoice_number,
            payee: Payee {
                name: non_blank(self.payee_entity_name),
                abn: non_blank(self.payee_entity_abn),
                acn: non_blank(self.payee_entity_acn),
                arbn: non_blank(self.payee_entity_arbn),
            },
            payer: EntityDetails {
                name: non_blank(self.payer_entity_name),
                abn: non_blank(self.payer_entity_abn),
                acn_arbn: non_blank(self.payer_entity_acn_arbn),
            },
            invoice_amount,
            due_date,
            paid_status: self.paid_status,
            paid_date,
            payment_term,
            is_peppol_enabled: self.is_peppol_enabled.unwrap_or(false),
            is_small_business: self.is_small_business.unwrap_or(true),
            is_partial_payment: self.is_partial_payment.unwrap_or(false),
        })
    }
}
