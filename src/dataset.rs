use csv::ReaderBuilder;
use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::{PtrsError, Result};
use crate::metrics::{Invoice, InvoiceRecord};

/// Parse a JSON array of invoice records. `invoiceAmount` may be a string or a number.
pub fn read_json(content: &str) -> Result<Vec<Invoice>> {
    let rows: Vec<Value> = serde_json::from_str(content)?;
    let mut records = Vec::with_capacity(rows.len());
    for (idx, mut row) in rows.into_iter().enumerate() {
        amount_as_text(&mut row, idx + 1)?;
        records.push(serde_json::from_value::<InvoiceRecord>(row)?);
    }
    into_invoices(records)
}

fn amount_as_text(row: &mut Value, row_number: usize) -> Result<()> {
    let Some(amount) = row.get_mut("invoiceAmount") else {
        return Ok(());
    };
    let text = match &*amount {
        Value::String(_) => return Ok(()),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        other => {
            return Err(PtrsError::InvalidInput {
                row: row_number,
                field: "invoiceAmount",
                reason: format!("{other} is not a decimal amount"),
            })
        }
    };
    *amount = Value::String(text);
    Ok(())
}

/// Parse CSV with a header row using the same field names as the JSON form
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Invoice>> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();
    for rec in rdr.deserialize::<InvoiceRecord>() {
        records.push(rec?);
    }
    into_invoices(records)
}

fn into_invoices(records: Vec<InvoiceRecord>) -> Result<Vec<Invoice>> {
    records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| record.into_invoice(idx + 1))
        .collect()
}

/// Load a dataset, choosing the format from the file extension
pub fn load_dataset(path: &Path) -> Result<Vec<Invoice>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let invoices = match ext.as_deref() {
        Some("json") => read_json(&fs::read_to_string(path)?)?,
        Some("csv") => read_csv(fs::File::open(path)?)?,
        _ => return Err(PtrsError::UnsupportedDataset(path.to_path_buf())),
    };

    log::info!("loaded {} invoices from {}", invoices.len(), path.display());
    Ok(invoices)
}
