use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use ptrs_metrics::dataset::{load_dataset, read_csv, read_json};
use ptrs_metrics::error::PtrsError;

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_csv_and_json_fixtures_agree() {
    let from_csv = load_dataset(&fixture("invoices.csv")).unwrap();
    let from_json = load_dataset(&fixture("invoices.json")).unwrap();

    assert_eq!(from_csv.len(), 4);
    assert_eq!(from_json.len(), 4);

    for (a, b) in from_csv.iter().zip(&from_json) {
        assert_eq!(a.invoice_number, b.invoice_number);
        assert_eq!(a.invoice_amount, b.invoice_amount);
        assert_eq!(a.due_date, b.due_date);
        assert_eq!(a.paid_date, b.paid_date);
        assert_eq!(a.payment_term, b.payment_term);
        assert_eq!(a.payee.abn, b.payee.abn);
        assert_eq!(a.payee.acn, b.payee.acn);
    }
}

#[test]
fn test_csv_empty_cells_become_none() {
    let invoices = load_dataset(&fixture("invoices.csv")).unwrap();
    let unpaid = &invoices[3];

    assert!(!unpaid.paid_status);
    assert_eq!(unpaid.paid_date, None);
    assert_eq!(unpaid.payment_term, None);
    assert_eq!(unpaid.payee.acn, None);
    assert_eq!(unpaid.invoice_amount, dec!(2000.00));
    assert!(unpaid.is_small_business);
}

#[test]
fn test_json_defaults() {
    let invoices = read_json(
        r#"[{"invoiceNumber": "A-1", "invoiceAmount": "12.30", "dueDate": "2024-01-31"}]"#,
    )
    .unwrap();
    let invoice = &invoices[0];

    assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    assert!(!invoice.paid_status);
    assert!(!invoice.is_peppol_enabled);
    assert!(invoice.is_small_business);
    assert!(!invoice.is_partial_payment);
    assert!(invoice.payer.is_empty());
}

#[test]
fn test_bad_amount_reports_row_and_field() {
    let err = read_json(
        r#"[
            {"invoiceNumber": "A-1", "invoiceAmount": "10.00", "dueDate": "2024-01-31"},
            {"invoiceNumber": "A-2", "invoiceAmount": "ten", "dueDate": "2024-01-31"}
        ]"#,
    )
    .unwrap_err();

    match err {
        PtrsError::InvalidInput { row, field, .. } => {
            assert_eq!(row, 2);
            assert_eq!(field, "invoiceAmount");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_negative_amount_rejected() {
    let err = read_json(
        r#"[
            {"invoiceNumber": "SB-1", "invoiceAmount": "200.00", "dueDate": "2024-01-31"},
            {"invoiceNumber": "LB-1", "invoiceAmount": "-150.00", "dueDate": "2024-01-31", "isSmallBusiness": false}
        ]"#,
    )
    .unwrap_err();

    match err {
        PtrsError::InvalidInput { row, field, reason } => {
            assert_eq!(row, 2);
            assert_eq!(field, "invoiceAmount");
            assert!(reason.contains("negative"), "{reason}");
        }
        other => panic!("unexpected error: {other}"),
    }

    let csv = "invoiceNumber,invoiceAmount,dueDate\nA-1,-0.01,2024-01-01\n";
    assert!(matches!(
        read_csv(csv.as_bytes()),
        Err(PtrsError::InvalidInput { field: "invoiceAmount", .. })
    ));
}

#[test]
fn test_json_numeric_amounts_accepted() {
    let invoices = read_json(
        r#"[
            {"invoiceNumber": "N-1", "invoiceAmount": 1000.0, "dueDate": "2024-01-31"},
            {"invoiceNumber": "N-2", "invoiceAmount": 250, "dueDate": "2024-01-31"},
            {"invoiceNumber": "N-3", "invoiceAmount": 12.34, "dueDate": "2024-01-31"}
        ]"#,
    )
    .unwrap();

    assert_eq!(invoices[0].invoice_amount, dec!(1000));
    assert_eq!(invoices[1].invoice_amount, dec!(250));
    assert_eq!(invoices[2].invoice_amount, dec!(12.34));
}

#[test]
fn test_non_numeric_amount_types_report_row_and_field() {
    for amount in ["true", "null", "{}", "[1]"] {
        let input = format!(
            r#"[
                {{"invoiceNumber": "A-1", "invoiceAmount": "1.00", "dueDate": "2024-01-31"}},
                {{"invoiceNumber": "A-2", "invoiceAmount": {amount}, "dueDate": "2024-01-31"}}
            ]"#
        );
        match read_json(&input) {
            Err(PtrsError::InvalidInput { row, field, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(field, "invoiceAmount");
            }
            other => panic!("expected invalid amount for {amount}, got {other:?}"),
        }
    }
}

#[test]
fn test_bad_dates_and_terms_rejected() {
    let cases = [
        (
            r#"[{"invoiceNumber": "A", "invoiceAmount": "1", "dueDate": "31/01/2024"}]"#,
            "dueDate",
        ),
        (
            r#"[{"invoiceNumber": "A", "invoiceAmount": "1", "dueDate": "2024-01-31", "paidStatus": true, "paidDate": "soon"}]"#,
            "paidDate",
        ),
        (
            r#"[{"invoiceNumber": "A", "invoiceAmount": "1", "dueDate": "2024-01-31", "paymentTerm": -5}]"#,
            "paymentTerm",
        ),
        (
            r#"[{"invoiceNumber": " ", "invoiceAmount": "1", "dueDate": "2024-01-31"}]"#,
            "invoiceNumber",
        ),
    ];

    for (input, expected) in cases {
        match read_json(input) {
            Err(PtrsError::InvalidInput { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected invalid {expected}, got {other:?}"),
        }
    }
}

#[test]
fn test_paid_without_date_is_not_a_boundary_error() {
    let input = "invoiceNumber,invoiceAmount,dueDate,paidStatus,paidDate\nA-1,5.00,2024-01-01,true,\n";
    let invoices = read_csv(input.as_bytes()).unwrap();

    assert!(invoices[0].paid_status);
    assert_eq!(invoices[0].paid_date, None);
}

#[test]
fn test_unsupported_extension() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("invoices.xlsx");
    fs::write(&path, "not a dataset").unwrap();

    assert!(matches!(
        load_dataset(&path),
        Err(PtrsError::UnsupportedDataset(_))
    ));
}

#[test]
fn test_malformed_json_is_a_json_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.json");
    fs::write(&path, "[{").unwrap();

    assert!(matches!(load_dataset(&path), Err(PtrsError::Json(_))));
}
