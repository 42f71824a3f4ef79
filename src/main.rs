use chrono::{DateTime, Datelike, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use ptrs_metrics::config::{
    config_dir, ensure_initialized, load_config, load_state, CONFIG_TEMPLATE,
};
use ptrs_metrics::dataset::load_dataset;
use ptrs_metrics::error::{PtrsError, Result};
use ptrs_metrics::metrics::{
    calculate_invoice_metrics, parse_date, validate_entities, Bucket, ExclusionReason,
    MetricsReport, ReportType,
};
use ptrs_metrics::reporting::{format_report_number, generate_report};

#[derive(Parser)]
#[command(name = "ptrs")]
#[command(version, about = "Payment Times Reporting metrics calculator", long_about = None)]
struct Cli {
    /// Path to config directory (default: XDG config dir or ~/.ptrs)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Compute payment times metrics for a dataset and print them
    Metrics {
        /// Invoice dataset (.json or .csv)
        dataset: PathBuf,

        /// Report type, e.g. "Standard PTR" or "Nil Reporter"
        #[arg(short = 't', long = "type")]
        report_type: Option<String>,

        /// Treat as a modified (amended) report
        #[arg(long)]
        modified: bool,

        /// Age unpaid invoices as of this date (YYYY-MM-DD, default: now)
        #[arg(long)]
        as_of: Option<String>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check payee ABN/ACN/ARBN formats
    Validate {
        /// Invoice dataset (.json or .csv)
        dataset: PathBuf,

        /// Show every invoice, not only invalid ones
        #[arg(long)]
        all: bool,
    },

    /// Compute a report and save it to the output directory
    Report {
        /// Invoice dataset (.json or .csv)
        dataset: PathBuf,

        /// Report type (default: from config.toml)
        #[arg(short = 't', long = "type")]
        report_type: Option<String>,

        /// Report number or index from 'list' that this report amends
        #[arg(long, value_name = "REPORT")]
        modified_from: Option<String>,

        /// Age unpaid invoices as of this date (YYYY-MM-DD, default: now)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// List saved reports
    List {
        /// Number of reports to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show configuration and next report number
    Status,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: Cli) -> Result<()> {
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Metrics {
            dataset,
            report_type,
            modified,
            as_of,
            json,
        } => cmd_metrics(&cfg_dir, &dataset, report_type, modified, as_of, json),
        Commands::Validate { dataset, all } => cmd_validate(&dataset, all),
        Commands::Report {
            dataset,
            report_type,
            modified_from,
            as_of,
        } => cmd_report(&cfg_dir, &dataset, report_type, modified_from, as_of),
        Commands::List { limit } => cmd_list(&cfg_dir, limit),
        Commands::Status => cmd_status(&cfg_dir),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(PtrsError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir.join("output"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized ptrs config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your entity details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Compute a report:          ptrs report <dataset.csv>");

    Ok(())
}

/// Instant used to age unpaid invoices
fn as_of_instant(as_of: Option<&str>) -> Result<DateTime<Utc>> {
    match as_of {
        Some(s) => Ok(parse_date(s)?.and_time(NaiveTime::MIN).and_utc()),
        None => Ok(Utc::now()),
    }
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "METRIC")]
    metric: &'static str,
    #[tabled(rename = "VALUE")]
    value: String,
}

#[derive(Tabled)]
struct BucketRow {
    #[tabled(rename = "BUCKET")]
    label: String,
    #[tabled(rename = "INVOICES")]
    number: usize,
    #[tabled(rename = "VALUE")]
    value: String,
}

#[derive(Tabled)]
struct ValidationRow {
    #[tabled(rename = "INVOICE")]
    invoice: String,
    #[tabled(rename = "ABN")]
    abn: &'static str,
    #[tabled(rename = "ACN")]
    acn: &'static str,
    #[tabled(rename = "ARBN")]
    arbn: &'static str,
}

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "TYPE")]
    report_type: String,
    #[tabled(rename = "INVOICES")]
    invoices: usize,
    #[tabled(rename = "SB SHARE")]
    share: String,
    #[tabled(rename = "AMENDS")]
    amends: String,
}

fn format_grouped_int(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out.chars().rev().collect()
}

/// Format a money amount with two decimal places and thousands separators
fn format_money(value: Decimal, currency_symbol: &str) -> String {
    let rounded = format!("{:.2}", value);
    let (whole, frac) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let negative = whole.starts_with('-');
    let digits = whole.trim_start_matches('-');
    let grouped = format_grouped_int(digits.parse::<u64>().unwrap_or(0));

    if negative {
        format!("-{currency_symbol}{grouped}.{frac}")
    } else {
        format!("{currency_symbol}{grouped}.{frac}")
    }
}

fn bucket_table(buckets: &[Bucket], currency_symbol: &str) -> String {
    let rows: Vec<BucketRow> = buckets
        .iter()
        .map(|b| BucketRow {
            label: b.label.clone(),
            number: b.number,
            value: format_money(b.value, currency_symbol),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

fn print_report(report: &MetricsReport, currency_symbol: &str, as_of: DateTime<Utc>) {
    println!("Payment Times Report ({})", report.report_type);
    println!("{}", "-".repeat(50));

    if report.report_type == ReportType::NilReporter {
        println!("Nil report: no trade credit payments were computed.");
        if let Some(declaration) = report.declaration {
            println!("Declaration:            {declaration}");
        }
        if let Some(confirmation) = report.confirmation_statement {
            println!("Confirmation statement: {confirmation}");
        }
        return;
    }

    if let Some(entity) = &report.entity_details {
        println!(
            "Entity:           {} (ABN {})",
            entity.name.as_deref().unwrap_or("-"),
            entity.abn.as_deref().unwrap_or("-")
        );
    }
    println!(
        "Invoices:         {} ({} small business)",
        report.tcp_dataset.len(),
        report.sbtcp_dataset.len()
    );

    let m = &report.metrics;
    let rows = vec![
        SummaryRow {
            metric: "Average payment time (days)",
            value: format!("{:.2}", m.payment_times.average_payment_time),
        },
        SummaryRow {
            metric: "Median payment time (days)",
            value: format!("{:.2}", m.payment_times.median_payment_time),
        },
        SummaryRow {
            metric: "80th percentile (days)",
            value: m.payment_times.percentile80.to_string(),
        },
        SummaryRow {
            metric: "95th percentile (days)",
            value: m.payment_times.percentile95.to_string(),
        },
        SummaryRow {
            metric: "Paid within terms",
            value: format!("{:.2}%", m.percentage_within_terms),
        },
        SummaryRow {
            metric: "Paid within 30 days",
            value: format!("{:.2}%", m.payment_time_percentages.within30_days),
        },
        SummaryRow {
            metric: "Paid in 31 to 60 days",
            value: format!("{:.2}%", m.payment_time_percentages.between31_and60_days),
        },
        SummaryRow {
            metric: "Paid after 60 days",
            value: format!("{:.2}%", m.payment_time_percentages.over60_days),
        },
        SummaryRow {
            metric: "Small business trade credit",
            value: format!("{:.2}%", m.small_business_trade_credit_percentage),
        },
        SummaryRow {
            metric: "Peppol enabled",
            value: format!("{:.2}%", m.peppol_enabled_percentage),
        },
        SummaryRow {
            metric: "Total trade credit value",
            value: format_money(m.total_tcp_value, currency_symbol),
        },
        SummaryRow {
            metric: "Small business value",
            value: format_money(m.total_sbtcp_value, currency_symbol),
        },
    ];
    println!("{}", Table::new(rows).with(Style::rounded()).to_string());

    if report.paid_buckets.is_empty() && report.unpaid_buckets.is_empty() {
        println!();
        println!("No small business invoices to classify.");
        return;
    }

    println!();
    println!("Paid invoices");
    println!("{}", bucket_table(&report.paid_buckets, currency_symbol));
    println!();
    println!("Unpaid invoices as of {}", as_of.format("%Y-%m-%d"));
    println!("{}", bucket_table(&report.unpaid_buckets, currency_symbol));

    if !report.exclusions.is_empty() {
        let missing = report
            .exclusions
            .iter()
            .filter(|e| e.reason == ExclusionReason::MissingPaidDate)
            .count();
        println!();
        println!(
            "Excluded: {} invoice(s) ({} missing paid date, {} not yet overdue)",
            report.exclusions.len(),
            missing,
            report.exclusions.len() - missing
        );
    }
}

/// Compute and print metrics without saving
fn cmd_metrics(
    cfg_dir: &Path,
    dataset: &Path,
    report_type: Option<String>,
    modified: bool,
    as_of: Option<String>,
    json: bool,
) -> Result<()> {
    // Config is optional here; fall back to defaults when not initialized
    let config = load_config(cfg_dir).ok();
    let currency_symbol = config
        .as_ref()
        .map_or("$", |c| c.report.currency_symbol.as_str());
    let report_type: ReportType = match report_type {
        Some(t) => t.parse().unwrap_or_default(),
        None => config
            .as_ref()
            .map(|c| c.report.report_type())
            .unwrap_or_default(),
    };

    let now = as_of_instant(as_of.as_deref())?;
    let invoices = load_dataset(dataset)?;
    let report = calculate_invoice_metrics(&invoices, &report_type, modified, now);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, currency_symbol, now);
    }

    Ok(())
}

fn yes_no(valid: bool) -> &'static str {
    if valid {
        "valid"
    } else {
        "INVALID"
    }
}

/// Check payee identifier formats
fn cmd_validate(dataset: &Path, all: bool) -> Result<()> {
    let invoices = load_dataset(dataset)?;
    let results = validate_entities(&invoices);
    let valid = results.iter().filter(|r| r.is_valid()).count();

    let rows: Vec<ValidationRow> = results
        .iter()
        .filter(|r| all || !r.is_valid())
        .map(|r| ValidationRow {
            invoice: r.invoice_number.clone(),
            abn: yes_no(r.is_valid_abn),
            acn: yes_no(r.is_valid_acn),
            arbn: yes_no(r.is_valid_arbn),
        })
        .collect();

    if !rows.is_empty() {
        println!("{}", Table::new(rows).with(Style::rounded()).to_string());
    }
    println!(
        "{} of {} invoices have valid payee identifiers",
        valid,
        results.len()
    );

    Ok(())
}

/// Compute a report and save it
fn cmd_report(
    cfg_dir: &Path,
    dataset: &Path,
    report_type: Option<String>,
    modified_from: Option<String>,
    as_of: Option<String>,
) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let now = as_of_instant(as_of.as_deref())?;
    let report_type = report_type.map(|t| t.parse().unwrap_or_default());
    let generated = generate_report(cfg_dir, dataset, report_type, modified_from.as_deref(), now)?;

    println!("Generated {}", generated.number);
    println!("  Type:     {}", generated.report.report_type);
    println!("  Invoices: {}", generated.report.tcp_dataset.len());
    println!(
        "  SB share: {:.2}%",
        generated.report.metrics.small_business_trade_credit_percentage
    );
    println!("  Saved:    {}", generated.path.display());

    Ok(())
}

/// List saved reports, newest first
fn cmd_list(cfg_dir: &Path, limit: Option<usize>) -> Result<()> {
    ensure_initialized(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    if state.history.is_empty() {
        println!("No reports generated yet.");
        return Ok(());
    }

    let rows: Vec<ReportRow> = state
        .history
        .iter()
        .rev()
        .take(limit.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(idx, entry)| ReportRow {
            index: idx + 1,
            number: entry.number.clone(),
            date: entry.date.to_string(),
            report_type: entry.report_type.clone(),
            invoices: entry.invoices,
            share: format!("{:.2}%", entry.trade_credit_percentage),
            amends: entry.modified_from.clone().unwrap_or_default(),
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::rounded()).to_string());
    println!();
    println!("Total: {} reports", state.history.len());

    Ok(())
}

/// Show configuration and next report number
fn cmd_status(cfg_dir: &Path) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    let year = Utc::now().year() as u32;
    let next_number =
        format_report_number(&config.report.number_format, year, state.counter.next_seq(year));

    println!("PTRS Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Entity:           {}", config.entity.name);
    println!("ABN:              {}", config.entity.abn);
    println!("Default type:     {}", config.report.report_type());
    println!("Next report:      {}", next_number);

    if !state.history.is_empty() {
        println!();
        println!("Recent reports:");
        for entry in state.history.iter().rev().take(5) {
            println!(
                "  {} - {} - {} invoices",
                entry.number, entry.report_type, entry.invoices
            );
        }
    }

    Ok(())
}
