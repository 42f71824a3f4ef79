mod buckets;
mod entity;
mod invoice;
mod report;
mod stats;
mod timing;

pub use buckets::{classify, Bucket, Classification, DayRange, Exclusion, ExclusionReason};
pub use entity::{
    is_valid_abn, is_valid_company_number, validate_entities, validate_entity,
    EntityValidationResult,
};
pub use invoice::{parse_date, EntityDetails, Invoice, InvoiceRecord, Payee, DATE_FORMAT};
pub use report::{calculate_invoice_metrics, MetricsReport, PaymentMetrics, ReportType};
pub use stats::{
    payment_time_percentages, peppol_enabled_percentage, percentage_of, percentage_within_terms,
    small_business_trade_credit_percentage, PaymentTimePercentages, MIN_TRADE_CREDIT_PERCENTAGE,
};
pub use timing::{average, days_to_pay, median, overdue_days, payment_times, percentile, PaymentTimes};
