use serde::{Deserialize, Serialize};

use crate::metrics::{EntityDetails, ReportType};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub entity: EntitySettings,
    #[serde(default)]
    pub report: ReportSettings,
    pub output: OutputSettings,
}

/// The reporting entity lodging the payment times report
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EntitySettings {
    pub name: String,
    pub abn: String,
    #[serde(default)]
    pub acn_arbn: Option<String>,
}

impl EntitySettings {
    pub fn details(&self) -> EntityDetails {
        EntityDetails {
            name: Some(self.name.clone()),
            abn: Some(self.abn.clone()),
            acn_arbn: self.acn_arbn.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReportSettings {
    #[serde(default = "default_report_type")]
    pub default_type: String,
    #[serde(default = "default_number_format")]
    pub number_format: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl ReportSettings {
    pub fn report_type(&self) -> ReportType {
        self.default_type.parse().unwrap_or_default()
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            default_type: default_report_type(),
            number_format: default_number_format(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

fn default_report_type() -> String {
    ReportType::Standard.to_string()
}

fn default_number_format() -> String {
    "PTR-{year}-{seq:04}".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct OutputSettings {
    pub output_dir: String,
}
