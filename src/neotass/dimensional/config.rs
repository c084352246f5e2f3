//! Run configuration loaded from a TOML file.
//!
//! Every field has a default matching the NEOTASS extracts, so an absent or
//! partial file is valid. Source column mappings and calendar localization are
//! explicit values here rather than process-wide state.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::neotass::dimensional::error::{EtlError, Result};
use crate::neotass::dimensional::transform::calendar::CalendarNames;

/// Locale used for month and weekday names when none is configured.
pub const DEFAULT_LOCALE: &str = "pt_BR";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EtlConfig {
    pub paths: PathConfig,
    pub calendar: CalendarConfig,
    pub columns: SourceMapping,
}

impl EtlConfig {
    /// Reads the configuration from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|err| {
            EtlError::Config(format!(
                "failed to read config file '{}': {err}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathConfig {
    pub opportunities: PathBuf,
    pub sellout: PathBuf,
    pub output: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            opportunities: Path::new("data").join("registros_oportunidades.json"),
            sellout: Path::new("data").join("sellout.csv"),
            output: Path::new("output").join("banco_dimensional_neotass.xlsx"),
        }
    }
}

/// Calendar localization: either a locale name or explicit name tables.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalendarConfig {
    /// Locale name such as `pt_BR` or `POSIX`.
    pub locale: Option<String>,
    /// Twelve month names, January first.
    pub month_names: Option<Vec<String>>,
    /// Seven weekday names, Monday first.
    pub weekday_names: Option<Vec<String>>,
}

impl CalendarConfig {
    /// Resolves the configured localization. Explicit tables take precedence
    /// over the locale name and must be given together.
    pub fn names(&self) -> Result<CalendarNames> {
        match (&self.month_names, &self.weekday_names) {
            (Some(months), Some(weekdays)) => {
                CalendarNames::from_tables(months.clone(), weekdays.clone())
            }
            (None, None) => {
                CalendarNames::from_locale(self.locale.as_deref().unwrap_or(DEFAULT_LOCALE))
            }
            _ => Err(EtlError::Config(
                "calendar.month_names and calendar.weekday_names must be set together".into(),
            )),
        }
    }
}

/// Raw column labels of both sources, keyed by canonical field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceMapping {
    pub opportunities: OpportunityColumns,
    pub sellout: SelloutColumns,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpportunityColumns {
    pub tax_id: String,
    pub partner_name: String,
    pub product: String,
    pub registered_at: String,
    pub quantity: String,
    pub unit_price: String,
    pub status: String,
}

impl Default for OpportunityColumns {
    fn default() -> Self {
        Self {
            tax_id: "CNPJ Parceiro".into(),
            partner_name: "Nome Fantasia".into(),
            product: "Nome Produto".into(),
            registered_at: "Data de Registro".into(),
            quantity: "quantidade".into(),
            unit_price: "Valor Unitário".into(),
            status: "status".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelloutColumns {
    pub tax_id: String,
    pub partner_name: String,
    pub product: String,
    pub invoiced_at: String,
    pub invoice_number: String,
    pub quantity: String,
    pub unit_price: String,
}

impl Default for SelloutColumns {
    fn default() -> Self {
        Self {
            tax_id: "CNpj Parceiro".into(),
            partner_name: "Nome Fantasia".into(),
            product: "Nome_Produto".into(),
            invoiced_at: "Data_Fatura".into(),
            invoice_number: "NF".into(),
            quantity: "Quantidade".into(),
            unit_price: "Valor_Unitario".into(),
        }
    }
}
