use chrono::{Datelike, Locale, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::neotass::dimensional::error::{EtlError, Result};
use crate::neotass::dimensional::transform::normalize::capitalize;

/// Source of the month and weekday names written to the time dimension.
#[derive(Debug, Clone, PartialEq)]
pub enum CalendarNames {
    /// Names rendered from chrono's locale tables.
    Locale(Locale),
    /// Explicit names; months start at January, weekdays at Monday.
    Table {
        months: Vec<String>,
        weekdays: Vec<String>,
    },
}

impl CalendarNames {
    /// Looks up a locale by name. Both `pt_BR` and `pt-BR` spellings are
    /// accepted.
    pub fn from_locale(name: &str) -> Result<Self> {
        let normalized = name.trim().replace('-', "_");
        Locale::try_from(normalized.as_str())
            .map(CalendarNames::Locale)
            .map_err(|_| EtlError::Config(format!("unknown calendar locale '{name}'")))
    }

    pub fn from_tables(months: Vec<String>, weekdays: Vec<String>) -> Result<Self> {
        if months.len() != 12 {
            return Err(EtlError::Config(format!(
                "calendar.month_names needs 12 entries, found {}",
                months.len()
            )));
        }
        if weekdays.len() != 7 {
            return Err(EtlError::Config(format!(
                "calendar.weekday_names needs 7 entries, found {}",
                weekdays.len()
            )));
        }
        Ok(CalendarNames::Table { months, weekdays })
    }

    /// Full month name of `date`, first letter capitalized.
    pub fn month_name(&self, date: NaiveDate) -> String {
        match self {
            CalendarNames::Locale(locale) => render(date, "%B", *locale),
            CalendarNames::Table { months, .. } => capitalize(&months[date.month0() as usize]),
        }
    }

    /// Full weekday name of `date`, first letter capitalized.
    pub fn weekday_name(&self, date: NaiveDate) -> String {
        match self {
            CalendarNames::Locale(locale) => render(date, "%A", *locale),
            CalendarNames::Table { weekdays, .. } => {
                capitalize(&weekdays[date.weekday().num_days_from_monday() as usize])
            }
        }
    }
}

impl Default for CalendarNames {
    fn default() -> Self {
        CalendarNames::Locale(Locale::pt_BR)
    }
}

fn render(date: NaiveDate, pattern: &str, locale: Locale) -> String {
    let midnight = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
    capitalize(&midnight.format_localized(pattern, locale).to_string())
}
