use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::StampError;

/// Raw values as typed by the user. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StampForm {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    /// Multi-line address text, usually the result of a previous lookup
    pub address: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub temp_c: Option<String>,
    pub temp_f: Option<String>,
    #[serde(default)]
    pub show_map: bool,
}

/// Blank strings count as "not given".
pub(crate) fn given(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateLocale {
    #[default]
    Id,
    En,
}

pub fn weekday_abbreviation(weekday: Weekday, locale: DateLocale) -> &'static str {
    match locale {
        DateLocale::Id => match weekday {
            Weekday::Mon => "Sen",
            Weekday::Tue => "Sel",
            Weekday::Wed => "Rab",
            Weekday::Thu => "Kam",
            Weekday::Fri => "Jum",
            Weekday::Sat => "Sab",
            Weekday::Sun => "Min",
        },
        DateLocale::En => match weekday {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
            Weekday::Sun => "Sun",
        },
    }
}

/// `2024-01-01 (Sen)`
pub fn format_date_label(date: NaiveDate, locale: DateLocale) -> String {
    format!(
        "{} ({})",
        date.format("%Y-%m-%d"),
        weekday_abbreviation(date.weekday(), locale)
    )
}

/// `2024-01-01 (Sen)  08:30`
pub fn format_date_time(date: NaiveDate, time: NaiveTime, locale: DateLocale) -> String {
    format!("{}  {}", format_date_label(date, locale), time.format("%H:%M"))
}

pub fn parse_date(value: &str) -> Result<NaiveDate, StampError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| StampError::InvalidDate(value.trim().to_string()))
}

pub fn parse_time(value: &str) -> Result<NaiveTime, StampError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| StampError::InvalidTime(value.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature {
    pub celsius: f64,
    pub fahrenheit: f64,
}

fn parse_degrees(value: &str, unit: &str) -> Result<f64, StampError> {
    let cleaned = value
        .trim()
        .trim_end_matches(['C', 'F', 'c', 'f'])
        .trim_end_matches('°')
        .trim()
        .replace(',', ".");
    match cleaned.parse::<f64>() {
        Ok(degrees) if degrees.is_finite() => Ok(degrees),
        _ => Err(StampError::InvalidTemperature(format!(
            "'{}' is not a number of degrees {}",
            value.trim(),
            unit
        ))),
    }
}

fn format_degrees(value: f64) -> String {
    // Adding 0.0 turns -0.0 into 0.0
    let whole = value.round() + 0.0;
    if (value - whole).abs() < 0.05 {
        format!("{:.0}", whole)
    } else {
        format!("{:.1}", (value * 10.0).round() / 10.0 + 0.0)
    }
}

impl Temperature {
    /// Parse either or both scales; a missing scale is derived from the other.
    pub fn parse(celsius: Option<&str>, fahrenheit: Option<&str>) -> Result<Option<Self>, StampError> {
        let celsius = celsius.map(str::trim).filter(|v| !v.is_empty());
        let fahrenheit = fahrenheit.map(str::trim).filter(|v| !v.is_empty());

        let temperature = match (celsius, fahrenheit) {
            (None, None) => return Ok(None),
            (Some(c), Some(f)) => Self {
                celsius: parse_degrees(c, "Celsius")?,
                fahrenheit: parse_degrees(f, "Fahrenheit")?,
            },
            (Some(c), None) => {
                let celsius = parse_degrees(c, "Celsius")?;
                Self {
                    celsius,
                    fahrenheit: (celsius * 9.0 / 5.0 + 32.0).round(),
                }
            }
            (None, Some(f)) => {
                let fahrenheit = parse_degrees(f, "Fahrenheit")?;
                Self {
                    celsius: ((fahrenheit - 32.0) * 5.0 / 9.0).round(),
                    fahrenheit,
                }
            }
        };

        Ok(Some(temperature))
    }

    /// `33°C / 91°F`
    pub fn label(&self) -> String {
        format!(
            "{}°C / {}°F",
            format_degrees(self.celsius),
            format_degrees(self.fahrenheit)
        )
    }
}
