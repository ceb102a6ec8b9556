//! Structural and semantic checks for calendar data.
//!
//! Rules run on [`serde_json::Value`] so that a dataset read from disk gets
//! the same treatment as one produced by a scrape: a missing field, a `days`
//! that is not an array or a non-boolean `isHoliday` are reported instead of
//! failing deserialization. Typed entry points serialize the model first.
//!
//! Errors make a result invalid; warnings are informational only.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;
use crate::models::{CalendarData, CalendarDay, CalendarMonth};
use crate::numerals::native_to_arabic;

const REQUIRED_DAY_FIELDS: [&str; 3] = ["day", "dayInEn", "en"];
const MIN_DAYS: usize = 28;
const MAX_DAYS: usize = 32;
const MAX_DAY_NUMBER: u32 = 32;

/// Outcome of a validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    /// An empty, valid result.
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        let mut result = Self::new();
        result.error(message);
        result
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.is_valid = false;
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Fold `other` into `self`, prefixing each of its messages.
    pub fn merge_prefixed(&mut self, prefix: &str, other: ValidationResult) {
        for e in other.errors {
            self.error(format!("{prefix}: {e}"));
        }
        for w in other.warnings {
            self.warning(format!("{prefix}: {w}"));
        }
    }

    /// Fold `other` into `self` unchanged.
    pub fn merge(&mut self, other: ValidationResult) {
        self.is_valid &= other.is_valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Turn a failed result into a `Validation` error; a passing result
    /// yields its warnings.
    pub fn into_result(self) -> Result<Vec<String>, AppError> {
        if self.is_valid {
            Ok(self.warnings)
        } else {
            Err(AppError::validation(self.errors.join("; ")))
        }
    }
}

/// Check one day record.
pub fn check_day(day: &Value) -> ValidationResult {
    let mut result = ValidationResult::new();
    let Some(fields) = day.as_object() else {
        result.error("Day must be an object");
        return result;
    };

    let text = |name: &str| {
        fields
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    };

    for name in REQUIRED_DAY_FIELDS {
        if text(name).is_none() {
            result.error(format!("Missing required field '{name}'"));
        }
    }

    if let (Some(native), Some(arabic)) = (text("day"), text("dayInEn")) {
        let converted = native_to_arabic(native);
        if converted != arabic {
            result.warning(format!(
                "Numeral mismatch: day '{native}' converts to '{converted}' but dayInEn is '{arabic}'"
            ));
        }
    }

    if let Some(en) = text("en")
        && !is_one_or_two_digits(en)
    {
        result.warning(format!("Unexpected reference day '{en}'"));
    }

    if let Some(arabic) = text("dayInEn")
        && day_number(arabic).is_none()
    {
        result.error(format!("Day number '{arabic}' is not between 1 and 32"));
    }

    if !matches!(fields.get("isHoliday"), Some(Value::Bool(_))) {
        result.error("isHoliday must be a boolean");
    }

    result
}

/// `dayInEn` as an integer, if it lies in `1..=32`.
fn day_number(arabic: &str) -> Option<u32> {
    arabic
        .trim()
        .parse()
        .ok()
        .filter(|n| (1..=MAX_DAY_NUMBER).contains(n))
}

fn is_one_or_two_digits(s: &str) -> bool {
    (1..=2).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

/// Check one month record, including the day sequence.
pub fn check_month(month: &Value) -> ValidationResult {
    let mut result = ValidationResult::new();
    let Some(fields) = month.as_object() else {
        result.error("Month must be an object");
        return result;
    };

    match fields.get("month").and_then(Value::as_u64) {
        Some(m) if (1..=12).contains(&m) => {}
        other => result.error(format!(
            "Invalid month number: {}",
            other.map_or_else(|| describe(fields.get("month")), |m| m.to_string())
        )),
    }

    let Some(days) = fields.get("days").and_then(Value::as_array) else {
        result.error("days must be an array");
        return result;
    };

    if !(MIN_DAYS..=MAX_DAYS).contains(&days.len()) {
        result.warning(format!(
            "Unusual number of days: {} (expected {MIN_DAYS}-{MAX_DAYS})",
            days.len()
        ));
    }

    for (i, day) in days.iter().enumerate() {
        result.merge_prefixed(&format!("Day {}", i + 1), check_day(day));
    }

    let numbers: Vec<Option<u32>> = days
        .iter()
        .map(|d| d.get("dayInEn").and_then(Value::as_str).and_then(day_number))
        .collect();
    for (i, pair) in numbers.windows(2).enumerate() {
        let broken = match (pair[0], pair[1]) {
            (Some(previous), Some(current)) => {
                let rollover = previous > 28 && current == 1;
                current != previous + 1 && !rollover
            }
            _ => true,
        };
        if broken {
            result.warning(format!(
                "Non-sequential days at day {}: {} followed by {}",
                i + 2,
                show_day(pair[0]),
                show_day(pair[1])
            ));
        }
    }

    result
}

fn show_day(number: Option<u32>) -> String {
    number.map_or_else(|| "an invalid day".to_string(), |n| n.to_string())
}

fn describe(value: Option<&Value>) -> String {
    match value {
        None => "missing".to_string(),
        Some(v) => v.to_string(),
    }
}

/// Validates days, months, years and whole datasets.
///
/// The default validator expects every year to hold months 1 through 12 in
/// order. [`Validator::for_months`] narrows that to a configured subset, as
/// produced by a partial acquisition run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validator {
    expected_months: Vec<u32>,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            expected_months: (1..=12).collect(),
        }
    }
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_months(months: &[u32]) -> Self {
        Self {
            expected_months: months.to_vec(),
        }
    }

    pub fn expected_months(&self) -> &[u32] {
        &self.expected_months
    }

    pub fn validate_day(&self, day: &CalendarDay) -> ValidationResult {
        with_value(day, check_day)
    }

    pub fn validate_month(&self, month: &CalendarMonth) -> ValidationResult {
        with_value(month, check_month)
    }

    pub fn validate_year(&self, year: i32, months: &[CalendarMonth]) -> ValidationResult {
        with_value(months, |v| self.check_year(&year.to_string(), v))
    }

    pub fn validate_data(&self, data: &CalendarData) -> ValidationResult {
        with_value(data, |v| self.check_dataset(v))
    }

    /// Check one year: month count, every month, and month positions.
    pub fn check_year(&self, year: &str, months: &Value) -> ValidationResult {
        let mut result = ValidationResult::new();
        let Some(months) = months.as_array() else {
            result.error(format!("Year {year} must be an array of months"));
            return result;
        };

        let expected = self.expected_months.len();
        if months.len() != expected {
            result.error(format!(
                "Year {year} should have {expected} months, found {}",
                months.len()
            ));
        }

        for (i, month) in months.iter().enumerate() {
            result.merge_prefixed(&format!("Year {year}, month {}", i + 1), check_month(month));

            let declared = month.get("month").and_then(Value::as_u64);
            if let (Some(declared), Some(&wanted)) = (declared, self.expected_months.get(i))
                && declared != u64::from(wanted)
            {
                result.error(format!(
                    "Year {year}: month at position {} declares month {declared}, expected {wanted}",
                    i + 1
                ));
            }
        }

        result
    }

    /// Check a whole dataset: an object keyed by year.
    pub fn check_dataset(&self, data: &Value) -> ValidationResult {
        let mut result = ValidationResult::new();
        let Some(years) = data.as_object() else {
            result.error("Dataset must be an object keyed by year");
            return result;
        };

        for (key, months) in years {
            if key.trim().parse::<i32>().is_err() {
                result.error(format!("Invalid year key '{key}'"));
            }
            result.merge(self.check_year(key, months));
        }

        result
    }
}

fn with_value<T: Serialize + ?Sized>(
    record: &T,
    check: impl FnOnce(&Value) -> ValidationResult,
) -> ValidationResult {
    match serde_json::to_value(record) {
        Ok(value) => check(&value),
        Err(e) => ValidationResult::failed(format!("Record cannot be serialized: {e}")),
    }
}

/// Validate a dataset file on disk without touching the network.
pub fn validate_dataset_file(
    validator: &Validator,
    path: &Path,
) -> Result<ValidationResult, AppError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        AppError::file_system(format!("Failed to read {}: {e}", path.display())).with_source(e)
    })?;
    let value: Value = serde_json::from_str(&raw).map_err(|e| {
        AppError::parsing(format!("Invalid JSON in {}: {e}", path.display())).with_source(e)
    })?;
    Ok(validator.check_dataset(&value))
}
