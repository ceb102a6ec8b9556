use std::path::Path;

use csv::Writer;
use patro_core::error::AppError;
use patro_core::models::CalendarData;
use patro_core::traits::Exporter;
use serde::Serialize;

use crate::{create_file, prepare};

/// One CSV row per day.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DayRecord<'a> {
    year: i32,
    month: u32,
    day: &'a str,
    day_in_en: &'a str,
    en: &'a str,
    is_holiday: bool,
    tithi: &'a str,
    event: &'a str,
}

/// Flattens the dataset into a table with a header row. Missing `tithi` and
/// `event` values are written as empty cells.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        Self
    }
}

impl Exporter for CsvExporter {
    fn export(
        &self,
        data: &CalendarData,
        output: &Path,
        include_all_fields: bool,
    ) -> Result<(), AppError> {
        let data = prepare(data, include_all_fields);
        let mut writer = Writer::from_writer(create_file(output)?);
        let csv_error = |e: csv::Error| {
            AppError::file_system(format!("Failed to write {}: {e}", output.display()))
                .with_source(e)
        };

        let mut rows = 0usize;
        for (year, months) in data.iter() {
            for month in months {
                for day in &month.days {
                    writer
                        .serialize(DayRecord {
                            year,
                            month: month.month,
                            day: &day.day,
                            day_in_en: &day.day_in_en,
                            en: &day.en,
                            is_holiday: day.is_holiday,
                            tithi: day.tithi.as_deref().unwrap_or_default(),
                            event: day.event.as_deref().unwrap_or_default(),
                        })
                        .map_err(csv_error)?;
                    rows += 1;
                }
            }
        }
        writer.flush()?;

        tracing::info!(path = %output.display(), rows, "Exported CSV");
        Ok(())
    }
}
