use std::io::Write;
use std::path::{Path, PathBuf};

use patro_core::error::AppError;
use patro_core::models::CalendarData;
use patro_core::traits::Exporter;

use crate::{create_file, prepare};

/// Writes the dataset as a JSON object keyed by year.
#[derive(Debug, Clone, Copy)]
pub struct JsonExporter {
    pretty: bool,
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-line output.
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    /// Write one `<year>.json` per year into `dir`. Each file holds a
    /// one-year dataset, so it loads and validates like the combined file.
    pub fn export_years(
        &self,
        data: &CalendarData,
        dir: &Path,
        include_all_fields: bool,
    ) -> Result<Vec<PathBuf>, AppError> {
        let mut written = Vec::with_capacity(data.len());
        for (year, months) in data.iter() {
            let single: CalendarData = std::iter::once((year, months.clone())).collect();
            let path = dir.join(format!("{year}.json"));
            self.export(&single, &path, include_all_fields)?;
            written.push(path);
        }
        Ok(written)
    }
}

impl Exporter for JsonExporter {
    fn export(
        &self,
        data: &CalendarData,
        output: &Path,
        include_all_fields: bool,
    ) -> Result<(), AppError> {
        let data = prepare(data, include_all_fields);
        let mut writer = create_file(output)?;

        let written = if self.pretty {
            serde_json::to_writer_pretty(&mut writer, &*data)
        } else {
            serde_json::to_writer(&mut writer, &*data)
        };
        written.map_err(|e| {
            AppError::file_system(format!("Failed to write {}: {e}", output.display()))
                .with_source(e)
        })?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::info!(
            path = %output.display(),
            years = data.len(),
            days = data.day_count(),
            "Exported JSON"
        );
        Ok(())
    }
}

/// Read a dataset previously written by [`JsonExporter`].
pub fn load_dataset(path: &Path) -> Result<CalendarData, AppError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        AppError::file_system(format!("Failed to read {}: {e}", path.display())).with_source(e)
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        AppError::parsing(format!("Invalid dataset in {}: {e}", path.display())).with_source(e)
    })
}
