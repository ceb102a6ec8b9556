use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use patro_core::error::AppError;
use patro_core::models::CalendarData;
use patro_core::traits::Exporter;

use crate::csv::CsvExporter;
use crate::json::JsonExporter;

/// Which exporters to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    All,
}

impl ExportFormat {
    /// The single-file formats this selection expands to.
    pub fn targets(self) -> &'static [ExportFormat] {
        match self {
            ExportFormat::Json => &[ExportFormat::Json],
            ExportFormat::Csv => &[ExportFormat::Csv],
            ExportFormat::All => &[ExportFormat::Json, ExportFormat::Csv],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::All => "all",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "all" => Ok(ExportFormat::All),
            other => Err(AppError::config(format!(
                "Unknown export format '{other}' (expected json, csv or all)"
            ))),
        }
    }
}

/// Output files for `format`: `<dir>/<stem>.<ext>` per target.
pub fn output_paths(dir: &Path, stem: &str, format: ExportFormat) -> Vec<PathBuf> {
    format
        .targets()
        .iter()
        .map(|target| dir.join(format!("{stem}.{}", target.as_str())))
        .collect()
}

/// Run every exporter `format` selects and return the files written.
pub fn export_dataset(
    data: &CalendarData,
    dir: &Path,
    stem: &str,
    format: ExportFormat,
    include_all_fields: bool,
) -> Result<Vec<PathBuf>, AppError> {
    let paths = output_paths(dir, stem, format);
    for (target, path) in format.targets().iter().zip(&paths) {
        match target {
            ExportFormat::Csv => CsvExporter.export(data, path, include_all_fields)?,
            _ => JsonExporter::default().export(data, path, include_all_fields)?,
        }
    }
    Ok(paths)
}
