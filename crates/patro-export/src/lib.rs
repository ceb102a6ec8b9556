pub mod csv;
pub mod format;
pub mod json;

use std::borrow::Cow;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use patro_core::error::AppError;
use patro_core::models::CalendarData;

pub use crate::csv::CsvExporter;
pub use format::{ExportFormat, export_dataset, output_paths};
pub use json::{JsonExporter, load_dataset};

/// The dataset as it should be written: untouched, or with meaningless
/// `tithi`/`event` values dropped.
pub(crate) fn prepare(data: &CalendarData, include_all_fields: bool) -> Cow<'_, CalendarData> {
    if include_all_fields {
        Cow::Borrowed(data)
    } else {
        Cow::Owned(data.simplified())
    }
}

/// Create `path` for writing, creating missing parent directories first.
pub(crate) fn create_file(path: &Path) -> Result<BufWriter<File>, AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::file_system(format!(
                "Failed to create directory {}: {e}",
                parent.display()
            ))
            .with_source(e)
        })?;
    }

    let file = File::create(path).map_err(|e| {
        AppError::file_system(format!("Failed to create {}: {e}", path.display())).with_source(e)
    })?;
    Ok(BufWriter::new(file))
}
