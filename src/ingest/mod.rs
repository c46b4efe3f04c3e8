/// CSV ingest for the two input datasets.
///
/// Submodules:
/// - `water_level`: holding tank depth log
/// - `drought`: US Drought Monitor county export

pub mod drought;
pub mod water_level;

use crate::model::{Result, TankmonError};
use std::fs::File;
use std::path::Path;

/// Row counts from one load, for the ingest summary log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestStats {
    pub total: usize,
    pub kept: usize,
}

impl IngestStats {
    pub fn dropped(&self) -> usize {
        self.total - self.kept
    }
}

/// Opens a trimmed, header-aware CSV reader and checks that every column in
/// `required` is present.
pub(crate) fn open_csv(path: &Path, required: &[&str]) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|source| TankmonError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file);

    let headers = reader.headers().map_err(|source| TankmonError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(TankmonError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    Ok(reader)
}

/// Short name used as log context.
pub(crate) fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
