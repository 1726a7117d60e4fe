//! Workbook-backed data provider
//!
//! Each test case reads its rows from the worksheet named after it — the
//! mapping is supplied explicitly by the caller, never inferred. Row 0 is a
//! header and is skipped; the header also fixes the column count. Data rows
//! with fewer populated cells than the header are padded with empty strings,
//! never truncated and never a fault.

use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use thiserror::Error;
use tracing::debug;

/// Data provider errors
#[derive(Error, Debug)]
pub enum DataError {
    #[error("cannot open workbook {path}: {source}")]
    FileUnavailable {
        path: String,
        #[source]
        source: calamine::XlsxError,
    },

    #[error("workbook has no sheet named `{0}`")]
    SheetNotFound(String),

    #[error("failed to read sheet `{sheet}`: {source}")]
    SheetUnreadable {
        sheet: String,
        #[source]
        source: calamine::XlsxError,
    },
}

/// A workbook file supplying case data.
///
/// Holds only the path: every [`rows_for`](Self::rows_for) invocation opens
/// the file fresh, so edits between runs (or between cases) are always
/// picked up and nothing is cached across invocations.
#[derive(Debug, Clone)]
pub struct Workbook {
    path: PathBuf,
}

impl Workbook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows for the named sheet, header excluded, cells as display strings.
    pub fn rows_for(&self, sheet: &str) -> Result<Vec<Vec<String>>, DataError> {
        let mut workbook: Xlsx<_> =
            open_workbook(&self.path).map_err(|source| DataError::FileUnavailable {
                path: self.path.display().to_string(),
                source,
            })?;

        ensure_sheet_exists(&workbook.sheet_names(), sheet)?;

        let range = workbook
            .worksheet_range(sheet)
            .map_err(|source| DataError::SheetUnreadable {
                sheet: sheet.to_string(),
                source,
            })?;

        let rows = rows_from_range(&range);
        debug!(
            "Loaded {} data rows from sheet `{}` of {}",
            rows.len(),
            sheet,
            self.path.display()
        );
        Ok(rows)
    }
}

fn ensure_sheet_exists(names: &[String], sheet: &str) -> Result<(), DataError> {
    if names.iter().any(|n| n == sheet) {
        Ok(())
    } else {
        Err(DataError::SheetNotFound(sheet.to_string()))
    }
}

/// Shape a sheet range into data rows.
///
/// The column count comes from the header row alone: the index of its last
/// non-empty cell. Data rows are emitted at exactly that width, short rows
/// padded with empty strings.
fn rows_from_range(range: &Range<Data>) -> Vec<Vec<String>> {
    let Some(header) = range.rows().next() else {
        return Vec::new();
    };

    let Some(last) = header.iter().rposition(|cell| !matches!(cell, Data::Empty)) else {
        return Vec::new();
    };
    let width = last + 1;

    range
        .rows()
        .skip(1)
        .map(|row| {
            (0..width)
                .map(|col| row.get(col).map(format_cell).unwrap_or_default())
                .collect()
        })
        .collect()
}

/// Display-formatted cell value; empty cells become the empty string.
fn format_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}
