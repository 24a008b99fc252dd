use std::fs::File;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use nalgebra::DVector;

use crate::error::DataLoadError;

/// Column holding the shoe size in spreadsheets.
pub const X_COLUMN: &str = "skostr";
/// Column holding the height in spreadsheets.
pub const Y_COLUMN: &str = "hoyde";

/// Paired observations, stored column-wise.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    x: DVector<f64>,
    y: DVector<f64>,
}

impl Dataset {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let (x, y): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();

        Self {
            x: DVector::from_vec(x),
            y: DVector::from_vec(y),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x(&self) -> &DVector<f64> {
        &self.x
    }

    pub fn y(&self) -> &DVector<f64> {
        &self.y
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + Clone + '_ {
        self.x.iter().cloned().zip(self.y.iter().cloned())
    }
}

/// Something a [`Dataset`] can be read from.
pub trait DataSource {
    fn path(&self) -> &Path;

    fn load(&self) -> Result<Dataset, DataLoadError>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    Csv,
    Spreadsheet,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self, DataLoadError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv" | "txt") => Ok(Self::Csv),
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "xla" | "ods") => Ok(Self::Spreadsheet),
            _ => Err(DataLoadError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Picks the loader for `path`, guessing the format from the extension unless one is given.
pub fn open_source(
    path: impl Into<PathBuf>,
    format: Option<InputFormat>,
    sheet: Option<String>,
) -> Result<Box<dyn DataSource>, DataLoadError> {
    let path = path.into();

    let format = match format {
        Some(format) => format,
        None => InputFormat::from_path(&path)?,
    };

    let source: Box<dyn DataSource> = match format {
        InputFormat::Csv => Box::new(CsvSource::new(path)),
        InputFormat::Spreadsheet => Box::new(SpreadsheetSource::new(path, sheet)),
    };

    Ok(source)
}

#[derive(Debug, serde::Deserialize)]
struct Record {
    skostr: String,
    hoyde: String,
}

/// Headerless comma separated file, columns taken by position as (shoe size, height).
#[derive(Clone, Debug)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn csv_error(&self, source: csv::Error) -> DataLoadError {
        DataLoadError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}

impl DataSource for CsvSource {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Dataset, DataLoadError> {
        let file = File::open(&self.path).map_err(|source| DataLoadError::Io {
            path: self.path.clone(),
            source,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut pairs = Vec::new();

        for result in reader.records() {
            let record = result.map_err(|e| self.csv_error(e))?;
            let row = record.position().map_or(pairs.len() + 1, |p| p.line() as usize);

            let Record { skostr, hoyde } = record
                .deserialize::<Record>(None)
                .map_err(|e| self.csv_error(e))?;

            pairs.push((
                number(&skostr, row, X_COLUMN)?,
                number(&hoyde, row, Y_COLUMN)?,
            ));
        }

        tracing::debug!(path = %self.path.display(), rows = pairs.len(), "read csv");

        Ok(Dataset::from_pairs(pairs))
    }
}

/// Workbook with a header row naming the `skostr` and `hoyde` columns.
#[derive(Clone, Debug)]
pub struct SpreadsheetSource {
    path: PathBuf,
    sheet: Option<String>,
}

impl SpreadsheetSource {
    /// Reads the named sheet, or the first one when `sheet` is `None`.
    pub fn new(path: impl Into<PathBuf>, sheet: Option<String>) -> Self {
        Self {
            path: path.into(),
            sheet,
        }
    }

    fn spreadsheet_error(&self, source: calamine::Error) -> DataLoadError {
        DataLoadError::Spreadsheet {
            path: self.path.clone(),
            source,
        }
    }

    fn column_index(&self, header: &[Data], name: &str) -> Result<usize, DataLoadError> {
        header
            .iter()
            .position(|cell| cell.to_string().trim() == name)
            .ok_or_else(|| DataLoadError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }
}

impl DataSource for SpreadsheetSource {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Dataset, DataLoadError> {
        // surfaces a missing file as an io error rather than a format guess failure
        std::fs::metadata(&self.path).map_err(|source| DataLoadError::Io {
            path: self.path.clone(),
            source,
        })?;

        let mut workbook = open_workbook_auto(&self.path).map_err(|e| self.spreadsheet_error(e))?;

        let range = match &self.sheet {
            Some(name) => {
                if !workbook.sheet_names().iter().any(|sheet| sheet == name) {
                    return Err(DataLoadError::MissingSheet {
                        path: self.path.clone(),
                        sheet: name.clone(),
                    });
                }
                workbook.worksheet_range(name)
            }
            None => workbook
                .worksheet_range_at(0)
                .ok_or_else(|| DataLoadError::EmptySheet {
                    path: self.path.clone(),
                })?,
        }
        .map_err(|e| self.spreadsheet_error(e))?;

        let first_row = range.start().map_or(0, |(row, _)| row as usize);
        let mut rows = range.rows();

        let header = rows.next().ok_or_else(|| DataLoadError::EmptySheet {
            path: self.path.clone(),
        })?;

        let x_idx = self.column_index(header, X_COLUMN)?;
        let y_idx = self.column_index(header, Y_COLUMN)?;

        let mut pairs = Vec::new();

        // 1-based sheet row, the header sits on first_row + 1
        for (row_number, row) in (first_row + 2..).zip(rows) {
            if row.iter().all(|cell| matches!(cell, Data::Empty)) {
                continue;
            }

            let x = cell_value(row.get(x_idx), row_number, X_COLUMN)?;
            let y = cell_value(row.get(y_idx), row_number, Y_COLUMN)?;

            pairs.push((x, y));
        }

        tracing::debug!(path = %self.path.display(), rows = pairs.len(), "read spreadsheet");

        Ok(Dataset::from_pairs(pairs))
    }
}

fn cell_value(cell: Option<&Data>, row: usize, column: &str) -> Result<f64, DataLoadError> {
    let cell = cell.unwrap_or(&Data::Empty);

    let value = match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match value {
        Some(value) => finite(value, row, column),
        None => Err(DataLoadError::NotNumeric {
            row,
            column: column.to_string(),
            value: cell.to_string(),
        }),
    }
}

fn number(text: &str, row: usize, column: &str) -> Result<f64, DataLoadError> {
    match text.parse::<f64>() {
        Ok(value) => finite(value, row, column),
        Err(_) => Err(DataLoadError::NotNumeric {
            row,
            column: column.to_string(),
            value: text.to_string(),
        }),
    }
}

fn finite(value: f64, row: usize, column: &str) -> Result<f64, DataLoadError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DataLoadError::NotNumeric {
            row,
            column: column.to_string(),
            value: value.to_string(),
        })
    }
}
