use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum DataLoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed csv in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("cannot open workbook {path}: {source}")]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook {path} has no sheet named {sheet:?}")]
    MissingSheet { path: PathBuf, sheet: String },

    #[error("sheet in {path} is empty")]
    EmptySheet { path: PathBuf },

    #[error("column {column:?} not found in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("row {row}, column {column:?}: {value:?} is not a finite number")]
    NotNumeric {
        row: usize,
        column: String,
        value: String,
    },

    #[error("unsupported input format for {path}")]
    UnsupportedFormat { path: PathBuf },
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DegenerateDataError {
    #[error("at least 2 points are needed to fit a line, got {count}")]
    TooFewPoints { count: usize },

    #[error("every shoe size equals {x}, the slope is undefined")]
    ConstantPredictor { x: f64 },
}

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("chart drawing failed: {0}")]
    Chart(String),

    #[error("generated svg is invalid: {0}")]
    Svg(String),

    #[error("pdf conversion failed: {0}")]
    Pdf(String),

    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    DataLoad(#[from] DataLoadError),

    #[error(transparent)]
    DegenerateData(#[from] DegenerateDataError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
