//! Least squares fit of height against shoe size, plotted to a pdf.

pub mod dataset;
pub mod error;
pub mod logging;
pub mod pdf;
pub mod pipeline;
pub mod plots;
pub mod reg_lin;

pub use dataset::{CsvSource, DataSource, Dataset, InputFormat, SpreadsheetSource};
pub use error::{DataLoadError, DegenerateDataError, PipelineError, RenderError};
pub use pipeline::{process_file, run, RunConfig, RunReport};
pub use reg_lin::LinearFit;
