use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, instrument, warn};

use crate::dataset::{open_source, DataSource};
use crate::error::PipelineError;
use crate::pdf::{svg_to_pdf, write_pdf};
use crate::plots::render_svg;
use crate::reg_lin::LinearFit;

pub const DEFAULT_INPUT_PATH: &str = "skostr_hoyde.csv";
pub const DEFAULT_OUTPUT_PATH: &str = "output_path.pdf";

#[derive(Clone, Debug)]
pub struct RunConfig {
    pub output: PathBuf,
    /// Open the written pdf in the system viewer.
    pub show: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
            show: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RunReport {
    pub output: PathBuf,
    pub fit: LinearFit,
    pub points: usize,
}

/// Load, fit, plot and write the pdf. Nothing is written unless every step before the write succeeds.
#[instrument(skip_all, fields(input = %source.path().display()))]
pub fn run(source: &dyn DataSource, config: &RunConfig) -> Result<RunReport, PipelineError> {
    let dataset = source.load()?;
    info!(points = dataset.len(), "loaded dataset");

    let fit = LinearFit::fit(&dataset)?;
    info!(
        intercept = fit.intercept,
        slope = fit.slope,
        "fitted regression line"
    );

    let svg = render_svg(&dataset, &fit)?;
    let pdf = svg_to_pdf(&svg)?;
    debug!(svg_bytes = svg.len(), pdf_bytes = pdf.len(), "rendered chart");

    write_pdf(&config.output, &pdf)?;
    info!(output = %config.output.display(), "wrote plot");

    if config.show {
        preview(&config.output);
    }

    Ok(RunReport {
        output: config.output.clone(),
        fit,
        points: dataset.len(),
    })
}

/// Plots `input` into [`DEFAULT_OUTPUT_PATH`] and returns that path.
pub fn process_file(input: impl AsRef<Path>) -> Result<PathBuf, PipelineError> {
    let source = open_source(input.as_ref(), None, None)?;
    let report = run(source.as_ref(), &RunConfig::default())?;

    Ok(report.output)
}

/// Best effort, failures only produce a warning.
pub fn preview(path: &Path) {
    match viewer_command(path).status() {
        Ok(status) if status.success() => debug!(path = %path.display(), "opened viewer"),
        Ok(status) => warn!(%status, "viewer exited unsuccessfully"),
        Err(e) => warn!("cannot open viewer: {e}"),
    }
}

#[cfg(target_os = "macos")]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("open");
    command.arg(path);
    command
}

#[cfg(windows)]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]).arg(path);
    command
}

#[cfg(all(unix, not(target_os = "macos")))]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(path);
    command
}
