use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use skostr_hoyde::dataset::{open_source, InputFormat};
use skostr_hoyde::logging;
use skostr_hoyde::PipelineError;
use skostr_hoyde::pipeline::{self, RunConfig, DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH};

/// Fits height against shoe size and plots the regression line to a pdf.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Headerless two column csv, or a workbook with `skostr` and `hoyde` columns
    #[arg(default_value = DEFAULT_INPUT_PATH)]
    pub input: PathBuf,

    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Input format, guessed from the extension when omitted
    #[arg(long, value_enum)]
    pub format: Option<InputFormat>,

    /// Worksheet to read, the first one by default
    #[arg(long)]
    pub sheet: Option<String>,

    /// Open the pdf once written
    #[arg(long)]
    pub show: bool,

    /// Increases log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init(logging::verbosity_level(args.verbose)) {
        eprintln!("invalid {} filter: {e}", logging::LOG_ENV);
        return ExitCode::FAILURE;
    }

    let config = RunConfig {
        output: args.output,
        show: args.show,
    };

    let result = open_source(args.input, args.format, args.sheet)
        .map_err(PipelineError::from)
        .and_then(|source| pipeline::run(source.as_ref(), &config));

    match result {
        Ok(report) => {
            println!("Regression Line: {}", report.fit.equation());
            println!("{}", report.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_fixed_paths() {
        let args = Args::try_parse_from(["reg_lin"]).unwrap();

        assert_eq!(args.input, PathBuf::from("skostr_hoyde.csv"));
        assert_eq!(args.output, PathBuf::from("output_path.pdf"));
        assert_eq!(args.format, None);
        assert!(!args.show);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn parses_spreadsheet_options() {
        let args = Args::try_parse_from([
            "reg_lin",
            "data.bin",
            "--format",
            "spreadsheet",
            "--sheet",
            "Ark1",
            "--output",
            "plots/fit.pdf",
            "-vv",
        ])
        .unwrap();

        assert_eq!(args.format, Some(InputFormat::Spreadsheet));
        assert_eq!(args.sheet.as_deref(), Some("Ark1"));
        assert_eq!(args.output, PathBuf::from("plots/fit.pdf"));
        assert_eq!(args.verbose, 2);
    }
}
