mod app;
mod effects;
mod logging;
mod persistence;

use std::process::ExitCode;

use pipeline_logging::pipeline_error;

fn main() -> ExitCode {
    logging::initialize(logging::LogDestination::Both);

    let options = match app::CliOptions::from_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("usage: receipt_app [--manual-start] [--output-dir DIR] <receipt files...>");
            return ExitCode::FAILURE;
        }
    };

    match app::run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            pipeline_error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
