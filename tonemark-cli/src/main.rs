//! # Tonemark
//!
//! A terminal tool for annotating intonation in speech recordings with ToDI
//! labels.

use log::error;

mod annotations;
mod cli;
mod controls;
mod logging;
mod runner;
mod ui;

fn main() {
    let args = cli::args::build_cli().get_matches();
    let log_buffer = logging::init();

    let code = match runner::run(&args, log_buffer) {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err);
            eprintln!("{}", err);
            -1
        }
    };

    std::process::exit(code)
}
