//! MobSF CLI binary.
//!
//! A command-line interface for interacting with the MobSF API.

use std::process::ExitCode;

use clap::Parser;
use mobsf_cli::cli::Cli;
use mobsf_cli::logging::init_logging;
use mobsf_cli::App;

/// Exit status after Ctrl-C.
const INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let client = match cli.client() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Check MOBSF_SERVER / -s and MOBSF_API_KEY / -a");
            return ExitCode::FAILURE;
        }
    };

    let mut app = App::stdout(client).with_format(cli.output_format());

    tokio::select! {
        result = app.execute(cli.command) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nInterrupted by user");
            ExitCode::from(INTERRUPTED)
        }
    }
}
