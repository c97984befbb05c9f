use tdm_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible.
    if let Err(err) = logging::init_logging() {
        eprintln!("tdm: file logging unavailable ({:#}); logging to stderr", err);
        logging::init_logging_stderr();
    }

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("tdm error: {:#}", err);
        std::process::exit(1);
    }
}
