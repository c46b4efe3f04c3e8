use std::path::Path;
use std::process::ExitCode;

use tankmon::config::{load_or_default, DEFAULT_CONFIG_FILE};
use tankmon::logging::{self, LogLevel, Stage};

fn main() -> ExitCode {
    // Logging comes up before config so a bad config file is still reported.
    logging::init_logger(LogLevel::Info, None, false);

    let config = match load_or_default(Path::new(DEFAULT_CONFIG_FILE)) {
        Ok(config) => config,
        Err(e) => {
            logging::error(Stage::Config, Some(DEFAULT_CONFIG_FILE), &e.to_string());
            return ExitCode::FAILURE;
        }
    };

    if let Some(log_file) = config.output.log_file.as_deref() {
        logging::init_logger(LogLevel::Info, Some(log_file), false);
    }

    match tankmon::run(&config) {
        Ok(summary) => {
            println!("Saved plot to {}", summary.output_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            logging::error(Stage::System, None, &e.to_string());
            ExitCode::FAILURE
        }
    }
}
