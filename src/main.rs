use clap::Parser;
use taggen::cli::{run_cli, Cli};
use taggen::logging::{init_logging, LogConfig};

fn main() {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    if cli.verbose {
        log_config = log_config.verbose();
    }
    if let Err(e) = init_logging(&log_config) {
        eprintln!("Warning: {e:#}");
    }

    if let Err(e) = run_cli(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
