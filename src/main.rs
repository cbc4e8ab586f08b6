use std::env;
use std::process;

use broadside::cli;
use broadside::config::Settings;
use tracing_subscriber::EnvFilter;

fn main() {
    let settings = Settings::from_env();
    let filter = EnvFilter::try_new(&settings.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(broadside::config::DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    process::exit(cli::run_with_args(&args, &settings));
}
