use brrtmvc::cli::{run_cli, Cli};
use brrtmvc::logging::{init_logging_with_config, LogConfig};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    if std::env::var("BRRTMVC_LOG_LEVEL").is_err() {
        log_config.log_level = "error".to_string();
    }
    log_config.async_logging = false;
    init_logging_with_config(&log_config)?;

    let stdout = std::io::stdout();
    let code = run_cli(&cli, &mut stdout.lock())?;
    std::process::exit(code);
}
