use rpcgate::cli::run_cli;
use rpcgate::logging::{init_logging_with_config, LogConfig};

fn main() -> anyhow::Result<()> {
    let mut config = LogConfig::from_env();
    if std::env::var_os("RPCGATE_LOG_LEVEL").is_none() {
        config.log_level = "warn".to_string();
    }
    let _guard = init_logging_with_config(&config)?;
    run_cli()
}
