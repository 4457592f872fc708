//! expenseweb main entry point

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use expenseweb_api::start_server;
use expenseweb_client::HttpBackend;
use expenseweb_config::{Config, ConfigError};
use expenseweb_core::FinanceBackend;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "expenseweb")]
#[command(version = "0.1.0")]
#[command(about = "A lightweight web front-end for tracking bank transactions and expenses", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, missing) = match Config::load(args.config.clone()) {
        Ok(config) => (config, false),
        Err(ConfigError::FileNotFound { .. }) => (Config::default(), true),
        Err(e) => {
            return Err(anyhow::anyhow!(
                "Failed to load {}: {}",
                args.config.display(),
                e.to_details()
            ));
        }
    };

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    if missing {
        log::warn!(
            "Config file {} not found, using defaults (see --print-default-config)",
            args.config.display()
        );
    } else {
        log::info!("Config loaded from {}", args.config.display());
    }

    let backend: Arc<dyn FinanceBackend> = Arc::new(HttpBackend::from_config(&config));

    let rt = Runtime::new()?;
    rt.block_on(start_server(config, backend))
}
