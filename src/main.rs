use std::path::PathBuf;

use clap::Parser;
use ordertaker::infrastructure::bootstrap::App;
use ordertaker::infrastructure::config::Config;
use tracing::{error, info};

/// Telegram-controlled order taking bot.
#[derive(Parser, Debug)]
#[command(name = "ordertaker", version, about)]
struct Cli {
    /// Path to the TOML configuration file. A missing file means defaults.
    #[arg(short, long, env = "ORDERBOT_CONFIG", default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match Config::load_or_default(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    config.init_logging();
    info!(config = %cli.config.display(), "ordertaker starting");

    if let Err(e) = App::run(config).await {
        error!(error = %e, "Fatal error");
        std::process::exit(1);
    }

    info!("ordertaker stopped");
}
