use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod models;
mod services;
mod utils;

use commands::Reply;
use config::Config;
use services::dashboard_service::{Dashboard, PngChartTarget};
use services::provider_service::MockProvider;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("crypto_dashboard=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    info!("✨ Starting Crypto Asset Dashboard...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };
    info!(
        "Chart {}x{} (padding {}, ratio {}) -> {}",
        config.surface.width,
        config.surface.height,
        config.surface.padding,
        config.surface.device_pixel_ratio,
        config.chart_output.display()
    );

    let provider = MockProvider::new(config.mock.clone());
    let target = PngChartTarget::new(config.chart_output.clone(), config.surface);
    let mut dashboard = Dashboard::new(provider, target, &config.default_asset);

    println!("{}", commands::select::execute_load(&mut dashboard).await);
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        };

        match commands::handle_line(&mut dashboard, &line).await {
            Reply::Message(text) => println!("{}", text),
            Reply::Nothing => {}
            Reply::Quit => break,
        }
    }

    info!("👋 Dashboard closed after {} fetches", dashboard.provider().fetch_count());
}
