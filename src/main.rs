use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use finboard_backend::app::app::App;

#[tokio::main]
async fn main() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,finboard_backend=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(true)
        .init();

    info!("🚀 Starting Finboard Backend");

    match dotenv() {
        Ok(_) => info!("✅ Loaded .env file"),
        Err(e) => warn!("⚠️ No .env file loaded: {} (using system env vars)", e),
    }

    let app = App::new().await;
    app.start().await;
}
