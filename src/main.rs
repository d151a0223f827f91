use std::net::SocketAddr;
use tokio::net::TcpListener;

use wata::config::AppConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| wata::db::DEFAULT_DATABASE_URL.to_string());
    let secure_cookies = std::env::var("SECURE_COOKIES")
        .map(|v| v == "true")
        .unwrap_or(false);
    let config = AppConfig::from_env();

    let pool = wata::db::init_pool(&database_url).await;
    let app = wata::build_app(pool, &config, secure_cookies).await;

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    let listener = TcpListener::bind(addr).await.unwrap();

    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await.unwrap();
}
