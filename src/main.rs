// src/main.rs
use poll_backend::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("poll_backend=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    poll_backend::serve(config).await
}
