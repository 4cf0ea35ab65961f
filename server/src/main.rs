use std::{fs::OpenOptions, net::SocketAddr, sync::Arc};

use server::{routes, server_state::ServerState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trip_recorder_data_management::database::TripDatabase;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    std::fs::create_dir_all("server/log")?;
    let log_file = "server/log/server.log";

    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=trace", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file))
        .init();

    tracing::info!("Starting mock trip API...");

    let database = if std::env::var("TRIP_API_EPHEMERAL").is_ok() {
        TripDatabase::connect_in_memory().await
    } else {
        TripDatabase::connect().await
    }
    .map_err(|err| anyhow::anyhow!("Failed to open trip database: {err:?}"))?;

    let state = Arc::new(ServerState { database });
    let app = routes::router(state);

    let addr: SocketAddr = std::env::var("TRIP_API_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
