use std::time::Duration;

use recorder::{gpx_replay::GpxReplaySource, trip_recorder::TripRecorder};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trip_recorder_data_management::{
    DataManager, database::TripDatabase, remote::RemoteTripStore, trip_store::TripStore,
};
use trip_recorder_lib::location_point::group_by_trip;

/// Replay pacing for the demo; real devices report a fix every few seconds.
const REPLAY_INTERVAL: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=trace", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(gpx_path) = args.next() else {
        anyhow::bail!("Usage: recorder <track.gpx> [title] [photo.jpg]");
    };
    let title = args.next().unwrap_or_default();
    let photo = match args.next() {
        Some(path) => Some(std::fs::read(&path)?),
        None => None,
    };

    let source = GpxReplaySource::load(&gpx_path)
        .map_err(|err| anyhow::anyhow!("Failed to load track: {err:?}"))?;
    anyhow::ensure!(!source.is_empty(), "Track {gpx_path} has no points");
    tracing::info!("Replaying {} points from {gpx_path}", source.len());

    // TRIP_RECORDER_API switches to the mock API backing; the local
    // database is the default.
    match std::env::var("TRIP_RECORDER_API") {
        Ok(base_url) => {
            tracing::info!("Recording against the mock API at {base_url}");
            record(RemoteTripStore::new(base_url), source, title, photo).await
        }
        Err(_) => {
            tracing::info!("Recording into the local database");
            let store = TripDatabase::connect()
                .await
                .map_err(|err| anyhow::anyhow!("Failed to open database: {err:?}"))?;
            record(store, source, title, photo).await
        }
    }
}

async fn record<S: TripStore>(
    store: S,
    source: GpxReplaySource,
    title: String,
    photo: Option<Vec<u8>>,
) -> anyhow::Result<()> {
    let mut recorder = TripRecorder::with_interval(DataManager::new(store), REPLAY_INTERVAL);

    let trip_id = recorder.start(&source).await;
    anyhow::ensure!(trip_id > 0, "The store refused to create a trip");
    tracing::info!("Recording trip {trip_id}");

    while recorder.subscription_active() {
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    // Point writes are fire-and-forget; give the last ones a moment to land.
    tokio::time::sleep(Duration::from_millis(200)).await;

    recorder.stop();
    recorder.finalize(photo.as_deref(), &title).await;

    let data_manager = recorder.data_manager();
    for trip in data_manager.completed_trips().await {
        tracing::info!(
            "Trip {} \"{}\": {:.1} m, photo attached: {}",
            trip.trip_id,
            trip.title,
            trip.distance,
            trip.photo_data.is_some()
        );
    }
    for (trip_id, points) in group_by_trip(data_manager.all_points().await) {
        tracing::info!("Trip {trip_id}: {} points on the map", points.len());
    }

    Ok(())
}
