use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use trip_recorder_data_management::trip_store::TripStore;
use trip_recorder_lib::{location_point::LocationPoint, trip::Trip};

use crate::server_state::ServerState;

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/trips", get(list_trips).post(create_trip))
        .route(
            "/trips/{trip_id}",
            get(get_trip).put(update_trip).delete(delete_trip),
        )
        .route("/points", get(list_points).post(append_point))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn list_trips(State(state): State<Arc<ServerState>>) -> Response {
    match state.database.all_trips().await {
        Ok(trips) => Json(trips).into_response(),
        Err(err) => {
            tracing::error!("Failed to list trips: {err:?}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// The client sends a fresh trip without an id; the stored echo carries the
/// assigned one.
async fn create_trip(State(state): State<Arc<ServerState>>, Json(trip): Json<Trip>) -> Response {
    match state.database.create_trip(trip.start_time).await {
        Ok(created) => Json(created).into_response(),
        Err(err) => {
            tracing::error!("Failed to create trip: {err:?}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn get_trip(State(state): State<Arc<ServerState>>, Path(trip_id): Path<i64>) -> Response {
    match state.database.get_trip(trip_id).await {
        Ok(Some(trip)) => Json(trip).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            tracing::error!("Failed to get trip {trip_id}: {err:?}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn update_trip(
    State(state): State<Arc<ServerState>>,
    Path(trip_id): Path<i64>,
    Json(mut trip): Json<Trip>,
) -> Response {
    // The path id is authoritative.
    trip.trip_id = trip_id;

    match state.database.get_trip(trip_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            tracing::error!("Failed to look up trip {trip_id}: {err:?}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    match state.database.update_trip(&trip).await {
        Ok(()) => Json(trip).into_response(),
        Err(err) => {
            tracing::error!("Failed to update trip {trip_id}: {err:?}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn delete_trip(State(state): State<Arc<ServerState>>, Path(trip_id): Path<i64>) -> Response {
    match state.database.delete_trip(trip_id).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => {
            tracing::error!("Failed to delete trip {trip_id}: {err:?}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[derive(Deserialize)]
struct PointsQuery {
    #[serde(rename = "tripId")]
    trip_id: Option<i64>,
}

async fn list_points(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<PointsQuery>,
) -> Response {
    let points = match query.trip_id {
        Some(trip_id) => state.database.trip_points(trip_id).await,
        None => state.database.all_points().await,
    };

    match points {
        Ok(points) => Json(points).into_response(),
        Err(err) => {
            tracing::error!("Failed to list points: {err:?}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn append_point(
    State(state): State<Arc<ServerState>>,
    Json(point): Json<LocationPoint>,
) -> Response {
    match state.database.append_point(&point).await {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(err) => {
            tracing::error!("Failed to store point for trip {}: {err:?}", point.trip_id);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use trip_recorder_data_management::{
        DataManager, database::TripDatabase, remote::RemoteTripStore,
    };

    use super::*;

    /// Serve the router over loopback on an ephemeral port and hand back
    /// the remote store pointed at it.
    async fn serve_ephemeral() -> RemoteTripStore {
        let database = TripDatabase::connect_in_memory().await.unwrap();
        let state = Arc::new(ServerState { database });
        let app = router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        RemoteTripStore::new(format!("http://{addr}"))
    }

    #[tokio::test]
    async fn remote_store_round_trip() {
        let store = serve_ephemeral().await;

        let trip = store
            .create_trip(Utc.timestamp_opt(1_000, 0).unwrap())
            .await
            .unwrap();
        assert!(trip.trip_id > 0);
        assert!(trip.end_time.is_none());

        assert!(store.get_trip(trip.trip_id + 999).await.unwrap().is_none());

        // Points go in out of order and come back sorted by timestamp.
        for (latitude, secs) in [(10.001, 2_000), (10.0, 1_500), (10.002, 2_500)] {
            store
                .append_point(&LocationPoint::new(
                    trip.trip_id,
                    latitude,
                    20.0,
                    Utc.timestamp_opt(secs, 0).unwrap(),
                ))
                .await
                .unwrap();
        }
        let points = store.trip_points(trip.trip_id).await.unwrap();
        assert_eq!(points.len(), 3);
        assert!(points.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp));

        // Open trips stay out of the gallery until finalized.
        assert!(store.completed_trips().await.unwrap().is_empty());

        let data_manager = DataManager::new(store.clone());
        data_manager
            .finalize_trip(trip.trip_id, Some(b"jpeg bytes"), "Morning ride")
            .await;

        let completed = store.completed_trips().await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].title, "Morning ride");
        assert!(completed[0].distance > 0.0);
        assert_eq!(completed[0].start_time, trip.start_time);

        // Reopening makes the trip drop out of the gallery again.
        store.reopen_trip(trip.trip_id).await.unwrap();
        assert!(store.completed_trips().await.unwrap().is_empty());

        // Delete cascades to the points.
        store.delete_trip(trip.trip_id).await.unwrap();
        assert!(store.trip_points(trip.trip_id).await.unwrap().is_empty());
        assert!(store.get_trip(trip.trip_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn updating_an_unknown_trip_is_a_404() {
        let store = serve_ephemeral().await;

        let ghost = Trip::new(4_242, Utc.timestamp_opt(1_000, 0).unwrap());
        assert!(store.update_trip(&ghost).await.is_err());
    }
}
