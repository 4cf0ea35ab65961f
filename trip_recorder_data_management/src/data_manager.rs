use chrono::Utc;
use trip_recorder_lib::{
    distance::path_distance,
    location_point::LocationPoint,
    photo,
    trip::{Trip, UNTITLED},
};

use crate::trip_store::TripStore;

/// The public interface for all trip recorder data management.
///
/// Store failures stop here: reads degrade to empty results and writes are
/// logged and dropped, so the recorder only ever sees values it can act on.
/// The cost is that a point lost to a transient failure is lost for good.
#[derive(Clone)]
pub struct DataManager<S: TripStore> {
    store: S,
}

impl<S: TripStore> DataManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create a new open trip and return its id, or -1 when the store
    /// refused. Callers must not start recording on a non-positive id.
    pub async fn start_new_trip(&self) -> i64 {
        match self.store.create_trip(Utc::now()).await {
            Ok(trip) => trip.trip_id,
            Err(err) => {
                tracing::error!("Failed to create trip: {err:?}");
                -1
            }
        }
    }

    pub async fn save_location_point(&self, point: LocationPoint) {
        if let Err(err) = self.store.append_point(&point).await {
            tracing::error!("Failed to save point for trip {}: {err:?}", point.trip_id);
        }
    }

    /// Reopen a completed trip so new points extend its history.
    pub async fn resume_trip(&self, trip_id: i64) {
        if let Err(err) = self.store.reopen_trip(trip_id).await {
            tracing::error!("Failed to reopen trip {trip_id}: {err:?}");
        }
    }

    pub async fn delete_trip(&self, trip_id: i64) {
        if let Err(err) = self.store.delete_trip(trip_id).await {
            tracing::error!("Failed to delete trip {trip_id}: {err:?}");
        }
    }

    pub async fn get_trip(&self, trip_id: i64) -> Option<Trip> {
        match self.store.get_trip(trip_id).await {
            Ok(trip) => trip,
            Err(err) => {
                tracing::error!("Failed to get trip {trip_id}: {err:?}");
                None
            }
        }
    }

    pub async fn completed_trips(&self) -> Vec<Trip> {
        match self.store.completed_trips().await {
            Ok(trips) => trips,
            Err(err) => {
                tracing::error!("Failed to list completed trips: {err:?}");
                Vec::new()
            }
        }
    }

    pub async fn all_points(&self) -> Vec<LocationPoint> {
        match self.store.all_points().await {
            Ok(points) => points,
            Err(err) => {
                tracing::error!("Failed to list points: {err:?}");
                Vec::new()
            }
        }
    }

    pub async fn trip_points(&self, trip_id: i64) -> Vec<LocationPoint> {
        match self.store.trip_points(trip_id).await {
            Ok(points) => points,
            Err(err) => {
                tracing::error!("Failed to get points for trip {trip_id}: {err:?}");
                Vec::new()
            }
        }
    }

    /// Complete a trip: recompute its distance over the full point history
    /// (not a delta since the last stop), attach the encoded photo and
    /// title, and stamp the end time. A failed step leaves the trip open;
    /// finalize can simply run again.
    pub async fn finalize_trip(&self, trip_id: i64, photo_jpeg: Option<&[u8]>, title: &str) {
        let points = self.trip_points(trip_id).await;
        let total_distance = path_distance(&points);

        let Some(mut trip) = self.get_trip(trip_id).await else {
            tracing::error!("Cannot finalize unknown trip {trip_id}");
            return;
        };

        trip.end_time = Some(Utc::now());
        trip.distance = total_distance;
        trip.title = if title.is_empty() { UNTITLED.to_string() } else { title.to_string() };
        trip.photo_data = photo_jpeg.map(photo::encode_photo);

        if let Err(err) = self.store.update_trip(&trip).await {
            tracing::error!("Failed to finalize trip {trip_id}: {err:?}");
        }
    }
}
