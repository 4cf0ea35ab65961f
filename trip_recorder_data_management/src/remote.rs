use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use trip_recorder_lib::{location_point::LocationPoint, trip::Trip};

use crate::{DataManagerError, trip_store::TripStore};

/// Client for the mock trip API: the same store contract as the local
/// database, shipped as JSON over HTTP.
#[derive(Clone)]
pub struct RemoteTripStore {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteTripStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl TripStore for RemoteTripStore {
    async fn create_trip(&self, start_time: DateTime<Utc>) -> Result<Trip, DataManagerError> {
        // The server assigns the id and echoes the stored trip back.
        self.client
            .post(self.url("trips"))
            .json(&Trip::new(0, start_time))
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| DataManagerError::Remote(format!("Failed to create trip: {err}")))?
            .json::<Trip>()
            .await
            .map_err(|err| DataManagerError::Remote(format!("Failed to decode created trip: {err}")))
    }

    async fn update_trip(&self, trip: &Trip) -> Result<(), DataManagerError> {
        self.client
            .put(self.url(&format!("trips/{}", trip.trip_id)))
            .json(trip)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| {
                DataManagerError::Remote(format!("Failed to update trip {}: {err}", trip.trip_id))
            })
            .map(|_| ())
    }

    async fn delete_trip(&self, trip_id: i64) -> Result<(), DataManagerError> {
        self.client
            .delete(self.url(&format!("trips/{trip_id}")))
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| DataManagerError::Remote(format!("Failed to delete trip {trip_id}: {err}")))
            .map(|_| ())
    }

    async fn get_trip(&self, trip_id: i64) -> Result<Option<Trip>, DataManagerError> {
        let response = self
            .client
            .get(self.url(&format!("trips/{trip_id}")))
            .send()
            .await
            .map_err(|err| DataManagerError::Remote(format!("Failed to get trip {trip_id}: {err}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        response
            .error_for_status()
            .map_err(|err| DataManagerError::Remote(format!("Failed to get trip {trip_id}: {err}")))?
            .json::<Trip>()
            .await
            .map(Some)
            .map_err(|err| DataManagerError::Remote(format!("Failed to decode trip {trip_id}: {err}")))
    }

    async fn reopen_trip(&self, trip_id: i64) -> Result<(), DataManagerError> {
        let Some(mut trip) = self.get_trip(trip_id).await? else {
            return Err(DataManagerError::Remote(format!("No trip {trip_id} to reopen")));
        };

        trip.end_time = None;
        self.update_trip(&trip).await
    }

    async fn append_point(&self, point: &LocationPoint) -> Result<(), DataManagerError> {
        self.client
            .post(self.url("points"))
            .json(point)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| {
                DataManagerError::Remote(format!("Failed to send point for trip {}: {err}", point.trip_id))
            })
            .map(|_| ())
    }

    async fn trip_points(&self, trip_id: i64) -> Result<Vec<LocationPoint>, DataManagerError> {
        let mut points = self
            .client
            .get(self.url("points"))
            .query(&[("tripId", trip_id)])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| {
                DataManagerError::Remote(format!("Failed to get points for trip {trip_id}: {err}"))
            })?
            .json::<Vec<LocationPoint>>()
            .await
            .map_err(|err| {
                DataManagerError::Remote(format!("Failed to decode points for trip {trip_id}: {err}"))
            })?;

        // Timestamp order is the contract, whatever the server sent.
        points.sort_by_key(|point| point.timestamp);
        Ok(points)
    }

    async fn all_points(&self) -> Result<Vec<LocationPoint>, DataManagerError> {
        let mut points = self
            .client
            .get(self.url("points"))
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| DataManagerError::Remote(format!("Failed to get points: {err}")))?
            .json::<Vec<LocationPoint>>()
            .await
            .map_err(|err| DataManagerError::Remote(format!("Failed to decode points: {err}")))?;

        points.sort_by_key(|point| point.timestamp);
        Ok(points)
    }

    async fn completed_trips(&self) -> Result<Vec<Trip>, DataManagerError> {
        // The API lists every trip; only the finished ones belong in the
        // gallery.
        let mut trips = self
            .client
            .get(self.url("trips"))
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| DataManagerError::Remote(format!("Failed to get trips: {err}")))?
            .json::<Vec<Trip>>()
            .await
            .map_err(|err| DataManagerError::Remote(format!("Failed to decode trips: {err}")))?;

        trips.retain(Trip::is_completed);
        trips.sort_by_key(|trip| std::cmp::Reverse(trip.end_time));
        Ok(trips)
    }
}
