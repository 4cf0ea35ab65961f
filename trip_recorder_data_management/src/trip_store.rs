use std::future::Future;

use chrono::{DateTime, Utc};
use trip_recorder_lib::{location_point::LocationPoint, trip::Trip};

use crate::DataManagerError;

/// The persistence contract shared by the local database and the remote
/// mock API. The recorder and the data manager are written against this
/// trait alone and never branch on which backing is active.
pub trait TripStore: Clone + Send + Sync + 'static {
    /// Create a new open trip. The backing assigns the id.
    fn create_trip(
        &self,
        start_time: DateTime<Utc>,
    ) -> impl Future<Output = Result<Trip, DataManagerError>> + Send;

    fn update_trip(&self, trip: &Trip)
    -> impl Future<Output = Result<(), DataManagerError>> + Send;

    /// Delete a trip and all of its points.
    fn delete_trip(&self, trip_id: i64)
    -> impl Future<Output = Result<(), DataManagerError>> + Send;

    fn get_trip(
        &self,
        trip_id: i64,
    ) -> impl Future<Output = Result<Option<Trip>, DataManagerError>> + Send;

    /// Clear the end time so a completed trip records again under its old id.
    fn reopen_trip(&self, trip_id: i64)
    -> impl Future<Output = Result<(), DataManagerError>> + Send;

    fn append_point(
        &self,
        point: &LocationPoint,
    ) -> impl Future<Output = Result<(), DataManagerError>> + Send;

    /// All points of one trip, ordered by ascending timestamp.
    fn trip_points(
        &self,
        trip_id: i64,
    ) -> impl Future<Output = Result<Vec<LocationPoint>, DataManagerError>> + Send;

    /// Every stored point, ordered by ascending timestamp.
    fn all_points(&self)
    -> impl Future<Output = Result<Vec<LocationPoint>, DataManagerError>> + Send;

    /// Trips with a non-null end time, newest first.
    fn completed_trips(&self)
    -> impl Future<Output = Result<Vec<Trip>, DataManagerError>> + Send;
}
