use std::time::Duration;

use futures::StreamExt;
use tokio::task::JoinHandle;
use trip_recorder_data_management::{DataManager, trip_store::TripStore};
use trip_recorder_lib::location_point::LocationPoint;

use crate::location_source::LocationSource;

/// How often the location source is asked for a fix while recording.
pub const LOCATION_INTERVAL: Duration = Duration::from_secs(5);

/// Lifecycle of one recording session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecorderState {
    /// No active trip.
    Idle,
    /// Subscribed to the location source, persisting points under the id.
    Recording { trip_id: i64 },
    /// Stream closed, waiting for the photo and title before finalize.
    AwaitingFinalize { trip_id: i64 },
}

/// Drives a trip through start / resume / stop / finalize against whichever
/// store backing it was built with. At most one location subscription is
/// ever live; all state changes happen on the caller's task.
pub struct TripRecorder<S: TripStore> {
    data_manager: DataManager<S>,
    location_interval: Duration,
    state: RecorderState,
    location_job: Option<JoinHandle<()>>,
}

impl<S: TripStore> TripRecorder<S> {
    pub fn new(data_manager: DataManager<S>) -> Self {
        Self::with_interval(data_manager, LOCATION_INTERVAL)
    }

    pub fn with_interval(data_manager: DataManager<S>, location_interval: Duration) -> Self {
        Self {
            data_manager,
            location_interval,
            state: RecorderState::Idle,
            location_job: None,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn data_manager(&self) -> &DataManager<S> {
        &self.data_manager
    }

    /// Whether the location subscription task is still running.
    pub fn subscription_active(&self) -> bool {
        self.location_job.as_ref().is_some_and(|job| !job.is_finished())
    }

    /// Begin a fresh trip. Returns the new trip id, or -1 when the store
    /// refused to create one (no transition happens then). A second call
    /// while a subscription is live is dropped and returns the current id.
    pub async fn start(&mut self, source: &impl LocationSource) -> i64 {
        if self.subscription_active() {
            return self.current_trip_id().unwrap_or(-1);
        }

        let trip_id = self.data_manager.start_new_trip().await;
        if trip_id <= 0 {
            return -1;
        }

        self.subscribe(source, trip_id);
        trip_id
    }

    /// Continue a previously completed trip under its existing id. The
    /// stored trip is reopened (end time cleared), and new points extend
    /// the old history; the next finalize recomputes the distance over all
    /// of it.
    pub async fn resume(&mut self, source: &impl LocationSource, trip_id: i64) -> i64 {
        if self.subscription_active() {
            return self.current_trip_id().unwrap_or(-1);
        }

        self.data_manager.resume_trip(trip_id).await;
        self.subscribe(source, trip_id);
        trip_id
    }

    /// Stop recording. The subscription is aborted before this returns, so
    /// no further points are dispatched; writes already in flight may still
    /// land. The trip stays open until finalize.
    pub fn stop(&mut self) {
        if let Some(job) = self.location_job.take() {
            job.abort();
        }
        if let RecorderState::Recording { trip_id } = self.state {
            self.state = RecorderState::AwaitingFinalize { trip_id };
        }
    }

    /// Attach the photo and title, recompute the full-history distance and
    /// close the trip. Does nothing when no trip id is held.
    pub async fn finalize(&mut self, photo_jpeg: Option<&[u8]>, title: &str) {
        let Some(trip_id) = self.current_trip_id() else {
            return;
        };

        // Finalizing straight out of Recording still has a live stream;
        // close it first.
        if let Some(job) = self.location_job.take() {
            job.abort();
        }

        self.data_manager.finalize_trip(trip_id, photo_jpeg, title).await;
        self.state = RecorderState::Idle;
    }

    fn current_trip_id(&self) -> Option<i64> {
        match self.state {
            RecorderState::Recording { trip_id } | RecorderState::AwaitingFinalize { trip_id } => {
                Some(trip_id)
            }
            RecorderState::Idle => None,
        }
    }

    fn subscribe(&mut self, source: &impl LocationSource, trip_id: i64) {
        // Single live subscription: replace whatever handle is left over.
        if let Some(job) = self.location_job.take() {
            job.abort();
        }

        let updates = source.updates(self.location_interval);
        let data_manager = self.data_manager.clone();

        let job = tokio::spawn(async move {
            futures::pin_mut!(updates);
            while let Some(update) = updates.next().await {
                match update {
                    Ok(fix) => {
                        // Each point write is its own task; a slow store
                        // must not hold up the stream.
                        let data_manager = data_manager.clone();
                        tokio::spawn(async move {
                            data_manager
                                .save_location_point(LocationPoint::new(
                                    trip_id,
                                    fix.latitude,
                                    fix.longitude,
                                    fix.timestamp,
                                ))
                                .await;
                        });
                    }
                    Err(err) => {
                        tracing::error!("Location source failed: {err:?}");
                        break;
                    }
                }
            }
        });

        self.location_job = Some(job);
        self.state = RecorderState::Recording { trip_id };
    }
}
