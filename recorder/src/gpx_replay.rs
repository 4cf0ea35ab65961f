use std::time::Duration;

use chrono::Utc;
use futures::{Stream, StreamExt};

use crate::location_source::{LocationSource, LocationSourceError, PositionFix};

/// Replays the points of a recorded GPX track as if they were live fixes,
/// one per interval tick, stamped with the emission time. Stands in for
/// the platform location provider on development machines.
pub struct GpxReplaySource {
    track: Vec<(f64, f64)>,
}

impl GpxReplaySource {
    pub fn load(path: &str) -> Result<Self, LocationSourceError> {
        let file = std::fs::File::open(path)
            .map_err(|_| LocationSourceError(format!("Failed to open gpx file {path}")))?;
        let reader = std::io::BufReader::new(file);
        let gpx = gpx::read(reader)
            .map_err(|_| LocationSourceError(format!("Failed to parse gpx file {path}")))?;

        let mut track = Vec::new();
        for file_track in gpx.tracks {
            for segment in file_track.segments {
                for waypoint in segment.points {
                    let position = waypoint.point();
                    track.push((position.y(), position.x()));
                }
            }
        }

        Ok(Self { track })
    }

    pub fn len(&self) -> usize {
        self.track.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track.is_empty()
    }
}

impl LocationSource for GpxReplaySource {
    fn updates(
        &self,
        min_interval: Duration,
    ) -> impl Stream<Item = Result<PositionFix, LocationSourceError>> + Send + 'static {
        futures::stream::iter(self.track.clone()).then(move |(latitude, longitude)| async move {
            tokio::time::sleep(min_interval).await;
            Ok(PositionFix {
                latitude,
                longitude,
                timestamp: Utc::now(),
            })
        })
    }
}
