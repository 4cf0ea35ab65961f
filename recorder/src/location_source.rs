use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::Stream;

/// One position fix from the live location source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug)]
pub struct LocationSourceError(pub String);

/// A producer of live position fixes, asked for at most one fix per
/// `min_interval`. The stream runs until the subscriber drops or aborts
/// it; a production failure arrives as one terminal `Err` item, after
/// which no more fixes follow.
pub trait LocationSource {
    fn updates(
        &self,
        min_interval: Duration,
    ) -> impl Stream<Item = Result<PositionFix, LocationSourceError>> + Send + 'static;
}
