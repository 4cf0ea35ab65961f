use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder title until the user names the trip at finalize.
pub const UNTITLED: &str = "Untitled";

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub trip_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub title: String,
    pub photo_data: Option<String>,
    pub distance: f64,
}

impl Trip {
    pub fn new(trip_id: i64, start_time: DateTime<Utc>) -> Self {
        Self {
            trip_id,
            start_time,
            end_time: None,
            title: UNTITLED.to_string(),
            photo_data: None,
            distance: 0.0,
        }
    }

    /// A trip is completed once finalize has stamped its end time. Open
    /// trips never show up in the completed listings.
    pub fn is_completed(&self) -> bool {
        self.end_time.is_some()
    }
}
