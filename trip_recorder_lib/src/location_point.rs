use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One GPS fix, owned by exactly one trip. Points are append-only and the
/// timestamp, not the insertion order, defines the trajectory order.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationPoint {
    pub point_id: i64,
    pub trip_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

impl LocationPoint {
    /// The store assigns the point id on insert.
    pub fn new(trip_id: i64, latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            point_id: 0,
            trip_id,
            latitude,
            longitude,
            timestamp,
        }
    }
}

/// Group a flat point list by owning trip, one entry per polyline on the map.
pub fn group_by_trip(points: Vec<LocationPoint>) -> BTreeMap<i64, Vec<LocationPoint>> {
    let mut grouped: BTreeMap<i64, Vec<LocationPoint>> = BTreeMap::new();
    for point in points {
        grouped.entry(point.trip_id).or_default().push(point);
    }
    grouped
}
