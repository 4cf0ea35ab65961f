pub const TRIPS_TABLE_NAME: &str = "trips";
pub const TRIP_ID: &str = "trip_id";
pub const START_TIME: &str = "start_time";
pub const END_TIME: &str = "end_time";
pub const TITLE: &str = "title";
pub const PHOTO_DATA: &str = "photo_data";
pub const DISTANCE: &str = "distance";

pub const POINTS_TABLE_NAME: &str = "location_points";
pub const POINT_ID: &str = "point_id";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const TIMESTAMP: &str = "timestamp";
