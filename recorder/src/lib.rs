pub mod gpx_replay;
pub mod location_source;
pub mod trip_recorder;
