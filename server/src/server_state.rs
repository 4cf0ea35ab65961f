use trip_recorder_data_management::database::TripDatabase;

pub struct ServerState {
    pub database: TripDatabase,
}
