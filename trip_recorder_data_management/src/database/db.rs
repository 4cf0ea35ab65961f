use std::path::PathBuf;

use chrono::{DateTime, Utc};
use const_format::concatcp;
use sqlx::{
    Executor, Pool, Sqlite, SqlitePool, query, query_as,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use trip_recorder_lib::{location_point::LocationPoint, trip::Trip};

use crate::{DATA_DIR, DATABASE_PATH, DataManagerError, trip_store::TripStore};

use super::constants::*;

const CREATE_TABLES: &str = concatcp!("
    CREATE TABLE IF NOT EXISTS ", TRIPS_TABLE_NAME, "(",
        TRIP_ID,    " INTEGER PRIMARY KEY AUTOINCREMENT,",
        START_TIME, " TIMESTAMP NOT NULL,",
        END_TIME,   " TIMESTAMP,",
        TITLE,      " TEXT NOT NULL,",
        PHOTO_DATA, " TEXT,",
        DISTANCE,   " REAL NOT NULL DEFAULT 0);

    CREATE TABLE IF NOT EXISTS ", POINTS_TABLE_NAME, "(",
        POINT_ID,  " INTEGER PRIMARY KEY AUTOINCREMENT,",
        TRIP_ID,   " INTEGER NOT NULL,",
        LATITUDE,  " REAL NOT NULL,",
        LONGITUDE, " REAL NOT NULL,",
        TIMESTAMP, " TIMESTAMP NOT NULL,
        FOREIGN KEY(", TRIP_ID, ") REFERENCES ", TRIPS_TABLE_NAME, "(", TRIP_ID, ") ON DELETE CASCADE
    )");

#[derive(Clone)]
pub struct TripDatabase {
    pool: Pool<Sqlite>,
}

impl TripDatabase {
    pub async fn connect() -> Result<Self, DataManagerError> {
        let root: PathBuf = project_root::get_project_root()
            .map_err(|_| DataManagerError::Database("Failed to locate project root".to_string()))?;

        let data_dir = root.join(DATA_DIR);
        if !data_dir.exists() {
            std::fs::create_dir_all(&data_dir).map_err(|_| {
                DataManagerError::Database(format!("Failed to create data directory: {:?}", data_dir))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(root.join(DATABASE_PATH))
            .foreign_keys(true)
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|_| DataManagerError::Database("Failed to connect to database".to_string()))?;

        let db = Self { pool };
        db.init().await?;

        Ok(db)
    }

    /// A private in-memory database, used by tests and the server's
    /// ephemeral mode. Pinned to a single connection so every caller sees
    /// the same database.
    pub async fn connect_in_memory() -> Result<Self, DataManagerError> {
        let options = SqliteConnectOptions::new().in_memory(true).foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|_| {
                DataManagerError::Database("Failed to open in-memory database".to_string())
            })?;

        let db = Self { pool };
        db.init().await?;

        Ok(db)
    }

    async fn init(&self) -> Result<(), DataManagerError> {
        self.pool
            .execute(CREATE_TABLES)
            .await
            .map_err(|_| DataManagerError::Database("Failed to create tables".to_string()))
            .map(|_| ())
    }

    /// Every stored trip, open ones included. The store contract only
    /// exposes the completed listing; the mock API serves this one.
    pub async fn all_trips(&self) -> Result<Vec<Trip>, DataManagerError> {
        query_as::<_, Trip>(concatcp!("SELECT * FROM ", TRIPS_TABLE_NAME, " ORDER BY ", TRIP_ID))
            .fetch_all(&self.pool)
            .await
            .map_err(|_| DataManagerError::Database("Failed to get trips".to_string()))
    }
}

impl TripStore for TripDatabase {
    async fn create_trip(&self, start_time: DateTime<Utc>) -> Result<Trip, DataManagerError> {
        let trip = Trip::new(0, start_time);

        let id = query_as::<_, (i64,)>(concatcp!("
            INSERT INTO ", TRIPS_TABLE_NAME, "(",
            TRIP_ID, ", ", START_TIME, ", ", END_TIME, ", ", TITLE, ", ", PHOTO_DATA, ", ", DISTANCE, ")
            VALUES (NULL, ?1, NULL, ?2, NULL, 0) RETURNING ", TRIP_ID))
            .bind(start_time)
            .bind(&trip.title)
            .fetch_one(&self.pool)
            .await
            .map_err(|_| DataManagerError::Database("Failed to insert trip".to_string()))
            .map(|row| row.0)?;

        Ok(Trip { trip_id: id, ..trip })
    }

    async fn update_trip(&self, trip: &Trip) -> Result<(), DataManagerError> {
        query(concatcp!("UPDATE ", TRIPS_TABLE_NAME, " SET ",
            START_TIME, " = ?1, ", END_TIME, " = ?2, ", TITLE, " = ?3, ",
            PHOTO_DATA, " = ?4, ", DISTANCE, " = ?5 WHERE ", TRIP_ID, " = ?6"))
            .bind(trip.start_time)
            .bind(trip.end_time)
            .bind(&trip.title)
            .bind(&trip.photo_data)
            .bind(trip.distance)
            .bind(trip.trip_id)
            .execute(&self.pool)
            .await
            .map_err(|_| DataManagerError::Database("Failed to update trip".to_string()))
            .map(|_| ())
    }

    async fn delete_trip(&self, trip_id: i64) -> Result<(), DataManagerError> {
        query(concatcp!("DELETE FROM ", TRIPS_TABLE_NAME, " WHERE ", TRIP_ID, " = ?1"))
            .bind(trip_id)
            .execute(&self.pool)
            .await
            .map_err(|_| DataManagerError::Database("Failed to delete trip".to_string()))
            .map(|_| ())
    }

    async fn get_trip(&self, trip_id: i64) -> Result<Option<Trip>, DataManagerError> {
        query_as::<_, Trip>(concatcp!("SELECT * FROM ", TRIPS_TABLE_NAME, " WHERE ", TRIP_ID, " = ?1"))
            .bind(trip_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|_| DataManagerError::Database("Failed to get trip".to_string()))
    }

    async fn reopen_trip(&self, trip_id: i64) -> Result<(), DataManagerError> {
        query(concatcp!("UPDATE ", TRIPS_TABLE_NAME, " SET ", END_TIME, " = NULL WHERE ", TRIP_ID, " = ?1"))
            .bind(trip_id)
            .execute(&self.pool)
            .await
            .map_err(|_| DataManagerError::Database("Failed to reopen trip".to_string()))
            .map(|_| ())
    }

    async fn append_point(&self, point: &LocationPoint) -> Result<(), DataManagerError> {
        query(concatcp!("
            INSERT INTO ", POINTS_TABLE_NAME, "(",
            POINT_ID, ", ", TRIP_ID, ", ", LATITUDE, ", ", LONGITUDE, ", ", TIMESTAMP, ")
            VALUES (NULL, ?1, ?2, ?3, ?4)"))
            .bind(point.trip_id)
            .bind(point.latitude)
            .bind(point.longitude)
            .bind(point.timestamp)
            .execute(&self.pool)
            .await
            .map_err(|_| DataManagerError::Database("Failed to insert point".to_string()))
            .map(|_| ())
    }

    async fn trip_points(&self, trip_id: i64) -> Result<Vec<LocationPoint>, DataManagerError> {
        query_as::<_, LocationPoint>(concatcp!("
            SELECT * FROM ", POINTS_TABLE_NAME, " WHERE ", TRIP_ID, " = ?1 ORDER BY ", TIMESTAMP, " ASC"))
            .bind(trip_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|_| DataManagerError::Database("Failed to get trip points".to_string()))
    }

    async fn all_points(&self) -> Result<Vec<LocationPoint>, DataManagerError> {
        query_as::<_, LocationPoint>(concatcp!("
            SELECT * FROM ", POINTS_TABLE_NAME, " ORDER BY ", TIMESTAMP, " ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(|_| DataManagerError::Database("Failed to get points".to_string()))
    }

    async fn completed_trips(&self) -> Result<Vec<Trip>, DataManagerError> {
        query_as::<_, Trip>(concatcp!("
            SELECT * FROM ", TRIPS_TABLE_NAME, " WHERE ", END_TIME, " IS NOT NULL ORDER BY ", END_TIME, " DESC"))
            .fetch_all(&self.pool)
            .await
            .map_err(|_| DataManagerError::Database("Failed to get completed trips".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn point(trip_id: i64, latitude: f64, secs: i64) -> LocationPoint {
        LocationPoint::new(trip_id, latitude, 20.0, Utc.timestamp_opt(secs, 0).unwrap())
    }

    #[tokio::test]
    async fn deleting_a_trip_cascades_to_its_points() {
        let db = TripDatabase::connect_in_memory().await.unwrap();

        let kept = db.create_trip(Utc::now()).await.unwrap();
        let doomed = db.create_trip(Utc::now()).await.unwrap();
        db.append_point(&point(kept.trip_id, 10.0, 1)).await.unwrap();
        db.append_point(&point(doomed.trip_id, 11.0, 2)).await.unwrap();
        db.append_point(&point(doomed.trip_id, 11.1, 3)).await.unwrap();

        db.delete_trip(doomed.trip_id).await.unwrap();

        assert!(db.trip_points(doomed.trip_id).await.unwrap().is_empty());
        assert!(db.get_trip(doomed.trip_id).await.unwrap().is_none());
        assert_eq!(db.trip_points(kept.trip_id).await.unwrap().len(), 1);
        assert_eq!(db.all_points().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn open_trips_stay_out_of_the_completed_listing() {
        let db = TripDatabase::connect_in_memory().await.unwrap();

        let mut trip = db.create_trip(Utc.timestamp_opt(1_000, 0).unwrap()).await.unwrap();
        assert!(db.completed_trips().await.unwrap().is_empty());

        trip.end_time = Some(Utc.timestamp_opt(2_000, 0).unwrap());
        trip.distance = 123.4;
        db.update_trip(&trip).await.unwrap();

        let completed = db.completed_trips().await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0], trip);

        db.reopen_trip(trip.trip_id).await.unwrap();
        assert!(db.completed_trips().await.unwrap().is_empty());
        let reopened = db.get_trip(trip.trip_id).await.unwrap().unwrap();
        assert!(reopened.end_time.is_none());
        assert_eq!(reopened.start_time, trip.start_time);
    }

    #[tokio::test]
    async fn points_come_back_in_timestamp_order() {
        let db = TripDatabase::connect_in_memory().await.unwrap();
        let trip = db.create_trip(Utc::now()).await.unwrap();

        // Inserted out of order on purpose.
        db.append_point(&point(trip.trip_id, 10.2, 30)).await.unwrap();
        db.append_point(&point(trip.trip_id, 10.0, 10)).await.unwrap();
        db.append_point(&point(trip.trip_id, 10.1, 20)).await.unwrap();

        let points = db.trip_points(trip.trip_id).await.unwrap();
        let latitudes: Vec<f64> = points.iter().map(|p| p.latitude).collect();
        assert_eq!(latitudes, vec![10.0, 10.1, 10.2]);
    }
}
