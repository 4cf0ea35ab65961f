use const_format::concatcp;

pub mod database;
pub mod remote;
pub mod trip_store;
mod data_manager;

pub use data_manager::*;

pub const DATA_DIR: &str = "data/";
pub const DATABASE_PATH: &str = concatcp!(DATA_DIR, "trip_recorder.db");

#[derive(Debug)]
pub enum DataManagerError {
    Database(String),
    Remote(String),
}
