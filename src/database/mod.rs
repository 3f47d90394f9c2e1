pub mod models;
pub mod pool;

pub use pool::{connect, health_check, migrate_down, migrate_up, DatabaseError, MIGRATOR};
