pub mod postgres;
pub mod records;
pub mod sqlite;
pub mod trait_def;

pub use postgres::PostgresStorage;
pub use records::RecordStore;
pub use sqlite::SqliteStorage;
pub use trait_def::{Storage, StorageError, StorageResult};
