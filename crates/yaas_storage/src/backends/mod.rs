pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::InMemoryStorage;

#[cfg(feature = "postgres")]
pub use postgres::PostgresStorage;

#[cfg(feature = "sqlite")]
pub use sqlite::SQLiteStorage;

#[cfg(any(feature = "postgres", feature = "sqlite"))]
pub(crate) fn storage_error(context: &str, err: sqlx::Error) -> yaas_core::Error {
    yaas_core::Error::Storage(format!("{}: {}", context, err))
}

#[cfg(any(feature = "postgres", feature = "sqlite"))]
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
