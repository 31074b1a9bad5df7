use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// The targeted row does not exist (or vanished mid-operation).
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}
