use error_stack::Report;
use thiserror::Error;

/// Database related errors
#[derive(Debug, Error)]
pub enum Error {
  /// An error caused by an invalid Postgres connection url.
  #[error("invalid connection url")]
  InvalidUrl,
  /// An error caused by an [`sqlx`] error.
  #[error("received a pool error: {0}")]
  Internal(sqlx::Error),
  /// Pending migrations could not be applied.
  #[error("failed to perform database migrations")]
  Migration,
  /// The database pool is currently in read mode (most likely
  /// due to maintenance) and should not perform any writes.
  #[error("database is currently in read mode")]
  Readonly,
  /// A unique constraint rejected the write. Holds the name
  /// of the violated constraint.
  #[error("unique constraint {0:?} violated")]
  UniqueViolation(String),
  /// The database pool does not have a reliable connection
  /// to transact to the database.
  #[error("unhealthy database pool")]
  UnhealthyPool,
}

/// Converts from a generic [sqlx] result into a [database compatible error](Error).
pub trait ErrorExt<T> {
  fn into_db_error(self) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, sqlx::Error> {
  fn into_db_error(self) -> Result<T> {
    self.map_err(|e| match &e {
      sqlx::Error::Database(err) if err.message().ends_with("read-only transaction") => {
        Report::new(e).change_context(Error::Readonly)
      }
      sqlx::Error::Database(err) if err.is_unique_violation() => {
        let constraint = err.constraint().unwrap_or_default().to_string();
        Report::new(e).change_context(Error::UniqueViolation(constraint))
      }
      _ => Report::new(Error::Internal(e)),
    })
  }
}

/// Lazily typed [`std::result::Result`] but the error generic
/// is filled up with [a database error](Error).
pub type Result<T> = error_stack::Result<T, Error>;

/// Shortcuts for inspecting the current context of a database report.
pub trait ErrorExt2 {
  fn is_unhealthy(&self) -> bool;
  fn is_readonly(&self) -> bool;
  fn unique_violation(&self) -> Option<&str>;
}

impl ErrorExt2 for Report<Error> {
  fn is_unhealthy(&self) -> bool {
    matches!(self.current_context(), Error::UnhealthyPool)
  }

  fn is_readonly(&self) -> bool {
    matches!(self.current_context(), Error::Readonly)
  }

  fn unique_violation(&self) -> Option<&str> {
    match self.current_context() {
      Error::UniqueViolation(constraint) => Some(constraint),
      _ => None,
    }
  }
}
