use error_stack::Context;

use super::{Error, Result};
use crate::types;

/// Turns a report result into a server [error](Error) tagged
/// with the given client-facing type.
pub trait ErrorExt<T> {
  fn error_type(self, error_type: types::Error) -> Result<T>;
}

impl<T, C: Context> ErrorExt<T> for error_stack::Result<T, C> {
  fn error_type(self, error_type: types::Error) -> Result<T> {
    self.map_err(|report| Error::from_report(error_type, report))
  }
}
