use error_stack::{Context, Report};
use tracing_error::SpanTrace;

use crate::{database, types};

mod ext;
pub use ext::*;

pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by account operations and routes.
///
/// The current context of the report is always the client-facing
/// [error type](types::Error), the frames below it describe what
/// actually happened and stay on the server.
pub struct Error {
  report: Report<types::Error>,
  trace: SpanTrace,
}

impl Error {
  #[must_use]
  pub fn from_context(error_type: types::Error, context: impl Context) -> Self {
    Self::from_report(error_type, Report::new(context))
  }

  #[must_use]
  pub fn from_report(error_type: types::Error, report: Report<impl Context>) -> Self {
    Self {
      report: report.change_context(error_type),
      trace: SpanTrace::capture(),
    }
  }
}

impl Error {
  #[must_use]
  pub fn as_type(&self) -> &types::Error {
    self.report.current_context()
  }

  #[must_use]
  pub fn attach_printable(
    mut self,
    attachment: impl std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
  ) -> Self {
    self.report = self.report.attach_printable(attachment);
    self
  }

  #[must_use]
  pub fn downcast_ref<F: Context>(&self) -> Option<&F> {
    self.report.downcast_ref::<F>()
  }
}

impl std::fmt::Debug for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Error")
      .field("type", self.as_type())
      .field("report", &self.report)
      .field("trace", &self.trace)
      .finish()
  }
}

impl std::fmt::Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}: ", self.as_type())?;
    writeln!(f, "{:?}", self.report)?;
    std::fmt::Display::fmt(&self.trace, f)
  }
}

impl From<Report<database::Error>> for Error {
  fn from(value: Report<database::Error>) -> Self {
    match value.current_context() {
      database::Error::Readonly => Error::from_report(types::Error::ReadonlyMode, value),
      _ => Error::from_report(types::Error::Internal, value),
    }
  }
}

impl From<validator::ValidateError> for Error {
  fn from(value: validator::ValidateError) -> Self {
    #[derive(Debug, thiserror::Error)]
    #[error("Validation error occurred")]
    struct ValidateError;
    Error::from_context(types::Error::InvalidFormBody(value), ValidateError)
  }
}
