use serde::Serialize;
use std::fmt::Display;

/// Client-facing error categories. Every failure a route can
/// produce is reported as exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Error {
  Internal,
  InvalidFormBody(validator::ValidateError),
  InvitationExpired,
  NotFound,
  ReadonlyMode,
  Unauthorized,
  VerificationFailed,
}

impl Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Error::Internal => f.write_str("Failed to perform request"),
      Error::InvalidFormBody(..) => f.write_str("User performed request with invalid body"),
      Error::InvitationExpired => f.write_str("Invitation is no longer active"),
      Error::NotFound => f.write_str("Requested resource does not exist"),
      Error::ReadonlyMode => f.write_str("Attempt to write read-only database"),
      Error::Unauthorized => f.write_str("Authentication required"),
      Error::VerificationFailed => f.write_str("Verification token is invalid"),
    }
  }
}

impl std::error::Error for Error {}
