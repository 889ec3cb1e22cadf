use actix_web::{body::BoxBody, http::StatusCode, HttpResponse};

use crate::{error::Error, types::Error as ErrorType};

impl actix_web::ResponseError for Error {
  fn status_code(&self) -> StatusCode {
    match self.as_type() {
      ErrorType::Internal => StatusCode::INTERNAL_SERVER_ERROR,
      ErrorType::InvalidFormBody(..) | ErrorType::VerificationFailed => StatusCode::BAD_REQUEST,
      ErrorType::InvitationExpired => StatusCode::GONE,
      ErrorType::NotFound => StatusCode::NOT_FOUND,
      ErrorType::ReadonlyMode => StatusCode::SERVICE_UNAVAILABLE,
      ErrorType::Unauthorized => StatusCode::UNAUTHORIZED,
    }
  }

  fn error_response(&self) -> HttpResponse<BoxBody> {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!("Failed to perform request: {}", self);
    } else {
      tracing::debug!(error = ?self.as_type(), "Rejected request");
    }
    HttpResponse::build(status).json(self.as_type())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::ResponseError;

  #[derive(Debug, thiserror::Error)]
  #[error("test")]
  struct Test;

  #[test]
  fn test_status_codes() {
    let cases = [
      (ErrorType::Internal, StatusCode::INTERNAL_SERVER_ERROR),
      (ErrorType::InvitationExpired, StatusCode::GONE),
      (ErrorType::NotFound, StatusCode::NOT_FOUND),
      (ErrorType::ReadonlyMode, StatusCode::SERVICE_UNAVAILABLE),
      (ErrorType::Unauthorized, StatusCode::UNAUTHORIZED),
      (ErrorType::VerificationFailed, StatusCode::BAD_REQUEST),
    ];
    for (error_type, status) in cases {
      assert_eq!(Error::from_context(error_type, Test).status_code(), status);
    }
  }
}
