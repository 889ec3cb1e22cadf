use actix_web::{
  body::MessageBody,
  dev::{ServiceRequest, ServiceResponse},
  error::JsonPayloadError,
  http::StatusCode,
  middleware::ErrorHandlerResponse,
  HttpRequest, HttpResponse,
};
use thiserror::Error;
use tracing::Span;
use tracing_actix_web::{DefaultRootSpanBuilder, RootSpanBuilder};
use validator::ValidateError;

use crate::{error::Error, types};

/// Root span builder that records requests at `DEBUG` level so
/// every request does not show up in the default `info` output.
pub struct QuieterRootSpanBuilder;

impl RootSpanBuilder for QuieterRootSpanBuilder {
  fn on_request_start(request: &ServiceRequest) -> Span {
    tracing_actix_web::root_span!(level = tracing::Level::DEBUG, request)
  }

  fn on_request_end<B: MessageBody>(
    span: Span,
    outcome: &Result<ServiceResponse<B>, actix_web::Error>,
  ) {
    DefaultRootSpanBuilder::on_request_end(span, outcome);
  }
}

/// Rewrites error responses made by actix-web itself (unknown
/// routes, wrong methods) into the same JSON shape our routes use.
pub fn handle_actix_web_error<B>(
  res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
  let ours = res
    .response()
    .error()
    .is_some_and(|e| e.as_error::<Error>().is_some());

  if ours {
    return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
  }

  let status = res.status();
  let error_type = match status {
    StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED => types::Error::NotFound,
    StatusCode::UNAUTHORIZED => types::Error::Unauthorized,
    StatusCode::SERVICE_UNAVAILABLE => types::Error::ReadonlyMode,
    status if status.is_client_error() => types::Error::InvalidFormBody(ValidateError::message(
      status.canonical_reason().unwrap_or("Invalid request"),
    )),
    _ => types::Error::Internal,
  };

  let (req, _) = res.into_parts();
  let response = HttpResponse::build(status).json(&error_type);
  let res = ServiceResponse::new(req, response).map_into_right_body::<B>();
  Ok(ErrorHandlerResponse::Response(res))
}

#[derive(Debug, Error)]
#[error("Failed to parse request body")]
struct MalformedBody;

/// Malformed JSON bodies are reported as an invalid form body.
pub fn handle_json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  let message = match &err {
    JsonPayloadError::Deserialize(e) => e.to_string(),
    JsonPayloadError::ContentType => "Expected a JSON request body".to_string(),
    other => other.to_string(),
  };
  Error::from_context(
    types::Error::InvalidFormBody(ValidateError::message(message)),
    MalformedBody,
  )
  .attach_printable(err.to_string())
  .into()
}
