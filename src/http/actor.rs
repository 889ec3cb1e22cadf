use actix_web::{http::header, web, FromRequest};
use futures::future::{ready, LocalBoxFuture};
use thiserror::Error;

use crate::{
  accounts,
  error::Error,
  schema::User,
  types, App,
};

/// Whoever sent the request, resolved from the `Authorization` header.
#[derive(Debug)]
pub enum Actor {
  Anonymous,
  User(User),
}

impl Actor {
  pub fn get_user(self) -> Result<User, Error> {
    #[derive(Debug, Error)]
    #[error("Attempt to access user-only route")]
    struct Unauthorized;
    match self {
      Self::User(n) => Ok(n),
      Self::Anonymous => Err(Error::from_context(types::Error::Unauthorized, Unauthorized)),
    }
  }
}

/// Accepts both `Token <key>` and `Bearer <key>`.
fn auth_token_key(value: &str) -> Option<&str> {
  let (scheme, key) = value.split_once(' ')?;
  let key = key.trim();
  let known = scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer");
  (known && !key.is_empty()).then_some(key)
}

impl FromRequest for Actor {
  type Error = Error;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(
    req: &actix_web::HttpRequest,
    _payload: &mut actix_web::dev::Payload,
  ) -> Self::Future {
    let key = req
      .headers()
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .and_then(auth_token_key)
      .map(str::to_string);

    let Some(key) = key else {
      return Box::pin(ready(Ok(Actor::Anonymous)));
    };

    let Some(app) = req.app_data::<web::Data<App>>() else {
      #[derive(Debug, Error)]
      #[error("The web app has no available configuration")]
      struct NoConfig;
      return Box::pin(ready(Err(Error::from_context(types::Error::Internal, NoConfig))));
    };

    // A key that was sent but is unknown is rejected outright
    // instead of treating the request as anonymous.
    let app = app.clone();
    Box::pin(async move {
      let user = accounts::authenticate(app.store(), &key).await?;
      Ok(Actor::User(user))
    })
  }
}
