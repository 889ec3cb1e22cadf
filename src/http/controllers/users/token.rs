use actix_web::{web, HttpResponse};

use crate::{accounts, error::Error, http::Actor, types::view::LoggedIn, App};

/// Replaces the caller's auth token. The key used for this
/// request stops working right away.
#[tracing::instrument(skip_all)]
pub async fn rotate_token(app: web::Data<App>, actor: Actor) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  let token = accounts::update_or_create_auth_token(app.store(), user.id).await?;
  Ok(HttpResponse::Ok().json(LoggedIn {
    user: (&user).into(),
    token: token.key,
  }))
}
