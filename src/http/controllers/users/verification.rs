use actix_web::{
  web::{self, Json},
  HttpResponse,
};

use crate::{
  accounts,
  error::Error,
  http::Actor,
  types::{form::users::verify, view::UserView},
  App,
};

#[tracing::instrument(skip_all)]
pub async fn resend_verification(
  app: web::Data<App>,
  actor: Actor,
) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  let token = accounts::update_or_create_verification_token(app.store(), user.id).await?;

  // Delivering the link is up to whatever consumes these logs.
  match app.config.verification_link(user.id, token.token) {
    Some(link) => tracing::debug!(user.id = %user.id, %link, "issued verification token"),
    None => tracing::debug!(user.id = %user.id, "issued verification token"),
  }

  Ok(HttpResponse::Accepted().finish())
}

#[tracing::instrument(skip_all)]
pub async fn verify(app: web::Data<App>, form: Json<verify::Request>) -> Result<HttpResponse, Error> {
  let ttl = app.config.verification_ttl();
  let user = accounts::verify_user(app.store(), form.token.as_str(), form.user_id, ttl).await?;
  Ok(HttpResponse::Ok().json(UserView::from(&user)))
}
