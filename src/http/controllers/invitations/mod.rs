use actix_web::{
  web::{self, Json},
  HttpResponse,
};

use super::parse_id;
use crate::{
  accounts,
  error::Error,
  http::Actor,
  types::{
    form::invitations::{accept, create},
    view::InvitationView,
  },
  App,
};

#[tracing::instrument(skip_all)]
pub async fn create(
  app: web::Data<App>,
  actor: Actor,
  form: Json<create::Request>,
) -> Result<HttpResponse, Error> {
  let inviter = actor.get_user()?;
  let invitation = accounts::create_invitation(app.store(), &inviter, &form).await?;
  Ok(HttpResponse::Created().json(InvitationView::from(&invitation)))
}

#[tracing::instrument(skip(app))]
pub async fn get(app: web::Data<App>, path: web::Path<String>) -> Result<HttpResponse, Error> {
  let id = parse_id(&path)?;
  let invitation = accounts::get_invitation(app.store(), id).await?;
  Ok(HttpResponse::Ok().json(InvitationView::from(&invitation)))
}

#[tracing::instrument(skip(app, form))]
pub async fn accept(
  app: web::Data<App>,
  path: web::Path<String>,
  form: Json<accept::Request>,
) -> Result<HttpResponse, Error> {
  let id = parse_id(&path)?;
  let invitation = accounts::get_invitation(app.store(), id).await?;

  let form = form.into_inner();
  let user = accounts::accept_invitation_and_create_user(app.store(), &invitation, form.password)
    .await?;

  let response = accounts::get_logged_in_user_response(app.store(), &user).await?;
  Ok(HttpResponse::Created().json(response))
}
