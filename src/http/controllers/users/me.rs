use actix_web::{
  web::{self, Json},
  HttpResponse,
};

use crate::{
  accounts,
  error::Error,
  http::Actor,
  types::{form::users::update, view::UserView},
  App,
};

#[tracing::instrument(skip_all)]
pub async fn me(actor: Actor) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  Ok(HttpResponse::Ok().json(UserView::from(&user)))
}

#[tracing::instrument(skip_all)]
pub async fn update_me(
  app: web::Data<App>,
  actor: Actor,
  form: Json<update::Request>,
) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  let user = accounts::update_user(app.store(), &user, form.into_inner()).await?;
  Ok(HttpResponse::Ok().json(UserView::from(&user)))
}
