use actix_web::{
  web::{self, Json},
  HttpResponse,
};

use crate::{accounts, error::Error, types::form::users::register, App};

#[tracing::instrument(skip_all)]
pub async fn register(
  app: web::Data<App>,
  form: Json<register::Request>,
) -> Result<HttpResponse, Error> {
  let user = accounts::create_user(app.store(), &form).await?;
  let response = accounts::get_logged_in_user_response(app.store(), &user).await?;
  Ok(HttpResponse::Created().json(response))
}
