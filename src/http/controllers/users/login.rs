use actix_web::{
  web::{self, Json},
  HttpResponse,
};

use crate::{accounts, error::Error, types::form::users::login, App};

#[tracing::instrument(skip_all)]
pub async fn login(app: web::Data<App>, form: Json<login::Request>) -> Result<HttpResponse, Error> {
  let user = accounts::login(app.store(), &form).await?;
  let response = accounts::get_logged_in_user_response(app.store(), &user).await?;
  Ok(HttpResponse::Ok().json(response))
}
