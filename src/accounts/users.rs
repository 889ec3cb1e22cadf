use error_stack::Report;
use thiserror::Error;
use validator::{Validate, ValidateError};

use crate::{
  database::ErrorExt2,
  error::{Error, ErrorExt, Result},
  schema::{NewUser, User},
  store::{Store, USERS_EMAIL_KEY},
  types::{
    self,
    form::users::{login, register, update},
    view::{LoggedIn, UserView},
  },
  util::{password, token, validation},
};

pub(super) fn email_taken() -> ValidateError {
  ValidateError::field("email", "This e-mail address is already registered")
}

/// Maps a unique violation on the users' e-mail into the same
/// validation error a duplicate check would give.
pub(super) fn map_email_taken(report: Report<crate::database::Error>) -> Error {
  if report.unique_violation() == Some(USERS_EMAIL_KEY) {
    Error::from_report(types::Error::InvalidFormBody(email_taken()), report)
  } else {
    report.into()
  }
}

/// Turns an already validated registration form into a user row
/// ready to be inserted. The e-mail doubles as the username.
///
/// A taken e-mail is only caught once the row is inserted.
#[tracing::instrument(skip_all)]
pub(super) async fn prepare_new_user(form: &register::Request) -> Result<NewUser> {
  let email = validation::normalize_email(&form.email);
  let password_hash = password::hash(form.password.clone())
    .await
    .error_type(types::Error::Internal)?;

  Ok(NewUser {
    username: email.clone(),
    email,
    first_name: form.first_name.trim().to_string(),
    last_name: form.last_name.trim().to_string(),
    password_hash,
  })
}

/// Registers a user together with their auth token and
/// verification token.
#[tracing::instrument(skip_all)]
pub async fn create_user(store: &dyn Store, form: &register::Request) -> Result<User> {
  form.validate()?;

  // Skips hashing for an e-mail that is obviously taken
  let email = validation::normalize_email(&form.email);
  if store.user_by_email(&email).await?.is_some() {
    return Err(email_taken().into());
  }

  let new_user = prepare_new_user(form).await?;
  let user = store
    .register_user(
      &new_user,
      &token::new_auth_token_key(),
      token::new_verification_token(),
    )
    .await
    .map_err(map_email_taken)?;

  tracing::info!(user.id = %user.id, "registered new user");
  Ok(user)
}

/// Applies profile changes. Only the names are ever changed,
/// `email` and `password` in the request are dropped.
#[tracing::instrument(skip(store, user), fields(user.id = %user.id))]
pub async fn update_user(store: &dyn Store, user: &User, form: update::Request) -> Result<User> {
  form.validate()?;

  let changes = form.into_changes();
  let first_name = changes.first_name.as_deref().map(str::trim);
  let last_name = changes.last_name.as_deref().map(str::trim);

  match store.update_user_names(user.id, first_name, last_name).await? {
    Some(user) => Ok(user),
    None => {
      #[derive(Debug, Error)]
      #[error("User was deleted while updating")]
      struct UserGone;
      Err(Error::from_context(types::Error::NotFound, UserGone))
    }
  }
}

/// Resolves e-mail and password credentials into their user.
#[tracing::instrument(skip_all)]
pub async fn login(store: &dyn Store, form: &login::Request) -> Result<User> {
  #[derive(Debug, Error)]
  #[error("Invalid credentials")]
  struct InvalidCredentials;

  form.validate()?;

  let email = validation::normalize_email(&form.email);
  let Some(user) = store.user_by_email(&email).await? else {
    password::verify_dummy(form.password.clone())
      .await
      .error_type(types::Error::Internal)?;
    return Err(Error::from_context(types::Error::Unauthorized, InvalidCredentials));
  };

  let matched = password::verify(form.password.clone(), user.password_hash.clone())
    .await
    .error_type(types::Error::Internal)?;

  if matched {
    Ok(user)
  } else {
    Err(Error::from_context(types::Error::Unauthorized, InvalidCredentials))
  }
}

/// Pairs the user's view with their current auth token.
#[tracing::instrument(skip_all, fields(user.id = %user.id))]
pub async fn get_logged_in_user_response(store: &dyn Store, user: &User) -> Result<LoggedIn> {
  let token = super::get_auth_token(store, user.id).await?;
  Ok(LoggedIn {
    user: UserView::from(user),
    token: token.key,
  })
}
