use chrono::{Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
  error::{Error, Result},
  schema::{User, VerificationToken},
  store::Store,
  types::{
    self,
    id::{marker::UserMarker, Id},
  },
  util::token,
};

/// Issues a fresh verification token. A previous token of the user
/// is overwritten and becomes active again.
#[tracing::instrument(skip(store))]
pub async fn update_or_create_verification_token(
  store: &dyn Store,
  user_id: Id<UserMarker>,
) -> Result<VerificationToken> {
  let token = token::new_verification_token();
  Ok(store.upsert_verification_token(user_id, token).await?)
}

#[tracing::instrument(skip(store, submitted), fields(submitted = "<hidden>"))]
pub async fn check_verification_token(
  store: &dyn Store,
  submitted: &str,
  user_id: Id<UserMarker>,
  ttl: Duration,
) -> Result<VerificationToken> {
  #[derive(Debug, Error)]
  #[error("Expected exactly one verification token for the user")]
  struct TokenCount;

  #[derive(Debug, Error)]
  #[error("Submitted verification token does not match")]
  struct Mismatch;

  let mut tokens = store.verification_tokens_for(user_id).await?;
  if tokens.len() != 1 {
    let count = tokens.len();
    return Err(
      Error::from_context(types::Error::NotFound, TokenCount)
        .attach_printable(format!("found {count} verification tokens")),
    );
  }
  let token = tokens.remove(0);

  let Ok(submitted) = Uuid::parse_str(submitted.trim()) else {
    return Err(
      Error::from_context(types::Error::VerificationFailed, Mismatch)
        .attach_printable("submitted token is not a UUID"),
    );
  };

  if token.token != submitted || !token.is_valid(Utc::now().naive_utc(), ttl) {
    return Err(Error::from_context(types::Error::VerificationFailed, Mismatch));
  }

  Ok(token)
}

/// Checks the submitted token and marks the user's e-mail
/// address as verified. The token cannot be used twice.
#[tracing::instrument(skip(store, submitted))]
pub async fn verify_user(
  store: &dyn Store,
  submitted: &str,
  user_id: Id<UserMarker>,
  ttl: Duration,
) -> Result<User> {
  check_verification_token(store, submitted, user_id, ttl).await?;

  match store.mark_verified(user_id).await? {
    Some(user) => {
      tracing::info!(user.id = %user.id, "verified user e-mail address");
      Ok(user)
    }
    None => {
      #[derive(Debug, Error)]
      #[error("User does not exist")]
      struct UserGone;
      Err(Error::from_context(types::Error::NotFound, UserGone))
    }
  }
}
