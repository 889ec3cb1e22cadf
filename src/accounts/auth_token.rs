use thiserror::Error;

use crate::{
  error::{Error, Result},
  schema::{AuthToken, User},
  store::Store,
  types::{
    self,
    id::{marker::UserMarker, Id},
  },
  util::token,
};

#[derive(Debug, Error)]
#[error("Expected exactly one auth token for the user")]
struct AuthTokenCount;

fn token_count_error(count: usize) -> Error {
  Error::from_context(types::Error::Internal, AuthTokenCount)
    .attach_printable(format!("found {count} auth tokens"))
}

/// Returns the only auth token of the user. Missing or duplicated
/// tokens are treated as data corruption.
#[tracing::instrument(skip(store))]
pub async fn get_auth_token(store: &dyn Store, user_id: Id<UserMarker>) -> Result<AuthToken> {
  let mut tokens = store.auth_tokens_for(user_id).await?;
  match tokens.len() {
    1 => Ok(tokens.remove(0)),
    count => Err(token_count_error(count)),
  }
}

/// Issues a new auth token, replacing the previous one if any.
/// The new key is never equal to the one it replaces.
#[tracing::instrument(skip(store))]
pub async fn update_or_create_auth_token(
  store: &dyn Store,
  user_id: Id<UserMarker>,
) -> Result<AuthToken> {
  let tokens = store.auth_tokens_for(user_id).await?;
  match tokens.as_slice() {
    [] => Ok(store.create_auth_token(user_id, &token::new_auth_token_key()).await?),
    [previous] => {
      let mut key = token::new_auth_token_key();
      while key == previous.key {
        key = token::new_auth_token_key();
      }
      Ok(store.replace_auth_token(user_id, &key).await?)
    }
    tokens => Err(token_count_error(tokens.len())),
  }
}

/// Resolves the key of an `Authorization` header into its user.
#[tracing::instrument(skip_all)]
pub async fn authenticate(store: &dyn Store, key: &str) -> Result<User> {
  #[derive(Debug, Error)]
  #[error("Unknown auth token")]
  struct UnknownToken;

  let Some(token) = store.auth_token_by_key(key).await? else {
    return Err(Error::from_context(types::Error::Unauthorized, UnknownToken));
  };

  match store.user_by_id(token.user_id).await? {
    Some(user) => Ok(user),
    None => Err(Error::from_context(types::Error::Unauthorized, UnknownToken)),
  }
}
