use async_trait::async_trait;
use uuid::Uuid;

use crate::{
  database::{error::ErrorExt, Connection, Pool, Result},
  schema::{AuthToken, Invitation, NewInvitation, NewUser, User, VerificationToken},
  types::id::{
    marker::{InvitationMarker, UserMarker},
    Id,
  },
};

use super::Store;

#[derive(Debug, Clone)]
pub struct PgStore {
  pool: Pool,
}

impl PgStore {
  #[must_use]
  pub fn new(pool: Pool) -> Self {
    Self { pool }
  }
}

async fn insert_registered(
  conn: &mut Connection,
  user: &NewUser,
  auth_key: &str,
  verification_token: Uuid,
) -> Result<User> {
  let user = User::insert(conn, user).await?;
  AuthToken::insert(conn, user.id, auth_key).await?;
  VerificationToken::upsert(conn, user.id, verification_token).await?;
  Ok(user)
}

#[async_trait]
impl Store for PgStore {
  async fn user_by_id(&self, id: Id<UserMarker>) -> Result<Option<User>> {
    let mut conn = self.pool.get().await?;
    User::by_id(&mut conn, id).await
  }

  async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
    let mut conn = self.pool.get().await?;
    User::by_email(&mut conn, email).await
  }

  #[tracing::instrument(skip_all)]
  async fn register_user(
    &self,
    user: &NewUser,
    auth_key: &str,
    verification_token: Uuid,
  ) -> Result<User> {
    let mut txn = self.pool.begin().await?;
    let user = insert_registered(&mut txn, user, auth_key, verification_token).await?;
    txn.commit().await.into_db_error()?;
    Ok(user)
  }

  async fn update_user_names(
    &self,
    id: Id<UserMarker>,
    first_name: Option<&str>,
    last_name: Option<&str>,
  ) -> Result<Option<User>> {
    let mut txn = self.pool.begin().await?;
    let user = User::update_names(&mut txn, id, first_name, last_name).await?;
    txn.commit().await.into_db_error()?;
    Ok(user)
  }

  async fn auth_tokens_for(&self, user_id: Id<UserMarker>) -> Result<Vec<AuthToken>> {
    let mut conn = self.pool.get().await?;
    AuthToken::for_user(&mut conn, user_id).await
  }

  async fn auth_token_by_key(&self, key: &str) -> Result<Option<AuthToken>> {
    let mut conn = self.pool.get().await?;
    AuthToken::by_key(&mut conn, key).await
  }

  async fn create_auth_token(&self, user_id: Id<UserMarker>, key: &str) -> Result<AuthToken> {
    let mut txn = self.pool.begin().await?;
    let token = AuthToken::insert(&mut txn, user_id, key).await?;
    txn.commit().await.into_db_error()?;
    Ok(token)
  }

  async fn replace_auth_token(&self, user_id: Id<UserMarker>, key: &str) -> Result<AuthToken> {
    let mut txn = self.pool.begin().await?;
    AuthToken::delete_for_user(&mut txn, user_id).await?;
    let token = AuthToken::insert(&mut txn, user_id, key).await?;
    txn.commit().await.into_db_error()?;
    Ok(token)
  }

  async fn verification_tokens_for(
    &self,
    user_id: Id<UserMarker>,
  ) -> Result<Vec<VerificationToken>> {
    let mut conn = self.pool.get().await?;
    VerificationToken::for_user(&mut conn, user_id).await
  }

  async fn upsert_verification_token(
    &self,
    user_id: Id<UserMarker>,
    token: Uuid,
  ) -> Result<VerificationToken> {
    let mut txn = self.pool.begin().await?;
    let token = VerificationToken::upsert(&mut txn, user_id, token).await?;
    txn.commit().await.into_db_error()?;
    Ok(token)
  }

  async fn mark_verified(&self, user_id: Id<UserMarker>) -> Result<Option<User>> {
    let mut txn = self.pool.begin().await?;
    let Some(user) = User::mark_verified(&mut txn, user_id).await? else {
      return Ok(None);
    };
    VerificationToken::deactivate(&mut txn, user_id).await?;
    txn.commit().await.into_db_error()?;
    Ok(Some(user))
  }

  async fn create_invitation(&self, invitation: &NewInvitation) -> Result<Invitation> {
    let mut txn = self.pool.begin().await?;
    let invitation = Invitation::insert(&mut txn, invitation).await?;
    txn.commit().await.into_db_error()?;
    Ok(invitation)
  }

  async fn invitation_by_id(&self, id: Id<InvitationMarker>) -> Result<Option<Invitation>> {
    let mut conn = self.pool.get().await?;
    Invitation::by_id(&mut conn, id).await
  }

  #[tracing::instrument(skip(self, user, auth_key, verification_token))]
  async fn accept_invitation(
    &self,
    id: Id<InvitationMarker>,
    user: &NewUser,
    auth_key: &str,
    verification_token: Uuid,
  ) -> Result<Option<User>> {
    let mut txn = self.pool.begin().await?;

    // The row lock taken here makes a concurrent accept wait on us,
    // it sees the invitation inactive once we commit.
    if !Invitation::deactivate_if_active(&mut txn, id).await? {
      txn.rollback().await.into_db_error()?;
      return Ok(None);
    }

    let user = insert_registered(&mut txn, user, auth_key, verification_token).await?;
    txn.commit().await.into_db_error()?;
    Ok(Some(user))
  }
}
