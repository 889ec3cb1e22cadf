use async_trait::async_trait;
use uuid::Uuid;

use crate::{
  database::Result,
  schema::{AuthToken, Invitation, NewInvitation, NewUser, User, VerificationToken},
  types::id::{
    marker::{InvitationMarker, UserMarker},
    Id,
  },
};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Name of the unique constraint on `users.email`.
pub const USERS_EMAIL_KEY: &str = "users_email_key";

/// Persistence used by the account service functions.
///
/// Every operation that touches more than one row is atomic, the
/// implementor runs it in one transaction or under one lock.
#[async_trait]
pub trait Store: std::fmt::Debug + Send + Sync {
  async fn user_by_id(&self, id: Id<UserMarker>) -> Result<Option<User>>;

  async fn user_by_email(&self, email: &str) -> Result<Option<User>>;

  /// Inserts the user along with their auth token and verification
  /// token. Nothing is stored if any of the three rows fails.
  ///
  /// Fails with [`UniqueViolation`] on [`USERS_EMAIL_KEY`] if the
  /// e-mail address is taken.
  ///
  /// [`UniqueViolation`]: crate::database::Error::UniqueViolation
  async fn register_user(
    &self,
    user: &NewUser,
    auth_key: &str,
    verification_token: Uuid,
  ) -> Result<User>;

  /// Leaves the field untouched on `None`.
  async fn update_user_names(
    &self,
    id: Id<UserMarker>,
    first_name: Option<&str>,
    last_name: Option<&str>,
  ) -> Result<Option<User>>;

  async fn auth_tokens_for(&self, user_id: Id<UserMarker>) -> Result<Vec<AuthToken>>;

  async fn auth_token_by_key(&self, key: &str) -> Result<Option<AuthToken>>;

  async fn create_auth_token(&self, user_id: Id<UserMarker>, key: &str) -> Result<AuthToken>;

  /// Deletes every token of the user and stores `key` as the new one.
  async fn replace_auth_token(&self, user_id: Id<UserMarker>, key: &str) -> Result<AuthToken>;

  async fn verification_tokens_for(
    &self,
    user_id: Id<UserMarker>,
  ) -> Result<Vec<VerificationToken>>;

  async fn upsert_verification_token(
    &self,
    user_id: Id<UserMarker>,
    token: Uuid,
  ) -> Result<VerificationToken>;

  /// Marks the user as verified and deactivates their verification token.
  async fn mark_verified(&self, user_id: Id<UserMarker>) -> Result<Option<User>>;

  async fn create_invitation(&self, invitation: &NewInvitation) -> Result<Invitation>;

  async fn invitation_by_id(&self, id: Id<InvitationMarker>) -> Result<Option<Invitation>>;

  /// Consumes the invitation and registers its user like [`Store::register_user`].
  ///
  /// Returns `None` without creating anything if the invitation is no
  /// longer active, including when another caller consumed it first.
  async fn accept_invitation(
    &self,
    id: Id<InvitationMarker>,
    user: &NewUser,
    auth_key: &str,
    verification_token: Uuid,
  ) -> Result<Option<User>>;
}
