use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use error_stack::Report;
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
  database::{Error, Result},
  schema::{AuthToken, Invitation, NewInvitation, NewUser, User, VerificationToken},
  types::id::{
    marker::{InvitationMarker, UserMarker},
    Id,
  },
};

use super::{Store, USERS_EMAIL_KEY};

/// [`Store`] kept entirely in memory. Mirrors the constraints of the
/// Postgres schema so both backends fail the same way.
#[derive(Debug, Default)]
pub struct MemoryStore {
  state: Mutex<State>,
  readonly: bool,
}

#[derive(Debug, Default)]
struct State {
  last_user_id: u64,
  last_invitation_id: u64,
  users: BTreeMap<Id<UserMarker>, User>,
  auth_tokens: Vec<AuthToken>,
  verification_tokens: Vec<VerificationToken>,
  invitations: BTreeMap<Id<InvitationMarker>, Invitation>,
}

fn now() -> NaiveDateTime {
  Utc::now().naive_utc()
}

fn unique_violation(constraint: &str) -> Report<Error> {
  Report::new(Error::UniqueViolation(constraint.to_string()))
}

impl State {
  fn insert_user(&mut self, user: &NewUser) -> Result<User> {
    if self.users.values().any(|v| v.email == user.email) {
      return Err(unique_violation(USERS_EMAIL_KEY));
    }

    self.last_user_id += 1;
    let user = User {
      id: Id::new(self.last_user_id),
      created_at: now(),
      email: user.email.clone(),
      username: user.username.clone(),
      first_name: user.first_name.clone(),
      last_name: user.last_name.clone(),
      password_hash: user.password_hash.clone(),
      is_verified: false,
      updated_at: None,
    };
    self.users.insert(user.id, user.clone());
    Ok(user)
  }

  fn insert_auth_token(&mut self, user_id: Id<UserMarker>, key: &str) -> Result<AuthToken> {
    if self.auth_tokens.iter().any(|v| v.key == key) {
      return Err(unique_violation("auth_tokens_pkey"));
    }
    if self.auth_tokens.iter().any(|v| v.user_id == user_id) {
      return Err(unique_violation("auth_tokens_user_id_key"));
    }

    let token = AuthToken {
      key: key.to_string(),
      user_id,
      created_at: now(),
    };
    self.auth_tokens.push(token.clone());
    Ok(token)
  }

  fn upsert_verification_token(
    &mut self,
    user_id: Id<UserMarker>,
    token: Uuid,
  ) -> VerificationToken {
    let fresh = VerificationToken {
      user_id,
      token,
      is_active: true,
      created_at: now(),
    };
    match self.verification_tokens.iter_mut().find(|v| v.user_id == user_id) {
      Some(existing) => *existing = fresh.clone(),
      None => self.verification_tokens.push(fresh.clone()),
    }
    fresh
  }

  fn register(&mut self, user: &NewUser, auth_key: &str, verification_token: Uuid) -> Result<User> {
    // Nothing below is visible to other callers until the guard drops,
    // so checking the constraints upfront keeps the state untouched
    // when one of them fails.
    if self.users.values().any(|v| v.email == user.email) {
      return Err(unique_violation(USERS_EMAIL_KEY));
    }
    if self.auth_tokens.iter().any(|v| v.key == auth_key) {
      return Err(unique_violation("auth_tokens_pkey"));
    }

    let user = self.insert_user(user)?;
    self.insert_auth_token(user.id, auth_key)?;
    self.upsert_verification_token(user.id, verification_token);
    Ok(user)
  }
}

impl MemoryStore {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Every write fails with [`Error::Readonly`], like a Postgres
  /// pool configured as read-only.
  #[must_use]
  pub fn readonly() -> Self {
    Self {
      state: Mutex::default(),
      readonly: true,
    }
  }

  fn check_writable(&self) -> Result<()> {
    if self.readonly {
      Err(Report::new(Error::Readonly))
    } else {
      Ok(())
    }
  }
}

#[cfg(test)]
impl MemoryStore {
  /// Inserts a user without provisioning any token.
  pub(crate) async fn push_raw_user(&self, user: &NewUser) -> User {
    self.state.lock().await.insert_user(user).unwrap()
  }

  /// Inserts a token row without checking any constraint.
  pub(crate) async fn push_raw_auth_token(&self, token: AuthToken) {
    self.state.lock().await.auth_tokens.push(token);
  }

  pub(crate) async fn push_raw_verification_token(&self, token: VerificationToken) {
    self.state.lock().await.verification_tokens.push(token);
  }

  pub(crate) async fn backdate_verification_token(
    &self,
    user_id: Id<UserMarker>,
    by: chrono::Duration,
  ) {
    let mut state = self.state.lock().await;
    for token in state.verification_tokens.iter_mut().filter(|v| v.user_id == user_id) {
      token.created_at -= by;
    }
  }

  pub(crate) async fn user_count(&self) -> usize {
    self.state.lock().await.users.len()
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn user_by_id(&self, id: Id<UserMarker>) -> Result<Option<User>> {
    Ok(self.state.lock().await.users.get(&id).cloned())
  }

  async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
    let state = self.state.lock().await;
    Ok(state.users.values().find(|v| v.email == email).cloned())
  }

  async fn register_user(
    &self,
    user: &NewUser,
    auth_key: &str,
    verification_token: Uuid,
  ) -> Result<User> {
    self.check_writable()?;
    self.state.lock().await.register(user, auth_key, verification_token)
  }

  async fn update_user_names(
    &self,
    id: Id<UserMarker>,
    first_name: Option<&str>,
    last_name: Option<&str>,
  ) -> Result<Option<User>> {
    self.check_writable()?;
    let mut state = self.state.lock().await;
    let Some(user) = state.users.get_mut(&id) else {
      return Ok(None);
    };
    if let Some(first_name) = first_name {
      user.first_name = first_name.to_string();
    }
    if let Some(last_name) = last_name {
      user.last_name = last_name.to_string();
    }
    user.updated_at = Some(now());
    Ok(Some(user.clone()))
  }

  async fn auth_tokens_for(&self, user_id: Id<UserMarker>) -> Result<Vec<AuthToken>> {
    let state = self.state.lock().await;
    Ok(state.auth_tokens.iter().filter(|v| v.user_id == user_id).cloned().collect())
  }

  async fn auth_token_by_key(&self, key: &str) -> Result<Option<AuthToken>> {
    let state = self.state.lock().await;
    Ok(state.auth_tokens.iter().find(|v| v.key == key).cloned())
  }

  async fn create_auth_token(&self, user_id: Id<UserMarker>, key: &str) -> Result<AuthToken> {
    self.check_writable()?;
    self.state.lock().await.insert_auth_token(user_id, key)
  }

  async fn replace_auth_token(&self, user_id: Id<UserMarker>, key: &str) -> Result<AuthToken> {
    self.check_writable()?;
    let mut state = self.state.lock().await;
    let previous = std::mem::take(&mut state.auth_tokens);
    let (removed, kept): (Vec<_>, Vec<_>) =
      previous.into_iter().partition(|v| v.user_id == user_id);
    state.auth_tokens = kept;

    let result = state.insert_auth_token(user_id, key);
    if result.is_err() {
      state.auth_tokens.extend(removed);
    }
    result
  }

  async fn verification_tokens_for(
    &self,
    user_id: Id<UserMarker>,
  ) -> Result<Vec<VerificationToken>> {
    let state = self.state.lock().await;
    Ok(state
      .verification_tokens
      .iter()
      .filter(|v| v.user_id == user_id)
      .cloned()
      .collect())
  }

  async fn upsert_verification_token(
    &self,
    user_id: Id<UserMarker>,
    token: Uuid,
  ) -> Result<VerificationToken> {
    self.check_writable()?;
    Ok(self.state.lock().await.upsert_verification_token(user_id, token))
  }

  async fn mark_verified(&self, user_id: Id<UserMarker>) -> Result<Option<User>> {
    self.check_writable()?;
    let mut state = self.state.lock().await;
    let Some(user) = state.users.get_mut(&user_id) else {
      return Ok(None);
    };
    user.is_verified = true;
    user.updated_at = Some(now());
    let user = user.clone();

    for token in state.verification_tokens.iter_mut().filter(|v| v.user_id == user_id) {
      token.is_active = false;
    }
    Ok(Some(user))
  }

  async fn create_invitation(&self, invitation: &NewInvitation) -> Result<Invitation> {
    self.check_writable()?;
    let mut state = self.state.lock().await;
    state.last_invitation_id += 1;

    let invitation = Invitation {
      id: Id::new(state.last_invitation_id),
      created_at: now(),
      email: invitation.email.clone(),
      first_name: invitation.first_name.clone(),
      last_name: invitation.last_name.clone(),
      invited_by: invitation.invited_by,
      is_active: true,
    };
    state.invitations.insert(invitation.id, invitation.clone());
    Ok(invitation)
  }

  async fn invitation_by_id(&self, id: Id<InvitationMarker>) -> Result<Option<Invitation>> {
    Ok(self.state.lock().await.invitations.get(&id).cloned())
  }

  async fn accept_invitation(
    &self,
    id: Id<InvitationMarker>,
    user: &NewUser,
    auth_key: &str,
    verification_token: Uuid,
  ) -> Result<Option<User>> {
    self.check_writable()?;
    let mut state = self.state.lock().await;
    match state.invitations.get(&id) {
      Some(invitation) if invitation.is_active => {}
      _ => return Ok(None),
    }

    let user = state.register(user, auth_key, verification_token)?;
    if let Some(invitation) = state.invitations.get_mut(&id) {
      invitation.is_active = false;
    }
    Ok(Some(user))
  }
}
