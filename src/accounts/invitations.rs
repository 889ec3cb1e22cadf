use thiserror::Error;
use validator::{Validate, ValidateError};

use crate::{
  error::{Error, Result},
  schema::{Invitation, NewInvitation, User},
  store::Store,
  types::{
    self,
    form::{invitations::create, users::register},
    id::{marker::InvitationMarker, Id},
  },
  util::{token, validation, Sensitive},
};

use super::users::{map_email_taken, prepare_new_user};

#[derive(Debug, Error)]
#[error("Invitation is no longer active")]
struct InvitationExpired;

fn expired() -> Error {
  Error::from_context(types::Error::InvitationExpired, InvitationExpired)
}

#[tracing::instrument(skip_all, fields(inviter.id = %inviter.id))]
pub async fn create_invitation(
  store: &dyn Store,
  inviter: &User,
  form: &create::Request,
) -> Result<Invitation> {
  form.validate()?;

  let email = validation::normalize_email(&form.email);
  if store.user_by_email(&email).await?.is_some() {
    let error = ValidateError::field("email", "A user with this e-mail address already exists");
    return Err(error.into());
  }

  let invitation = store
    .create_invitation(&NewInvitation {
      email,
      first_name: form.first_name.trim().to_string(),
      last_name: form.last_name.trim().to_string(),
      invited_by: inviter.id,
    })
    .await?;

  tracing::info!(invitation.id = %invitation.id, "created invitation");
  Ok(invitation)
}

#[tracing::instrument(skip(store))]
pub async fn get_invitation(store: &dyn Store, id: Id<InvitationMarker>) -> Result<Invitation> {
  #[derive(Debug, Error)]
  #[error("Invitation does not exist")]
  struct UnknownInvitation;

  match store.invitation_by_id(id).await? {
    Some(invitation) => Ok(invitation),
    None => Err(Error::from_context(types::Error::NotFound, UnknownInvitation)),
  }
}

/// Registers the invited user with the given password and consumes
/// the invitation. Both happen together or not at all. An
/// invitation accepted twice fails as expired the second time, even
/// when `invitation` was read before the first accept.
#[tracing::instrument(skip_all, fields(invitation.id = %invitation.id))]
pub async fn accept_invitation_and_create_user(
  store: &dyn Store,
  invitation: &Invitation,
  password: Sensitive<String>,
) -> Result<User> {
  if !invitation.is_active {
    return Err(expired());
  }

  let form = register::Request {
    email: invitation.email.clone(),
    username: Some(invitation.email.clone()),
    first_name: invitation.first_name.clone(),
    last_name: invitation.last_name.clone(),
    password,
  };
  form.validate()?;
  let new_user = prepare_new_user(&form).await?;

  let accepted = store
    .accept_invitation(
      invitation.id,
      &new_user,
      &token::new_auth_token_key(),
      token::new_verification_token(),
    )
    .await
    .map_err(map_email_taken)?;

  match accepted {
    Some(user) => {
      tracing::info!(user.id = %user.id, "registered user from invitation");
      Ok(user)
    }
    None => Err(expired()),
  }
}
