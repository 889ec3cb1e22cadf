use serde::{Deserialize, Serialize};

use crate::schema;
use crate::types::id::{marker::InvitationMarker, Id};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InvitationView {
  pub id: Id<InvitationMarker>,
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  pub is_active: bool,
}

impl From<&schema::Invitation> for InvitationView {
  fn from(invitation: &schema::Invitation) -> Self {
    Self {
      id: invitation.id,
      email: invitation.email.clone(),
      first_name: invitation.first_name.clone(),
      last_name: invitation.last_name.clone(),
      is_active: invitation.is_active,
    }
  }
}
