use chrono::NaiveDateTime;
use sqlx::FromRow;

use crate::{
  database::{error::ErrorExt, Connection, Result},
  types::id::{
    marker::{InvitationMarker, UserMarker},
    Id,
  },
};

#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct Invitation {
  pub id: Id<InvitationMarker>,
  pub created_at: NaiveDateTime,
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  pub invited_by: Id<UserMarker>,
  pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewInvitation {
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  pub invited_by: Id<UserMarker>,
}

impl Invitation {
  #[tracing::instrument(skip(conn))]
  pub async fn by_id(conn: &mut Connection, id: Id<InvitationMarker>) -> Result<Option<Self>> {
    sqlx::query_as::<_, Self>(r#"SELECT * FROM "invitations" WHERE id = $1"#)
      .bind(id)
      .fetch_optional(conn)
      .await
      .into_db_error()
  }

  #[tracing::instrument(skip_all, fields(invited_by = %invitation.invited_by))]
  pub async fn insert(conn: &mut Connection, invitation: &NewInvitation) -> Result<Self> {
    sqlx::query_as::<_, Self>(
      r#"INSERT INTO "invitations" (email, first_name, last_name, invited_by)
      VALUES ($1, $2, $3, $4)
      RETURNING *"#,
    )
    .bind(&invitation.email)
    .bind(&invitation.first_name)
    .bind(&invitation.last_name)
    .bind(invitation.invited_by)
    .fetch_one(conn)
    .await
    .into_db_error()
  }

  /// Returns `false` if the invitation was already used up,
  /// only one caller can ever flip it.
  #[tracing::instrument(skip(conn))]
  pub async fn deactivate_if_active(
    conn: &mut Connection,
    id: Id<InvitationMarker>,
  ) -> Result<bool> {
    sqlx::query(r#"UPDATE "invitations" SET is_active = FALSE WHERE id = $1 AND is_active"#)
      .bind(id)
      .execute(conn)
      .await
      .map(|v| v.rows_affected() == 1)
      .into_db_error()
  }
}
