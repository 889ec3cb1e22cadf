use chrono::{Duration, NaiveDateTime};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
  database::{error::ErrorExt, Connection, Result},
  types::id::{marker::UserMarker, Id},
};

#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct VerificationToken {
  pub user_id: Id<UserMarker>,
  pub token: Uuid,
  pub is_active: bool,
  pub created_at: NaiveDateTime,
}

impl VerificationToken {
  /// A token is usable while it is active and younger than `ttl`.
  /// A `ttl` too large to represent never expires.
  #[must_use]
  pub fn is_valid(&self, now: NaiveDateTime, ttl: Duration) -> bool {
    self.is_active
      && self
        .created_at
        .checked_add_signed(ttl)
        .map_or(true, |expires_at| expires_at > now)
  }
}

impl VerificationToken {
  #[tracing::instrument(skip(conn))]
  pub async fn for_user(conn: &mut Connection, user_id: Id<UserMarker>) -> Result<Vec<Self>> {
    sqlx::query_as::<_, Self>(r#"SELECT * FROM "verification_tokens" WHERE user_id = $1"#)
      .bind(user_id)
      .fetch_all(conn)
      .await
      .into_db_error()
  }

  /// Replaces the user's token and revives it, the issue
  /// time restarts as well.
  #[tracing::instrument(skip(conn, token), fields(token = "<hidden>"))]
  pub async fn upsert(conn: &mut Connection, user_id: Id<UserMarker>, token: Uuid) -> Result<Self> {
    sqlx::query_as::<_, Self>(
      r#"INSERT INTO "verification_tokens" (user_id, token) VALUES ($1, $2)
      ON CONFLICT (user_id) DO UPDATE
      SET token = EXCLUDED.token,
          is_active = TRUE,
          created_at = (now() AT TIME ZONE 'utc')
      RETURNING *"#,
    )
    .bind(user_id)
    .bind(token)
    .fetch_one(conn)
    .await
    .into_db_error()
  }

  #[tracing::instrument(skip(conn))]
  pub async fn deactivate(conn: &mut Connection, user_id: Id<UserMarker>) -> Result<u64> {
    sqlx::query(r#"UPDATE "verification_tokens" SET is_active = FALSE WHERE user_id = $1"#)
      .bind(user_id)
      .execute(conn)
      .await
      .map(|v| v.rows_affected())
      .into_db_error()
  }
}
