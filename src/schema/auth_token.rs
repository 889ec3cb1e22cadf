use chrono::NaiveDateTime;
use sqlx::FromRow;

use crate::{
  database::{error::ErrorExt, Connection, Result},
  types::id::{marker::UserMarker, Id},
};

#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct AuthToken {
  pub key: String,
  pub user_id: Id<UserMarker>,
  pub created_at: NaiveDateTime,
}

impl AuthToken {
  /// Every token row owned by the user. More than one row
  /// means the table is corrupted.
  #[tracing::instrument(skip(conn))]
  pub async fn for_user(conn: &mut Connection, user_id: Id<UserMarker>) -> Result<Vec<Self>> {
    sqlx::query_as::<_, Self>(r#"SELECT * FROM "auth_tokens" WHERE user_id = $1"#)
      .bind(user_id)
      .fetch_all(conn)
      .await
      .into_db_error()
  }

  #[tracing::instrument(skip_all)]
  pub async fn by_key(conn: &mut Connection, key: &str) -> Result<Option<Self>> {
    sqlx::query_as::<_, Self>(r#"SELECT * FROM "auth_tokens" WHERE key = $1"#)
      .bind(key)
      .fetch_optional(conn)
      .await
      .into_db_error()
  }

  #[tracing::instrument(skip(conn, key), fields(key = "<hidden>"))]
  pub async fn insert(conn: &mut Connection, user_id: Id<UserMarker>, key: &str) -> Result<Self> {
    sqlx::query_as::<_, Self>(
      r#"INSERT INTO "auth_tokens" (key, user_id) VALUES ($1, $2) RETURNING *"#,
    )
    .bind(key)
    .bind(user_id)
    .fetch_one(conn)
    .await
    .into_db_error()
  }

  #[tracing::instrument(skip(conn))]
  pub async fn delete_for_user(conn: &mut Connection, user_id: Id<UserMarker>) -> Result<u64> {
    sqlx::query(r#"DELETE FROM "auth_tokens" WHERE user_id = $1"#)
      .bind(user_id)
      .execute(conn)
      .await
      .map(|v| v.rows_affected())
      .into_db_error()
  }
}
