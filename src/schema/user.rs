use chrono::NaiveDateTime;
use sqlx::FromRow;

use crate::{
  database::{error::ErrorExt, Connection, Result},
  types::id::{marker::UserMarker, Id},
};

#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct User {
  pub id: Id<UserMarker>,
  pub created_at: NaiveDateTime,
  pub email: String,
  pub username: String,
  pub first_name: String,
  pub last_name: String,
  pub password_hash: String,
  pub is_verified: bool,
  pub updated_at: Option<NaiveDateTime>,
}

/// Row values of a user that is about to be registered.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email: String,
  pub username: String,
  pub first_name: String,
  pub last_name: String,
  pub password_hash: String,
}

impl User {
  #[tracing::instrument(skip(conn))]
  pub async fn by_id(conn: &mut Connection, id: Id<UserMarker>) -> Result<Option<Self>> {
    sqlx::query_as::<_, Self>(r#"SELECT * FROM "users" WHERE id = $1"#)
      .bind(id)
      .fetch_optional(conn)
      .await
      .into_db_error()
  }

  #[tracing::instrument(skip(conn, email), fields(email = "<hidden>"))]
  pub async fn by_email(conn: &mut Connection, email: &str) -> Result<Option<Self>> {
    sqlx::query_as::<_, Self>(r#"SELECT * FROM "users" WHERE email = $1"#)
      .bind(email)
      .fetch_optional(conn)
      .await
      .into_db_error()
  }

  #[tracing::instrument(skip_all)]
  pub async fn insert(conn: &mut Connection, user: &NewUser) -> Result<Self> {
    sqlx::query_as::<_, Self>(
      r#"INSERT INTO "users" (email, username, first_name, last_name, password_hash)
      VALUES ($1, $2, $3, $4, $5)
      RETURNING *"#,
    )
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.password_hash)
    .fetch_one(conn)
    .await
    .into_db_error()
  }

  #[tracing::instrument(skip(conn, first_name, last_name))]
  pub async fn update_names(
    conn: &mut Connection,
    id: Id<UserMarker>,
    first_name: Option<&str>,
    last_name: Option<&str>,
  ) -> Result<Option<Self>> {
    sqlx::query_as::<_, Self>(
      r#"UPDATE "users"
      SET first_name = COALESCE($2, first_name),
          last_name = COALESCE($3, last_name),
          updated_at = (now() AT TIME ZONE 'utc')
      WHERE id = $1
      RETURNING *"#,
    )
    .bind(id)
    .bind(first_name)
    .bind(last_name)
    .fetch_optional(conn)
    .await
    .into_db_error()
  }

  #[tracing::instrument(skip(conn))]
  pub async fn mark_verified(conn: &mut Connection, id: Id<UserMarker>) -> Result<Option<Self>> {
    sqlx::query_as::<_, Self>(
      r#"UPDATE "users"
      SET is_verified = TRUE, updated_at = (now() AT TIME ZONE 'utc')
      WHERE id = $1
      RETURNING *"#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .into_db_error()
  }
}
