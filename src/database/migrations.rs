use error_stack::ResultExt;
use sqlx::migrate::Migrator;
use tokio::time::Instant;
use tracing::info;

use super::{Connection, Error, Result};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[must_use]
pub fn migrator() -> &'static Migrator {
  &MIGRATOR
}

#[tracing::instrument(skip_all, name = "migrations.run_pending")]
pub async fn run_pending(conn: &mut Connection) -> Result<()> {
  let now = Instant::now();
  info!("Performing database migrations... (this may take a while)");

  MIGRATOR.run(conn).await.change_context(Error::Migration)?;

  let elapsed = now.elapsed();
  info!("Successfully performed database migrations! took {elapsed:.2?}");
  Ok(())
}
