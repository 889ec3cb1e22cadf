use error_stack::{Report, ResultExt};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use std::{str::FromStr, time::Duration};

use crate::config;

pub mod error;
pub mod migrations;

pub use error::{Error, ErrorExt, ErrorExt2, Result};

pub type Transaction<'a> = sqlx::Transaction<'a, sqlx::Postgres>;
pub type PoolConnection = sqlx::pool::PoolConnection<sqlx::Postgres>;
pub type Connection = sqlx::PgConnection;

#[derive(Clone)]
pub struct Pool {
  pool: sqlx::PgPool,
  readonly: bool,
}

impl Pool {
  #[tracing::instrument(name = "db.pool.new", skip_all)]
  pub async fn new(global_cfg: &config::Database, pool_cfg: &config::DbPoolConfig) -> Result<Self> {
    let mut pool_opts = PgPoolOptions::new()
      .acquire_timeout(Duration::from_secs(global_cfg.timeout_secs.get()))
      .max_connections(pool_cfg.pool_size.get());

    if let Some(min_idle) = pool_cfg.min_idle {
      pool_opts = pool_opts.min_connections(min_idle.get());
    }

    let mut connect_opts =
      PgConnectOptions::from_str(pool_cfg.url.as_str()).change_context(Error::InvalidUrl)?;

    if global_cfg.enforce_tls {
      connect_opts = connect_opts.ssl_mode(PgSslMode::Require);
    } else {
      connect_opts = connect_opts.ssl_mode(PgSslMode::Prefer);
    }

    let pool = Self {
      pool: pool_opts.connect_lazy_with(connect_opts),
      readonly: pool_cfg.readonly,
    };

    match pool.wait_until_healthy().await {
      Ok(..) => {}
      Err(err) if err.is_unhealthy() => {
        tracing::warn!("Database is not reachable yet, connections will be retried lazily");
      }
      Err(err) => return Err(err),
    }

    Ok(pool)
  }

  /// Wraps an existing sqlx pool. Used by database tests where sqlx
  /// prepares a throwaway database.
  #[must_use]
  pub fn from_sqlx(pool: sqlx::PgPool) -> Self {
    Self {
      pool,
      readonly: false,
    }
  }
}

impl std::fmt::Debug for Pool {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    self.pool.fmt(f)
  }
}

impl Pool {
  #[inline(always)]
  pub fn connections(&self) -> u32 {
    self.pool.size()
  }

  #[inline(always)]
  pub fn is_healthy(&self) -> bool {
    self.connections() > 0
  }

  #[inline(always)]
  pub fn is_readonly(&self) -> bool {
    self.readonly
  }

  #[tracing::instrument(name = "db.transaction", skip(self))]
  pub async fn begin(&self) -> Result<Transaction<'static>> {
    if self.readonly {
      return Err(Error::Readonly.into());
    }
    match self.pool.begin().await {
      Ok(txn) => Ok(txn),
      Err(..) if !self.is_healthy() => Err(Error::UnhealthyPool.into()),
      Err(e) => Err(Report::new(Error::Internal(e))),
    }
  }

  #[tracing::instrument(name = "db.connect", skip(self))]
  pub async fn get(&self) -> Result<PoolConnection> {
    if let Some(inner) = self.pool.try_acquire() {
      return Ok(inner);
    }
    match self.pool.acquire().await {
      Ok(conn) => Ok(conn),
      Err(..) if !self.is_healthy() => Err(Error::UnhealthyPool.into()),
      Err(e) => Err(Report::new(Error::Internal(e))),
    }
  }

  #[tracing::instrument(skip(self))]
  pub async fn wait_until_healthy(&self) -> Result<()> {
    match self.pool.acquire().await {
      Ok(..) => Ok(()),
      Err(e) if !self.is_healthy() => Err(Report::new(e).change_context(Error::UnhealthyPool)),
      Err(err) => Err(Report::new(Error::Internal(err))),
    }
  }

  #[tracing::instrument(skip(self))]
  pub async fn migrate(&self) -> Result<()> {
    let mut conn = self.get().await?;
    migrations::run_pending(&mut conn).await
  }
}
