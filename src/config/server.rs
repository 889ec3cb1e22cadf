use chrono::Duration;
use error_stack::{Report, Result, ResultExt};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::num::{NonZeroU64, NonZeroUsize};
use url::Url;
use uuid::Uuid;
use validator::{Validate, ValidateError};

use super::ParseError;
use crate::types::id::{marker::UserMarker, Id};
use crate::util::{figment::FigmentErrorAttachable, validator::IntoValidatorReport};

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    #[serde(default = "Server::default_ip")]
    pub ip: IpAddr,
    #[serde(default = "Server::default_port")]
    pub port: u16,
    /// Amount of actix-web workers. Defaults to the amount of
    /// physical CPU cores if not set.
    pub workers: Option<NonZeroUsize>,
    pub db: super::Database,
    /// Base URL of the web client. Verification links are
    /// built on top of it.
    ///
    /// **Environment variables**:
    /// - `ROSTER_WEB_BASE_URL` or `WEB_BASE_URL`
    #[serde(default)]
    pub web_base_url: Option<Url>,
    /// How long a verification token stays valid after
    /// it was issued.
    ///
    /// **Environment variables**:
    /// - `ROSTER_VERIFICATION_TTL_SECS`
    #[serde(default = "Server::default_verification_ttl_secs")]
    pub verification_ttl_secs: NonZeroU64,
}

impl Validate for Server {
    fn validate(&self) -> std::result::Result<(), ValidateError> {
        let mut fields = ValidateError::field_builder();
        if let Err(error) = self.db.validate() {
            fields.insert("db", error);
        }
        if let Some(url) = &self.web_base_url {
            if url.cannot_be_a_base() {
                fields.insert("web_base_url", ValidateError::message("Invalid web base URL"));
            }
        }
        fields.build().into_result()
    }
}

impl Server {
    pub fn load() -> Result<Self, ParseError> {
        dotenvy::dotenv().ok();

        let config = Self::figment()
            .extract::<Self>()
            .map_err(|e| Report::new(ParseError).attach_figment_error(e))?;

        config
            .validate()
            .into_validator_report()
            .change_context(ParseError)?;

        Ok(config)
    }

    #[must_use]
    pub fn verification_ttl(&self) -> Duration {
        let secs = std::time::Duration::from_secs(self.verification_ttl_secs.get());
        Duration::from_std(secs).unwrap_or(Duration::max_value())
    }

    /// Builds the link a user follows to verify their e-mail address,
    /// `None` if `web_base_url` is not configured.
    #[must_use]
    pub fn verification_link(&self, user_id: Id<UserMarker>, token: Uuid) -> Option<Url> {
        let base = self.web_base_url.as_ref()?;
        let mut link = base.join("verify").ok()?;
        link.query_pairs_mut()
            .append_pair("user_id", &user_id.to_string())
            .append_pair("token", &token.to_string());
        Some(link)
    }
}

impl Server {
    const DEFAULT_CONFIG_FILE: &'static str = "roster.toml";
    const DEFAULT_PORT: u16 = 8080;
    const DEFAULT_VERIFICATION_TTL_SECS: u64 = 60 * 60 * 24;

    const fn default_ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    const fn default_port() -> u16 {
        Self::DEFAULT_PORT
    }

    const fn default_verification_ttl_secs() -> NonZeroU64 {
        match NonZeroU64::new(Self::DEFAULT_VERIFICATION_TTL_SECS) {
            Some(n) => n,
            None => panic!("DEFAULT_VERIFICATION_TTL_SECS is accidentally set to 0"),
        }
    }

    /// Creates a default [`Figment`] object to load server
    /// configuration. This function is there for testing.
    pub(crate) fn figment() -> figment::Figment {
        use figment::{
            providers::{Env, Format, Toml},
            Figment,
        };

        Figment::new()
            .merge(Toml::file(Self::DEFAULT_CONFIG_FILE))
            // Environment variable aliases
            .merge(
                Env::raw()
                    .only(&["DATABASE_URL", "WEB_BASE_URL"])
                    .map(|v| match v.as_str() {
                        "DATABASE_URL" => "db.primary.url".into(),
                        _ => v.as_str().to_lowercase().into(),
                    }),
            )
            // Fields with underscores in them have to be mapped by hand
            .merge(Env::prefixed("ROSTER_").map(|v| match v.as_str() {
                "DB_PRIMARY_MIN_IDLE" => "db.primary.min_idle".into(),
                "DB_PRIMARY_POOL_SIZE" => "db.primary.pool_size".into(),

                "DB_ENFORCE_TLS" => "db.enforce_tls".into(),
                "DB_TIMEOUT_SECS" => "db.timeout_secs".into(),

                "WEB_BASE_URL" => "web_base_url".into(),
                "VERIFICATION_TTL_SECS" => "verification_ttl_secs".into(),

                _ => v.as_str().replace('_', ".").into(),
            }))
    }
}
