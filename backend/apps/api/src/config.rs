//! Environment configuration
//!
//! The only place that reads the process environment. Values are assembled
//! into the crates' own config structs and passed down.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::{AdminSeed, AuthConfig};
use platform::mail::SmtpConfig;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:5173";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_SMTP_PORT: u16 = 587;
const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything the binary needs to start
#[derive(Debug)]
pub struct ApiConfig {
    pub database_url: String,
    pub port: u16,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
    /// Reset links are `{reset_url_base}/{token}`
    pub reset_url_base: String,
    pub smtp: Option<SmtpConfig>,
    pub admin: Option<AdminSeed>,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").context("DATABASE_URL must be set")?;

        let mut auth = match get("JWT_SECRET") {
            Some(secret) => AuthConfig::with_secret(secret.into_bytes()),
            None if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set; using a random secret for this run");
                AuthConfig::development()
            }
            None => bail!("JWT_SECRET must be set in production"),
        };
        if let Some(ttl) = parse::<u64>(&get, "JWT_ACCESS_TTL_SECS")? {
            auth.access_ttl = Duration::from_secs(ttl);
        }
        if let Some(ttl) = parse::<u64>(&get, "JWT_REFRESH_TTL_SECS")? {
            auth.refresh_ttl = Duration::from_secs(ttl);
        }
        if let Some(ttl) = parse::<u64>(&get, "PASSWORD_RESET_TTL_SECS")? {
            auth.reset_ttl = Duration::from_secs(ttl);
        }
        if let Some(ms) = parse::<u64>(&get, "STORE_TIMEOUT_MS")? {
            auth.store_timeout = Duration::from_millis(ms);
        }
        if let Some(secs) = parse::<u64>(&get, "TOKEN_SWEEP_INTERVAL_SECS")? {
            if secs == 0 {
                bail!("TOKEN_SWEEP_INTERVAL_SECS must be positive");
            }
            auth.sweep_interval = Duration::from_secs(secs);
        }

        let public_base =
            get("PUBLIC_BASE_URL").unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string());
        let reset_url_base = format!("{}/auth/reset-password", public_base.trim_end_matches('/'));

        let smtp = match get("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: parse::<u16>(&get, "SMTP_PORT")?.unwrap_or(DEFAULT_SMTP_PORT),
                username: get("SMTP_USER"),
                password: get("SMTP_PASS"),
                from: get("SMTP_FROM").context("SMTP_FROM must be set when SMTP_HOST is")?,
                timeout: SMTP_TIMEOUT,
            }),
            None => None,
        };

        let admin = match (
            get("ADMIN_USERNAME"),
            get("ADMIN_EMAIL"),
            get("ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(email), Some(password)) => Some(AdminSeed {
                username,
                email,
                password,
            }),
            (None, None, None) => None,
            _ => bail!("ADMIN_USERNAME, ADMIN_EMAIL and ADMIN_PASSWORD must be set together"),
        };

        let frontend_origins = get("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            database_url,
            port: parse::<u16>(&get, "PORT")?.unwrap_or(DEFAULT_PORT),
            frontend_origins,
            auth,
            reset_url_base,
            smtp,
            admin,
        })
    }
}

fn parse<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    get(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{key} is not a valid value: {raw:?}"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<ApiConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("DATABASE_URL", "postgres://localhost/shop"), ("JWT_SECRET", "s3cret")])
            .unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.frontend_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.auth.signing_secret, b"s3cret".to_vec());
        assert_eq!(config.auth.access_ttl, Duration::from_secs(900));
        assert_eq!(config.auth.refresh_ttl, Duration::from_secs(604_800));
        assert_eq!(config.reset_url_base, "http://localhost:3000/auth/reset-password");
        assert!(config.smtp.is_none());
        assert!(config.admin.is_none());
    }

    #[test]
    fn test_database_url_required() {
        assert!(config(&[("JWT_SECRET", "s3cret")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("DATABASE_URL", "postgres://db/shop"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_ACCESS_TTL_SECS", "60"),
            ("STORE_TIMEOUT_MS", "250"),
            ("PORT", "8080"),
            ("PUBLIC_BASE_URL", "https://shop.example.com/"),
            ("FRONTEND_ORIGINS", "https://a.example.com, https://b.example.com,"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.auth.access_ttl, Duration::from_secs(60));
        assert_eq!(config.auth.store_timeout, Duration::from_millis(250));
        assert_eq!(
            config.reset_url_base,
            "https://shop.example.com/auth/reset-password"
        );
        assert_eq!(
            config.frontend_origins,
            vec!["https://a.example.com", "https://b.example.com"]
        );
    }

    #[test]
    fn test_bad_number_rejected() {
        let err = config(&[
            ("DATABASE_URL", "postgres://db/shop"),
            ("JWT_SECRET", "s3cret"),
            ("PORT", "eighty"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_smtp_requires_from() {
        let base = [("DATABASE_URL", "postgres://db/shop"), ("JWT_SECRET", "s3cret")];

        let mut vars = base.to_vec();
        vars.push(("SMTP_HOST", "mail.example.com"));
        assert!(config(&vars).is_err());

        vars.push(("SMTP_FROM", "Shop <no-reply@example.com>"));
        let smtp = config(&vars).unwrap().smtp.unwrap();
        assert_eq!(smtp.port, 587);
        assert!(smtp.username.is_none());
    }

    #[test]
    fn test_admin_seed_all_or_nothing() {
        let base = [("DATABASE_URL", "postgres://db/shop"), ("JWT_SECRET", "s3cret")];

        let mut partial = base.to_vec();
        partial.push(("ADMIN_USERNAME", "root"));
        assert!(config(&partial).is_err());

        let mut full = partial.clone();
        full.push(("ADMIN_EMAIL", "root@example.com"));
        full.push(("ADMIN_PASSWORD", "Sup3r-secret!"));
        let seed = config(&full).unwrap().admin.unwrap();
        assert_eq!(seed.username, "root");
    }
}
