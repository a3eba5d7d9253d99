use crate::domain::validation::{PASSWORD_MIN_LEN, email, min_len};
use anyhow::{Context, Result, anyhow};
use std::env;
use std::str::FromStr;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;
const DEFAULT_LOG_FILTER: &str = "info";

/// Credentials for the admin account seeded at startup.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub mail: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub admin: Option<AdminSeed>,
    pub cors_allowed_origin: Option<String>,
    /// `EnvFilter` directives, e.g. `info` or `movie_user_api=debug`.
    pub log_filter: String,
}

impl AppConfig {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("JWT_SECRET must be set"))?;

        let admin = match (lookup("ADMIN_MAIL"), lookup("ADMIN_PASSWORD")) {
            (Some(mail), Some(password)) => {
                email("ADMIN_MAIL", &mail).map_err(|e| anyhow!(e))?;
                min_len("ADMIN_PASSWORD", &password, PASSWORD_MIN_LEN).map_err(|e| anyhow!(e))?;
                Some(AdminSeed { mail, password })
            }
            (None, None) => None,
            _ => return Err(anyhow!("ADMIN_MAIL and ADMIN_PASSWORD must be set together")),
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            jwt_secret,
            token_ttl_secs: parse_or(&lookup, "TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?,
            admin,
            cors_allowed_origin: lookup("CORS_ALLOWED_ORIGIN"),
            log_filter: lookup("RUST_LOG")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}
