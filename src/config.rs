use std::fmt;

use anyhow::{bail, Context};
use jsonwebtoken::Algorithm;

/// Development-only signing secret used when `SECRET_KEY` is not set.
/// Never deploy with this value.
pub const INSECURE_DEV_SECRET: &str = "mysecretkey";

/// Tokens are always signed with HMAC-SHA256.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

pub const DEFAULT_TTL_MINUTES: i64 = 60;

/// One year.
pub const MAX_TTL_MINUTES: i64 = 365 * 24 * 60;

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

impl JwtConfig {
    pub fn algorithm(&self) -> Algorithm {
        TOKEN_ALGORITHM
    }
}

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub hash: HashConfig,
}

// The database URL may carry a password.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("max_connections", &self.max_connections)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt", &self.jwt)
            .field("hash", &self.hash)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());

        let secret = match std::env::var("SECRET_KEY") {
            Ok(v) if !v.is_empty() => v,
            _ => {
                tracing::warn!("SECRET_KEY not set; using the insecure development secret");
                INSECURE_DEV_SECRET.to_string()
            }
        };

        let jwt = JwtConfig {
            secret,
            ttl_minutes: validate_ttl(
                env_parse("ACCESS_TOKEN_TTL_MINUTES")?.unwrap_or(DEFAULT_TTL_MINUTES),
            )?,
        };

        let defaults = HashConfig::default();
        let hash = HashConfig {
            memory_kib: env_parse("PASSWORD_HASH_MEMORY_KIB")?.unwrap_or(defaults.memory_kib),
            iterations: env_parse("PASSWORD_HASH_ITERATIONS")?.unwrap_or(defaults.iterations),
            parallelism: env_parse("PASSWORD_HASH_PARALLELISM")?.unwrap_or(defaults.parallelism),
        };

        let port = match env_parse("APP_PORT")? {
            Some(p) => p,
            None => env_parse("PORT")?.unwrap_or(8000),
        };

        Ok(Self {
            database_url,
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS")?.unwrap_or(10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            jwt,
            hash,
        })
    }

    /// Memory store, cheap hashing.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                ttl_minutes: DEFAULT_TTL_MINUTES,
            },
            hash: HashConfig {
                memory_kib: 64,
                iterations: 1,
                parallelism: 1,
            },
        }
    }
}

fn validate_ttl(minutes: i64) -> anyhow::Result<i64> {
    if !(1..=MAX_TTL_MINUTES).contains(&minutes) {
        bail!("ACCESS_TOKEN_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {minutes}");
    }
    Ok(minutes)
}

fn env_parse<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("invalid value for {key}")),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_hash_config_matches_argon2_defaults() {
        let cfg = HashConfig::default();
        assert_eq!(cfg.memory_kib, 19 * 1024);
        assert_eq!(cfg.iterations, 2);
        assert_eq!(cfg.parallelism, 1);
    }

    #[test]
    fn algorithm_is_fixed_hs256() {
        let cfg = AppConfig::for_tests();
        assert_eq!(cfg.jwt.algorithm(), Algorithm::HS256);
        assert_eq!(cfg.jwt.ttl_minutes, 60);
    }

    #[test]
    fn ttl_must_be_positive_and_bounded() {
        assert_eq!(validate_ttl(60).unwrap(), 60);
        assert_eq!(validate_ttl(1).unwrap(), 1);
        assert_eq!(validate_ttl(MAX_TTL_MINUTES).unwrap(), MAX_TTL_MINUTES);
        assert!(validate_ttl(0).is_err());
        assert!(validate_ttl(-5).is_err());
        assert!(validate_ttl(MAX_TTL_MINUTES + 1).is_err());
        assert!(validate_ttl(10_000_000_000).is_err());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut cfg = AppConfig::for_tests();
        cfg.database_url = Some("postgres://app:hunter2@db/realty".into());
        let out = format!("{cfg:?}");
        assert!(!out.contains("test-secret"));
        assert!(!out.contains("hunter2"));
        assert!(out.contains("<redacted>"));
        assert!(out.contains("ttl_minutes: 60"));
        assert!(!format!("{:?}", cfg.jwt).contains("test-secret"));
    }

    #[test]
    fn env_parse_rejects_garbage() {
        std::env::set_var("REALTY_TEST_BAD_NUMBER", "sixty");
        let res: anyhow::Result<Option<i64>> = env_parse("REALTY_TEST_BAD_NUMBER");
        assert!(res.is_err());
        std::env::remove_var("REALTY_TEST_BAD_NUMBER");
    }
}
