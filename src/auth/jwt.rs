use std::{collections::HashSet, sync::Arc};

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::Duration;
use tracing::{debug, error};

use crate::{clock::Clock, config::JwtConfig, error::AppError};

/// JWT payload. Anything beyond the registered claims lands in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String, // username
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Issues and validates HS256 access tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    default_ttl_minutes: i64,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(cfg: &JwtConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm: cfg.algorithm(),
            default_ttl_minutes: cfg.ttl_minutes,
            clock,
        }
    }

    pub fn issue(&self, subject: &str) -> Result<String, AppError> {
        self.issue_with_ttl(subject, self.default_ttl_minutes)
    }

    pub fn issue_with_ttl(&self, subject: &str, ttl_minutes: i64) -> Result<String, AppError> {
        self.issue_with_claims(subject, Map::new(), ttl_minutes)
    }

    pub fn issue_with_claims(
        &self,
        subject: &str,
        extra: Map<String, Value>,
        ttl_minutes: i64,
    ) -> Result<String, AppError> {
        let now = self.clock.now();
        let exp = ttl_minutes
            .checked_mul(60)
            .filter(|secs| *secs > 0)
            .and_then(|secs| now.checked_add(Duration::seconds(secs)))
            .ok_or_else(|| {
                error!(ttl_minutes, "token ttl out of range");
                AppError::Internal(anyhow::anyhow!("token ttl out of range: {ttl_minutes} minutes"))
            })?;
        let claims = Claims {
            sub: subject.to_string(),
            exp: exp.unix_timestamp(),
            iat: Some(now.unix_timestamp()),
            jti: Some(nonce()),
            extra,
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding).map_err(|e| {
            error!(error = %e, "jwt encode failed");
            AppError::Internal(e.into())
        })?;
        debug!(subject = %subject, exp = claims.exp, "jwt signed");
        Ok(token)
    }

    /// Checks signature, algorithm and required claims, then expiry against
    /// the injected clock (no leeway).
    pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(self.algorithm);
        // exp is enforced below with our own clock
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::from(["exp".to_string(), "sub".to_string()]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "jwt rejected");
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::ExpiredToken,
                _ => AppError::MalformedToken,
            }
        })?;

        if self.clock.now().unix_timestamp() >= data.claims.exp {
            debug!(subject = %data.claims.sub, "jwt expired");
            return Err(AppError::ExpiredToken);
        }

        debug!(subject = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

fn nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}
