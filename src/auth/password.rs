use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::{debug, error};

use crate::{config::HashConfig, error::AppError};

/// Argon2id password hasher. Output is a PHC string carrying algorithm,
/// version, cost parameters and salt, so verification needs nothing else.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    pub fn new(cfg: HashConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 parameters: {e}"))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn hash(&self, plain: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                AppError::Internal(anyhow::anyhow!(e.to_string()))
            })?
            .to_string();
        Ok(hash)
    }

    /// False for a wrong password and for a stored value that is not a valid
    /// PHC string.
    pub fn verify(&self, plain: &str, stored: &str) -> bool {
        let parsed = match PasswordHash::new(stored) {
            Ok(p) => p,
            Err(e) => {
                debug!(error = %e, "stored password hash does not parse");
                return false;
            }
        };
        // Verification uses the parameters embedded in the stored hash.
        self.argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> CredentialHasher {
        CredentialHasher::new(crate::config::AppConfig::for_tests().hash).expect("params")
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let h = hasher();
        let password = "Secur3P@ssw0rd!";
        let hash = h.hash(password).expect("hashing should succeed");
        assert!(h.verify(password, &hash));
    }

    #[test]
    fn hash_is_salted_and_self_describing() {
        let h = hasher();
        let a = h.hash("secret123").unwrap();
        let b = h.hash("secret123").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$v=19$"));
        assert!(h.verify("secret123", &a));
        assert!(h.verify("secret123", &b));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let h = hasher();
        let hash = h.hash("correct-horse-battery-staple").unwrap();
        assert!(!h.verify("wrong-password", &hash));
    }

    #[test]
    fn verify_is_false_on_malformed_hash() {
        let h = hasher();
        assert!(!h.verify("anything", "not-a-valid-hash"));
        assert!(!h.verify("anything", ""));
        assert!(!h.verify("anything", "$argon2id$v=19$m=64,t=1,p=1$garbage"));
    }

    #[test]
    fn verify_accepts_hash_from_other_cost_settings() {
        let cheap = hasher();
        let other = CredentialHasher::new(HashConfig {
            memory_kib: 128,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        let hash = other.hash("pw").unwrap();
        assert!(cheap.verify("pw", &hash));
    }

    #[test]
    fn rejects_invalid_params() {
        let res = CredentialHasher::new(HashConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(res.is_err());
    }
}
