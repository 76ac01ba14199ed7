//! Configuration for the auth surface.
//!
//! The auth core never reads the environment itself; the secret and TTL
//! are loaded here once at startup and injected.

use chrono::Duration;

use pitline_auth::SecretProvider;

const SECRET_VAR: &str = "PITLINE_JWT_SECRET";
const TTL_VAR: &str = "PITLINE_TOKEN_TTL_SECS";

/// Auth configuration, sourced from the environment.
#[derive(Clone)]
pub struct AuthConfig {
    secret: String,
    pub token_ttl: Duration,
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"[redacted]")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl AuthConfig {
    /// Load from `PITLINE_JWT_SECRET` / `PITLINE_TOKEN_TTL_SECS`.
    ///
    /// A missing or empty secret is a startup error; there is no default
    /// signing secret. The TTL defaults to 24 hours.
    pub fn from_env() -> anyhow::Result<Self> {
        let secret = std::env::var(SECRET_VAR)
            .map_err(|_| anyhow::anyhow!("{SECRET_VAR} is not set"))?;
        if secret.trim().is_empty() {
            anyhow::bail!("{SECRET_VAR} is empty");
        }

        let token_ttl = match std::env::var(TTL_VAR) {
            Ok(raw) => {
                let secs: i64 = raw
                    .parse()
                    .map_err(|e| anyhow::anyhow!("{TTL_VAR} is not an integer: {e}"))?;
                if secs <= 0 {
                    anyhow::bail!("{TTL_VAR} must be positive, got {secs}");
                }
                Duration::seconds(secs)
            }
            Err(_) => pitline_auth::token::default_ttl(),
        };

        Ok(Self { secret, token_ttl })
    }

    /// Build a config directly. Intended for tests and embedded setups.
    pub fn new(secret: impl Into<String>, token_ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            token_ttl,
        }
    }

    pub fn secret_provider(&self) -> EnvSecretProvider {
        EnvSecretProvider {
            secret: self.secret.clone(),
        }
    }
}

/// [`SecretProvider`] backed by configuration.
///
/// Holds the secret by value so the config can be dropped after wiring.
/// Deliberately no `Debug` derive.
#[derive(Clone)]
pub struct EnvSecretProvider {
    secret: String,
}

impl SecretProvider for EnvSecretProvider {
    fn signing_secret(&self) -> &str {
        &self.secret
    }
}

impl core::fmt::Debug for EnvSecretProvider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("EnvSecretProvider([redacted])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_config_wires_a_provider() {
        let config = AuthConfig::new("wiring-secret", Duration::minutes(5));
        let provider = config.secret_provider();
        assert_eq!(provider.signing_secret(), "wiring-secret");
        assert_eq!(config.token_ttl, Duration::minutes(5));
    }

    #[test]
    fn debug_output_never_contains_the_secret() {
        let provider = AuthConfig::new("hunter2", Duration::minutes(5)).secret_provider();
        let debugged = format!("{provider:?}");
        assert!(!debugged.contains("hunter2"));
    }
}
