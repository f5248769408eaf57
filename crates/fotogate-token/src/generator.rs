//! Opaque token value generation.

use rand::distributions::Alphanumeric;
use rand::Rng;

use fotogate_core::config::tokens::TokenConfig;
use fotogate_core::error::AppError;
use fotogate_core::result::AppResult;

use crate::store::TokenStore;

/// Minimum length accepted for alphanumeric tokens. Shorter values do not
/// give a negligible collision probability at event-scale volumes.
const MIN_ALPHANUMERIC_LENGTH: usize = 20;

/// Token value policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPolicy {
    /// Random draw from the 62-symbol alphanumeric alphabet.
    Alphanumeric {
        /// Number of characters, at least [`MIN_ALPHANUMERIC_LENGTH`].
        length: usize,
    },
    /// 256 random bits as 64 lowercase hex characters, for high-security
    /// contexts.
    Hex256,
}

impl TokenPolicy {
    /// Build a policy from configuration.
    pub fn from_config(config: &TokenConfig) -> AppResult<Self> {
        match config.policy.as_str() {
            "alphanumeric" => Ok(Self::Alphanumeric {
                length: config.length.max(MIN_ALPHANUMERIC_LENGTH),
            }),
            "hex" => Ok(Self::Hex256),
            other => Err(AppError::configuration(format!(
                "Unknown token policy: '{other}'"
            ))),
        }
    }

    /// Length of values produced under this policy.
    pub fn length(self) -> usize {
        match self {
            Self::Alphanumeric { length } => length,
            Self::Hex256 => 64,
        }
    }
}

/// Generates token values and enforces uniqueness against the store.
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    /// Value policy.
    policy: TokenPolicy,
    /// Collision retry budget.
    max_attempts: u32,
}

impl TokenGenerator {
    /// Create a generator with the given policy and retry budget.
    pub fn new(policy: TokenPolicy, max_attempts: u32) -> Self {
        Self {
            policy,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Create a generator from configuration.
    pub fn from_config(config: &TokenConfig) -> AppResult<Self> {
        Ok(Self::new(
            TokenPolicy::from_config(config)?,
            config.max_generation_attempts,
        ))
    }

    /// Draw one value from the CSPRNG. Uniqueness is not checked here.
    pub fn generate(&self) -> String {
        match self.policy {
            TokenPolicy::Alphanumeric { length } => rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(length)
                .map(char::from)
                .collect(),
            TokenPolicy::Hex256 => {
                let mut bytes = [0u8; 32];
                rand::thread_rng().fill(&mut bytes);
                hex::encode(bytes)
            }
        }
    }

    /// Draw values until one is unused, up to the retry budget.
    ///
    /// Exceeding the budget is an explicit, observable failure
    /// (`ExhaustedRetries`), never a silent fallback. No write happens on
    /// any path of this method.
    pub async fn generate_unique(&self, store: &dyn TokenStore) -> AppResult<String> {
        for attempt in 1..=self.max_attempts {
            let value = self.generate();
            if !store.value_exists(&value).await? {
                return Ok(value);
            }
            tracing::warn!(attempt, "Token value collision, redrawing");
        }

        Err(AppError::exhausted_retries(format!(
            "Token generation exhausted {} attempts",
            self.max_attempts
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTokenStore;
    use fotogate_core::error::ErrorKind;
    use std::collections::HashSet;

    fn alphanumeric(length: usize) -> TokenGenerator {
        TokenGenerator::new(TokenPolicy::Alphanumeric { length }, 10)
    }

    #[test]
    fn test_length_and_alphabet() {
        let generator = alphanumeric(24);
        for _ in 0..100 {
            let value = generator.generate();
            assert_eq!(value.len(), 24);
            assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_hex_policy_shape() {
        let generator = TokenGenerator::new(TokenPolicy::Hex256, 10);
        let value = generator.generate();
        assert_eq!(value.len(), 64);
        assert!(value.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_batch_pairwise_distinct() {
        let generator = alphanumeric(24);
        let values: HashSet<String> = (0..1000).map(|_| generator.generate()).collect();
        assert_eq!(values.len(), 1000);
    }

    #[test]
    fn test_policy_clamps_short_lengths() {
        let config = TokenConfig {
            length: 8,
            ..TokenConfig::default()
        };
        let policy = TokenPolicy::from_config(&config).expect("policy");
        assert_eq!(policy.length(), MIN_ALPHANUMERIC_LENGTH);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let config = TokenConfig {
            policy: "base64".to_string(),
            ..TokenConfig::default()
        };
        let err = TokenPolicy::from_config(&config).expect_err("should reject");
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_generate_unique_accepts_fresh_value() {
        let store = MemoryTokenStore::new();
        let generator = alphanumeric(24);
        let value = generator.generate_unique(&store).await.expect("unique");
        assert_eq!(value.len(), 24);
    }

    #[tokio::test]
    async fn test_exhausted_retries_after_budget() {
        let store = MemoryTokenStore::new();
        store.set_collide_always(true).await;
        let generator = alphanumeric(24);

        let err = generator
            .generate_unique(&store)
            .await
            .expect_err("should exhaust");
        assert_eq!(err.kind, ErrorKind::ExhaustedRetries);
        assert_eq!(store.token_count().await, 0);
    }
}
