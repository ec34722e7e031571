//! Collision-free short code generation.

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::entities::LinkKey;
use crate::domain::errors::LinkError;
use crate::domain::repositories::LinkRepository;
use crate::utils::code_generator::{
    RESERVED_ALIASES, encode_base62, generate_code, validate_custom_alias,
};

/// Upper bound of the random counter offset and of collision jumps.
const COUNTER_JITTER: u64 = 1 << 20;

/// How generated codes are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeStrategy {
    /// Uniformly random alphanumeric codes of a fixed length.
    Random,
    /// Base62 encoding of a process-wide counter seeded from the startup time
    /// plus a random offset. After a collision the counter jumps ahead and
    /// the remaining attempts are random draws.
    Sequential,
}

impl FromStr for CodeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(CodeStrategy::Random),
            "sequential" | "counter" => Ok(CodeStrategy::Sequential),
            other => Err(format!(
                "unknown code strategy '{other}' (expected 'random' or 'sequential')"
            )),
        }
    }
}

/// Produces short codes that are free in the link store.
///
/// Custom aliases are validated and checked once; generated codes are
/// re-drawn on collision up to `max_attempts` times.
pub struct CodeGenerator<L: LinkRepository + ?Sized> {
    repository: Arc<L>,
    strategy: CodeStrategy,
    length: usize,
    max_attempts: u32,
    counter: AtomicU64,
}

impl<L: LinkRepository + ?Sized> CodeGenerator<L> {
    /// Creates a generator.
    ///
    /// # Arguments
    ///
    /// - `repository` - store used for existence checks
    /// - `strategy` - random or counter-based codes
    /// - `length` - length of random codes
    /// - `max_attempts` - collisions tolerated before giving up
    pub fn new(
        repository: Arc<L>,
        strategy: CodeStrategy,
        length: usize,
        max_attempts: u32,
    ) -> Self {
        Self {
            repository,
            strategy,
            length,
            max_attempts: max_attempts.max(1),
            counter: AtomicU64::new(
                Utc::now().timestamp_millis().unsigned_abs()
                    + rand::random_range(0..COUNTER_JITTER),
            ),
        }
    }

    /// Returns a code that no active link holds under `domain`.
    ///
    /// # Errors
    ///
    /// - [`LinkError::Validation`] if `custom_alias` breaks the alias rules
    /// - [`LinkError::AliasConflict`] if `custom_alias` is taken
    /// - [`LinkError::GenerationExhausted`] if every attempt collided
    /// - [`LinkError::Unavailable`] if the store fails
    pub async fn generate(
        &self,
        domain: Option<&str>,
        custom_alias: Option<&str>,
    ) -> Result<String, LinkError> {
        if let Some(alias) = custom_alias {
            validate_custom_alias(alias)?;

            let key = LinkKey::new(domain.map(str::to_owned), alias);
            if self.repository.exists(&key).await? {
                return Err(LinkError::AliasConflict(alias.to_string()));
            }
            return Ok(alias.to_string());
        }

        for attempt in 1..=self.max_attempts {
            let candidate = self.next_candidate(attempt);

            if RESERVED_ALIASES.contains(&candidate.as_str()) {
                continue;
            }

            let key = LinkKey::new(domain.map(str::to_owned), candidate);
            if !self.repository.exists(&key).await? {
                debug!(attempt, code = %key.code, "Generated short code");
                return Ok(key.code);
            }

            debug!(attempt, code = %key.code, "Generated code collided");
            if self.strategy == CodeStrategy::Sequential {
                // Another instance is drawing from the same range.
                self.counter
                    .fetch_add(rand::random_range(1..=COUNTER_JITTER), Ordering::Relaxed);
            }
        }

        warn!(
            attempts = self.max_attempts,
            "Short code generation exhausted all attempts"
        );
        Err(LinkError::GenerationExhausted(self.max_attempts))
    }

    fn next_candidate(&self, attempt: u32) -> String {
        match self.strategy {
            CodeStrategy::Sequential if attempt == 1 => {
                encode_base62(self.counter.fetch_add(1, Ordering::Relaxed))
            }
            _ => generate_code(self.length),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::StoreError;
    use crate::domain::repositories::MockLinkRepository;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_generate_random_code_of_configured_length() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_exists()
            .withf(|key| key.domain.is_none())
            .times(1)
            .returning(|_| Ok(false));

        let generator = CodeGenerator::new(Arc::new(mock_repo), CodeStrategy::Random, 6, 10);
        let code = generator.generate(None, None).await.unwrap();

        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn test_generate_retries_on_collision() {
        let mut mock_repo = MockLinkRepository::new();
        let mut calls = 0;
        mock_repo.expect_exists().times(3).returning(move |_| {
            calls += 1;
            Ok(calls < 3)
        });

        let generator = CodeGenerator::new(Arc::new(mock_repo), CodeStrategy::Random, 8, 10);
        assert!(generator.generate(None, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_generate_exhausted() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_exists().times(4).returning(|_| Ok(true));

        let generator = CodeGenerator::new(Arc::new(mock_repo), CodeStrategy::Random, 6, 4);
        let result = generator.generate(None, None).await;

        assert!(matches!(result, Err(LinkError::GenerationExhausted(4))));
    }

    #[tokio::test]
    async fn test_sequential_codes_are_distinct() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_exists().returning(|_| Ok(false));

        let generator = CodeGenerator::new(Arc::new(mock_repo), CodeStrategy::Sequential, 6, 10);
        let mut codes = HashSet::new();
        for _ in 0..100 {
            codes.insert(generator.generate(None, None).await.unwrap());
        }

        assert_eq!(codes.len(), 100);
    }

    #[tokio::test]
    async fn test_sequential_generators_sharing_a_store_do_not_exhaust() {
        use crate::domain::entities::NewLink;
        use crate::infrastructure::memory::MemoryLinkRepository;

        let store = Arc::new(MemoryLinkRepository::new());
        let first = CodeGenerator::new(store.clone(), CodeStrategy::Sequential, 6, 10);
        let second = CodeGenerator::new(store.clone(), CodeStrategy::Sequential, 6, 10);
        // Both instances start from the same counter value.
        second
            .counter
            .store(first.counter.load(Ordering::Relaxed), Ordering::Relaxed);

        let mut issued = HashSet::new();
        for _ in 0..20 {
            let code = first.generate(None, None).await.unwrap();
            store
                .put(NewLink {
                    short_code: code.clone(),
                    domain: None,
                    destination_url: "https://example.com".to_string(),
                    owner_id: None,
                    password_hash: None,
                    expires_at: None,
                    max_clicks: None,
                    is_one_time: false,
                })
                .await
                .unwrap();
            issued.insert(code);
        }

        for _ in 0..5 {
            let code = second.generate(None, None).await.unwrap();
            assert!(!issued.contains(&code));
        }
    }

    #[tokio::test]
    async fn test_custom_alias_free() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_exists()
            .withf(|key| key.code == "promo" && key.domain.as_deref() == Some("go.example.com"))
            .times(1)
            .returning(|_| Ok(false));

        let generator = CodeGenerator::new(Arc::new(mock_repo), CodeStrategy::Random, 6, 10);
        let code = generator
            .generate(Some("go.example.com"), Some("promo"))
            .await
            .unwrap();

        assert_eq!(code, "promo");
    }

    #[tokio::test]
    async fn test_custom_alias_taken() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_exists().times(1).returning(|_| Ok(true));

        let generator = CodeGenerator::new(Arc::new(mock_repo), CodeStrategy::Random, 6, 10);
        let result = generator.generate(None, Some("promo")).await;

        assert!(matches!(result, Err(LinkError::AliasConflict(ref a)) if a == "promo"));
    }

    #[tokio::test]
    async fn test_invalid_alias_skips_store() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_exists().never();

        let generator = CodeGenerator::new(Arc::new(mock_repo), CodeStrategy::Random, 6, 10);

        assert!(matches!(
            generator.generate(None, Some("health")).await,
            Err(LinkError::Validation(_))
        ));
        assert!(matches!(
            generator.generate(None, Some("-bad")).await,
            Err(LinkError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_store_failure_is_unavailable() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_exists()
            .returning(|_| Err(StoreError::Unavailable("down".to_string())));

        let generator = CodeGenerator::new(Arc::new(mock_repo), CodeStrategy::Random, 6, 10);

        assert!(matches!(
            generator.generate(None, None).await,
            Err(LinkError::Unavailable(_))
        ));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("random".parse::<CodeStrategy>(), Ok(CodeStrategy::Random));
        assert_eq!("Sequential".parse::<CodeStrategy>(), Ok(CodeStrategy::Sequential));
        assert!("uuid".parse::<CodeStrategy>().is_err());
    }
}
