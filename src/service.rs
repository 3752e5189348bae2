//! Request handling around the chain core: decoding requests, running the
//! chosen policy, and persisting and caching public results.

use crate::cache::{RecentTranslation, RecentTranslations};
use crate::catalog::LanguageCatalog;
use crate::chain::{Chain, ChainOrchestrator, Policy};
use crate::config::Config;
use crate::error::ChainError;
use crate::metrics::{ChainMetrics, MetricsReport};
use crate::provider::TranslationProvider;
use crate::random::{Random, RandomSource};
use crate::store::{StoredTranslation, TranslationStore};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// A validated translation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateRequest {
    pub text: String,
    pub policy: Policy,
    /// Persist the result and add it to the recent list
    pub is_public: bool,
}

/// Request body as sent by web clients.
///
/// `type` selects the policy: 0 = fixed count (`options` is the count, as a
/// numeric string or number), 1 = full permutation (`options` ignored),
/// 2 = explicit sequence (`options` is an array of language names).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTranslateRequest {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub options: serde_json::Value,
    #[serde(default)]
    pub is_public: bool,
}

impl TryFrom<WireTranslateRequest> for TranslateRequest {
    type Error = ChainError;

    fn try_from(wire: WireTranslateRequest) -> Result<Self, Self::Error> {
        let policy = match wire.kind {
            0 => Policy::FixedCount(parse_count(&wire.options)?),
            1 => Policy::FullPermutation,
            2 => Policy::ExplicitSequence(parse_names(wire.options)?),
            other => {
                return Err(ChainError::InvalidArgument(format!(
                    "unknown translation type {}",
                    other
                )))
            }
        };

        Ok(Self {
            text: wire.text,
            policy,
            is_public: wire.is_public,
        })
    }
}

fn parse_count(options: &serde_json::Value) -> Result<i64, ChainError> {
    let count = match options {
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        serde_json::Value::Number(n) => n.as_i64(),
        _ => None,
    };
    count.ok_or_else(|| {
        ChainError::InvalidArgument(format!("hop count must be an integer, got {}", options))
    })
}

fn parse_names(options: serde_json::Value) -> Result<Vec<String>, ChainError> {
    serde_json::from_value(options).map_err(|e| {
        ChainError::InvalidArgument(format!("language sequence must be a list of names: {}", e))
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub results: Chain,
    pub translation_id: Option<String>,
}

pub struct TranslateService {
    catalog: Arc<LanguageCatalog>,
    provider: Arc<dyn TranslationProvider>,
    store: Arc<dyn TranslationStore>,
    recent: RecentTranslations,
    metrics: ChainMetrics,
    hop_timeout: Option<Duration>,
    max_hops: usize,
}

impl TranslateService {
    pub fn new(
        config: &Config,
        catalog: Arc<LanguageCatalog>,
        provider: Arc<dyn TranslationProvider>,
        store: Arc<dyn TranslationStore>,
    ) -> Result<Self> {
        let recent = RecentTranslations::new(config.recent_capacity)
            .context("Invalid RECENT_TRANSLATIONS_CAPACITY")?;

        Ok(Self {
            catalog,
            provider,
            store,
            recent,
            metrics: ChainMetrics::new(),
            hop_timeout: config.hop_timeout(),
            max_hops: config.max_hops,
        })
    }

    /// All supported language names, sorted.
    pub fn supported_lang_names(&self) -> &[String] {
        self.catalog.names()
    }

    pub async fn translate(&self, request: TranslateRequest) -> Result<TranslateResponse> {
        let mut rng = Random::from_entropy();
        self.translate_with(request, &mut rng).await
    }

    /// Like [`translate`](Self::translate) with a caller-supplied random source.
    pub async fn translate_with<R>(
        &self,
        request: TranslateRequest,
        rng: &mut R,
    ) -> Result<TranslateResponse>
    where
        R: RandomSource + Send,
    {
        self.validate(&request)?;

        let orchestrator = ChainOrchestrator::new(&self.catalog, self.provider.as_ref())
            .with_hop_timeout(self.hop_timeout);

        self.metrics.record_started();
        let chain = match orchestrator.run(&request.text, &request.policy, rng).await {
            Ok(chain) => {
                self.metrics.record_completed(chain.hops());
                chain
            }
            Err(e) => {
                error!("Translation chain failed: {}", e);
                self.metrics
                    .record_failed(matches!(e, ChainError::ProviderFailure { .. }));
                return Err(e.into());
            }
        };

        let translation_id = if request.is_public {
            let id = self
                .store
                .create(&chain)
                .await
                .context("Failed to save translation")?;
            self.recent.push(RecentTranslation {
                results: chain.clone(),
                translation_id: Some(id.clone()),
            });
            info!("Saved public translation {}", id);
            Some(id)
        } else {
            None
        };

        Ok(TranslateResponse {
            results: chain,
            translation_id,
        })
    }

    /// Recent public translations, newest first.
    pub fn recent_translations(&self) -> Vec<RecentTranslation> {
        self.recent.newest_first()
    }

    pub async fn translation(&self, translation_id: &str) -> Result<Option<StoredTranslation>> {
        self.store
            .get(translation_id)
            .await
            .with_context(|| format!("Failed to load translation {}", translation_id))
    }

    pub fn metrics(&self) -> MetricsReport {
        self.metrics.report()
    }

    fn validate(&self, request: &TranslateRequest) -> Result<(), ChainError> {
        if request.text.trim().is_empty() {
            return Err(ChainError::InvalidArgument("text must not be empty".to_string()));
        }

        let hops = match &request.policy {
            Policy::FixedCount(n) => usize::try_from(*n).unwrap_or(0),
            Policy::FullPermutation => 0,
            Policy::ExplicitSequence(names) => names.len(),
        };
        if hops > self.max_hops {
            return Err(ChainError::InvalidArgument(format!(
                "at most {} hops allowed, got {}",
                self.max_hops, hops
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ORIGIN_NAME;
    use crate::store::InMemoryStore;
    use crate::test_support::{sample_catalog, AppendCode, FailOnCall};

    fn create_test_config() -> Config {
        Config {
            yandex_api_key: "test-key".to_string(),
            yandex_api_url: "http://localhost".to_string(),
            http_timeout_secs: 10,
            recent_capacity: 4,
            hop_timeout_secs: 5,
            max_hops: 10,
        }
    }

    fn create_service(provider: Arc<dyn TranslationProvider>) -> (TranslateService, InMemoryStore) {
        let store = InMemoryStore::new();
        let service = TranslateService::new(
            &create_test_config(),
            Arc::new(sample_catalog()),
            provider,
            Arc::new(store.clone()),
        )
        .expect("Should build service");
        (service, store)
    }

    fn request(text: &str, policy: Policy, is_public: bool) -> TranslateRequest {
        TranslateRequest {
            text: text.to_string(),
            policy,
            is_public,
        }
    }

    fn sequence(names: &[&str]) -> Policy {
        Policy::ExplicitSequence(names.iter().map(|s| s.to_string()).collect())
    }

    // ==================== Wire Request Tests ====================

    fn wire(json: serde_json::Value) -> Result<TranslateRequest, ChainError> {
        let wire: WireTranslateRequest = serde_json::from_value(json).expect("Should deserialize");
        TranslateRequest::try_from(wire)
    }

    #[test]
    fn test_wire_fixed_count_from_string() {
        let request = wire(serde_json::json!({
            "text": "hello", "type": 0, "options": "3", "isPublic": true
        }))
        .unwrap();

        assert_eq!(request.policy, Policy::FixedCount(3));
        assert!(request.is_public);
    }

    #[test]
    fn test_wire_fixed_count_from_number() {
        let request = wire(serde_json::json!({"text": "hello", "type": 0, "options": 2})).unwrap();
        assert_eq!(request.policy, Policy::FixedCount(2));
        assert!(!request.is_public);
    }

    #[test]
    fn test_wire_fixed_count_not_a_number() {
        let err = wire(serde_json::json!({"text": "hello", "type": 0, "options": "lots"}))
            .unwrap_err();
        assert!(matches!(err, ChainError::InvalidArgument(_)));

        let err = wire(serde_json::json!({"text": "hello", "type": 0, "options": "2.5"}))
            .unwrap_err();
        assert!(matches!(err, ChainError::InvalidArgument(_)));
    }

    #[test]
    fn test_wire_full_permutation_ignores_options() {
        let request = wire(serde_json::json!({"text": "hello", "type": 1, "options": null})).unwrap();
        assert_eq!(request.policy, Policy::FullPermutation);
    }

    #[test]
    fn test_wire_explicit_sequence() {
        let request = wire(serde_json::json!({
            "text": "hello", "type": 2, "options": ["French", "German"]
        }))
        .unwrap();
        assert_eq!(request.policy, sequence(&["French", "German"]));
    }

    #[test]
    fn test_wire_explicit_sequence_malformed() {
        let err = wire(serde_json::json!({"text": "hello", "type": 2, "options": "French"}))
            .unwrap_err();
        assert!(matches!(err, ChainError::InvalidArgument(_)));
    }

    #[test]
    fn test_wire_unknown_type() {
        let err = wire(serde_json::json!({"text": "hello", "type": 7})).unwrap_err();
        assert!(err.to_string().contains("unknown translation type 7"));
    }

    // ==================== translate Tests ====================

    #[tokio::test]
    async fn test_private_translation_is_not_saved() {
        let (service, store) = create_service(Arc::new(AppendCode));

        let response = service
            .translate(request("hello", sequence(&["French"]), false))
            .await
            .expect("Should succeed");

        assert_eq!(response.results.final_text(), "hello-fr-en");
        assert!(response.translation_id.is_none());
        assert!(store.is_empty());
        assert!(service.recent_translations().is_empty());
    }

    #[tokio::test]
    async fn test_public_translation_is_saved_and_cached() {
        let (service, _store) = create_service(Arc::new(AppendCode));

        let response = service
            .translate(request("hello", sequence(&["French", "German"]), true))
            .await
            .expect("Should succeed");

        let id = response.translation_id.clone().expect("Should have an id");

        let stored = service
            .translation(&id)
            .await
            .expect("Should query")
            .expect("Should exist");
        assert_eq!(stored.results, response.results);

        let recent = service.recent_translations();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].translation_id.as_deref(), Some(id.as_str()));
    }

    #[tokio::test]
    async fn test_recent_translations_newest_first_and_bounded() {
        let (service, store) = create_service(Arc::new(AppendCode));

        for text in ["a", "b", "c", "d"] {
            service
                .translate(request(text, sequence(&["Spanish"]), true))
                .await
                .expect("Should succeed");
        }

        // Capacity 4 keeps the 3 newest
        let recent: Vec<String> = service
            .recent_translations()
            .iter()
            .map(|r| r.results.source_text().to_string())
            .collect();
        assert_eq!(recent, vec!["d", "c", "b"]);
        // Evicted results stay in the store
        assert_eq!(store.len(), 4);
    }

    #[tokio::test]
    async fn test_seeded_fixed_count() {
        let (service, _) = create_service(Arc::new(AppendCode));
        let mut rng = Random::seeded(21);

        let response = service
            .translate_with(request("hello", Policy::FixedCount(5), false), &mut rng)
            .await
            .expect("Should succeed");

        assert_eq!(response.results.len(), 7);
        assert_eq!(response.results.entries()[6].lang_name, ORIGIN_NAME);
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let (service, _) = create_service(Arc::new(AppendCode));

        let err = service
            .translate(request("   ", Policy::FixedCount(1), false))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ChainError>(),
            Some(ChainError::InvalidArgument(_))
        ));
        assert_eq!(service.metrics().chains_started, 0);
    }

    #[tokio::test]
    async fn test_too_many_hops_rejected() {
        let (service, _) = create_service(Arc::new(AppendCode));

        let err = service
            .translate(request("hello", Policy::FixedCount(11), false))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("at most 10 hops"));

        let long = vec!["French"; 11];
        let err = service
            .translate(request("hello", sequence(&long), false))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("at most 10 hops"));
    }

    #[tokio::test]
    async fn test_provider_failure_not_saved() {
        let (service, store) = create_service(Arc::new(FailOnCall::new(1)));

        let err = service
            .translate(request("hello", sequence(&["French", "German"]), true))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ChainError>(),
            Some(ChainError::ProviderFailure { hop: 1, .. })
        ));
        assert!(store.is_empty());
        assert!(service.recent_translations().is_empty());

        let metrics = service.metrics();
        assert_eq!(metrics.chains_failed, 1);
        assert_eq!(metrics.provider_failures, 1);
    }

    #[tokio::test]
    async fn test_metrics_count_hops() {
        let (service, _) = create_service(Arc::new(AppendCode));

        service
            .translate(request("hello", sequence(&["French", "German"]), false))
            .await
            .unwrap();

        let metrics = service.metrics();
        assert_eq!(metrics.chains_started, 1);
        assert_eq!(metrics.chains_completed, 1);
        assert_eq!(metrics.hops_completed, 3);
    }

    #[test]
    fn test_supported_lang_names() {
        let (service, _) = create_service(Arc::new(AppendCode));
        assert_eq!(
            service.supported_lang_names(),
            &["Chinese", "English", "French", "German", "Spanish"]
        );
    }

    #[test]
    fn test_invalid_capacity_rejected() {
        let mut config = create_test_config();
        config.recent_capacity = 1;

        let result = TranslateService::new(
            &config,
            Arc::new(sample_catalog()),
            Arc::new(AppendCode),
            Arc::new(InMemoryStore::new()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_response_serialization() {
        let response = TranslateResponse {
            results: tokio_test::block_on(
                ChainOrchestrator::new(&sample_catalog(), &AppendCode)
                    .run_explicit_sequence("hi", &[]),
            )
            .unwrap(),
            translation_id: None,
        };

        let json = serde_json::to_value(&response).expect("Should serialize");
        assert!(json["translationId"].is_null());
        assert_eq!(json["results"][1]["text"], "hi-en");
    }
}
