use crate::chain::Chain;
use crate::random::generate_translation_id;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTranslation {
    pub translation_id: String,
    pub results: Chain,
    pub created_at: DateTime<Utc>,
}

/// Durable home for public chains, addressed by an opaque id.
#[async_trait]
pub trait TranslationStore: Send + Sync {
    /// Store `chain` under a fresh id and return the id.
    async fn create(&self, chain: &Chain) -> Result<String>;

    /// Fetch a stored chain by id.
    async fn get(&self, translation_id: &str) -> Result<Option<StoredTranslation>>;
}

/// Process-local store. Contents are lost on exit.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    translations: Arc<Mutex<HashMap<String, StoredTranslation>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, StoredTranslation>> {
        self.translations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TranslationStore for InMemoryStore {
    async fn create(&self, chain: &Chain) -> Result<String> {
        let mut translations = self.lock();
        let mut rng = rand::thread_rng();

        // Regenerate until the id is unused
        let translation_id = loop {
            let candidate = generate_translation_id(&mut rng);
            if !translations.contains_key(&candidate) {
                break candidate;
            }
        };

        translations.insert(
            translation_id.clone(),
            StoredTranslation {
                translation_id: translation_id.clone(),
                results: chain.clone(),
                created_at: Utc::now(),
            },
        );
        debug!("Stored translation {}", translation_id);

        Ok(translation_id)
    }

    async fn get(&self, translation_id: &str) -> Result<Option<StoredTranslation>> {
        Ok(self.lock().get(translation_id).cloned())
    }
}
