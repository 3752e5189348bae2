//! Stub providers and fixtures shared by unit tests.

use crate::catalog::LanguageCatalog;
use crate::error::ProviderError;
use crate::provider::TranslationProvider;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// English, French, German, Spanish, Chinese.
pub fn sample_catalog() -> LanguageCatalog {
    LanguageCatalog::from_langs([
        ("en", "English"),
        ("fr", "French"),
        ("de", "German"),
        ("es", "Spanish"),
        ("zh", "Chinese"),
    ])
}

/// `translate(t, _, to) = t + "-" + to`
pub struct AppendCode;

#[async_trait]
impl TranslationProvider for AppendCode {
    async fn translate(
        &self,
        text: &str,
        _from_code: &str,
        to_code: &str,
    ) -> Result<String, ProviderError> {
        Ok(format!("{}-{}", text, to_code))
    }

    fn name(&self) -> &'static str {
        "append-code"
    }
}

/// Behaves like [`AppendCode`] except that the call with the given
/// zero-based index fails with a 503.
pub struct FailOnCall {
    fail_at: usize,
    calls: AtomicUsize,
}

impl FailOnCall {
    pub fn new(fail_at: usize) -> Self {
        Self {
            fail_at,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationProvider for FailOnCall {
    async fn translate(
        &self,
        text: &str,
        _from_code: &str,
        to_code: &str,
    ) -> Result<String, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == self.fail_at {
            return Err(ProviderError::Api {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }
        Ok(format!("{}-{}", text, to_code))
    }

    fn name(&self) -> &'static str {
        "fail-on-call"
    }
}

/// Sleeps before answering like [`AppendCode`].
pub struct Slow(pub Duration);

#[async_trait]
impl TranslationProvider for Slow {
    async fn translate(
        &self,
        text: &str,
        _from_code: &str,
        to_code: &str,
    ) -> Result<String, ProviderError> {
        tokio::time::sleep(self.0).await;
        Ok(format!("{}-{}", text, to_code))
    }

    fn name(&self) -> &'static str {
        "slow"
    }
}
