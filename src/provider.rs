use crate::error::ProviderError;
use async_trait::async_trait;

/// A machine-translation backend.
///
/// Retry policy, if any, belongs to the implementation. Callers make exactly
/// one `translate` call per hop.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate `text` from the language `from_code` to `to_code`.
    async fn translate(
        &self,
        text: &str,
        from_code: &str,
        to_code: &str,
    ) -> Result<String, ProviderError>;

    /// Short provider name for logs.
    fn name(&self) -> &'static str;
}
