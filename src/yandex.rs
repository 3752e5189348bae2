use crate::config::Config;
use crate::error::ProviderError;
use crate::provider::TranslationProvider;
use crate::retry::{with_retry_if, RetryConfig};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    text: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LangsResponse {
    langs: BTreeMap<String, String>,
}

/// Error body, e.g. `{"code": 401, "message": "API key is invalid"}`
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Yandex Translate v1.5 JSON API client.
#[derive(Clone)]
pub struct YandexTranslator {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    retry: RetryConfig,
}

impl YandexTranslator {
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        // Every request gets a deadline, so a silent server cannot stall startup
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            client,
            api_key: config.yandex_api_key.clone(),
            api_url: config.yandex_api_url.clone(),
            retry: RetryConfig::provider_call(),
        })
    }

    /// Replace the retry policy used for `translate` calls.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch the supported `{code -> name}` map with English display names.
    pub async fn fetch_supported_languages(
        &self,
        retry: &RetryConfig,
    ) -> Result<BTreeMap<String, String>, ProviderError> {
        let url = format!("{}/getLangs", self.api_url);

        let langs = with_retry_if(
            retry,
            "Fetching supported languages",
            || async {
                let response = self
                    .client
                    .get(&url)
                    .query(&[("ui", "en"), ("key", self.api_key.as_str())])
                    .send()
                    .await?;

                let body: LangsResponse = parse_response(response).await?;
                Ok::<_, ProviderError>(body.langs)
            },
            ProviderError::is_retryable,
        )
        .await?;

        info!("Fetched {} supported languages", langs.len());
        Ok(langs)
    }

    async fn translate_once(
        &self,
        url: &str,
        text: &str,
        lang: &str,
    ) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(url)
            .query(&[("key", self.api_key.as_str()), ("text", text), ("lang", lang)])
            .send()
            .await?;

        let body: TranslateResponse = parse_response(response).await?;

        body.text
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("response contained no text".to_string()))
    }
}

#[async_trait]
impl TranslationProvider for YandexTranslator {
    async fn translate(
        &self,
        text: &str,
        from_code: &str,
        to_code: &str,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/translate", self.api_url);
        let lang = format!("{}-{}", from_code, to_code);

        with_retry_if(
            &self.retry,
            &format!("Translation {}", lang),
            || self.translate_once(&url, text, &lang),
            ProviderError::is_retryable,
        )
        .await
    }

    fn name(&self) -> &'static str {
        "yandex"
    }
}

/// Turn non-2xx responses into `ProviderError::Api` and decode the rest.
async fn parse_response<T>(response: reqwest::Response) -> Result<T, ProviderError>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ProviderError::MalformedResponse(e.to_string()))
}
