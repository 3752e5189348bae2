//! Translate text through a chain of languages and back to English,
//! recording every intermediate hop.

pub mod cache;
pub mod catalog;
pub mod chain;
pub mod config;
pub mod error;
pub mod metrics;
pub mod provider;
pub mod random;
pub mod retry;
pub mod service;
pub mod store;
pub mod yandex;

#[cfg(test)]
pub(crate) mod test_support;

pub use catalog::LanguageCatalog;
pub use chain::{Chain, ChainOrchestrator, Entry, Policy};
pub use error::{ChainError, ProviderError};
pub use provider::TranslationProvider;
