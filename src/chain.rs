//! Translation chains: route selection and sequential hop execution.
//!
//! A chain starts in the origin language, visits each language of the route in
//! order and finishes with one more hop back to the origin. Each hop's input is
//! the previous hop's output, so hops never run concurrently.

use crate::catalog::{LanguageCatalog, ORIGIN_CODE, ORIGIN_NAME};
use crate::error::{ChainError, ProviderError};
use crate::provider::TranslationProvider;
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// The text as it exists immediately after arriving at `lang_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub lang_name: String,
    pub text: String,
}

impl Entry {
    pub fn new(lang_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            lang_name: lang_name.into(),
            text: text.into(),
        }
    }
}

/// Ordered trace of a completed chain.
///
/// Always holds at least two entries; the first and last are in the origin
/// language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Chain {
    entries: Vec<Entry>,
}

impl Chain {
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of foreign languages visited.
    pub fn foreign_hops(&self) -> usize {
        self.entries.len() - 2
    }

    /// Number of provider calls the chain took.
    pub fn hops(&self) -> usize {
        self.entries.len() - 1
    }

    pub fn source_text(&self) -> &str {
        &self.entries[0].text
    }

    pub fn final_text(&self) -> &str {
        &self.entries[self.entries.len() - 1].text
    }
}

/// Longest route a single chain may take. Callers usually enforce a lower
/// bound of their own (see `MAX_HOPS`).
pub const MAX_ROUTE_LEN: usize = 10_000;

/// How the foreign languages of a chain are chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Policy {
    /// Exactly `n` random foreign languages, no language twice in a row.
    FixedCount(i64),
    /// Every foreign language once, in random order.
    FullPermutation,
    /// The given languages, in the given order.
    ExplicitSequence(Vec<String>),
}

/// Runs chains against a provider, resolving names through a catalog.
pub struct ChainOrchestrator<'a> {
    catalog: &'a LanguageCatalog,
    provider: &'a dyn TranslationProvider,
    hop_timeout: Option<Duration>,
}

impl<'a> ChainOrchestrator<'a> {
    pub fn new(catalog: &'a LanguageCatalog, provider: &'a dyn TranslationProvider) -> Self {
        Self {
            catalog,
            provider,
            hop_timeout: None,
        }
    }

    /// Abort the chain if any single provider call takes longer than `timeout`.
    pub fn with_hop_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.hop_timeout = timeout;
        self
    }

    /// Run the chain described by `policy`.
    pub async fn run<R>(
        &self,
        source_text: &str,
        policy: &Policy,
        rng: &mut R,
    ) -> Result<Chain, ChainError>
    where
        R: RandomSource + Send,
    {
        match policy {
            Policy::FixedCount(n) => self.run_fixed_count(source_text, *n, rng).await,
            Policy::FullPermutation => self.run_full_permutation(source_text, rng).await,
            Policy::ExplicitSequence(names) => {
                self.run_explicit_sequence(source_text, names).await
            }
        }
    }

    /// Translate through `n` random foreign languages, then back to the origin.
    pub async fn run_fixed_count<R>(
        &self,
        source_text: &str,
        n: i64,
        rng: &mut R,
    ) -> Result<Chain, ChainError>
    where
        R: RandomSource + Send,
    {
        let route = pick_fixed_count(self.catalog, n, rng)?;
        info!("Running fixed-count chain through {} languages", route.len());
        self.execute(source_text, &route).await
    }

    /// Translate through every foreign language once, in random order.
    pub async fn run_full_permutation<R>(
        &self,
        source_text: &str,
        rng: &mut R,
    ) -> Result<Chain, ChainError>
    where
        R: RandomSource + Send,
    {
        let route = pick_full_permutation(self.catalog, rng)?;
        info!("Running full-permutation chain through {} languages", route.len());
        self.execute(source_text, &route).await
    }

    /// Translate through `names` in order. No randomness.
    pub async fn run_explicit_sequence(
        &self,
        source_text: &str,
        names: &[String],
    ) -> Result<Chain, ChainError> {
        info!("Running explicit chain through {:?}", names);
        self.execute(source_text, names).await
    }

    async fn execute(&self, source_text: &str, route: &[String]) -> Result<Chain, ChainError> {
        // Resolve every code up front so an unknown name costs no provider calls
        let mut stops: Vec<(&str, &str)> = Vec::with_capacity(route.len() + 1);
        for name in route {
            stops.push((name.as_str(), self.catalog.code_of(name)?));
        }
        stops.push((ORIGIN_NAME, ORIGIN_CODE));

        let mut entries = Vec::with_capacity(stops.len() + 1);
        entries.push(Entry::new(ORIGIN_NAME, source_text));

        let mut current_text = source_text.to_string();
        let mut current_code = ORIGIN_CODE;

        for (hop, (name, code)) in stops.into_iter().enumerate() {
            debug!(
                "Hop {} via {}: {} -> {} ({})",
                hop,
                self.provider.name(),
                current_code,
                code,
                name
            );

            let next_text = self
                .translate_hop(&current_text, current_code, code)
                .await
                .map_err(|source| {
                    warn!(
                        "Chain aborted at hop {} ({} -> {}, {}): {}",
                        hop,
                        current_code,
                        code,
                        self.provider.name(),
                        source
                    );
                    ChainError::ProviderFailure {
                        hop,
                        from: current_code.to_string(),
                        to: code.to_string(),
                        source,
                    }
                })?;

            entries.push(Entry::new(name, next_text.clone()));
            current_text = next_text;
            current_code = code;
        }

        Ok(Chain { entries })
    }

    async fn translate_hop(
        &self,
        text: &str,
        from_code: &str,
        to_code: &str,
    ) -> Result<String, ProviderError> {
        let call = self.provider.translate(text, from_code, to_code);
        match self.hop_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ProviderError::Timeout(limit))?,
            None => call.await,
        }
    }
}

/// Draw `n` foreign names, rejecting the origin and the previous draw.
fn pick_fixed_count<R: RandomSource>(
    catalog: &LanguageCatalog,
    n: i64,
    rng: &mut R,
) -> Result<Vec<String>, ChainError> {
    if n < 0 {
        return Err(ChainError::InvalidArgument(format!(
            "hop count must be non-negative, got {}",
            n
        )));
    }

    let n = match usize::try_from(n) {
        Ok(n) if n <= MAX_ROUTE_LEN => n,
        _ => {
            return Err(ChainError::InvalidArgument(format!(
                "hop count {} exceeds the limit of {}",
                n, MAX_ROUTE_LEN
            )))
        }
    };

    // The sampler below only terminates if a valid draw exists at every step
    let foreign = catalog.foreign_count();
    if (n >= 1 && foreign == 0) || (n >= 2 && foreign < 2) {
        return Err(ChainError::InvalidArgument(format!(
            "{} hops need at least {} foreign languages, catalog has {}",
            n,
            n.min(2),
            foreign
        )));
    }

    let names = catalog.names();
    let mut route: Vec<String> = Vec::with_capacity(n);

    while route.len() < n {
        let candidate = &names[rng.uniform_int(0, names.len() - 1)?];
        let repeats_previous = route.last() == Some(candidate);
        if candidate != ORIGIN_NAME && !repeats_previous {
            route.push(candidate.clone());
        }
    }

    Ok(route)
}

fn pick_full_permutation<R: RandomSource>(
    catalog: &LanguageCatalog,
    rng: &mut R,
) -> Result<Vec<String>, ChainError> {
    let mut route = catalog.foreign_names();
    rng.shuffle(&mut route)?;
    Ok(route)
}
