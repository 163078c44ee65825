//! Concurrent fan-out and result merging

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::timeout;

use shopsaver_config::constants::search;
use shopsaver_core::{AggregatedSearchResult, SearchCandidate, SearchSource};

/// Listing-name terms that mark a candidate as an accessory rather than the
/// product itself. Skipped when the query is explicitly about one of them.
const ACCESSORY_TERMS: &[&str] = &[
    "case",
    "cover",
    "sleeve",
    "charger",
    "cable",
    "battery",
    "power bank",
    "earbud tip",
    "stand",
    "holder",
    "screen protector",
    "film",
    "accessory",
    "adapter",
    "for ",
];

/// Queries every registered source concurrently and merges the results
pub struct PriceSearchAggregator {
    sources: Vec<Arc<dyn SearchSource>>,
    per_source_timeout: Duration,
    per_source_limit: usize,
}

impl PriceSearchAggregator {
    pub fn new(sources: Vec<Arc<dyn SearchSource>>) -> Self {
        Self {
            sources,
            per_source_timeout: Duration::from_secs(search::SOURCE_TIMEOUT_SECS),
            per_source_limit: search::DEFAULT_PER_SOURCE_LIMIT,
        }
    }

    pub fn with_timeout(mut self, per_source_timeout: Duration) -> Self {
        self.per_source_timeout = per_source_timeout;
        self
    }

    pub fn with_limit(mut self, per_source_limit: usize) -> Self {
        self.per_source_limit = per_source_limit;
        self
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Search all sources for a keyword.
    ///
    /// Sources run concurrently, each under its own timeout. Failures and
    /// timeouts are recorded by platform name and the rest of the results
    /// still come back; only every source failing yields an empty result.
    pub async fn search(&self, keyword: &str) -> AggregatedSearchResult {
        let total_sources = self.sources.len();
        let calls = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            let keyword = keyword.to_string();
            let limit = self.per_source_limit;
            let per_source_timeout = self.per_source_timeout;
            async move {
                let platform = source.platform().to_string();
                match timeout(per_source_timeout, source.search(&keyword, limit)).await {
                    Ok(Ok(candidates)) => (platform, Ok(candidates)),
                    Ok(Err(e)) => {
                        tracing::warn!(platform = %platform, error = %e, "Search source failed");
                        (platform, Err(()))
                    }
                    Err(_) => {
                        tracing::warn!(platform = %platform, "Search source timed out");
                        (platform, Err(()))
                    }
                }
            }
        });

        let mut candidates = Vec::new();
        let mut failed_sources = Vec::new();
        for (platform, outcome) in join_all(calls).await {
            match outcome {
                Ok(found) => candidates.extend(found),
                Err(()) => failed_sources.push(platform),
            }
        }

        let candidates = filter_accessories(keyword, candidates);
        let mut candidates = dedup_by_url(candidates);
        candidates.sort_by(|a, b| a.price.total_cmp(&b.price));
        candidates.truncate(self.per_source_limit);

        tracing::debug!(
            keyword,
            kept = candidates.len(),
            failed = failed_sources.len(),
            total_sources,
            "Aggregated search"
        );

        AggregatedSearchResult {
            candidates,
            failed_sources,
            total_sources,
        }
    }
}

/// Drop accessory listings unless the query itself asks for an accessory.
///
/// If filtering would remove every candidate, the unfiltered set is kept:
/// a weak match beats an empty answer.
fn filter_accessories(
    keyword: &str,
    candidates: Vec<SearchCandidate>,
) -> Vec<SearchCandidate> {
    let keyword_lower = keyword.to_lowercase();
    // "for " only marks accessories in listing names ("case for iPhone");
    // it is too common in queries to disable filtering on.
    if ACCESSORY_TERMS
        .iter()
        .filter(|term| **term != "for ")
        .any(|term| keyword_lower.contains(term))
    {
        return candidates;
    }

    let filtered: Vec<SearchCandidate> = candidates
        .iter()
        .filter(|c| {
            let name = c.name.to_lowercase();
            !ACCESSORY_TERMS.iter().any(|term| name.contains(term))
        })
        .cloned()
        .collect();

    if filtered.is_empty() {
        candidates
    } else {
        filtered
    }
}

/// Keep the first candidate per URL
fn dedup_by_url(candidates: Vec<SearchCandidate>) -> Vec<SearchCandidate> {
    let mut seen = std::collections::HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.url.clone()))
        .collect()
}
