use serde::Serialize;

use crate::core::pricing::cache::{epoch_now, PriceCache, PriceCacheRecord};
use crate::core::pricing::fallback;
use crate::core::pricing::fetcher::{self, PriceTable};
use crate::core::usage::bucket::RateQuad;

/// Where the live price table for this run came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingSource {
    FreshCache,
    Fetched,
    StaleCache,
    Fallback,
}

impl PricingSource {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::FreshCache => "cache (fresh)",
            Self::Fetched => "live (litellm)",
            Self::StaleCache => "cache (stale)",
            Self::Fallback => "fallback (builtin)",
        }
    }
}

/// Maps model names to rates, constructed once per run.
///
/// `resolve` is total: an unknown model prices at generic default rates
/// rather than failing the report.
#[derive(Debug, Clone)]
pub struct PricingResolver {
    table: Option<PriceTable>,
    source: PricingSource,
}

impl PricingResolver {
    /// Cache-then-network initialization. A fresh cache skips the fetch;
    /// a failed fetch degrades to the stale cache, then to the builtin
    /// fallback table.
    pub async fn initialize(cache: &PriceCache) -> Self {
        Self::init_inner(cache, false).await
    }

    /// Like `initialize`, but refetches even when the cache is fresh.
    pub async fn refresh(cache: &PriceCache) -> Self {
        Self::init_inner(cache, true).await
    }

    async fn init_inner(cache: &PriceCache, force_refresh: bool) -> Self {
        let now = epoch_now();
        let cached = cache.load();

        if !force_refresh {
            if let Some(record) = &cached {
                if record.is_fresh(now) {
                    return Self::from_table(record.pricing.clone(), PricingSource::FreshCache);
                }
            }
        }

        let fetched = fetcher::fetch().await;
        if let Some(table) = &fetched {
            cache.store(table, now);
        }
        Self::from_outcome(cached, fetched)
    }

    /// Resolver state after a refresh attempt.
    fn from_outcome(cached: Option<PriceCacheRecord>, fetched: Option<PriceTable>) -> Self {
        match (fetched, cached) {
            (Some(table), _) => Self::from_table(table, PricingSource::Fetched),
            (None, Some(record)) => Self::from_table(record.pricing, PricingSource::StaleCache),
            (None, None) => Self::offline(),
        }
    }

    /// Resolver with no live table and no I/O.
    pub fn offline() -> Self {
        Self {
            table: None,
            source: PricingSource::Fallback,
        }
    }

    /// Resolver over a fixed table.
    pub fn from_table(table: PriceTable, source: PricingSource) -> Self {
        Self {
            table: Some(table),
            source,
        }
    }

    pub fn source(&self) -> PricingSource {
        self.source
    }

    /// Rates for a model name.
    ///
    /// Live table: exact match, then the longest key sharing a prefix
    /// relation with the name in either direction (ties broken by
    /// lexicographic order). Otherwise the builtin fallback table, then
    /// generic default rates.
    pub fn resolve(&self, model: &str) -> RateQuad {
        let m = model.to_lowercase();

        if let Some(table) = &self.table {
            if let Some(rates) = table.get(&m) {
                return *rates;
            }
            let best = table
                .keys()
                .filter(|k| m.starts_with(k.as_str()) || k.starts_with(&m))
                .max_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
            if let Some(key) = best {
                return table[key];
            }
        }

        fallback::lookup(&m).unwrap_or(fallback::DEFAULT_RATES)
    }
}
