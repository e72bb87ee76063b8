use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::usage::bucket::{CostBucket, TokenBucket};

/// Three co-indexed maps: per-key token totals, per-key-per-model token
/// totals, and per-key costs. The per-model buckets for a key always sum
/// to that key's total bucket, field-wise.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregate {
    pub totals: BTreeMap<String, TokenBucket>,
    pub per_model: BTreeMap<String, BTreeMap<String, TokenBucket>>,
    pub costs: BTreeMap<String, CostBucket>,
}

/// Buckets keyed by calendar day, `YYYY-MM-DD`.
pub type DailyAggregate = Aggregate;

/// Buckets keyed by calendar month, `YYYY-MM`.
pub type MonthlyAggregate = Aggregate;

impl Aggregate {
    /// Add one record's tokens and cost under `key` / `model`.
    pub fn accumulate(&mut self, key: &str, model: &str, tokens: &TokenBucket, cost: &CostBucket) {
        self.totals.entry(key.to_string()).or_default().merge(tokens);
        self.per_model
            .entry(key.to_string())
            .or_default()
            .entry(model.to_string())
            .or_default()
            .merge(tokens);
        self.costs.entry(key.to_string()).or_default().merge(cost);
    }

    /// Field-wise token sum over every key.
    pub fn sum_totals(&self) -> TokenBucket {
        let mut sum = TokenBucket::default();
        for bucket in self.totals.values() {
            sum.merge(bucket);
        }
        sum
    }

    /// Field-wise cost sum over every key.
    pub fn sum_costs(&self) -> CostBucket {
        let mut sum = CostBucket::default();
        for bucket in self.costs.values() {
            sum.merge(bucket);
        }
        sum
    }

    /// Per-model token buckets merged across every key.
    pub fn merged_models(&self) -> BTreeMap<String, TokenBucket> {
        let mut merged: BTreeMap<String, TokenBucket> = BTreeMap::new();
        for models in self.per_model.values() {
            for (model, bucket) in models {
                merged.entry(model.clone()).or_default().merge(bucket);
            }
        }
        merged
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}
