use chrono::TimeZone;

use crate::core::pricing::resolver::PricingResolver;
use crate::core::usage::aggregate::DailyAggregate;
use crate::core::usage::bucket::TokenBucket;
use crate::core::usage::reader::{RawEntry, Timestamp};

/// Model label applied to entries that carry usage but no model name.
pub const UNKNOWN_MODEL: &str = "unknown";

/// Folds raw entries into per-day buckets, pricing each record through
/// the resolver as it goes.
pub struct UsageAggregator<'a> {
    resolver: &'a PricingResolver,
}

impl<'a> UsageAggregator<'a> {
    pub fn new(resolver: &'a PricingResolver) -> Self {
        Self { resolver }
    }

    /// Streaming fold. Entries missing a usage payload or timestamp are
    /// skipped; accumulation is field-wise addition, so the result does
    /// not depend on input order.
    pub fn ingest<I>(&self, entries: I) -> DailyAggregate
    where
        I: IntoIterator<Item = RawEntry>,
    {
        let mut daily = DailyAggregate::default();

        for entry in entries {
            let Some(usage) = entry.usage else { continue };
            let Some(ts) = entry.timestamp else { continue };
            let Some(date) = day_key(&ts) else { continue };

            let model = entry.model.unwrap_or_else(|| UNKNOWN_MODEL.to_string());
            let tokens = TokenBucket {
                input: usage.input_tokens,
                output: usage.output_tokens,
                cache_read: usage.cache_read_input_tokens,
                cache_create: usage.cache_creation_input_tokens,
            };

            let cost = self.resolver.resolve(&model).cost_of(&tokens);
            daily.accumulate(&date, &model, &tokens, &cost);
        }

        daily
    }
}

/// Normalize a timestamp to a `YYYY-MM-DD` key.
///
/// Numeric values past 1e12 are millisecond epochs; numeric values convert
/// via the local-time calendar day. Text values are truncated to their ISO
/// date prefix.
pub(crate) fn day_key(ts: &Timestamp) -> Option<String> {
    match ts {
        Timestamp::Numeric(value) => {
            let mut secs = *value;
            if secs > 1e12 {
                secs /= 1000.0;
            }
            chrono::Local
                .timestamp_opt(secs as i64, 0)
                .single()
                .map(|dt| dt.format("%Y-%m-%d").to_string())
        }
        Timestamp::Text(text) => Some(text.chars().take(10).collect()),
    }
}
