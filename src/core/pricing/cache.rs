use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::pricing::fetcher::PriceTable;

const CACHE_TTL_SECS: u64 = 24 * 60 * 60;

/// On-disk price snapshot: `{"updated": <epoch secs>, "pricing": {model: [..;4]}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceCacheRecord {
    pub updated: u64,
    pub pricing: PriceTable,
}

impl PriceCacheRecord {
    pub fn is_fresh(&self, now: u64) -> bool {
        now.saturating_sub(self.updated) < CACHE_TTL_SECS
    }
}

/// Persisted price table with a freshness timestamp.
#[derive(Debug, Clone)]
pub struct PriceCache {
    path: PathBuf,
}

fn default_cache_path() -> PathBuf {
    let base = std::env::var("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("~"))
                .join(".cache")
        });
    base.join("ccl").join("pricing-cache.json")
}

pub fn epoch_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

impl PriceCache {
    pub fn at_default_path() -> Self {
        Self::at(default_cache_path())
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the persisted record. Any read or parse failure is a miss.
    pub fn load(&self) -> Option<PriceCacheRecord> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Persist the table stamped with `now`. Write failures are ignored;
    /// pricing stays best-effort.
    pub fn store(&self, table: &PriceTable, now: u64) {
        let record = PriceCacheRecord {
            updated: now,
            pricing: table.clone(),
        };
        let _ = self.write_record(&record);
    }

    /// Write to a sibling temp file, then rename over the target, so a
    /// concurrent reader never observes a torn table.
    fn write_record(&self, record: &PriceCacheRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create cache directory: {}", parent.display())
            })?;
        }
        let json = serde_json::to_string(record).context("Failed to serialize price cache")?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("Failed to write cache to {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to move cache into {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::usage::bucket::RateQuad;

    fn sample_table() -> PriceTable {
        let mut table = PriceTable::new();
        table.insert(
            "claude-sonnet-4-5".to_string(),
            RateQuad {
                input: 3.0,
                output: 15.0,
                cache_read: 0.3,
                cache_create: 3.75,
            },
        );
        table
    }

    #[test]
    fn store_then_load_roundtrip() {
        let dir = std::env::temp_dir().join("ccl_test_cache_roundtrip");
        let _ = std::fs::remove_dir_all(&dir);
        let cache = PriceCache::at(dir.join("pricing-cache.json"));

        cache.store(&sample_table(), 1_700_000_000);
        let record = cache.load().unwrap();
        assert_eq!(record.updated, 1_700_000_000);
        let rates = &record.pricing["claude-sonnet-4-5"];
        assert!((rates.output - 15.0).abs() < 1e-9);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn store_leaves_no_temp_file() {
        let dir = std::env::temp_dir().join("ccl_test_cache_tmpfile");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("pricing-cache.json");
        let cache = PriceCache::at(path.clone());

        cache.store(&sample_table(), 42);
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_missing_file_is_miss() {
        let cache = PriceCache::at(std::env::temp_dir().join("ccl_test_cache_missing.json"));
        assert!(cache.load().is_none());
    }

    #[test]
    fn load_corrupt_file_is_miss() {
        let dir = std::env::temp_dir().join("ccl_test_cache_corrupt");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("pricing-cache.json");
        std::fs::write(&path, "{not json").unwrap();

        let cache = PriceCache::at(path);
        assert!(cache.load().is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_parses_wire_format() {
        let dir = std::env::temp_dir().join("ccl_test_cache_wire");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("pricing-cache.json");
        std::fs::write(
            &path,
            r#"{"updated": 1700000000, "pricing": {"claude-haiku-3-5": [0.8, 4.0, 0.08, 1.0]}}"#,
        )
        .unwrap();

        let record = PriceCache::at(path).load().unwrap();
        let rates = &record.pricing["claude-haiku-3-5"];
        assert!((rates.input - 0.8).abs() < 1e-9);
        assert!((rates.cache_create - 1.0).abs() < 1e-9);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn freshness_window_is_24_hours() {
        let record = PriceCacheRecord {
            updated: 1_000_000,
            pricing: PriceTable::new(),
        };
        assert!(record.is_fresh(1_000_000));
        assert!(record.is_fresh(1_000_000 + CACHE_TTL_SECS - 1));
        assert!(!record.is_fresh(1_000_000 + CACHE_TTL_SECS));
    }

    #[test]
    fn clock_skew_counts_as_fresh() {
        let record = PriceCacheRecord {
            updated: 2_000_000,
            pricing: PriceTable::new(),
        };
        // A record stamped in the future must not underflow.
        assert!(record.is_fresh(1_000_000));
    }
}
