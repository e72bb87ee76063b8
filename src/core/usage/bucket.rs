use serde::{Deserialize, Serialize};

/// Token counts for one accumulation key, split by kind.
///
/// The total is always derived from the four fields, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBucket {
    pub input: u64,
    pub output: u64,
    pub cache_read: u64,
    pub cache_create: u64,
}

impl TokenBucket {
    pub fn total(&self) -> u64 {
        self.input + self.output + self.cache_read + self.cache_create
    }

    pub fn merge(&mut self, other: &TokenBucket) {
        self.input += other.input;
        self.output += other.output;
        self.cache_read += other.cache_read;
        self.cache_create += other.cache_create;
    }
}

/// Dollar amounts mirroring the four token kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBucket {
    pub input: f64,
    pub output: f64,
    pub cache_read: f64,
    pub cache_create: f64,
}

impl CostBucket {
    pub fn total(&self) -> f64 {
        self.input + self.output + self.cache_read + self.cache_create
    }

    pub fn merge(&mut self, other: &CostBucket) {
        self.input += other.input;
        self.output += other.output;
        self.cache_read += other.cache_read;
        self.cache_create += other.cache_create;
    }
}

/// Per-model rates in dollars per one million tokens.
///
/// A zero rate means "no data for this kind", not "free". Serializes as the
/// 4-element array `[input, output, cache_read, cache_create]` used by the
/// on-disk price cache.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct RateQuad {
    pub input: f64,
    pub output: f64,
    pub cache_read: f64,
    pub cache_create: f64,
}

impl From<[f64; 4]> for RateQuad {
    fn from(v: [f64; 4]) -> Self {
        Self {
            input: v[0],
            output: v[1],
            cache_read: v[2],
            cache_create: v[3],
        }
    }
}

impl From<RateQuad> for [f64; 4] {
    fn from(r: RateQuad) -> Self {
        [r.input, r.output, r.cache_read, r.cache_create]
    }
}

impl RateQuad {
    /// Price a token bucket at these rates.
    pub fn cost_of(&self, tokens: &TokenBucket) -> CostBucket {
        CostBucket {
            input: tokens.input as f64 * self.input / 1e6,
            output: tokens.output as f64 * self.output / 1e6,
            cache_read: tokens.cache_read as f64 * self.cache_read / 1e6,
            cache_create: tokens.cache_create as f64 * self.cache_create / 1e6,
        }
    }
}
