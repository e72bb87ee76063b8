use crate::core::usage::bucket::RateQuad;

/// One builtin pricing entry, dollars per million tokens.
///
/// Cache rates are absent here: the builtin table only carries the published
/// input/output prices, so cache reads and writes price at zero on this path.
#[derive(Debug, Clone)]
pub struct FallbackEntry {
    pub prefix: &'static str,
    pub input: f64,
    pub output: f64,
}

/// Ordered most-specific/newest first; the first prefix match wins.
static FALLBACK_TABLE: &[FallbackEntry] = &[
    FallbackEntry { prefix: "claude-opus-4-6", input: 5.00, output: 25.00 },
    FallbackEntry { prefix: "claude-opus-4-5", input: 5.00, output: 25.00 },
    FallbackEntry { prefix: "claude-opus-4-1", input: 15.00, output: 75.00 },
    FallbackEntry { prefix: "claude-opus-4", input: 15.00, output: 75.00 },
    FallbackEntry { prefix: "claude-sonnet-4-6", input: 3.00, output: 15.00 },
    FallbackEntry { prefix: "claude-sonnet-4-5", input: 3.00, output: 15.00 },
    FallbackEntry { prefix: "claude-sonnet-4", input: 3.00, output: 15.00 },
    FallbackEntry { prefix: "claude-sonnet-3-7", input: 3.00, output: 15.00 },
    FallbackEntry { prefix: "claude-sonnet-3-5", input: 3.00, output: 15.00 },
    FallbackEntry { prefix: "claude-sonnet-3", input: 3.00, output: 15.00 },
    FallbackEntry { prefix: "claude-haiku-4-5", input: 1.00, output: 5.00 },
    FallbackEntry { prefix: "claude-haiku-4", input: 1.00, output: 5.00 },
    FallbackEntry { prefix: "claude-haiku-3-5", input: 0.80, output: 4.00 },
    FallbackEntry { prefix: "claude-haiku-3", input: 0.25, output: 1.25 },
];

/// Generic rates applied when a model matches nothing anywhere.
pub const DEFAULT_RATES: RateQuad = RateQuad {
    input: 3.00,
    output: 15.00,
    cache_read: 0.0,
    cache_create: 0.0,
};

/// Look up a lowercased model name against the builtin table.
pub fn lookup(model: &str) -> Option<RateQuad> {
    FALLBACK_TABLE
        .iter()
        .find(|e| model.starts_with(e.prefix))
        .map(|e| RateQuad {
            input: e.input,
            output: e.output,
            cache_read: 0.0,
            cache_create: 0.0,
        })
}
