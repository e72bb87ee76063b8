use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::core::usage::bucket::RateQuad;

/// Lowercased model id -> per-million rates. Replaced wholesale on refresh.
pub type PriceTable = HashMap<String, RateQuad>;

/// LiteLLM's public model cost database.
pub const PRICE_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/BerriAI/litellm/main/model_prices_and_context_window.json";

const FETCH_TIMEOUT_SECS: u64 = 8;
const MODEL_FAMILY: &str = "claude";

#[derive(Deserialize)]
struct ModelCostEntry {
    input_cost_per_token: Option<f64>,
    output_cost_per_token: Option<f64>,
    cache_read_input_token_cost: Option<f64>,
    cache_creation_input_token_cost: Option<f64>,
}

/// Fetch the current price table from the remote source.
///
/// Returns `None` on any network, timeout, or decode error, and also when
/// the document decoded but contained no qualifying entries.
pub async fn fetch() -> Option<PriceTable> {
    fetch_from(PRICE_SOURCE_URL).await
}

async fn fetch_from(url: &str) -> Option<PriceTable> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .ok()?;

    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await
        .ok()?;

    if !response.status().is_success() {
        return None;
    }

    let raw: HashMap<String, serde_json::Value> = response.json().await.ok()?;
    build_table(&raw)
}

/// Reduce the raw cost document to per-million rates for the model family.
///
/// Entries with neither an input nor an output price are unpriced model
/// classes (embeddings, audio) and are discarded.
fn build_table(raw: &HashMap<String, serde_json::Value>) -> Option<PriceTable> {
    let mut table = PriceTable::new();

    for (model_id, value) in raw {
        let id = model_id.to_lowercase();
        if !id.contains(MODEL_FAMILY) {
            continue;
        }

        let entry: ModelCostEntry = match serde_json::from_value(value.clone()) {
            Ok(e) => e,
            Err(_) => continue,
        };

        let input = entry.input_cost_per_token.unwrap_or(0.0);
        let output = entry.output_cost_per_token.unwrap_or(0.0);
        if input <= 0.0 && output <= 0.0 {
            continue;
        }

        let cache_read = entry.cache_read_input_token_cost.unwrap_or(0.0);
        let cache_create = entry.cache_creation_input_token_cost.unwrap_or(0.0);

        table.insert(
            id,
            RateQuad {
                input: input * 1e6,
                output: output * 1e6,
                cache_read: cache_read * 1e6,
                cache_create: cache_create * 1e6,
            },
        );
    }

    if table.is_empty() {
        None
    } else {
        Some(table)
    }
}
