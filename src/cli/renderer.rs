use colored::{control, Colorize};
use std::collections::BTreeMap;

use crate::core::formatter::{family_name, format_cost, format_count};
use crate::core::pricing::resolver::PricingSource;
use crate::core::usage::aggregate::{Aggregate, MonthlyAggregate};
use crate::core::usage::bucket::{CostBucket, TokenBucket};
use crate::core::usage::rollup::WindowAggregate;

const LABEL_WIDTH: usize = 12;
const COUNT_WIDTH: usize = 10;
const COST_WIDTH: usize = 8;
const RULE_WIDTH: usize = 138;

/// Render the full report: pricing source line, monthly table, recent-days
/// table, each with a trailing Sum row.
pub fn render_report(
    monthly: &MonthlyAggregate,
    window: &WindowAggregate,
    source: PricingSource,
    use_color: bool,
) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("pricing: {}", source.describe()));
    lines.push(String::new());

    lines.push("=== Monthly ===".bold().to_string());
    lines.push(String::new());
    render_section(&mut lines, monthly, "Month");

    let days = (window.end - window.start).num_days();
    lines.push(String::new());
    lines.push(
        format!(
            "=== Last {} days ({} ~ {}) ===",
            days, window.start, window.end
        )
        .bold()
        .to_string(),
    );
    lines.push(String::new());
    render_section(&mut lines, &window.days, "Date");

    lines.join("\n")
}

fn render_section(lines: &mut Vec<String>, agg: &Aggregate, label: &str) {
    lines.push(header_row(label).cyan().to_string());
    lines.push(rule());

    for (key, tokens) in &agg.totals {
        let cost = agg.costs.get(key).copied().unwrap_or_default();
        let models = agg.per_model.get(key);
        render_row(lines, key, tokens, &cost, models);
    }

    lines.push(rule());
    let sum_models = agg.merged_models();
    render_row(
        lines,
        "Sum",
        &agg.sum_totals(),
        &agg.sum_costs(),
        Some(&sum_models),
    );
}

fn header_row(label: &str) -> String {
    format!(
        "{:<lw$} {:>cw$} {:>dw$} {:>cw$} {:>dw$} {:>cw$} {:>dw$} {:>cw$} {:>dw$} {:>cw$} {:>dw$}  Model",
        label,
        "Input",
        "$",
        "Output",
        "$",
        "CacheRd",
        "$",
        "CacheCr",
        "$",
        "Total",
        "$Total",
        lw = LABEL_WIDTH,
        cw = COUNT_WIDTH,
        dw = COST_WIDTH,
    )
}

fn rule() -> String {
    "-".repeat(RULE_WIDTH).dimmed().to_string()
}

fn render_row(
    lines: &mut Vec<String>,
    label: &str,
    tokens: &TokenBucket,
    cost: &CostBucket,
    models: Option<&BTreeMap<String, TokenBucket>>,
) {
    let row = format!(
        "{:<lw$} {:>cw$} {:>dw$} {:>cw$} {:>dw$} {:>cw$} {:>dw$} {:>cw$} {:>dw$} {:>cw$} {:>dw$}",
        label,
        format_count(tokens.input),
        format_cost(cost.input),
        format_count(tokens.output),
        format_cost(cost.output),
        format_count(tokens.cache_read),
        format_cost(cost.cache_read),
        format_count(tokens.cache_create),
        format_cost(cost.cache_create),
        format_count(tokens.total()),
        format_cost(cost.total()),
        lw = LABEL_WIDTH,
        cw = COUNT_WIDTH,
        dw = COST_WIDTH,
    );

    let shares = models
        .map(|m| model_share_lines(m, tokens.total()))
        .unwrap_or_default();

    let first = shares.first().cloned().unwrap_or_default();
    lines.push(format!("{}  {}", row, first).trim_end().to_string());

    let pad = " ".repeat(row.len());
    for share in shares.iter().skip(1) {
        lines.push(format!("{}  {}", pad, share));
    }
}

/// Per-family token shares of a row, "family NN%", one per line.
///
/// Families are merged before computing shares so date-stamped variants of
/// one family collapse into a single line.
fn model_share_lines(models: &BTreeMap<String, TokenBucket>, total: u64) -> Vec<String> {
    if total == 0 {
        return Vec::new();
    }

    let mut by_family: BTreeMap<String, u64> = BTreeMap::new();
    for (model, bucket) in models {
        *by_family.entry(family_name(model)).or_default() += bucket.total();
    }

    by_family
        .into_iter()
        .map(|(family, count)| {
            let pct = count as f64 / total as f64 * 100.0;
            format!("{} {:.0}%", family, pct)
        })
        .collect()
}
