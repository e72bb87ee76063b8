use anyhow::Result;
use chrono::{Duration, Local};
use serde::Serialize;

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::core::config::AppConfig;
use crate::core::pricing::cache::PriceCache;
use crate::core::pricing::resolver::{PricingResolver, PricingSource};
use crate::core::usage::aggregate::MonthlyAggregate;
use crate::core::usage::aggregator::UsageAggregator;
use crate::core::usage::reader;
use crate::core::usage::rollup::{self, WindowAggregate};

#[derive(Serialize)]
struct ReportPayload<'a> {
    pricing: PricingSource,
    monthly: &'a MonthlyAggregate,
    window: &'a WindowAggregate,
}

pub async fn run(
    days: Option<u32>,
    offline: bool,
    refresh: bool,
    opts: &OutputOptions,
) -> Result<()> {
    let config = AppConfig::load().unwrap_or_default();
    let days = days.unwrap_or(config.report.window_days);

    let cache = PriceCache::at_default_path();
    let resolver = if offline {
        PricingResolver::offline()
    } else if refresh {
        PricingResolver::refresh(&cache).await
    } else {
        PricingResolver::initialize(&cache).await
    };

    let files = reader::discover_session_files(&config.logs.roots);
    let entries = reader::read_entries(&files);

    let aggregator = UsageAggregator::new(&resolver);
    let daily = aggregator.ingest(entries);

    if daily.is_empty() && matches!(opts.format, OutputFormat::Text) {
        eprintln!("No session logs found under the configured roots.");
    }

    let monthly = rollup::rollup_monthly(&daily);
    let today = Local::now().date_naive();
    let start = today - Duration::days(days as i64);
    let window = rollup::window(&daily, start, today);

    match opts.format {
        OutputFormat::Json => {
            let payload = ReportPayload {
                pricing: resolver.source(),
                monthly: &monthly,
                window: &window,
            };
            let json = if opts.pretty {
                serde_json::to_string_pretty(&payload)?
            } else {
                serde_json::to_string(&payload)?
            };
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!(
                "{}",
                renderer::render_report(&monthly, &window, resolver.source(), opts.use_color)
            );
        }
    }

    Ok(())
}
