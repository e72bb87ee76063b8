use chrono::NaiveDate;
use serde::Serialize;

use crate::core::usage::aggregate::{Aggregate, DailyAggregate, MonthlyAggregate};

/// Inclusive date-range view over the daily aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct WindowAggregate {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Aggregate,
}

/// Group days into calendar months by their `YYYY-MM` prefix and merge
/// all three maps field-wise. Pure reduction: no re-pricing, no raw
/// records.
pub fn rollup_monthly(daily: &DailyAggregate) -> MonthlyAggregate {
    let mut monthly = MonthlyAggregate::default();

    for (day, tokens) in &daily.totals {
        monthly
            .totals
            .entry(month_key(day))
            .or_default()
            .merge(tokens);
    }
    for (day, models) in &daily.per_model {
        let month = monthly.per_model.entry(month_key(day)).or_default();
        for (model, tokens) in models {
            month.entry(model.clone()).or_default().merge(tokens);
        }
    }
    for (day, cost) in &daily.costs {
        monthly.costs.entry(month_key(day)).or_default().merge(cost);
    }

    monthly
}

/// Days whose date falls within `[start, end]`. Keys that do not parse as
/// dates are excluded.
pub fn window(daily: &DailyAggregate, start: NaiveDate, end: NaiveDate) -> WindowAggregate {
    let mut days = Aggregate::default();

    for (day, tokens) in &daily.totals {
        let Ok(date) = NaiveDate::parse_from_str(day, "%Y-%m-%d") else {
            continue;
        };
        if date < start || date > end {
            continue;
        }
        days.totals.insert(day.clone(), *tokens);
        if let Some(models) = daily.per_model.get(day) {
            days.per_model.insert(day.clone(), models.clone());
        }
        if let Some(cost) = daily.costs.get(day) {
            days.costs.insert(day.clone(), *cost);
        }
    }

    WindowAggregate { start, end, days }
}

fn month_key(day: &str) -> String {
    day.chars().take(7).collect()
}
