use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

/// One cell of the activity heatmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatmapDay {
    /// ISO calendar date, e.g. "2025-03-14".
    pub date: String,
    pub count: u64,
}

pub const HEATMAP_DAYS: i64 = 365;

/// Fold transaction timestamps into a daily-count series for the trailing
/// year ending on `today`: exactly 365 entries, oldest first, missing days 0.
/// Timestamps outside the window are ignored.
pub fn build_heatmap(timestamps: &[DateTime<Utc>], today: NaiveDate) -> Vec<HeatmapDay> {
    let mut counts: HashMap<NaiveDate, u64> = HashMap::new();
    for ts in timestamps {
        *counts.entry(ts.date_naive()).or_default() += 1;
    }

    (0..HEATMAP_DAYS)
        .map(|offset| {
            let date = today - Duration::days(HEATMAP_DAYS - 1 - offset);
            HeatmapDay {
                date: date.format("%Y-%m-%d").to_string(),
                count: counts.get(&date).copied().unwrap_or(0),
            }
        })
        .collect()
}
