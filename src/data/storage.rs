//! Storage panel: raw capacity columns for each storage pool.

use crc_weekly_types::{Axis, SeriesBundle, Trace};

use super::periods::chronological;
use super::{fields, TransformConfig, X_AXIS_TITLE};
use crate::error::TransformError;
use crate::source::Document;

/// Per-pool columns as `(field suffix, trace label, on percent axis)`.
/// A pool named `zfs` reads `zfs_used`, `zfs_total`, ...
static POOL_COLUMNS: [(&str, &str, bool); 5] = [
    ("used", "used (TB)", false),
    ("total", "total (TB)", false),
    ("committed", "committed (TB)", false),
    ("used_percent", "used (%)", true),
    ("committed_percent", "committed (%)", true),
];

/// Build the storage panel.
///
/// Periods ending on or before the cutoff are dropped; every remaining
/// column is plotted as stored.
pub fn transform(docs: &[Document], config: &TransformConfig) -> Result<SeriesBundle, TransformError> {
    let periods: Vec<_> = chronological(docs.iter().enumerate(), |text| config.formats.parse_end_date(text))?
        .into_iter()
        .filter(|p| p.end.date() > config.storage_cutoff)
        .collect();

    let labels: Vec<String> = periods.iter().map(|p| config.formats.format(&p.end)).collect();

    let traces = config.storage_pools.iter().flat_map(|pool| {
        let labels = &labels;
        let periods = &periods;
        POOL_COLUMNS.iter().map(move |(suffix, label, percent_axis)| {
            let field = format!("{}_{}", pool, suffix);
            let values = periods
                .iter()
                .map(|p| fields::number_or_nan(p.doc, &field))
                .collect();
            let trace = Trace::new(format!("{} {}", pool, label), labels.clone(), values);
            if *percent_axis {
                trace.on_secondary_axis()
            } else {
                trace
            }
        })
    });

    Ok(SeriesBundle::builder("Storage")
        .x_axis(Axis::new(X_AXIS_TITLE).tick_angle(45))
        .y_axis(Axis::new("Capacity (TB)"))
        .y2_axis(Axis::new("Percent").tick_suffix("%").range(0.0, 100.0))
        .traces(traces)
        .build())
}
