//! Service-unit panel: capacity vs. consumption summed across clusters.

use crc_weekly_types::{Axis, SeriesBundle, Trace};

use super::family::Cluster;
use super::periods::chronological;
use super::{fields, TransformConfig, X_AXIS_TITLE};
use crate::error::TransformError;
use crate::source::Document;

pub const THEORETICAL_MAX: &str = "theoretical_max_sus";
pub const CONSUMED: &str = "consumed_sus";

/// Pre-aggregated columns passed through as `(field, trace name)`, in plot order.
static FLAT_COLUMNS: [(&str, &str); 3] = [
    ("sus_per_year", "Total SUs / year * 0.85"),
    ("alloc_sus", "Currently Allocated"),
    ("used_sus", "Used SUs"),
];

/// Build the service-unit panel.
///
/// Periods ending on or before the cutoff are dropped, as are documents whose
/// sentinel field is an empty string (partially ingested weeks).
///
/// Per-cluster sub-records are summed into the capacity and consumption
/// traces. Pre-aggregated yearly, allocated and used columns are plotted as
/// stored when any period carries them.
pub fn transform(docs: &[Document], config: &TransformConfig) -> Result<SeriesBundle, TransformError> {
    let complete = docs
        .iter()
        .enumerate()
        .filter(|(_, doc)| !fields::is_blank(doc, &config.sentinel_field));
    let periods: Vec<_> = chronological(complete, |text| config.formats.parse_end_date(text))?
        .into_iter()
        .filter(|p| p.end.date() > config.sus_cutoff)
        .collect();

    let labels: Vec<String> = periods.iter().map(|p| config.formats.format(&p.end)).collect();

    let nested = periods.iter().any(|p| has_cluster_records(p.doc));
    let flat: Vec<(&str, &str)> = FLAT_COLUMNS
        .iter()
        .copied()
        .filter(|(field, _)| periods.iter().any(|p| fields::number(p.doc, field).is_some()))
        .collect();

    let mut traces = Vec::new();
    if nested || flat.is_empty() {
        let theoretical = periods.iter().map(|p| sum_over_clusters(p.doc, THEORETICAL_MAX)).collect();
        let consumed = periods.iter().map(|p| sum_over_clusters(p.doc, CONSUMED)).collect();
        traces.push(Trace::new("Theoretical max SUs", labels.clone(), theoretical));
        traces.push(Trace::new("Consumed SUs", labels.clone(), consumed));
    }
    for (field, name) in flat {
        let values = periods.iter().map(|p| fields::number_or_nan(p.doc, field)).collect();
        traces.push(Trace::new(name, labels.clone(), values));
    }

    Ok(SeriesBundle::builder("Service Units")
        .x_axis(Axis::new(X_AXIS_TITLE).tick_angle(45))
        .y_axis(Axis::new("Number"))
        .traces(traces)
        .build())
}

fn has_cluster_records(doc: &Document) -> bool {
    Cluster::ALL
        .iter()
        .any(|cluster| fields::sub_record(doc, cluster.name()).is_some())
}

/// Sum `field` over every cluster sub-record. A missing cluster or field
/// makes the total `NaN`.
pub fn sum_over_clusters(doc: &Document, field: &str) -> f64 {
    Cluster::ALL
        .iter()
        .map(|cluster| {
            fields::sub_record(doc, cluster.name())
                .map_or(f64::NAN, |sub| fields::number_or_nan(sub, field))
        })
        .sum()
}
