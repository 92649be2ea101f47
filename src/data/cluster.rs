//! Per-cluster utilization panel.
//!
//! Reads either layout of the `statistics` collection:
//!
//! - nested: one document per week with a sub-record per cluster
//!   (`{"end_date": .., "gpu": {"mean_alloc": .., "mean_total": .., "unique_users": ..}}`)
//! - flat: one document per cluster per week with a precomputed percentage
//!   (`{"end_date": .., "cluster": "gpu", "allocated": .., "down": .., ..}`)

use crc_weekly_types::{Axis, SeriesBundle, Trace};

use super::family::Cluster;
use super::periods::chronological;
use super::rolling::{aligned_tail, percent, rolling_mean};
use super::{fields, TransformConfig, X_AXIS_TITLE};
use crate::error::TransformError;
use crate::source::Document;

/// Headroom added above the largest user count on the secondary axis.
const USERS_AXIS_HEADROOM: f64 = 5.0;

/// Build the utilization panel for one cluster.
pub fn transform(
    cluster: Cluster,
    docs: &[Document],
    config: &TransformConfig,
) -> Result<SeriesBundle, TransformError> {
    let relevant = docs
        .iter()
        .enumerate()
        .filter(|(_, doc)| cluster_stats(doc, cluster).is_some());
    let periods = chronological(relevant, |text| config.formats.parse(text))?;

    let stats: Vec<&Document> = periods
        .iter()
        .filter_map(|p| cluster_stats(p.doc, cluster))
        .collect();
    let labels: Vec<String> = periods.iter().map(|p| config.formats.format(&p.end)).collect();

    let allocated: Vec<f64> = stats.iter().map(|s| percent_allocated(s)).collect();
    let users: Vec<f64> = stats.iter().map(|s| fields::number_or_nan(s, "unique_users")).collect();

    let window = config.rolling_window;
    let rolling = Trace::new(
        format!("rolling avg. ({} week)", window),
        aligned_tail(&labels, window).to_vec(),
        rolling_mean(&allocated, window),
    );

    let users_trace = Trace::new("unique users", labels.clone(), users).on_secondary_axis();
    let mut y2_axis = Axis::new("Number");
    if let Some(max) = users_trace.max() {
        y2_axis = y2_axis.range(0.0, max + USERS_AXIS_HEADROOM);
    }

    let mut traces = vec![Trace::new("used", labels.clone(), allocated)];
    if let Some(down) = optional_column(&stats, "down") {
        traces.push(Trace::new("down", labels.clone(), down));
    }
    traces.push(users_trace);
    if let Some(wait) = optional_column(&stats, "wait_time") {
        traces.push(Trace::new("wait time (hrs)", labels.clone(), wait).on_secondary_axis());
    }
    traces.push(rolling);

    Ok(SeriesBundle::builder(cluster.name())
        .x_axis(Axis::new(X_AXIS_TITLE).tick_angle(45))
        .y_axis(Axis::new("Percent").tick_suffix("%").range(0.0, 100.0))
        .y2_axis(y2_axis)
        .traces(traces)
        .build())
}

/// The part of `doc` describing `cluster`, if `doc` covers it at all.
fn cluster_stats<'a>(doc: &'a Document, cluster: Cluster) -> Option<&'a Document> {
    if let Some(sub) = fields::sub_record(doc, cluster.name()) {
        return Some(sub);
    }
    (fields::text(doc, "cluster") == Some(cluster.name())).then_some(doc)
}

fn percent_allocated(stats: &Document) -> f64 {
    if stats.contains_key("mean_alloc") || stats.contains_key("mean_total") {
        percent(
            fields::number(stats, "mean_alloc"),
            fields::number(stats, "mean_total"),
        )
    } else {
        fields::number_or_nan(stats, "allocated")
    }
}

/// A column that only some collections carry; `None` if no period has it.
fn optional_column(stats: &[&Document], field: &str) -> Option<Vec<f64>> {
    stats
        .iter()
        .any(|s| fields::number(s, field).is_some())
        .then(|| stats.iter().map(|s| fields::number_or_nan(s, field)).collect())
}
