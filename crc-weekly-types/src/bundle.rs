//! Series bundles - the plot-ready output of one transformation pass.

use alloc::string::String;
use alloc::vec::Vec;

use crate::{Axis, Layout};

/// How a trace is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TraceMode {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "lines+markers"))]
    LinesAndMarkers,
    #[cfg_attr(feature = "serde", serde(rename = "lines"))]
    Lines,
}

/// Which y axis a trace is plotted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum YAxis {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "y"))]
    Primary,
    #[cfg_attr(feature = "serde", serde(rename = "y2"))]
    Secondary,
}

/// A single named line on a chart.
///
/// `x` holds display labels (one per period) and `y` the matching values.
/// Both always have the same length. A `NaN` in `y` marks a value that could
/// not be computed for that period (e.g. a zero denominator).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trace {
    pub name: String,
    pub x: Vec<String>,
    #[cfg_attr(feature = "serde", serde(with = "nullable"))]
    pub y: Vec<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: TraceMode,
    #[cfg_attr(feature = "serde", serde(default))]
    pub y_axis: YAxis,
}

impl Trace {
    /// Create a lines-and-markers trace on the primary axis.
    ///
    /// Extra labels or values beyond the shorter of the two inputs are dropped.
    pub fn new(name: impl Into<String>, mut x: Vec<String>, mut y: Vec<f64>) -> Self {
        let len = x.len().min(y.len());
        x.truncate(len);
        y.truncate(len);
        Self {
            name: name.into(),
            x,
            y,
            mode: TraceMode::default(),
            y_axis: YAxis::default(),
        }
    }

    /// Plot this trace against the secondary (right-hand) axis.
    pub fn on_secondary_axis(mut self) -> Self {
        self.y_axis = YAxis::Secondary;
        self
    }

    pub fn mode(mut self, mode: TraceMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Iterate `(label, value)` pairs in display order.
    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> {
        self.x.iter().map(String::as_str).zip(self.y.iter().copied())
    }

    /// Largest finite value, if any.
    pub fn max(&self) -> Option<f64> {
        self.y
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }
}

/// Everything a renderer needs to draw one chart panel.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeriesBundle {
    pub title: String,
    pub layout: Layout,
    pub traces: Vec<Trace>,
}

impl SeriesBundle {
    pub fn builder(title: impl Into<String>) -> SeriesBundleBuilder {
        SeriesBundleBuilder::new(title)
    }

    /// Look up a trace by name.
    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.name == name)
    }

    /// Date labels of the first (full-length) trace.
    pub fn labels(&self) -> &[String] {
        self.traces
            .first()
            .map(|t| t.x.as_slice())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.iter().all(Trace::is_empty)
    }
}

/// Builder for [`SeriesBundle`].
#[derive(Debug)]
pub struct SeriesBundleBuilder {
    title: String,
    layout: Layout,
    traces: Vec<Trace>,
}

impl SeriesBundleBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            layout: Layout::default(),
            traces: Vec::new(),
        }
    }

    pub fn x_axis(mut self, axis: Axis) -> Self {
        self.layout.x_axis = axis;
        self
    }

    pub fn y_axis(mut self, axis: Axis) -> Self {
        self.layout.y_axis = axis;
        self
    }

    pub fn y2_axis(mut self, axis: Axis) -> Self {
        self.layout.y2_axis = Some(axis);
        self
    }

    pub fn trace(mut self, trace: Trace) -> Self {
        self.traces.push(trace);
        self
    }

    pub fn traces(mut self, traces: impl IntoIterator<Item = Trace>) -> Self {
        self.traces.extend(traces);
        self
    }

    pub fn build(self) -> SeriesBundle {
        SeriesBundle {
            title: self.title,
            layout: self.layout,
            traces: self.traces,
        }
    }
}

// Non-finite values are written as `null` and read back as NaN.
#[cfg(feature = "serde")]
mod nullable {
    use alloc::vec::Vec;

    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            if value.is_finite() {
                seq.serialize_element(value)?;
            } else {
                seq.serialize_element(&Option::<f64>::None)?;
            }
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let values = Vec::<Option<f64>>::deserialize(deserializer)?;
        Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}
