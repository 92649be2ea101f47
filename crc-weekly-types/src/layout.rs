//! Axis and layout descriptions for a chart panel.

use alloc::string::String;

/// One chart axis.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Axis {
    pub title: String,

    /// Suffix appended to tick labels (e.g. `%`).
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub tick_suffix: Option<String>,

    /// Tick label rotation in degrees.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub tick_angle: Option<i32>,

    /// Fixed `[low, high]` range. Renderers autoscale when absent.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub range: Option<[f64; 2]>,
}

impl Axis {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn tick_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.tick_suffix = Some(suffix.into());
        self
    }

    pub fn tick_angle(mut self, degrees: i32) -> Self {
        self.tick_angle = Some(degrees);
        self
    }

    pub fn range(mut self, low: f64, high: f64) -> Self {
        self.range = Some([low, high]);
        self
    }
}

/// Axes of a single panel.
///
/// `y2_axis` is drawn on the right, overlaying the primary y axis. Traces opt in
/// to it with [`YAxis::Secondary`](crate::YAxis::Secondary).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layout {
    pub x_axis: Axis,
    pub y_axis: Axis,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub y2_axis: Option<Axis>,
}
