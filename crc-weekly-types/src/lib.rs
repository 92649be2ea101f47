//! # crc-weekly-types
//!
//! The plot-ready schema produced by the crc-weekly pipeline. A renderer only
//! needs these types to draw the weekly utilization dashboard; nothing here
//! knows how the numbers were fetched or computed.
//!
//! ## Features
//!
//! - `std` (default): Standard library support (timestamps)
//! - `serde`: JSON serialization via serde. Non-finite values are written as
//!   `null` and read back as `NaN`.
//!
//! ## Example
//!
//! ```rust
//! use crc_weekly_types::{Axis, SeriesBundle, Trace};
//!
//! let bundle = SeriesBundle::builder("smp")
//!     .x_axis(Axis::new("Week End Date (MM/DD/YY)").tick_angle(45))
//!     .y_axis(Axis::new("Percent").tick_suffix("%").range(0.0, 100.0))
//!     .trace(Trace::new("used", vec!["01/05/19".into()], vec![42.0]))
//!     .build();
//!
//! assert_eq!(bundle.traces.len(), 1);
//! assert_eq!(bundle.labels(), ["01/05/19"]);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod bundle;
mod dashboard;
mod layout;
mod version;

pub use bundle::*;
pub use dashboard::*;
pub use layout::*;
pub use version::*;

/// Current schema version.
///
/// Increment this when making breaking changes to the bundle format.
pub const SCHEMA_VERSION: u32 = 1;
