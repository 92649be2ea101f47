//! Format version stamped on every [`Dashboard`](crate::Dashboard).

use crate::SCHEMA_VERSION;

/// `major` changes when a renderer written against an older layout would
/// misread the panels; `minor` only adds fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
}

impl SchemaVersion {
    pub const fn current() -> Self {
        Self {
            major: SCHEMA_VERSION,
            minor: 0,
        }
    }

    /// Whether this build can read a dashboard written with `self`.
    ///
    /// Newer minor versions are fine, unknown fields are ignored.
    pub fn is_readable(&self) -> bool {
        self.major == SCHEMA_VERSION
    }
}
