//! Dashboard - every panel produced by one refresh cycle.

use alloc::collections::BTreeMap;
use alloc::string::String;

use crate::{SchemaVersion, SeriesBundle};

/// The complete result of one refresh cycle, keyed by panel id
/// (`smp`, `gpu`, `mpi`, `htc`, `sus`, `storage`).
///
/// A panel whose transformation failed has no entry in `panels` and an entry
/// in `errors` instead, unless a previous bundle was carried over with
/// [`Dashboard::carry_over`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dashboard {
    pub version: SchemaVersion,

    /// Unix timestamp in milliseconds when the cycle ran.
    pub generated_at_ms: u64,

    pub panels: BTreeMap<String, SeriesBundle>,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "BTreeMap::is_empty"))]
    pub errors: BTreeMap<String, String>,
}

impl Dashboard {
    /// Create an empty dashboard stamped with the current time.
    #[cfg(feature = "std")]
    pub fn new() -> Self {
        Self::with_timestamp(current_timestamp_ms())
    }

    pub fn with_timestamp(generated_at_ms: u64) -> Self {
        Self {
            version: SchemaVersion::current(),
            generated_at_ms,
            panels: BTreeMap::new(),
            errors: BTreeMap::new(),
        }
    }

    pub fn insert_panel(&mut self, id: impl Into<String>, bundle: SeriesBundle) {
        let id = id.into();
        self.errors.remove(&id);
        self.panels.insert(id, bundle);
    }

    pub fn record_error(&mut self, id: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(id.into(), message.into());
    }

    pub fn panel(&self, id: &str) -> Option<&SeriesBundle> {
        self.panels.get(id)
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Keep showing `previous` bundles for panels that failed this cycle.
    ///
    /// The error stays recorded so consumers can flag the panel as stale.
    /// Returns the number of panels carried over.
    pub fn carry_over(&mut self, previous: &Dashboard) -> usize {
        let mut carried = 0;
        for id in self.errors.keys() {
            if self.panels.contains_key(id) {
                continue;
            }
            if let Some(bundle) = previous.panels.get(id) {
                self.panels.insert(id.clone(), bundle.clone());
                carried += 1;
            }
        }
        carried
    }
}

#[cfg(feature = "std")]
impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

/// Milliseconds since the Unix epoch, or 0 if the clock is before it.
#[cfg(feature = "std")]
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
