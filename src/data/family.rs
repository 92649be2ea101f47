//! Metric families and the clusters they cover.

use std::fmt;
use std::str::FromStr;

use crate::source::Source;

/// A compute partition whose utilization is tracked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cluster {
    Smp,
    Gpu,
    Mpi,
    Htc,
}

impl Cluster {
    pub const ALL: [Cluster; 4] = [Cluster::Smp, Cluster::Gpu, Cluster::Mpi, Cluster::Htc];

    /// Key used for this cluster in documents (`cluster` field and sub-record name).
    pub fn name(&self) -> &'static str {
        match self {
            Cluster::Smp => "smp",
            Cluster::Gpu => "gpu",
            Cluster::Mpi => "mpi",
            Cluster::Htc => "htc",
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Cluster {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cluster::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown cluster: {}", s))
    }
}

/// One panel's worth of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeriesFamily {
    /// Utilization of a single cluster.
    Cluster(Cluster),
    /// Service-unit capacity vs. consumption, summed over clusters.
    ServiceUnits,
    /// Storage pool capacities.
    Storage,
}

impl SeriesFamily {
    /// Every panel, in dashboard order.
    pub const ALL: [SeriesFamily; 6] = [
        SeriesFamily::Cluster(Cluster::Smp),
        SeriesFamily::Cluster(Cluster::Gpu),
        SeriesFamily::Cluster(Cluster::Mpi),
        SeriesFamily::Cluster(Cluster::Htc),
        SeriesFamily::ServiceUnits,
        SeriesFamily::Storage,
    ];

    /// Key of this family's panel in a published dashboard.
    pub fn panel_id(&self) -> &'static str {
        match self {
            SeriesFamily::Cluster(cluster) => cluster.name(),
            SeriesFamily::ServiceUnits => "sus",
            SeriesFamily::Storage => "storage",
        }
    }

    /// Where this family's documents live.
    pub fn source(&self) -> Source {
        match self {
            SeriesFamily::Cluster(_) => Source::Statistics,
            SeriesFamily::ServiceUnits => Source::ServiceUnits,
            SeriesFamily::Storage => Source::Storage,
        }
    }
}

impl fmt::Display for SeriesFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.panel_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_from_str() {
        assert_eq!("gpu".parse::<Cluster>().unwrap(), Cluster::Gpu);
        assert_eq!(" HTC ".parse::<Cluster>().unwrap(), Cluster::Htc);
        assert!("bigmem".parse::<Cluster>().is_err());
    }

    #[test]
    fn test_panel_ids_are_unique() {
        let mut ids: Vec<_> = SeriesFamily::ALL.iter().map(|f| f.panel_id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), SeriesFamily::ALL.len());
    }

    #[test]
    fn test_clusters_share_statistics_source() {
        for cluster in Cluster::ALL {
            assert_eq!(SeriesFamily::Cluster(cluster).source(), Source::Statistics);
        }
        assert_eq!(SeriesFamily::ServiceUnits.source(), Source::ServiceUnits);
        assert_eq!(SeriesFamily::Storage.source(), Source::Storage);
    }
}
