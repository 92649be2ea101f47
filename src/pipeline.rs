//! One refresh cycle: fetch every source, transform every family.

use std::time::Instant;

use crc_weekly_types::{current_timestamp_ms, Dashboard};
use tracing::{debug, info, warn};

use crate::data::{SeriesFamily, Transformer};
use crate::error::FetchError;
use crate::source::{Fetcher, Snapshot};

/// Fetches documents and turns them into a [`Dashboard`].
///
/// A fetch failure fails the whole run. A transform failure only affects
/// its own panel, which is recorded in [`Dashboard::errors`].
#[derive(Debug, Clone)]
pub struct Pipeline {
    fetcher: Fetcher,
    transformer: Transformer,
}

impl Pipeline {
    pub fn new(fetcher: Fetcher, transformer: Transformer) -> Self {
        Self {
            fetcher,
            transformer,
        }
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn transformer(&self) -> &Transformer {
        &self.transformer
    }

    /// Run one full cycle.
    pub async fn run(&self) -> Result<Dashboard, FetchError> {
        let started = Instant::now();
        let snapshot = self.fetcher.fetch_all().await?;
        let dashboard = self.build_dashboard(&snapshot, current_timestamp_ms());
        info!(
            panels = dashboard.len(),
            failed = dashboard.errors.len(),
            documents = snapshot.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline run complete"
        );
        Ok(dashboard)
    }

    /// Transform a fetched snapshot. Pure: no I/O, same input same output.
    pub fn build_dashboard(&self, snapshot: &Snapshot, generated_at_ms: u64) -> Dashboard {
        let mut dashboard = Dashboard::with_timestamp(generated_at_ms);

        for family in SeriesFamily::ALL {
            let Some(docs) = snapshot.documents(family.source()) else {
                debug!(%family, "source not fetched, skipping");
                continue;
            };

            match self.transformer.transform(family, docs) {
                Ok(bundle) => {
                    debug!(%family, traces = bundle.traces.len(), "series built");
                    dashboard.insert_panel(family.panel_id(), bundle);
                }
                Err(e) => {
                    warn!(%family, error = %e, "series failed");
                    dashboard.record_error(family.panel_id(), e.to_string());
                }
            }
        }

        dashboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Cluster, TransformConfig};
    use crate::source::{ChannelStore, Collections, Document, DocumentStore, Source};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn docs(value: Value) -> Vec<Document> {
        serde_json::from_value(value).unwrap()
    }

    fn statistics() -> Vec<Document> {
        docs(json!([
            {
                "end_date": "01/12/19-00:00:00",
                "smp": { "mean_alloc": 30, "mean_total": 100, "unique_users": 12 },
                "gpu": { "mean_alloc": 2, "mean_total": 4, "unique_users": 3 },
                "mpi": { "mean_alloc": 50, "mean_total": 100, "unique_users": 8 },
                "htc": { "mean_alloc": 10, "mean_total": 40, "unique_users": 20 }
            },
            {
                "end_date": "01/05/19-00:00:00",
                "smp": { "mean_alloc": 20, "mean_total": 100, "unique_users": 10 },
                "gpu": { "mean_alloc": 1, "mean_total": 4, "unique_users": 2 },
                "mpi": { "mean_alloc": 40, "mean_total": 100, "unique_users": 7 },
                "htc": { "mean_alloc": 5, "mean_total": 40, "unique_users": 15 }
            }
        ]))
    }

    fn service_units() -> Vec<Document> {
        let clusters = |consumed: f64| {
            json!({
                "theoretical_max_sus": 1000,
                "consumed_sus": consumed
            })
        };
        docs(json!([
            {
                "end_date": "05/06/19",
                "smp": clusters(100.0), "gpu": clusters(200.0),
                "mpi": clusters(300.0), "htc": clusters(400.0),
                "bgfs_used": 120, "bgfs_total": 500
            },
            {
                "end_date": "04/08/19",
                "smp": clusters(1.0), "gpu": clusters(1.0),
                "mpi": clusters(1.0), "htc": clusters(1.0),
                "bgfs_used": 100, "bgfs_total": 500
            }
        ]))
    }

    fn pipeline(collections: Collections) -> Pipeline {
        let store: Arc<dyn DocumentStore> = Arc::new(ChannelStore::with_collections(collections));
        let fetcher = Fetcher::builder()
            .source(Source::Statistics, store.clone(), "statistics")
            .source(Source::ServiceUnits, store.clone(), "sus")
            .source(Source::Storage, store, "sus")
            .build();
        Pipeline::new(fetcher, Transformer::new(TransformConfig::default()))
    }

    fn collections() -> Collections {
        Collections::from([
            ("statistics".to_string(), statistics()),
            ("sus".to_string(), service_units()),
        ])
    }

    #[tokio::test]
    async fn test_run_builds_every_panel() {
        let dashboard = pipeline(collections()).run().await.unwrap();

        assert_eq!(dashboard.len(), 6);
        assert!(dashboard.errors.is_empty());

        let smp = dashboard.panel("smp").unwrap();
        assert_eq!(smp.labels(), ["01/05/19", "01/12/19"]);
        assert_eq!(smp.trace("used").unwrap().y, vec![20.0, 30.0]);

        let sus = dashboard.panel("sus").unwrap();
        assert_eq!(sus.labels(), ["05/06/19"]);
        assert_eq!(sus.trace("Consumed SUs").unwrap().y, vec![1000.0]);
        assert_eq!(sus.trace("Theoretical max SUs").unwrap().y, vec![4000.0]);

        let storage = dashboard.panel("storage").unwrap();
        assert_eq!(storage.trace("bgfs used (TB)").unwrap().y, vec![120.0]);
    }

    #[tokio::test]
    async fn test_build_is_idempotent() {
        let pipeline = pipeline(collections());
        let snapshot = pipeline.fetcher().fetch_all().await.unwrap();

        let first = pipeline.build_dashboard(&snapshot, 42);
        let second = pipeline.build_dashboard(&snapshot, 42);
        // Missing storage columns are NaN, so compare the published form.
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
        assert_eq!(first.generated_at_ms, 42);
    }

    #[tokio::test]
    async fn test_malformed_date_only_fails_its_series() {
        let mut sus = service_units();
        sus[0].insert("end_date".to_string(), json!("2019-05-06"));
        let collections = Collections::from([
            ("statistics".to_string(), statistics()),
            ("sus".to_string(), sus),
        ]);

        let dashboard = pipeline(collections).run().await.unwrap();

        assert!(dashboard.panel("sus").is_none());
        assert!(dashboard.panel("storage").is_none());
        assert!(dashboard.errors["sus"].contains("2019-05-06"));
        for cluster in Cluster::ALL {
            assert!(dashboard.panel(cluster.name()).is_some());
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_fails_run() {
        let fetcher = Fetcher::builder()
            .source(
                Source::Statistics,
                Arc::new(crate::source::FileStore::new("/nonexistent/crc-weekly")),
                "statistics",
            )
            .build();
        let pipeline = Pipeline::new(fetcher, Transformer::default());

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, FetchError::Unreachable { .. }));
    }

    #[tokio::test]
    async fn test_unconfigured_sources_are_skipped() {
        let store: Arc<dyn DocumentStore> = Arc::new(ChannelStore::with_collections(collections()));
        let fetcher = Fetcher::builder()
            .source(Source::Statistics, store, "statistics")
            .build();

        let dashboard = Pipeline::new(fetcher, Transformer::default()).run().await.unwrap();
        assert_eq!(dashboard.len(), 4);
        assert!(dashboard.panel("sus").is_none());
        assert!(dashboard.errors.is_empty());
    }
}
