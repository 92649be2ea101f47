//! Periodic refresh: run the pipeline on a timer and publish the result.

use std::sync::Arc;
use std::time::Duration;

use crc_weekly_types::Dashboard;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::pipeline::Pipeline;
use crate::publish::Output;

/// Default time between refresh cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3600);

/// Re-runs a [`Pipeline`] periodically and publishes every dashboard to the
/// configured outputs.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use crc_weekly::{Fetcher, Output, Pipeline, Refresher, Transformer};
///
/// #[tokio::main]
/// async fn main() {
///     let pipeline = Pipeline::new(Fetcher::builder().build(), Transformer::default());
///     let refresher = Refresher::builder(pipeline)
///         .output(Output::file("dashboard.json"))
///         .interval(Duration::from_secs(600))
///         .build();
///
///     let handle = refresher.start();
///     tokio::signal::ctrl_c().await.ok();
///     handle.stop().await;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Refresher {
    pipeline: Arc<Pipeline>,
    outputs: Arc<Vec<Output>>,
    interval: Duration,
}

impl Refresher {
    pub fn builder(pipeline: Pipeline) -> RefresherBuilder {
        RefresherBuilder {
            pipeline,
            outputs: Vec::new(),
            interval: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one cycle and publish it.
    ///
    /// Panels that failed this cycle keep their bundle from `previous`. On a
    /// fetch failure nothing is published and the error is returned.
    pub async fn run_once(&self, previous: Option<&Dashboard>) -> Result<Dashboard, FetchError> {
        let mut dashboard = self.pipeline.run().await?;

        if let Some(previous) = previous {
            let carried = dashboard.carry_over(previous);
            if carried > 0 {
                warn!(carried, "serving stale panels from the previous cycle");
            }
        }

        self.publish(&dashboard).await;
        Ok(dashboard)
    }

    /// The last dashboard persisted by one of the outputs, used to seed
    /// [`Dashboard::carry_over`] on the first cycle after a restart.
    pub async fn restore(&self) -> Option<Dashboard> {
        for output in self.outputs.iter() {
            if let Some(dashboard) = output.restore().await {
                return Some(dashboard);
            }
        }
        None
    }

    async fn publish(&self, dashboard: &Dashboard) {
        for output in self.outputs.iter() {
            match output.emit(dashboard).await {
                Ok(()) => debug!(output = %output.describe(), "dashboard published"),
                Err(e) => warn!(output = %output.describe(), error = %e, "failed to publish dashboard"),
            }
        }
    }

    /// Start refreshing in the background.
    ///
    /// The first cycle runs immediately, carrying over from whatever a
    /// previous run left in the outputs. Cycles never overlap; a cycle that
    /// overruns the interval causes the missed ticks to be skipped.
    pub fn start(&self) -> RefreshHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let refresher = self.clone();

        let task = tokio::spawn(async move {
            let mut timer = tokio::time::interval(refresher.interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut last = refresher.restore().await;

            info!(interval_secs = refresher.interval.as_secs(), "refresher started");
            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        match refresher.run_once(last.as_ref()).await {
                            Ok(dashboard) => last = Some(dashboard),
                            Err(e) => warn!(error = %e, "refresh cycle failed, nothing published"),
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("refresher stopped");
        });

        RefreshHandle { stop_tx, task }
    }
}

/// Builder for [`Refresher`].
#[derive(Debug)]
pub struct RefresherBuilder {
    pipeline: Pipeline,
    outputs: Vec<Output>,
    interval: Option<Duration>,
}

impl RefresherBuilder {
    /// Add an output destination.
    ///
    /// Multiple outputs can be added; every dashboard goes to all of them.
    pub fn output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    /// Set the refresh interval.
    ///
    /// Defaults to one hour.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn build(self) -> Refresher {
        Refresher {
            pipeline: Arc::new(self.pipeline),
            outputs: Arc::new(self.outputs),
            interval: self.interval.unwrap_or(DEFAULT_INTERVAL),
        }
    }
}

/// Handle for stopping a running [`Refresher`].
///
/// Dropping the handle also stops the refresher after its current cycle.
#[derive(Debug)]
pub struct RefreshHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Stop refreshing and wait for an in-flight cycle to finish.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "refresher task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Transformer;
    use crate::source::{ChannelStore, Collections, Document, DocumentStore, Fetcher, FileStore, Source};
    use serde_json::json;

    fn statistics(end_date: &str) -> Vec<Document> {
        serde_json::from_value(json!([
            {
                "end_date": end_date,
                "smp": { "mean_alloc": 25, "mean_total": 100, "unique_users": 4 },
                "gpu": { "mean_alloc": 1, "mean_total": 2, "unique_users": 1 }
            }
        ]))
        .unwrap()
    }

    fn pipeline(store: Arc<dyn DocumentStore>) -> Pipeline {
        let fetcher = Fetcher::builder()
            .source(Source::Statistics, store, "statistics")
            .build();
        Pipeline::new(fetcher, Transformer::default())
    }

    #[test]
    fn test_default_interval() {
        let store = Arc::new(ChannelStore::with_collections(Collections::new()));
        let refresher = Refresher::builder(pipeline(store)).build();
        assert_eq!(refresher.interval(), Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_failed_series_keeps_previous_bundle() {
        let (tx, store) = ChannelStore::create("ingest");
        tx.send(Collections::from([(
            "statistics".to_string(),
            statistics("05/06/19-00:00:00"),
        )]))
        .unwrap();

        let (output, rx) = Output::channel();
        let refresher = Refresher::builder(pipeline(Arc::new(store)))
            .output(output)
            .build();

        let first = refresher.run_once(None).await.unwrap();
        assert!(first.errors.is_empty());

        tx.send(Collections::from([(
            "statistics".to_string(),
            statistics("May 13"),
        )]))
        .unwrap();
        let second = refresher.run_once(Some(&first)).await.unwrap();

        assert!(second.errors.contains_key("smp"));
        assert_eq!(second.panel("smp"), first.panel("smp"));
        let published = rx.borrow().clone().unwrap();
        assert!(published.errors.contains_key("gpu"));
    }

    #[tokio::test]
    async fn test_restart_carries_over_from_file_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("dashboard.json");

        let (tx, store) = ChannelStore::create("ingest");
        tx.send(Collections::from([(
            "statistics".to_string(),
            statistics("05/06/19-00:00:00"),
        )]))
        .unwrap();
        let store: Arc<dyn DocumentStore> = Arc::new(store);

        let before = Refresher::builder(pipeline(store.clone()))
            .output(Output::file(&path))
            .build();
        assert!(before.restore().await.is_none());
        let first = before.run_once(None).await.unwrap();

        tx.send(Collections::from([(
            "statistics".to_string(),
            statistics("May 13"),
        )]))
        .unwrap();
        let after = Refresher::builder(pipeline(store))
            .output(Output::file(&path))
            .build();
        let previous = after.restore().await;
        let second = after.run_once(previous.as_ref()).await.unwrap();

        assert!(second.errors.contains_key("smp"));
        let carried = second.panel("smp").unwrap();
        assert_eq!(carried.labels(), ["05/06/19"]);
        assert_eq!(carried.traces[0].y, first.panel("smp").unwrap().traces[0].y);
    }

    #[tokio::test]
    async fn test_fetch_failure_publishes_nothing() {
        let (output, rx) = Output::channel();
        let store = Arc::new(FileStore::new("/nonexistent/crc-weekly"));
        let refresher = Refresher::builder(pipeline(store)).output(output).build();

        assert!(refresher.run_once(None).await.is_err());
        assert!(rx.borrow().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_refresh() {
        let (tx, store) = ChannelStore::create("ingest");
        tx.send(Collections::from([(
            "statistics".to_string(),
            statistics("05/06/19-00:00:00"),
        )]))
        .unwrap();

        let (output, mut rx) = Output::channel();
        let refresher = Refresher::builder(pipeline(Arc::new(store)))
            .output(output)
            .interval(Duration::from_secs(60))
            .build();
        let handle = refresher.start();

        rx.changed().await.unwrap();
        let first = rx.borrow_and_update().clone().unwrap();
        assert_eq!(first.panel("smp").unwrap().labels(), ["05/06/19"]);

        tx.send(Collections::from([(
            "statistics".to_string(),
            statistics("05/13/19-00:00:00"),
        )]))
        .unwrap();
        rx.changed().await.unwrap();
        let second = rx.borrow_and_update().clone().unwrap();
        assert_eq!(second.panel("smp").unwrap().labels(), ["05/13/19"]);

        handle.stop().await;
    }
}
