//! Output backends for publishing dashboards.

use std::io;
use std::path::PathBuf;

use crc_weekly_types::Dashboard;
use tokio::io::AsyncWriteExt;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Where a finished [`Dashboard`] goes.
#[derive(Debug)]
pub enum Output {
    /// Write the dashboard as pretty JSON.
    ///
    /// The file is replaced atomically, so readers never see a partial write.
    File(PathBuf),

    /// Print the dashboard as one JSON line on stdout.
    Stdout,

    /// Hand the dashboard to in-process consumers.
    ///
    /// Use `Output::channel()` to create this variant and get the receiver.
    Channel(watch::Sender<Option<Dashboard>>),
}

impl Output {
    /// Create a file output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use crc_weekly::Output;
    ///
    /// let output = Output::file("dashboard.json");
    /// ```
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Output::File(path.into())
    }

    pub fn stdout() -> Self {
        Output::Stdout
    }

    /// Create a channel output and return both the output and receiver.
    ///
    /// The receiver holds `None` until the first dashboard is published.
    pub fn channel() -> (Self, watch::Receiver<Option<Dashboard>>) {
        let (tx, rx) = watch::channel(None);
        (Output::Channel(tx), rx)
    }

    /// Short name for logs.
    pub fn describe(&self) -> String {
        match self {
            Output::File(path) => format!("file: {}", path.display()),
            Output::Stdout => "stdout".to_string(),
            Output::Channel(_) => "channel".to_string(),
        }
    }

    /// Read back the dashboard a previous run left in this output.
    ///
    /// Only file outputs persist anything. A missing or unreadable file, or
    /// one written with an incompatible schema version, yields `None`.
    pub async fn restore(&self) -> Option<Dashboard> {
        let Output::File(path) = self else {
            return None;
        };

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read previous dashboard");
                return None;
            }
        };
        let dashboard: Dashboard = match serde_json::from_slice(&bytes) {
            Ok(dashboard) => dashboard,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unparseable previous dashboard");
                return None;
            }
        };

        if !dashboard.version.is_readable() {
            warn!(
                path = %path.display(),
                major = dashboard.version.major,
                "ignoring previous dashboard with incompatible schema"
            );
            return None;
        }

        debug!(path = %path.display(), panels = dashboard.len(), "restored previous dashboard");
        Some(dashboard)
    }

    /// Publish a dashboard to this output.
    pub async fn emit(&self, dashboard: &Dashboard) -> io::Result<()> {
        match self {
            Output::File(path) => {
                let json = serde_json::to_string_pretty(dashboard)?;
                let mut tmp = path.clone().into_os_string();
                tmp.push(".tmp");
                tokio::fs::write(&tmp, json).await?;
                tokio::fs::rename(&tmp, path).await?;
            }
            Output::Stdout => {
                let mut line = serde_json::to_vec(dashboard)?;
                line.push(b'\n');
                let mut stdout = tokio::io::stdout();
                stdout.write_all(&line).await?;
                stdout.flush().await?;
            }
            Output::Channel(tx) => {
                // No receivers left is not an error.
                tx.send_replace(Some(dashboard.clone()));
            }
        }
        Ok(())
    }
}
