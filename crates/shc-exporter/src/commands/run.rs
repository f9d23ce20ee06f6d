//! `run`: the exporter itself.
//!
//! Registers the client, connects the sink, warms the reference data and
//! then long-polls until the first failure or Ctrl-C. A failed poll ends the
//! process with a dedicated exit code so a supervisor can restart it.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use shc_config::Config;
use shc_core::{Exporter, InfluxSink, Pipeline, Point, PointSink};

use crate::cli::RunArgs;
use crate::error::CliError;

/// How long buffered points may take to drain on shutdown.
const FLUSH_GRACE: Duration = Duration::from_secs(10);

pub async fn handle(args: RunArgs, config: &Config, path: &Path) -> Result<(), CliError> {
    let hub = super::hub_config(config, path)?;
    let refresh = super::refresh_config(config, path)?;
    let influx = if args.dry_run {
        None
    } else {
        Some(
            config
                .influx_config()
                .map_err(|e| CliError::config(path.display().to_string(), e))?,
        )
    };

    let pipeline = Pipeline::connect(&hub, &refresh)?;
    if args.skip_register {
        info!("skipping registration check");
    } else {
        super::register::ensure(&pipeline, &hub).await?;
    }

    let (sink, flush): (Arc<dyn PointSink>, Option<JoinHandle<()>>) = match influx {
        Some(influx) => {
            let (sink, handle) = InfluxSink::connect(&influx).await?;
            (Arc::new(sink), Some(handle))
        }
        None => {
            info!("dry run, printing points to stdout");
            (Arc::new(StdoutSink), None)
        }
    };

    let devices = pipeline.devices().get().await;
    info!(devices = devices.len(), "reference data loaded");

    let poller = pipeline.poller(Arc::new(Exporter::new(sink)));
    let outcome = tokio::select! {
        err = poller.run() => Err(CliError::IngestionStopped { source: err }),
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, shutting down");
            Ok(())
        }
    };
    drop(poller);

    if let Some(handle) = flush {
        match tokio::time::timeout(FLUSH_GRACE, handle).await {
            Ok(Ok(())) => info!("pending points flushed"),
            Ok(Err(e)) => warn!(error = %e, "flush task failed"),
            Err(_) => warn!("timed out flushing pending points"),
        }
    }
    outcome
}

/// Writes each point as one JSON line to stdout.
struct StdoutSink;

impl PointSink for StdoutSink {
    fn write(&self, point: Point) {
        match serde_json::to_string(&point) {
            Ok(line) => {
                let mut stdout = std::io::stdout().lock();
                let _ = writeln!(stdout, "{line}");
            }
            Err(e) => warn!(measurement = %point.measurement, error = %e, "cannot render point"),
        }
    }
}
