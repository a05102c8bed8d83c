use std::time::Duration;

use rand::{Rng, SeedableRng};

use crate::catalog::Catalog;
use crate::error::Error;
use crate::metrics::Metrics;
use crate::store::StateStore;
use crate::watcher::{Outcome, Watcher};
use crate::webhook::Notifier;

/// Load the last seen id, run one cycle and commit whatever the outcome asks
/// for.
///
/// Errors never escape a cycle. The only `Err` is a store that could not be
/// read, in which case nothing else was attempted.
pub async fn run_once<C, N>(
    watcher: &Watcher<C, N>,
    store: &dyn StateStore,
    metrics: &Metrics,
) -> Result<Outcome, Error>
where
    C: Catalog,
    N: Notifier,
{
    let now = chrono::Utc::now();
    tracing::info!("Starting check at {}", now.to_rfc3339());

    let last_seen = match store.load().await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(kind = e.kind(), "Loading last seen id: {}", e);
            metrics.record_store_failure(now.timestamp());
            return Err(e);
        }
    };
    tracing::info!(
        "Current last seen id: {}",
        last_seen.as_ref().map(|id| id.as_str()).unwrap_or("<none>")
    );

    let outcome = watcher.cycle(last_seen.as_ref(), now).await;

    if let Some(id) = outcome.commit() {
        match store.save(id).await {
            Ok(()) => tracing::info!("Last seen id updated to {}", id),
            Err(e) => {
                // The announcement already went out, the next cycle may repeat it.
                tracing::warn!(kind = e.kind(), "Storing last seen id {}: {}", id, e);
            }
        }
    }

    metrics.record(&outcome, now.timestamp());
    Ok(outcome)
}

/// Runs cycles back to back until Ctrl-C, sleeping `interval` (plus a bit of
/// jitter) between them.
#[tracing::instrument(skip(watcher, store, metrics))]
pub async fn run_every<C, N>(
    watcher: &Watcher<C, N>,
    store: &dyn StateStore,
    metrics: &Metrics,
    interval: Duration,
) where
    C: Catalog,
    N: Notifier,
{
    let mut rng = rand::rngs::SmallRng::from_entropy();

    loop {
        let start_time = std::time::Instant::now();

        // Failures are already logged and counted.
        let _ = run_once(watcher, store, metrics).await;

        tracing::info!("Cycle took {:?}", start_time.elapsed());

        let wait = interval + Duration::from_millis(rng.gen_range(125..500));

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl-C, stopping");
                break;
            }
        }
    }
}
