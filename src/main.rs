use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(filter)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Setting up logging: {e}");
        return ExitCode::FAILURE;
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Fatal: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Building runtime")?;

    let config = catalog_watch::Config::from_env().context("Loading config")?;

    let registry = prometheus::Registry::new();
    let metrics = catalog_watch::Metrics::new(&registry).context("Registering metrics")?;

    let watcher = catalog_watch::watcher_from_config(&config).context("Building HTTP client")?;
    let store = catalog_watch::store::from_config(&config.state);

    let interval = match config.interval() {
        Some(i) => i,
        None => {
            tracing::info!("Running single check");
            // A failed cycle is logged and left for the next invocation.
            let _ = runtime.block_on(catalog_watch::runner::run_once(
                &watcher,
                store.as_ref(),
                &metrics,
            ));
            return Ok(());
        }
    };

    if let Some(addr) = config.metrics_addr {
        let app = axum::Router::new()
            .route("/metrics", axum::routing::get(metrics_handler))
            .with_state(registry);

        runtime.spawn(async move {
            tracing::info!("Serving metrics on {}", addr);
            if let Err(e) = axum::Server::bind(&addr)
                .serve(app.into_make_service())
                .await
            {
                tracing::error!("Metrics server {:?}", e);
            }
        });
    }

    tracing::info!("Checking every {:?}", interval);
    runtime.block_on(catalog_watch::runner::run_every(
        &watcher,
        store.as_ref(),
        &metrics,
        interval,
    ));

    Ok(())
}

#[tracing::instrument(skip(registry))]
async fn metrics_handler(
    axum::extract::State(registry): axum::extract::State<prometheus::Registry>,
) -> String {
    tracing::trace!("Getting metrics");

    let encoder = prometheus::TextEncoder::new();
    let metrics_families = registry.gather();
    match encoder.encode_to_string(&metrics_families) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Encoding Metrics {:?}", e);

            String::new()
        }
    }
}
