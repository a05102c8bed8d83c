use std::time::Duration;

pub mod catalog;
pub mod config;
pub mod error;
pub mod format;
pub mod item;
pub mod metrics;
pub mod runner;
pub mod store;
#[cfg(test)]
mod testing;
pub mod watcher;
pub mod webhook;

pub use config::Config;
pub use error::{Error, Result};
pub use item::{ItemDetail, ItemId, ItemSummary};
pub use metrics::Metrics;
pub use watcher::{Outcome, Watcher};

/// The HTTP client shared by the catalog and webhook clients. Every request
/// is bounded by `timeout`, which also aborts the underlying connection.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
}

/// Wires the real catalog and webhook clients up according to `config`.
pub fn watcher_from_config(
    config: &Config,
) -> reqwest::Result<Watcher<catalog::Client, webhook::Client>> {
    let req_client = http_client(config.request_timeout())?;

    let catalog = catalog::Client::new(req_client.clone(), config);
    let notifier = webhook::Client::new(
        req_client,
        config.webhook_url.clone().unwrap_or_default(),
    );
    let formatter = format::Formatter::new(&config.site_base, config.mention.clone());

    Ok(Watcher::new(catalog, notifier, formatter))
}
