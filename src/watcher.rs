//! The change detector.
//!
//! A [`Watcher`] runs a single step of the poll state machine: it looks at the
//! newest catalog listing, compares it with the last id that was announced and
//! decides what happens next. It never touches the persisted state itself,
//! the returned [`Outcome`] says whether a new id should be committed.

use chrono::{DateTime, Utc};

use crate::catalog::Catalog;
use crate::error::Error;
use crate::format::Formatter;
use crate::item::{ItemDetail, ItemId};
use crate::webhook::Notifier;

#[derive(Debug)]
pub enum Outcome {
    /// The listing could not be fetched.
    FetchFailed(Error),
    /// The listing came back without any items.
    Empty,
    /// No id was stored yet, the newest one becomes the baseline without
    /// announcing it.
    Bootstrapped(ItemId),
    Unchanged(ItemId),
    /// A new item was announced and the webhook acknowledged it.
    Notified {
        previous: ItemId,
        id: ItemId,
        fallback: bool,
    },
    /// A new item was found but the announcement did not go through. The
    /// stored id stays as is so the next cycle tries again.
    DeliveryFailed {
        previous: ItemId,
        id: ItemId,
        error: Error,
    },
}

impl Outcome {
    /// The id that has to be persisted after this cycle, if any.
    pub fn commit(&self) -> Option<&ItemId> {
        match self {
            Self::Bootstrapped(id) | Self::Notified { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Last-seen state after applying this outcome to `previous`.
    pub fn next_state(&self, previous: Option<ItemId>) -> Option<ItemId> {
        match self.commit() {
            Some(id) => Some(id.clone()),
            None => previous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FetchFailed(_) => "fetch_failed",
            Self::Empty => "empty",
            Self::Bootstrapped(_) => "bootstrapped",
            Self::Unchanged(_) => "unchanged",
            Self::Notified { .. } => "notified",
            Self::DeliveryFailed { .. } => "delivery_failed",
        }
    }

    /// Whether a webhook delivery was attempted during the cycle.
    pub fn attempted_delivery(&self) -> bool {
        matches!(self, Self::Notified { .. } | Self::DeliveryFailed { .. })
    }
}

pub struct Watcher<C, N> {
    catalog: C,
    notifier: N,
    formatter: Formatter,
}

impl<C, N> Watcher<C, N>
where
    C: Catalog,
    N: Notifier,
{
    pub fn new(catalog: C, notifier: N, formatter: Formatter) -> Self {
        Self {
            catalog,
            notifier,
            formatter,
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Runs one step against `last_seen`, stamping any message with `now`.
    #[tracing::instrument(skip(self, now))]
    pub async fn cycle(&self, last_seen: Option<&ItemId>, now: DateTime<Utc>) -> Outcome {
        let newest = match self.catalog.search().await {
            Ok(items) => match items.into_iter().next() {
                Some(item) => item,
                None => {
                    tracing::warn!("Search returned no items");
                    return Outcome::Empty;
                }
            },
            Err(e) => {
                tracing::warn!(kind = e.kind(), timeout = e.is_timeout(), "Loading newest items: {}", e);
                return Outcome::FetchFailed(e);
            }
        };

        let previous = match last_seen {
            Some(previous) => previous,
            None => {
                tracing::info!("No last seen id, starting from {}", newest.id);
                return Outcome::Bootstrapped(newest.id);
            }
        };

        if *previous == newest.id {
            tracing::info!("No new items");
            return Outcome::Unchanged(newest.id);
        }

        tracing::info!("New item detected: {} -> {}", previous, newest.id);

        let newest_id = newest.id.clone();
        let ids = [newest_id.clone()];
        let (item, fallback) = match self.catalog.details(&ids).await {
            Ok(details) => match details.into_iter().next() {
                Some(detail) => (detail, false),
                None => {
                    tracing::warn!("No details for {}, using the listing entry", newest.id);
                    (ItemDetail::from(newest), true)
                }
            },
            Err(e) => {
                tracing::warn!(kind = e.kind(), "Loading details for {}: {}", newest.id, e);
                (ItemDetail::from(newest), true)
            }
        };

        tracing::info!(
            name = item.name.as_deref().unwrap_or("-"),
            price = ?item.price,
            "Announcing item"
        );

        let message = self.formatter.message(&item, now);
        match self.notifier.deliver(&message).await {
            Ok(()) => {
                tracing::info!("Notification sent for {}", newest_id);
                Outcome::Notified {
                    previous: previous.clone(),
                    id: newest_id,
                    fallback,
                }
            }
            Err(e) => {
                tracing::warn!(kind = e.kind(), "Sending notification for {}: {}", newest_id, e);
                Outcome::DeliveryFailed {
                    previous: previous.clone(),
                    id: newest_id,
                    error: e,
                }
            }
        }
    }
}
