//! Bounded-concurrency holding collection across many collections.
//!
//! Each collection is aggregated in its own tokio task. At most
//! `concurrency` tasks are in flight; the calling task is the only writer of
//! the result map and reduces worker outputs as they complete.
//!
//! The contract is all-or-nothing: if any collection fails, no further
//! collections are started, the in-flight ones are awaited (never aborted),
//! and a single error is returned with every partial result discarded.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::{
    error::{Error, Result},
    traits::CollectionClient,
    types::{AssetHolding, Collection},
};

/// Holdings keyed by collection name.
pub type HoldingsByCollection = HashMap<String, Vec<AssetHolding>>;

/// Aggregate holdings for every collection, running at most `concurrency`
/// aggregations at once. A `concurrency` of zero is treated as one.
///
/// Once a collection fails, collections that have not started yet are never
/// started, so they make no ledger calls. Aggregations already running are
/// awaited before the error is returned.
pub async fn collect_holdings<C>(
    client: Arc<C>,
    collections: &[Collection],
    concurrency: usize,
) -> Result<HoldingsByCollection>
where
    C: CollectionClient + ?Sized + 'static,
{
    let concurrency = if concurrency == 0 {
        warn!("Concurrency of 0 requested, running sequentially");
        1
    } else {
        concurrency
    };

    ensure_unique_names(collections)?;

    info!(
        "Collecting holdings for {} collections (concurrency {})",
        collections.len(),
        concurrency
    );

    let mut pending = collections.iter().cloned();
    let mut workers: JoinSet<(String, Result<Vec<AssetHolding>>)> = JoinSet::new();
    let mut results = HoldingsByCollection::with_capacity(collections.len());
    let mut failure: Option<Error> = None;

    loop {
        while failure.is_none() && workers.len() < concurrency {
            let Some(collection) = pending.next() else {
                break;
            };
            let client = Arc::clone(&client);
            debug!("Starting aggregation for {:?}", collection.name);
            workers.spawn(async move {
                let holdings = client.holdings_by_collection(&collection).await;
                (collection.name, holdings)
            });
        }

        let Some(joined) = workers.join_next().await else {
            break;
        };

        match joined {
            Ok((name, Ok(holdings))) => {
                results.insert(name, holdings);
            }
            Ok((name, Err(err))) => {
                warn!("Aggregation for {:?} failed: {}", name, err);
                if failure.is_none() {
                    failure = Some(Error::Aggregation {
                        collection: name,
                        source: Box::new(err),
                    });
                }
            }
            Err(join_err) => {
                warn!("Aggregation worker did not complete: {}", join_err);
                if failure.is_none() {
                    failure = Some(Error::WorkerPanicked(join_err.to_string()));
                }
            }
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(results),
    }
}

fn ensure_unique_names(collections: &[Collection]) -> Result<()> {
    let mut seen = HashSet::with_capacity(collections.len());
    for collection in collections {
        if !seen.insert(collection.name.as_str()) {
            return Err(Error::DuplicateCollection {
                collection: collection.name.clone(),
            });
        }
    }
    Ok(())
}
