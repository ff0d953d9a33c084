//! The scanner's commands, independent of the ledger backend and output.

use holders::{
    collect_holdings, run_weighted_raffle, Asset, AssetHolding, CollectionClient, Error,
    HoldingsByCollection, RaffleParams,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::sync::Arc;

use crate::{config::HoldersConfig, output::OutputHandler};

/// Aggregate every configured collection and hand the result to `handler`.
pub async fn scan_holdings<C>(
    client: Arc<C>,
    config: &HoldersConfig,
    handler: &dyn OutputHandler,
) -> anyhow::Result<HoldingsByCollection>
where
    C: CollectionClient + ?Sized + 'static,
{
    let collections = config.collection_list();
    tracing::info!(
        "Scanning {} collections (concurrency {})",
        collections.len(),
        config.concurrency
    );

    let holdings = collect_holdings(client, &collections, config.concurrency).await?;

    let total: usize = holdings.values().map(Vec::len).sum();
    tracing::info!("Found {} holdings", total);

    handler.handle_holdings(&holdings).await?;
    Ok(holdings)
}

/// Options for a raffle run. Unset values fall back to the configuration.
#[derive(Debug, Clone, Default)]
pub struct RaffleOptions {
    pub winners: Option<usize>,
    pub seed: Option<u64>,
}

/// Outcome of a raffle run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaffleOutcome {
    /// Seed the draw used; rerunning with it reproduces the draw
    pub seed: u64,
    pub winners: Vec<AssetHolding>,
}

/// Run the weighted raffle over every configured collection.
pub async fn raffle<C>(
    client: Arc<C>,
    config: &HoldersConfig,
    options: &RaffleOptions,
    handler: &dyn OutputHandler,
) -> anyhow::Result<RaffleOutcome>
where
    C: CollectionClient + ?Sized + 'static,
{
    let number_of_winners = options.winners.unwrap_or(config.raffle.winners);
    if number_of_winners == 0 {
        anyhow::bail!("Number of winners must be at least 1");
    }

    let seed = options
        .seed
        .or(config.raffle.seed)
        .unwrap_or_else(|| rand::thread_rng().gen());
    tracing::info!("Drawing {} winners with seed {}", number_of_winners, seed);

    let params = RaffleParams {
        number_of_winners,
        concurrency: config.concurrency,
        excluded_wallets: config.excluded_wallets(),
    };
    let mut rng = ChaCha20Rng::seed_from_u64(seed);

    let winners = run_weighted_raffle(client, &config.collections, &params, &mut rng).await?;
    for (place, winner) in winners.iter().enumerate() {
        tracing::info!(
            "Winner {}: {} ({} x{})",
            place + 1,
            winner.address,
            winner.unit_name,
            winner.amount
        );
    }

    handler.handle_winners(&winners).await?;
    Ok(RaffleOutcome { seed, winners })
}

/// Whether an asset is held by a genuine owner.
///
/// `None` when nobody holds the asset at all.
pub async fn asset_ownership<C>(client: &C, asset_id: u64) -> anyhow::Result<Option<bool>>
where
    C: CollectionClient + ?Sized,
{
    let asset = Asset {
        name: String::new(),
        unit_name: String::new(),
        asset_id,
    };

    match client.is_asset_owned(&asset).await {
        Ok(owned) => Ok(Some(owned)),
        Err(Error::NoHoldersFound { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Whether a failure is a bug in the caller rather than a runtime condition.
pub fn is_programmer_error(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<Error>()
        .is_some_and(Error::is_programmer_error)
}
