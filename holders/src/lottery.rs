//! Weighted raffle over aggregated holdings.
//!
//! Every holding becomes a ticket weighted `collection weight * amount`.
//! Winners are drawn one at a time without replacement:
//!
//! - a ticket whose wallet is excluded, or whose exact holding has already
//!   won, is removed from the pool on its own and the draw is retried;
//! - other tickets of the same wallet or collection stay drawable, so a
//!   wallet can win again through a different holding;
//! - the draw fails once the pool is empty before enough winners are found.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use rand::Rng;
use tracing::{debug, info};

use crate::{
    chooser::WeightedChooser,
    collector::{collect_holdings, HoldingsByCollection},
    error::{Error, Result},
    traits::CollectionClient,
    types::{AssetHolding, Collection, WeightedCollection},
};

/// A holding together with its draw weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotteryTicket {
    pub holding: AssetHolding,
    pub weight: u128,
}

/// Parameters of a weighted raffle run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaffleParams {
    pub number_of_winners: usize,
    pub concurrency: usize,
    /// Wallets that can never win
    pub excluded_wallets: Vec<String>,
}

/// Build the ticket pool. Tickets with zero weight are left out.
///
/// A collection present in `holdings` without a weighted entry is a caller
/// bug and is reported as [`Error::ConfigurationMismatch`].
pub fn create_tickets(
    holdings: &HoldingsByCollection,
    weighted_collections: &[WeightedCollection],
) -> Result<Vec<LotteryTicket>> {
    let weights: HashMap<&str, u64> = weighted_collections
        .iter()
        .map(|wc| (wc.collection.name.as_str(), wc.weight))
        .collect();

    // Sorted so that a seeded draw is reproducible regardless of map order.
    let mut names: Vec<&String> = holdings.keys().collect();
    names.sort();

    let mut tickets = Vec::new();
    for name in names {
        let weight = *weights
            .get(name.as_str())
            .ok_or_else(|| Error::ConfigurationMismatch {
                collection: name.clone(),
            })?;

        tickets.extend(
            holdings[name]
                .iter()
                .map(|holding| LotteryTicket {
                    holding: holding.clone(),
                    weight: u128::from(weight) * u128::from(holding.amount),
                })
                .filter(|ticket| ticket.weight > 0),
        );
    }

    Ok(tickets)
}

/// Draw `number_of_winners` unique winners from `tickets`, in draw order.
pub fn pick_unique_winners<R: Rng + ?Sized>(
    mut tickets: Vec<LotteryTicket>,
    number_of_winners: usize,
    excluded_wallets: &[String],
    rng: &mut R,
) -> Result<Vec<AssetHolding>> {
    let excluded: HashSet<&str> = excluded_wallets.iter().map(String::as_str).collect();
    let mut selected: HashSet<AssetHolding> = HashSet::new();
    let mut winners = Vec::with_capacity(number_of_winners);

    let mut chooser = WeightedChooser::new(tickets.iter().map(|t| t.weight))?;

    while winners.len() < number_of_winners {
        let Some(index) = chooser.pick(rng) else {
            return Err(Error::InsufficientCandidates {
                requested: number_of_winners,
                selected: winners.len(),
            });
        };

        let holding = &tickets[index].holding;
        if excluded.contains(holding.address.as_str()) || selected.contains(holding) {
            debug!(
                "Rejected ticket for {} (asset {}), {} tickets left",
                holding.address,
                holding.asset_id,
                tickets.len() - 1
            );
            tickets.remove(index);
            chooser = WeightedChooser::new(tickets.iter().map(|t| t.weight))?;
            continue;
        }

        debug!(
            "Winner #{}: {} (asset {})",
            winners.len() + 1,
            holding.address,
            holding.asset_id
        );
        selected.insert(holding.clone());
        winners.push(holding.clone());
    }

    Ok(winners)
}

/// Build tickets from aggregated holdings and draw the winners.
pub fn draw_winners<R: Rng + ?Sized>(
    weighted_collections: &[WeightedCollection],
    holdings: &HoldingsByCollection,
    number_of_winners: usize,
    excluded_wallets: &[String],
    rng: &mut R,
) -> Result<Vec<AssetHolding>> {
    if number_of_winners == 0 {
        return Ok(Vec::new());
    }

    let tickets = create_tickets(holdings, weighted_collections)?;
    info!(
        "Drawing {} winners from {} tickets",
        number_of_winners,
        tickets.len()
    );

    pick_unique_winners(tickets, number_of_winners, excluded_wallets, rng)
}

/// Collect holdings for every weighted collection and draw the winners.
pub async fn run_weighted_raffle<C, R>(
    client: Arc<C>,
    weighted_collections: &[WeightedCollection],
    params: &RaffleParams,
    rng: &mut R,
) -> Result<Vec<AssetHolding>>
where
    C: CollectionClient + ?Sized + 'static,
    R: Rng + ?Sized,
{
    let collections: Vec<Collection> = weighted_collections
        .iter()
        .map(|wc| wc.collection.clone())
        .collect();

    let holdings = collect_holdings(client, &collections, params.concurrency).await?;

    draw_winners(
        weighted_collections,
        &holdings,
        params.number_of_winners,
        &params.excluded_wallets,
        rng,
    )
}
