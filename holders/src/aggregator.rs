//! Per-collection holding aggregation over a [`Ledger`].

use async_trait::async_trait;
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    filter,
    traits::{CollectionClient, Ledger},
    types::{Asset, AssetHolding, Balance, Collection},
};

/// [`CollectionClient`] backed by raw ledger queries.
#[derive(Debug, Clone)]
pub struct LedgerCollectionClient<L> {
    ledger: L,
}

impl<L: Ledger> LedgerCollectionClient<L> {
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    /// Get reference to the underlying ledger
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Fetch every balance page of `asset_id`, keeping the ones `keep`
    /// accepts.
    async fn collect_balances<F>(&self, asset_id: u64, mut keep: F) -> Result<Vec<Balance>>
    where
        F: FnMut(&Balance) -> bool,
    {
        let mut balances = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let page = self
                .ledger
                .asset_balances(asset_id, next_token.as_deref())
                .await
                .map_err(|e| Error::ledger(format!("reading balances of asset {asset_id}"), e))?;

            balances.extend(page.balances.into_iter().filter(|b| keep(b)));

            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        Ok(balances)
    }

    /// First holder of `asset_id` with a spendable balance, scanning pages
    /// in order and stopping as soon as one is found.
    async fn first_eligible_holder(&self, asset_id: u64) -> Result<String> {
        let mut next_token: Option<String> = None;

        loop {
            let page = self
                .ledger
                .asset_balances(asset_id, next_token.as_deref())
                .await
                .map_err(|e| Error::ledger(format!("reading balances of asset {asset_id}"), e))?;

            if let Some(holder) = page
                .balances
                .into_iter()
                .find(|b| b.amount >= 1 && !b.deleted && !b.frozen)
            {
                return Ok(holder.address);
            }

            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => return Err(Error::NoHoldersFound { asset_id }),
            }
        }
    }
}

#[async_trait]
impl<L: Ledger> CollectionClient for LedgerCollectionClient<L> {
    async fn assets_by_collection(&self, collection: &Collection) -> Result<Vec<Asset>> {
        let mut assets = Vec::new();

        for address in &collection.addresses {
            let created = self
                .ledger
                .created_assets(address)
                .await
                .map_err(|e| Error::ledger(format!("reading assets created by {address}"), e))?;

            let total = created.len();
            let before = assets.len();
            assets.extend(
                created
                    .into_iter()
                    .filter(|asset| filter::matches_asset(collection, asset))
                    .map(Asset::from),
            );

            debug!(
                "Collection {:?}: {} of {} assets created by {} match",
                collection.name,
                assets.len() - before,
                total,
                address
            );
        }

        Ok(assets)
    }

    async fn holdings_by_collection(&self, collection: &Collection) -> Result<Vec<AssetHolding>> {
        let assets = self.assets_by_collection(collection).await?;

        let mut holdings = Vec::new();
        for asset in &assets {
            let balances = self
                .collect_balances(asset.asset_id, |b| {
                    b.amount > 0
                        && !b.deleted
                        && !filter::is_excluded_holder(collection, &b.address)
                })
                .await?;

            holdings.extend(
                balances
                    .into_iter()
                    .map(|b| AssetHolding::new(asset, b.address, b.amount)),
            );
        }

        info!(
            "Collection {:?}: {} holdings across {} assets",
            collection.name,
            holdings.len(),
            assets.len()
        );

        Ok(holdings)
    }

    async fn is_asset_owned(&self, asset: &Asset) -> Result<bool> {
        let creator = self
            .ledger
            .asset_creator(asset.asset_id)
            .await
            .map_err(|e| Error::ledger(format!("looking up asset {}", asset.asset_id), e))?;

        let holder = self.first_eligible_holder(asset.asset_id).await?;
        if holder == creator {
            debug!("Asset {} is still held by its creator", asset.asset_id);
            return Ok(false);
        }

        let held = self
            .ledger
            .account_assets(&holder)
            .await
            .map_err(|e| Error::ledger(format!("reading assets held by {holder}"), e))?;

        // An account holding a single asset is assumed to be an escrow.
        let positive = held.iter().filter(|a| a.amount > 0).take(2).count();
        Ok(positive > 1)
    }
}
