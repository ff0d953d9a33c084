//! Ledger-facing traits.

use async_trait::async_trait;

use crate::{
    error::{LedgerError, Result},
    types::{AccountAsset, Asset, AssetHolding, BalancePage, Collection, CreatedAsset},
};

/// Raw queries against a ledger backend.
///
/// Implementations handle transport, authentication and any retry policy.
/// Dropping a returned future cancels the call.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Assets created by `address`, in the ledger's native order.
    async fn created_assets(
        &self,
        address: &str,
    ) -> std::result::Result<Vec<CreatedAsset>, LedgerError>;

    /// One page of balances for `asset_id`. Pass the previous page's
    /// `next_token` to continue.
    async fn asset_balances(
        &self,
        asset_id: u64,
        next_token: Option<&str>,
    ) -> std::result::Result<BalancePage, LedgerError>;

    /// Creator address of `asset_id`.
    async fn asset_creator(&self, asset_id: u64) -> std::result::Result<String, LedgerError>;

    /// Assets held by `address`.
    async fn account_assets(
        &self,
        address: &str,
    ) -> std::result::Result<Vec<AccountAsset>, LedgerError>;
}

/// Collection-level queries consumed by the collector and the raffle.
#[async_trait]
pub trait CollectionClient: Send + Sync {
    /// Assets belonging to `collection`.
    async fn assets_by_collection(&self, collection: &Collection) -> Result<Vec<Asset>>;

    /// Positive, non-excluded holdings of every asset in `collection`.
    async fn holdings_by_collection(&self, collection: &Collection) -> Result<Vec<AssetHolding>>;

    /// Whether `asset` is held by a regular account rather than its creator
    /// or an escrow.
    async fn is_asset_owned(&self, asset: &Asset) -> Result<bool>;
}
