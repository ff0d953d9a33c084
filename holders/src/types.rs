//! Collections, assets and holdings.

use serde::{Deserialize, Serialize};

/// An asset created on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub unit_name: String,
    pub asset_id: u64,
}

/// One holder's positive balance of one asset.
///
/// Two holdings are equal only if every field matches; the raffle relies on
/// this to tell winners apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetHolding {
    pub name: String,
    pub unit_name: String,
    pub address: String,
    pub amount: u64,
    pub asset_id: u64,
}

impl AssetHolding {
    /// Build a holding of `asset` by `address`.
    pub fn new(asset: &Asset, address: impl Into<String>, amount: u64) -> Self {
        Self {
            name: asset.name.clone(),
            unit_name: asset.unit_name.clone(),
            address: address.into(),
            amount,
            asset_id: asset.asset_id,
        }
    }
}

/// A named filter describing which ledger assets form one logical
/// collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Unique name, used as the key of aggregated results
    pub name: String,

    /// Creator or custodian accounts whose created assets are scanned
    #[serde(default)]
    pub addresses: Vec<String>,

    /// Keep only assets whose unit name starts with one of these
    #[serde(default)]
    pub unit_name_prefixes: Vec<String>,

    /// Asset ids that never belong to the collection
    #[serde(default)]
    pub excluded_asset_ids: Vec<u64>,

    /// Keep only asset ids strictly greater than this
    #[serde(default)]
    pub asset_id_greater_than: u64,

    /// Holders whose balances are ignored
    #[serde(default)]
    pub excluded_holder_addresses: Vec<String>,

    /// Keep only assets whose name contains one of these (case-insensitive)
    #[serde(default)]
    pub include_name_contains: Vec<String>,

    /// Drop assets whose name contains any of these (case-insensitive)
    #[serde(default)]
    pub exclude_name_contains: Vec<String>,
}

impl Collection {
    /// Create an unfiltered collection scanning the given addresses.
    pub fn new(name: impl Into<String>, addresses: Vec<String>) -> Self {
        Self {
            name: name.into(),
            addresses,
            ..Default::default()
        }
    }
}

/// A collection together with its raffle weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedCollection {
    #[serde(flatten)]
    pub collection: Collection,

    /// Tickets per unit held. Zero means the collection never produces
    /// drawable tickets.
    #[serde(default = "default_weight")]
    pub weight: u64,
}

fn default_weight() -> u64 {
    1
}

impl WeightedCollection {
    pub fn new(collection: Collection, weight: u64) -> Self {
        Self { collection, weight }
    }
}

/// An asset as listed among an account's created assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAsset {
    pub asset_id: u64,
    pub name: String,
    pub unit_name: String,
}

impl From<CreatedAsset> for Asset {
    fn from(created: CreatedAsset) -> Self {
        Asset {
            name: created.name,
            unit_name: created.unit_name,
            asset_id: created.asset_id,
        }
    }
}

/// One row of an asset's balance list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub address: String,
    pub amount: u64,
    pub deleted: bool,
    pub frozen: bool,
}

/// A page of balances. The last page has no `next_token`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalancePage {
    pub balances: Vec<Balance>,
    pub next_token: Option<String>,
}

/// One asset held by an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountAsset {
    pub asset_id: u64,
    pub amount: u64,
    pub frozen: bool,
}
