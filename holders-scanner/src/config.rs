//! Configuration for the holders scanner.

use holders::{Collection, WeightedCollection};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashSet},
    path::PathBuf,
};

/// Connection settings for the Algorand node and indexer APIs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Node (algod) API base URL
    #[serde(default = "default_algod_url")]
    pub algod_url: String,

    /// Node API token, sent as `X-Algo-API-Token` when non-empty
    #[serde(default)]
    pub algod_token: String,

    /// Indexer API base URL
    #[serde(default = "default_indexer_url")]
    pub indexer_url: String,

    /// Indexer API token, sent as `X-Indexer-API-Token` when non-empty
    #[serde(default)]
    pub indexer_token: String,

    /// Extra headers sent with every request (e.g. `Referer`)
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Balance rows requested per indexer page
    #[serde(default = "default_page_limit")]
    pub page_limit: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Raffle settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RaffleConfig {
    /// Number of unique winners to draw
    #[serde(default = "default_winners")]
    pub winners: usize,

    /// Seed for the draw. A random seed is generated (and logged) when
    /// absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Wallets that can never win
    #[serde(default)]
    pub excluded_wallets: Vec<String>,

    /// Also exclude every collection's creator addresses
    #[serde(default = "default_true")]
    pub exclude_collection_addresses: bool,
}

/// Scanner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldersConfig {
    /// Maximum number of collections aggregated at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// File the `holders` command writes to
    #[serde(default = "default_holdings_file")]
    pub holdings_file: PathBuf,

    #[serde(default)]
    pub ledger: LedgerConfig,

    #[serde(default)]
    pub raffle: RaffleConfig,

    /// Collections to scan, each with its raffle weight
    #[serde(default)]
    pub collections: Vec<WeightedCollection>,
}

fn default_algod_url() -> String {
    "https://mainnet-api.algonode.cloud".to_string()
}

fn default_indexer_url() -> String {
    "https://mainnet-idx.algonode.cloud".to_string()
}

fn default_page_limit() -> u64 {
    1000
}

fn default_timeout() -> u64 {
    30
}

fn default_winners() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    1
}

fn default_holdings_file() -> PathBuf {
    PathBuf::from("holdings.json")
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            algod_url: default_algod_url(),
            algod_token: String::new(),
            indexer_url: default_indexer_url(),
            indexer_token: String::new(),
            headers: BTreeMap::new(),
            page_limit: default_page_limit(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for RaffleConfig {
    fn default() -> Self {
        Self {
            winners: default_winners(),
            seed: None,
            excluded_wallets: Vec::new(),
            exclude_collection_addresses: true,
        }
    }
}

impl Default for HoldersConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            holdings_file: default_holdings_file(),
            ledger: LedgerConfig::default(),
            raffle: RaffleConfig::default(),
            collections: Vec::new(),
        }
    }
}

impl HoldersConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: HoldersConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.collections.is_empty() {
            anyhow::bail!("At least one collection must be configured");
        }

        let mut names = HashSet::new();
        for wc in &self.collections {
            let collection = &wc.collection;
            if collection.name.trim().is_empty() {
                anyhow::bail!("Every collection needs a non-empty name");
            }
            if !names.insert(collection.name.as_str()) {
                anyhow::bail!("Collection name {:?} is used more than once", collection.name);
            }
            if collection.addresses.is_empty() {
                anyhow::bail!("Collection {:?} has no addresses to scan", collection.name);
            }
            if wc.weight == 0 {
                tracing::warn!(
                    "Collection {:?} has weight 0 and can never win a raffle",
                    collection.name
                );
            }
        }

        if self.ledger.algod_url.is_empty() || self.ledger.indexer_url.is_empty() {
            anyhow::bail!("Both ledger.algod_url and ledger.indexer_url must be set");
        }
        if self.ledger.page_limit == 0 {
            anyhow::bail!("ledger.page_limit must be at least 1");
        }

        if self.raffle.winners == 0 {
            anyhow::bail!("raffle.winners must be at least 1");
        }

        if self.concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }

        Ok(())
    }

    /// The configured collections without their weights.
    pub fn collection_list(&self) -> Vec<Collection> {
        self.collections
            .iter()
            .map(|wc| wc.collection.clone())
            .collect()
    }

    /// Wallets excluded from the raffle: the configured list, plus every
    /// collection address when `exclude_collection_addresses` is set.
    pub fn excluded_wallets(&self) -> Vec<String> {
        let mut wallets = self.raffle.excluded_wallets.clone();
        if self.raffle.exclude_collection_addresses {
            for wc in &self.collections {
                for address in &wc.collection.addresses {
                    if !wallets.contains(address) {
                        wallets.push(address.clone());
                    }
                }
            }
        }
        wallets
    }
}
