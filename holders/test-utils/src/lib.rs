//! In-memory ledger mock

use async_trait::async_trait;
use holders::{AccountAsset, Balance, BalancePage, CreatedAsset, Ledger, LedgerError};
use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

/// A [`Ledger`] answering from fixed data.
///
/// Balance lists are split into pages of `page_size` rows; the next-page
/// token is the offset of the following row. Every call is counted, and the
/// highest number of calls observed in flight at once is recorded so tests
/// can check concurrency bounds (set a latency to make overlap visible).
#[derive(Debug, Default)]
pub struct MockLedger {
    created: HashMap<String, Vec<CreatedAsset>>,
    balances: HashMap<u64, Vec<Balance>>,
    creators: HashMap<u64, String>,
    held: HashMap<String, Vec<AccountAsset>>,
    failing_addresses: HashSet<String>,
    failing_assets: HashSet<u64>,
    page_size: Option<usize>,
    latency: Option<Duration>,

    calls: AtomicUsize,
    balance_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_created_assets(mut self, address: &str, assets: Vec<CreatedAsset>) -> Self {
        self.created.insert(address.to_string(), assets);
        self
    }

    pub fn with_balances(mut self, asset_id: u64, balances: Vec<Balance>) -> Self {
        self.balances.insert(asset_id, balances);
        self
    }

    pub fn with_creator(mut self, asset_id: u64, creator: &str) -> Self {
        self.creators.insert(asset_id, creator.to_string());
        self
    }

    pub fn with_account_assets(mut self, address: &str, assets: Vec<AccountAsset>) -> Self {
        self.held.insert(address.to_string(), assets);
        self
    }

    /// Make every query about `address` fail.
    pub fn failing_address(mut self, address: &str) -> Self {
        self.failing_addresses.insert(address.to_string());
        self
    }

    /// Make every balance query about `asset_id` fail.
    pub fn failing_asset(mut self, asset_id: u64) -> Self {
        self.failing_assets.insert(asset_id);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size.max(1));
        self
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Total number of ledger calls made.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of balance pages fetched.
    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> InFlight<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlight(&self.in_flight);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        guard
    }

    fn check_address(&self, address: &str) -> Result<(), LedgerError> {
        if self.failing_addresses.contains(address) {
            return Err(LedgerError::Transport(format!(
                "connection reset while querying {}",
                address
            )));
        }
        Ok(())
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn created_assets(&self, address: &str) -> Result<Vec<CreatedAsset>, LedgerError> {
        let _guard = self.enter().await;
        self.check_address(address)?;
        Ok(self.created.get(address).cloned().unwrap_or_default())
    }

    async fn asset_balances(
        &self,
        asset_id: u64,
        next_token: Option<&str>,
    ) -> Result<BalancePage, LedgerError> {
        let _guard = self.enter().await;
        self.balance_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing_assets.contains(&asset_id) {
            return Err(LedgerError::Status {
                status: 500,
                url: format!("mock://assets/{}/balances", asset_id),
            });
        }

        let all = self.balances.get(&asset_id).map(Vec::as_slice).unwrap_or(&[]);
        let start = match next_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| LedgerError::Decode(format!("bad next token {:?}", token)))?,
            None => 0,
        };
        let end = match self.page_size {
            Some(size) => (start + size).min(all.len()),
            None => all.len(),
        };

        Ok(BalancePage {
            balances: all.get(start..end).map(<[Balance]>::to_vec).unwrap_or_default(),
            next_token: (end < all.len()).then(|| end.to_string()),
        })
    }

    async fn asset_creator(&self, asset_id: u64) -> Result<String, LedgerError> {
        let _guard = self.enter().await;
        self.creators
            .get(&asset_id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(format!("asset {}", asset_id)))
    }

    async fn account_assets(&self, address: &str) -> Result<Vec<AccountAsset>, LedgerError> {
        let _guard = self.enter().await;
        self.check_address(address)?;
        Ok(self.held.get(address).cloned().unwrap_or_default())
    }
}

/// A created asset with the given id, name and unit name.
pub fn created_asset(asset_id: u64, name: &str, unit_name: &str) -> CreatedAsset {
    CreatedAsset {
        asset_id,
        name: name.to_string(),
        unit_name: unit_name.to_string(),
    }
}

/// A live, unfrozen balance row.
pub fn balance(address: &str, amount: u64) -> Balance {
    Balance {
        address: address.to_string(),
        amount,
        deleted: false,
        frozen: false,
    }
}

/// An account asset row.
pub fn account_asset(asset_id: u64, amount: u64) -> AccountAsset {
    AccountAsset {
        asset_id,
        amount,
        frozen: false,
    }
}
