//! Output handlers for aggregated holdings and raffle winners.
//!
//! - Stdout (JSON)
//! - File (pretty JSON, written atomically)

mod file;
mod stdout;

pub use file::JsonFileHandler;
pub use stdout::StdoutHandler;

use async_trait::async_trait;
use holders::{AssetHolding, HoldingsByCollection};
use serde::Serialize;
use std::collections::BTreeMap;

/// Trait for result output handlers.
#[async_trait]
pub trait OutputHandler: Send + Sync {
    /// Handle the holdings of every collection.
    async fn handle_holdings(&self, holdings: &HoldingsByCollection) -> anyhow::Result<()>;

    /// Handle the winners of a raffle, in draw order.
    async fn handle_winners(&self, winners: &[AssetHolding]) -> anyhow::Result<()>;

    /// Whether results are printed to stdout, leaving no room for a
    /// separate summary there.
    fn prints_results(&self) -> bool {
        false
    }
}

/// Holdings keyed by collection name in sorted order, so the same holdings
/// always serialize to the same document.
pub fn sorted_holdings(holdings: &HoldingsByCollection) -> BTreeMap<&str, &[AssetHolding]> {
    holdings
        .iter()
        .map(|(name, list)| (name.as_str(), list.as_slice()))
        .collect()
}

/// Serialize a value as JSON, optionally pretty printed.
pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> anyhow::Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}
