//! Stdout output handler.
//!
//! Prints results as JSON, suitable for piping to other tools.

use super::{sorted_holdings, to_json, OutputHandler};
use async_trait::async_trait;
use holders::{AssetHolding, HoldingsByCollection};

/// Handler that prints results to stdout.
///
/// Holdings are printed as one JSON document; winners as one JSON line per
/// winner.
pub struct StdoutHandler {
    /// Whether to use pretty printing
    pretty: bool,
}

impl StdoutHandler {
    /// Create a new stdout handler.
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Create a new stdout handler with pretty printing.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Compact or pretty printing, as requested.
    pub fn with_pretty(pretty: bool) -> Self {
        if pretty {
            Self::pretty()
        } else {
            Self::new()
        }
    }
}

impl Default for StdoutHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutputHandler for StdoutHandler {
    async fn handle_holdings(&self, holdings: &HoldingsByCollection) -> anyhow::Result<()> {
        println!("{}", to_json(&sorted_holdings(holdings), self.pretty)?);
        Ok(())
    }

    async fn handle_winners(&self, winners: &[AssetHolding]) -> anyhow::Result<()> {
        for winner in winners {
            println!("{}", to_json(winner, self.pretty)?);
        }
        Ok(())
    }

    fn prints_results(&self) -> bool {
        true
    }
}
