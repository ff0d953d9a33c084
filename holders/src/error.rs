//! Error types for holder aggregation and raffle draws.

use displaydoc::Display;
use thiserror::Error;

/// Errors reported by a ledger backend.
#[derive(Debug, Display, Error)]
pub enum LedgerError {
    /// Transport failure: {0}
    Transport(String),

    /// Ledger returned status {status} for {url}
    Status { status: u16, url: String },

    /// Failed to decode ledger response: {0}
    Decode(String),

    /// Not found: {0}
    NotFound(String),
}

/// Errors that can occur while collecting holdings or drawing winners.
#[derive(Debug, Display, Error)]
pub enum Error {
    /// Ledger call failed while {context}: {source}
    Ledger {
        context: String,
        #[source]
        source: LedgerError,
    },

    /// No eligible holders found for asset {asset_id}
    NoHoldersFound { asset_id: u64 },

    /// Aggregation failed for collection "{collection}": {source}
    Aggregation {
        collection: String,
        #[source]
        source: Box<Error>,
    },

    /// Collection "{collection}" appears more than once
    DuplicateCollection { collection: String },

    /// Aggregation worker panicked: {0}
    WorkerPanicked(String),

    /// Not enough unique eligible holdings to select {requested} winners (selected {selected})
    InsufficientCandidates { requested: usize, selected: usize },

    /// Collection "{collection}" has holdings but no weighted entry
    ConfigurationMismatch { collection: String },

    /// Total ticket weight overflows
    WeightOverflow,
}

impl Error {
    pub(crate) fn ledger(context: impl Into<String>, source: LedgerError) -> Self {
        Error::Ledger {
            context: context.into(),
            source,
        }
    }

    /// True for errors that indicate a caller bug rather than a runtime
    /// condition. Binaries should abort on these instead of retrying.
    pub fn is_programmer_error(&self) -> bool {
        match self {
            Error::ConfigurationMismatch { .. } | Error::DuplicateCollection { .. } => true,
            Error::Aggregation { source, .. } => source.is_programmer_error(),
            _ => false,
        }
    }
}

/// Result type for holder operations.
pub type Result<T> = std::result::Result<T, Error>;
