//! Collection holders and weighted raffles.
//!
//! Answers two questions for token-gated drops: who currently holds the
//! assets of a set of collections, and who wins a weighted raffle over those
//! holdings.
//!
//! - [`filter`] decides whether a ledger asset belongs to a [`Collection`]
//! - [`LedgerCollectionClient`] turns a collection into holdings using a
//!   [`Ledger`] backend
//! - [`collect_holdings`] aggregates many collections with bounded
//!   concurrency
//! - [`draw_winners`] and [`run_weighted_raffle`] draw unique winners
//!   without replacement

pub mod aggregator;
pub mod chooser;
pub mod collector;
pub mod error;
pub mod filter;
pub mod lottery;
pub mod traits;
pub mod types;

pub use crate::{
    aggregator::LedgerCollectionClient,
    chooser::WeightedChooser,
    collector::{collect_holdings, HoldingsByCollection},
    error::{Error, LedgerError, Result},
    lottery::{
        create_tickets, draw_winners, pick_unique_winners, run_weighted_raffle, LotteryTicket,
        RaffleParams,
    },
    traits::{CollectionClient, Ledger},
    types::{
        AccountAsset, Asset, AssetHolding, Balance, BalancePage, Collection, CreatedAsset,
        WeightedCollection,
    },
};
