//! Holders Scanner
//!
//! Finds the holders of Algorand NFT collections and runs weighted raffles
//! over them. This library provides:
//!
//! - TOML configuration of collections, weights and raffle settings
//! - An Algorand REST [`Ledger`](holders::Ledger) (node + indexer APIs)
//! - Output handlers (stdout, JSON file)
//! - The scanner's commands, usable with any collection client
//!
//! # Architecture
//!
//! Aggregation and the raffle live in the `holders` crate and only see the
//! `Ledger` trait; this crate wires them to the network, the configuration
//! file and the command line.

pub mod algorand;
pub mod commands;
pub mod config;
pub mod output;

pub use algorand::AlgorandLedger;
pub use commands::{RaffleOptions, RaffleOutcome};
pub use config::{HoldersConfig, LedgerConfig, RaffleConfig};
