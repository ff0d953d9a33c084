//! Scanner commands run against an in-memory ledger.

use holders::{AssetHolding, Collection, HoldingsByCollection, LedgerCollectionClient};
use holders_scanner::{
    commands::{self, RaffleOptions},
    config::HoldersConfig,
    output::{JsonFileHandler, OutputHandler},
};
use holders_test_utils::{account_asset, balance, created_asset, MockLedger};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

const CONFIG: &str = r#"
    concurrency = 2

    [raffle]
    winners = 2
    excluded_wallets = ["TEAM"]

    [[collections]]
    name = "Mostly Frens"
    addresses = ["MOSTLY"]
    unit_name_prefixes = ["MFER"]

    [[collections]]
    name = "Best Frens"
    weight = 6
    addresses = ["MOSTLY"]
    unit_name_prefixes = ["BFER"]
"#;

fn ledger() -> MockLedger {
    MockLedger::new()
        .with_created_assets(
            "MOSTLY",
            vec![
                created_asset(1, "Mostly Fren #1", "MFER1"),
                created_asset(2, "Best Fren #1", "BFER1"),
                created_asset(3, "Best Fren #2", "BFER2"),
            ],
        )
        .with_balances(1, vec![balance("ALICE", 1), balance("TEAM", 1)])
        .with_balances(2, vec![balance("BOB", 1), balance("MOSTLY", 1)])
        .with_balances(3, vec![balance("CAROL", 2)])
        .with_creator(1, "MOSTLY")
        .with_account_assets("ALICE", vec![account_asset(1, 1), account_asset(2, 1)])
}

fn client() -> Arc<LedgerCollectionClient<MockLedger>> {
    Arc::new(LedgerCollectionClient::new(ledger()))
}

/// Records what it is handed.
#[derive(Default)]
struct RecordingHandler {
    holdings: Mutex<Option<HoldingsByCollection>>,
    winners: Mutex<Vec<AssetHolding>>,
}

#[async_trait::async_trait]
impl OutputHandler for RecordingHandler {
    async fn handle_holdings(&self, holdings: &HoldingsByCollection) -> anyhow::Result<()> {
        *self.holdings.lock().unwrap() = Some(holdings.clone());
        Ok(())
    }

    async fn handle_winners(&self, winners: &[AssetHolding]) -> anyhow::Result<()> {
        self.winners.lock().unwrap().extend_from_slice(winners);
        Ok(())
    }
}

#[tokio::test]
async fn test_scan_holdings_writes_every_collection() {
    let config = HoldersConfig::from_toml(CONFIG).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("holdings.json");
    let handler = JsonFileHandler::new(&path);

    let holdings = commands::scan_holdings(client(), &config, &handler)
        .await
        .unwrap();
    assert_eq!(holdings["Mostly Frens"].len(), 2);
    assert_eq!(holdings["Best Frens"].len(), 3);

    let written: HashMap<String, Vec<AssetHolding>> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, holdings);
}

#[tokio::test]
async fn test_raffle_excludes_team_and_creator_wallets() {
    let config = HoldersConfig::from_toml(CONFIG).unwrap();
    let handler = RecordingHandler::default();

    for seed in 0..10 {
        let options = RaffleOptions {
            winners: Some(3),
            seed: Some(seed),
        };
        let outcome = commands::raffle(client(), &config, &options, &handler)
            .await
            .unwrap();

        assert_eq!(outcome.seed, seed);
        let mut addresses: Vec<_> = outcome.winners.iter().map(|w| w.address.as_str()).collect();
        addresses.sort();
        assert_eq!(addresses, vec!["ALICE", "BOB", "CAROL"]);
    }
    assert_eq!(handler.winners.lock().unwrap().len(), 30);
}

#[tokio::test]
async fn test_raffle_seed_reproduces_draw() {
    let mut config = HoldersConfig::from_toml(CONFIG).unwrap();
    config.raffle.seed = Some(7);
    let handler = RecordingHandler::default();

    let first = commands::raffle(client(), &config, &RaffleOptions::default(), &handler)
        .await
        .unwrap();
    let second = commands::raffle(client(), &config, &RaffleOptions::default(), &handler)
        .await
        .unwrap();

    assert_eq!(first.seed, 7);
    assert_eq!(first.winners.len(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_raffle_generated_seed_is_reported() {
    let config = HoldersConfig::from_toml(CONFIG).unwrap();
    let handler = RecordingHandler::default();

    let outcome = commands::raffle(client(), &config, &RaffleOptions::default(), &handler)
        .await
        .unwrap();
    let replay = commands::raffle(
        client(),
        &config,
        &RaffleOptions {
            winners: None,
            seed: Some(outcome.seed),
        },
        &handler,
    )
    .await
    .unwrap();

    assert_eq!(outcome, replay);
}

#[tokio::test]
async fn test_raffle_rejects_zero_winners_override() {
    let config = HoldersConfig::from_toml(CONFIG).unwrap();
    let handler = RecordingHandler::default();
    let options = RaffleOptions {
        winners: Some(0),
        seed: Some(1),
    };

    let client = client();

    assert!(commands::raffle(client.clone(), &config, &options, &handler)
        .await
        .is_err());
    assert_eq!(client.ledger().calls(), 0);
}

#[tokio::test]
async fn test_raffle_too_many_winners_is_not_a_programmer_error() {
    let config = HoldersConfig::from_toml(CONFIG).unwrap();
    let handler = RecordingHandler::default();
    let options = RaffleOptions {
        winners: Some(10),
        seed: Some(1),
    };

    let err = commands::raffle(client(), &config, &options, &handler)
        .await
        .unwrap_err();
    assert!(!commands::is_programmer_error(&err));
    assert!(matches!(
        err.downcast_ref::<holders::Error>(),
        Some(holders::Error::InsufficientCandidates { .. })
    ));
}

#[tokio::test]
async fn test_asset_ownership() {
    let client = client();
    assert_eq!(
        commands::asset_ownership(client.as_ref(), 1).await.unwrap(),
        Some(true)
    );

    let nobody = LedgerCollectionClient::new(
        MockLedger::new()
            .with_creator(9, "MOSTLY")
            .with_balances(9, vec![balance("EMPTY", 0)]),
    );
    assert_eq!(commands::asset_ownership(&nobody, 9).await.unwrap(), None);
}

#[tokio::test]
async fn test_unknown_creator_is_an_error() {
    let client = LedgerCollectionClient::new(MockLedger::new());
    assert!(commands::asset_ownership(&client, 42).await.is_err());
}

#[test]
fn test_collection_list_drops_weights() {
    let config = HoldersConfig::from_toml(CONFIG).unwrap();
    let mut best = Collection::new("Best Frens", vec!["MOSTLY".to_string()]);
    best.unit_name_prefixes = vec!["BFER".to_string()];
    assert_eq!(config.collection_list()[1], best);
}
