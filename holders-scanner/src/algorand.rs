//! Algorand REST ledger.
//!
//! Account and asset lookups go to the node (algod) API, balance lists to the
//! indexer API. Response bodies are decoded by small `parse_*` functions so
//! the JSON mapping can be checked without a network.

use async_trait::async_trait;
use holders::{AccountAsset, Balance, BalancePage, CreatedAsset, Ledger, LedgerError};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    StatusCode,
};
use serde::Deserialize;
use std::time::Duration;

use crate::config::LedgerConfig;

const ALGOD_TOKEN_HEADER: &str = "X-Algo-API-Token";
const INDEXER_TOKEN_HEADER: &str = "X-Indexer-API-Token";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct AccountResponse {
    #[serde(default)]
    created_assets: Vec<CreatedAssetJson>,
    #[serde(default)]
    assets: Vec<AccountAssetJson>,
}

#[derive(Debug, Deserialize)]
struct CreatedAssetJson {
    index: u64,
    #[serde(default)]
    params: AssetParamsJson,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct AssetParamsJson {
    #[serde(default)]
    name: String,
    #[serde(default)]
    unit_name: String,
    #[serde(default)]
    creator: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct AccountAssetJson {
    asset_id: u64,
    #[serde(default)]
    amount: u64,
    #[serde(default)]
    is_frozen: bool,
}

#[derive(Debug, Deserialize)]
struct AssetResponse {
    #[serde(default)]
    params: AssetParamsJson,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct BalancesResponse {
    #[serde(default)]
    balances: Vec<BalanceJson>,
    #[serde(default)]
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct BalanceJson {
    address: String,
    #[serde(default)]
    amount: u64,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    is_frozen: bool,
}

fn decode<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, LedgerError> {
    serde_json::from_str(body).map_err(|e| LedgerError::Decode(e.to_string()))
}

/// Parse the `created-assets` of an algod account response.
pub fn parse_created_assets(body: &str) -> Result<Vec<CreatedAsset>, LedgerError> {
    let account: AccountResponse = decode(body)?;
    Ok(account
        .created_assets
        .into_iter()
        .map(|a| CreatedAsset {
            asset_id: a.index,
            name: a.params.name,
            unit_name: a.params.unit_name,
        })
        .collect())
}

/// Parse the `assets` an algod account response says the account holds.
pub fn parse_account_assets(body: &str) -> Result<Vec<AccountAsset>, LedgerError> {
    let account: AccountResponse = decode(body)?;
    Ok(account
        .assets
        .into_iter()
        .map(|a| AccountAsset {
            asset_id: a.asset_id,
            amount: a.amount,
            frozen: a.is_frozen,
        })
        .collect())
}

/// Parse the creator out of an algod asset response.
pub fn parse_asset_creator(body: &str) -> Result<String, LedgerError> {
    let asset: AssetResponse = decode(body)?;
    if asset.params.creator.is_empty() {
        return Err(LedgerError::Decode("asset has no creator".to_string()));
    }
    Ok(asset.params.creator)
}

/// Parse one page of an indexer balance list. An empty `next-token` is
/// treated as the last page.
pub fn parse_balance_page(body: &str) -> Result<BalancePage, LedgerError> {
    let page: BalancesResponse = decode(body)?;
    Ok(BalancePage {
        balances: page
            .balances
            .into_iter()
            .map(|b| Balance {
                address: b.address,
                amount: b.amount,
                deleted: b.deleted,
                frozen: b.is_frozen,
            })
            .collect(),
        next_token: page.next_token.filter(|token| !token.is_empty()),
    })
}

/// Which Algorand API a request goes to.
#[derive(Debug, Clone, Copy)]
enum Api {
    Algod,
    Indexer,
}

/// [`Ledger`] backed by the algod and indexer REST APIs.
pub struct AlgorandLedger {
    client: reqwest::Client,
    algod_url: String,
    algod_token: String,
    indexer_url: String,
    indexer_token: String,
    page_limit: u64,
}

impl AlgorandLedger {
    /// Build a ledger client from configuration.
    pub fn from_config(config: &LedgerConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| anyhow::anyhow!("Invalid header name {:?}: {}", name, e))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| anyhow::anyhow!("Invalid value for header {}: {}", name, e))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            algod_url: config.algod_url.trim_end_matches('/').to_string(),
            algod_token: config.algod_token.clone(),
            indexer_url: config.indexer_url.trim_end_matches('/').to_string(),
            indexer_token: config.indexer_token.clone(),
            page_limit: config.page_limit,
        })
    }

    fn url(&self, api: Api, path: &str) -> String {
        match api {
            Api::Algod => format!("{}{}", self.algod_url, path),
            Api::Indexer => format!("{}{}", self.indexer_url, path),
        }
    }

    /// GET a path and return the response body.
    async fn get(
        &self,
        api: Api,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<String, LedgerError> {
        let url = self.url(api, path);
        let mut request = self.client.get(&url).query(query);
        request = match api {
            Api::Algod if !self.algod_token.is_empty() => {
                request.header(ALGOD_TOKEN_HEADER, &self.algod_token)
            }
            Api::Indexer if !self.indexer_token.is_empty() => {
                request.header(INDEXER_TOKEN_HEADER, &self.indexer_token)
            }
            _ => request,
        };

        tracing::debug!("GET {}", url);
        let response = request
            .send()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LedgerError::NotFound(url));
        }
        if !status.is_success() {
            return Err(LedgerError::Status {
                status: status.as_u16(),
                url,
            });
        }

        response
            .text()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))
    }
}

#[async_trait]
impl Ledger for AlgorandLedger {
    async fn created_assets(&self, address: &str) -> Result<Vec<CreatedAsset>, LedgerError> {
        let body = self
            .get(Api::Algod, &format!("/v2/accounts/{}", address), &[])
            .await?;
        parse_created_assets(&body)
    }

    async fn asset_balances(
        &self,
        asset_id: u64,
        next_token: Option<&str>,
    ) -> Result<BalancePage, LedgerError> {
        let mut query = vec![("limit", self.page_limit.to_string())];
        if let Some(token) = next_token {
            query.push(("next", token.to_string()));
        }
        let body = self
            .get(
                Api::Indexer,
                &format!("/v2/assets/{}/balances", asset_id),
                &query,
            )
            .await?;
        parse_balance_page(&body)
    }

    async fn asset_creator(&self, asset_id: u64) -> Result<String, LedgerError> {
        let body = self
            .get(Api::Algod, &format!("/v2/assets/{}", asset_id), &[])
            .await?;
        parse_asset_creator(&body)
    }

    async fn account_assets(&self, address: &str) -> Result<Vec<AccountAsset>, LedgerError> {
        let body = self
            .get(Api::Algod, &format!("/v2/accounts/{}", address), &[])
            .await?;
        parse_account_assets(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_parse_created_assets() {
        let body = r#"{
            "address": "CREATOR",
            "amount": 1000,
            "created-assets": [
                {"index": 1, "params": {"unit-name": "BRO#1", "total": 1, "decimals": 0}},
                {"index": 7, "params": {"name": "Mostly Fren #7", "unit-name": "MFER7"}}
            ]
        }"#;

        let assets = parse_created_assets(body).unwrap();
        assert_eq!(
            assets,
            vec![
                CreatedAsset {
                    asset_id: 1,
                    name: String::new(),
                    unit_name: "BRO#1".to_string(),
                },
                CreatedAsset {
                    asset_id: 7,
                    name: "Mostly Fren #7".to_string(),
                    unit_name: "MFER7".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_account_without_assets() {
        let body = r#"{"address": "EMPTY", "amount": 0}"#;
        assert!(parse_created_assets(body).unwrap().is_empty());
        assert!(parse_account_assets(body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_account_assets() {
        let body = r#"{
            "assets": [
                {"asset-id": 1, "amount": 1, "is-frozen": false},
                {"asset-id": 9, "amount": 0, "is-frozen": true}
            ]
        }"#;

        let assets = parse_account_assets(body).unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].asset_id, 1);
        assert_eq!(assets[0].amount, 1);
        assert!(assets[1].frozen);
    }

    #[test]
    fn test_parse_asset_creator() {
        let body = r#"{"index": 1, "params": {"creator": "CREATOR", "unit-name": "BRO#1"}}"#;
        assert_eq!(parse_asset_creator(body).unwrap(), "CREATOR");

        let missing = r#"{"index": 1, "params": {}}"#;
        assert!(matches!(
            parse_asset_creator(missing),
            Err(LedgerError::Decode(_))
        ));
    }

    #[test]
    fn test_parse_balance_page() {
        let body = r#"{
            "current-round": 100,
            "balances": [
                {"address": "HOLDER", "amount": 1, "deleted": false, "is-frozen": false},
                {"address": "GONE", "amount": 1, "deleted": true, "is-frozen": false}
            ],
            "next-token": "HOLDER"
        }"#;

        let page = parse_balance_page(body).unwrap();
        assert_eq!(page.balances.len(), 2);
        assert_eq!(page.balances[0].address, "HOLDER");
        assert!(page.balances[1].deleted);
        assert_eq!(page.next_token.as_deref(), Some("HOLDER"));
    }

    #[test]
    fn test_empty_next_token_ends_paging() {
        let body = r#"{"balances": [], "next-token": ""}"#;
        assert_eq!(parse_balance_page(body).unwrap().next_token, None);
    }

    #[test]
    fn test_bad_body_is_decode_error() {
        assert!(matches!(
            parse_balance_page("<html>"),
            Err(LedgerError::Decode(_))
        ));
    }

    #[test]
    fn test_from_config_trims_urls() {
        let config = LedgerConfig {
            algod_url: "http://localhost:4001/".to_string(),
            indexer_url: "http://localhost:8980".to_string(),
            headers: BTreeMap::from([(
                "Referer".to_string(),
                "https://www.mostlyfrens.xyz/".to_string(),
            )]),
            ..Default::default()
        };

        let ledger = AlgorandLedger::from_config(&config).unwrap();
        assert_eq!(
            ledger.url(Api::Algod, "/v2/assets/1"),
            "http://localhost:4001/v2/assets/1"
        );
        assert_eq!(
            ledger.url(Api::Indexer, "/v2/assets/1/balances"),
            "http://localhost:8980/v2/assets/1/balances"
        );
    }

    #[test]
    fn test_from_config_rejects_bad_header() {
        let config = LedgerConfig {
            headers: BTreeMap::from([("bad header".to_string(), "x".to_string())]),
            ..Default::default()
        };
        assert!(AlgorandLedger::from_config(&config).is_err());
    }
}
