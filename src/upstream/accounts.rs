//! Account fetchers

use serde::{Deserialize, Serialize};

use crate::cache::Fetched;
use crate::cache::registry::SessionRegistry;
use crate::config::FacadeConfig;
use crate::error::Result;
use crate::transport::HttpTransport;
use crate::upstream::{auth_headers, parse};

/// Account resource with its self link attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub account_id: Option<String>,

    #[serde(default)]
    pub account_name: Option<String>,

    /// Self link built by the facade, absent in the upstream payload
    #[serde(default)]
    pub url: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct AccountsResponse {
    #[serde(default)]
    accounts: Vec<Account>,
}

#[derive(Debug, Clone, Deserialize)]
struct AccountResponse {
    account: Account,
}

fn account_url(config: &FacadeConfig, account_id: &str) -> String {
    format!("{}/accounts/{}/", config.public_base_url, account_id)
}

/// List the caller's accounts, each with a self link.
pub async fn accounts<T: HttpTransport>(
    registry: &SessionRegistry<T>,
    config: &FacadeConfig,
    credential: &str,
) -> Result<Fetched<Vec<Account>>> {
    let client = registry.client_for(credential)?;
    let url = format!("{}/v1/account", config.upstream_base_url);
    let fetched = client.get(&url, &auth_headers(credential)).await?;
    let from_cache = fetched.from_cache;
    let response: AccountsResponse = parse(fetched.value)?;

    let accounts = response
        .accounts
        .into_iter()
        .map(|mut account| {
            account.url = account
                .account_id
                .as_deref()
                .map(|id| account_url(config, id));
            account
        })
        .collect();

    Ok(Fetched {
        value: accounts,
        from_cache,
    })
}

/// Fetch a single account by id.
pub async fn account<T: HttpTransport>(
    registry: &SessionRegistry<T>,
    config: &FacadeConfig,
    credential: &str,
    account_id: &str,
) -> Result<Fetched<Account>> {
    let client = registry.client_for(credential)?;
    let url = format!("{}/v1/account/{}", config.upstream_base_url, account_id);
    let fetched = client.get(&url, &auth_headers(credential)).await?;
    let from_cache = fetched.from_cache;
    let response: AccountResponse = parse(fetched.value)?;

    let mut account = response.account;
    account.url = account
        .account_id
        .as_deref()
        .map(|id| account_url(config, id));

    Ok(Fetched {
        value: account,
        from_cache,
    })
}
