//! Funding eligibility resolver
//!
//! Resolves the funding eligibility of a client against the GraphQL backend
//! and prints the merged result as JSON.
//!
//! ## Environment variables
//!
//! - `CLIENT_ID` - Merchant client id (required)
//! - `BUYER_COUNTRY`, `CURRENCY`, `INTENT` - Optional query inputs
//! - `VAULT` - Request vaultable instruments (`true`/`false`)
//! - `DISABLE_FUNDING` - Comma separated funding sources to disable
//! - `BASELINE` - Baseline eligibility as JSON (default: empty)
//! - `CLIENT_ACCESS_TOKEN` - Bearer token for vaulted instruments
//! - `SMART_BUTTONS_API_URL`, `SMART_BUTTONS_GRAPHQL_URL`, `SMART_BUTTONS_TIMEOUT_MS`

use smart_buttons::api::HttpGraphqlBatch;
use smart_buttons::config::ApiConfig;
use smart_buttons::eligibility::{
    resolve_funding_eligibility, FundingEligibilityOptions, RequestInfo,
};
use smart_buttons::types::{FundingEligibility, FundingSource};
use smart_buttons::ButtonError;
use std::env;
use std::str::FromStr;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let api_config = ApiConfig::from_env()?;
    let executor = HttpGraphqlBatch::new(&api_config)?;

    let client_id =
        env::var("CLIENT_ID").map_err(|_| ButtonError::config("CLIENT_ID must be set"))?;
    let baseline: FundingEligibility = match env::var("BASELINE") {
        Ok(raw) => serde_json::from_str(&raw)?,
        Err(_) => FundingEligibility::new(),
    };

    let mut options = FundingEligibilityOptions::new(client_id, baseline)
        .with_button_session_id(uuid::Uuid::new_v4().simple().to_string());
    if let Some(timeout) = api_config.timeout {
        options = options.with_timeout(timeout);
    }
    if let Ok(country) = env::var("BUYER_COUNTRY") {
        options = options.with_buyer_country(country);
    }
    if let Ok(currency) = env::var("CURRENCY") {
        options = options.with_currency(currency);
    }
    if let Ok(intent) = env::var("INTENT") {
        options = options.with_intent(intent);
    }
    if let Ok(vault) = env::var("VAULT") {
        options = options.with_vault(vault.eq_ignore_ascii_case("true"));
    }
    if let Ok(disabled) = env::var("DISABLE_FUNDING") {
        let sources = disabled
            .split(',')
            .map(str::trim)
            .filter(|source| !source.is_empty())
            .map(FundingSource::from_str)
            .collect::<smart_buttons::Result<Vec<_>>>()?;
        options = options.with_disable_funding(sources);
    }
    if let Ok(token) = env::var("CLIENT_ACCESS_TOKEN") {
        options = options.with_client_access_token(token);
    }

    tracing::info!("Resolving funding eligibility via {}", executor.url());
    let eligibility =
        resolve_funding_eligibility(&RequestInfo::default(), &executor, &options).await;

    println!("{}", serde_json::to_string_pretty(&eligibility)?);
    Ok(())
}
