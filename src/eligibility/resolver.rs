//! Funding eligibility resolution with fallback to the baseline

use super::merge::merge;
use super::query::EligibilitySelection;
use crate::api::{GraphqlBatch, GraphqlRequest};
use crate::telemetry::{Logger, TracingLogger};
use crate::types::{events, operations, CardBrand, FundingEligibility, FundingSource};
use crate::{ButtonError, Result};
use http::header::{COOKIE, USER_AGENT};
use http::{HeaderMap, HeaderName};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// The inbound page request eligibility is resolved for
#[derive(Debug, Clone, Default)]
pub struct RequestInfo {
    ip: Option<String>,
    headers: HeaderMap,
}

impl RequestInfo {
    /// Create request info from the client address and headers
    pub fn from_parts(ip: Option<String>, headers: HeaderMap) -> Self {
        Self { ip, headers }
    }

    /// Client IP address
    pub fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    /// Request headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value, empty when missing
    pub fn header(&self, name: &HeaderName) -> Result<String> {
        match self.headers.get(name) {
            Some(value) => value.to_str().map(str::to_string).map_err(|_| {
                ButtonError::invalid_request(format!("Header {} is not valid UTF-8", name))
            }),
            None => Ok(String::new()),
        }
    }
}

/// Inputs of an eligibility resolution
#[derive(Clone)]
pub struct FundingEligibilityOptions {
    pub logger: Arc<dyn Logger>,
    pub client_id: String,
    pub buyer_country: Option<String>,
    pub currency: Option<String>,
    pub intent: Option<String>,
    pub commit: bool,
    pub vault: bool,
    pub disable_funding: Vec<FundingSource>,
    pub disable_card: Vec<CardBrand>,
    pub merchant_id: Vec<String>,
    pub button_session_id: String,
    pub client_access_token: Option<String>,
    pub basic_funding_eligibility: FundingEligibility,
    pub timeout: Option<Duration>,
}

impl FundingEligibilityOptions {
    /// Create options for a client and its baseline eligibility
    pub fn new(client_id: impl Into<String>, basic_funding_eligibility: FundingEligibility) -> Self {
        Self {
            logger: Arc::new(TracingLogger),
            client_id: client_id.into(),
            buyer_country: None,
            currency: None,
            intent: None,
            commit: true,
            vault: false,
            disable_funding: Vec::new(),
            disable_card: Vec::new(),
            merchant_id: Vec::new(),
            button_session_id: String::new(),
            client_access_token: None,
            basic_funding_eligibility,
            timeout: None,
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_buyer_country(mut self, buyer_country: impl Into<String>) -> Self {
        self.buyer_country = Some(buyer_country.into());
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    pub fn with_commit(mut self, commit: bool) -> Self {
        self.commit = commit;
        self
    }

    pub fn with_vault(mut self, vault: bool) -> Self {
        self.vault = vault;
        self
    }

    pub fn with_disable_funding(mut self, disable_funding: Vec<FundingSource>) -> Self {
        self.disable_funding = disable_funding;
        self
    }

    pub fn with_disable_card(mut self, disable_card: Vec<CardBrand>) -> Self {
        self.disable_card = disable_card;
        self
    }

    pub fn with_merchant_id(mut self, merchant_id: Vec<String>) -> Self {
        self.merchant_id = merchant_id;
        self
    }

    pub fn with_button_session_id(mut self, button_session_id: impl Into<String>) -> Self {
        self.button_session_id = button_session_id.into();
        self
    }

    pub fn with_client_access_token(mut self, token: impl Into<String>) -> Self {
        self.client_access_token = Some(token.into());
        self
    }

    /// Bound the backend call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl fmt::Debug for FundingEligibilityOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FundingEligibilityOptions")
            .field("client_id", &self.client_id)
            .field("buyer_country", &self.buyer_country)
            .field("currency", &self.currency)
            .field("intent", &self.intent)
            .field("commit", &self.commit)
            .field("vault", &self.vault)
            .field("merchant_id", &self.merchant_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Variables of the `GetFundingEligibility` query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FundingEligibilityVariables {
    #[serde(rename = "clientID")]
    pub client_id: String,
    #[serde(rename = "buyerCountry")]
    pub buyer_country: Option<String>,
    pub ip: String,
    pub cookies: String,
    pub currency: Option<String>,
    pub intent: Option<String>,
    pub commit: bool,
    pub vault: bool,
    #[serde(rename = "disableFunding")]
    pub disable_funding: Vec<String>,
    #[serde(rename = "disableCard")]
    pub disable_card: Vec<String>,
    #[serde(rename = "merchantID")]
    pub merchant_id: Vec<String>,
    #[serde(rename = "buttonSessionID")]
    pub button_session_id: String,
    #[serde(rename = "userAgent")]
    pub user_agent: String,
}

impl FundingEligibilityVariables {
    /// Derive the variables from the inbound request and the options
    pub fn from_request(request: &RequestInfo, options: &FundingEligibilityOptions) -> Result<Self> {
        Ok(Self {
            client_id: options.client_id.clone(),
            buyer_country: options.buyer_country.clone(),
            ip: request.ip().unwrap_or_default().to_string(),
            cookies: request.header(&COOKIE)?,
            currency: options.currency.clone(),
            intent: options.intent.as_ref().map(|intent| intent.to_uppercase()),
            commit: options.commit,
            vault: options.vault,
            disable_funding: options
                .disable_funding
                .iter()
                .map(|source| source.as_str().to_uppercase())
                .collect(),
            disable_card: options
                .disable_card
                .iter()
                .map(|brand| brand.as_str().to_uppercase())
                .collect(),
            merchant_id: options.merchant_id.clone(),
            button_session_id: options.button_session_id.clone(),
            user_agent: request.header(&USER_AGENT)?,
        })
    }
}

/// Resolve funding eligibility, falling back to the baseline on any failure
///
/// Only the fields the baseline does not define are requested, and only
/// those are merged back, so baseline values are never overwritten.
pub async fn resolve_funding_eligibility(
    request: &RequestInfo,
    executor: &dyn GraphqlBatch,
    options: &FundingEligibilityOptions,
) -> FundingEligibility {
    match try_resolve(request, executor, options).await {
        Ok(eligibility) => eligibility,
        Err(error) => {
            options.logger.error(
                request,
                events::FUNDING_ELIGIBILITY_FALLBACK,
                json!({ "err": error.to_string() }),
            );
            options.basic_funding_eligibility.clone()
        }
    }
}

async fn try_resolve(
    request: &RequestInfo,
    executor: &dyn GraphqlBatch,
    options: &FundingEligibilityOptions,
) -> Result<FundingEligibility> {
    let baseline = &options.basic_funding_eligibility;
    let variables = FundingEligibilityVariables::from_request(request, options)?;

    let selection = EligibilitySelection::for_baseline(baseline);
    if selection.is_empty() {
        tracing::debug!("Funding eligibility fully known, skipping query");
        return Ok(baseline.clone());
    }

    let graphql_request =
        GraphqlRequest::new(selection.to_query(), serde_json::to_value(&variables)?)
            .with_access_token(options.client_access_token.clone());

    let execution = executor.execute(graphql_request);
    let data = match options.timeout {
        Some(timeout) => tokio::time::timeout(timeout, execution)
            .await
            .map_err(|_| ButtonError::timeout(operations::GET_FUNDING_ELIGIBILITY))??,
        None => execution.await?,
    };

    let raw = data
        .get("fundingEligibility")
        .cloned()
        .ok_or_else(|| ButtonError::graphql("Response has no fundingEligibility"))?;
    let fresh: FundingEligibility = serde_json::from_value(raw)?;

    Ok(merge(baseline, &selection.restrict(fresh)))
}
