//! Backend API used by the button
//!
//! This module declares the collaborator traits the core consumes and ships
//! reqwest-backed implementations of them.
//!
//! # Architecture
//!
//! - [`GraphqlBatch`] - Batched GraphQL executor used for eligibility and order calls
//! - [`ButtonApi`] - Vault, payment-method and order calls made during a payment
//! - [`client`] - [`HttpGraphqlBatch`] and [`HttpButtonApi`] over HTTP
//!
//! # Examples
//!
//! ```no_run
//! use smart_buttons::api::{GraphqlBatch, GraphqlRequest, HttpGraphqlBatch};
//! use smart_buttons::config::ApiConfig;
//!
//! # async fn example() -> smart_buttons::Result<()> {
//! let batch = HttpGraphqlBatch::new(&ApiConfig::default())?;
//! let data = batch
//!     .execute(GraphqlRequest::new("query { ping }", serde_json::json!({})))
//!     .await?;
//! println!("{}", data);
//! # Ok(())
//! # }
//! ```

use crate::types::FundingSource;
use crate::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

pub mod client;


pub use client::{HttpButtonApi, HttpGraphqlBatch};

/// One query submitted to the batched GraphQL executor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphqlRequest {
    pub query: String,
    pub variables: Value,
    #[serde(skip)]
    pub access_token: Option<String>,
}

impl GraphqlRequest {
    /// Create a request without access token
    pub fn new(query: impl Into<String>, variables: Value) -> Self {
        Self {
            query: query.into(),
            variables,
            access_token: None,
        }
    }

    /// Attach an access token
    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token;
        self
    }
}

/// Batched GraphQL executor
#[async_trait]
pub trait GraphqlBatch: Send + Sync {
    /// Execute the query and return its `data` object
    async fn execute(&self, request: GraphqlRequest) -> Result<Value>;
}

/// Payment method validation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatePaymentMethodRequest {
    pub client_access_token: String,
    pub order_id: String,
    pub payment_method_id: String,
    pub enable_three_domain_secure: bool,
    pub button_session_id: String,
    pub partner_attribution_id: Option<String>,
}

/// Payment method validation outcome
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatePaymentMethodResponse {
    pub status: u16,
    pub body: Value,
}

/// Best-effort client config update sent once an order exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfigUpdate {
    pub order_id: String,
    pub funding_source: FundingSource,
    pub inline: bool,
}

/// Backend calls made while a payment is in progress
#[async_trait]
pub trait ButtonApi: Send + Sync {
    /// Enable vaulting of the instrument used for the order
    async fn enable_vault(&self, order_id: &str, client_access_token: &str) -> Result<()>;

    /// Validate a vaulted payment method against an order
    async fn validate_payment_method(
        &self,
        request: &ValidatePaymentMethodRequest,
    ) -> Result<ValidatePaymentMethodResponse>;

    /// Delete a vaulted payment method
    async fn delete_vault(&self, payment_method_id: &str, client_access_token: &str) -> Result<()>;

    /// Check that the order belongs to the merchant the button was rendered for
    async fn validate_order(&self, order_id: &str, client_id: &str, merchant_id: &[String])
        -> Result<()>;

    /// Record the funding source and experience used for the order
    async fn update_client_config(&self, update: &ClientConfigUpdate) -> Result<()>;
}
