//! HTTP implementations of the backend collaborators

use super::{
    ButtonApi, ClientConfigUpdate, GraphqlBatch, GraphqlRequest, ValidatePaymentMethodRequest,
    ValidatePaymentMethodResponse,
};
use crate::config::ApiConfig;
use crate::types::operations;
use crate::{ButtonError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::BTreeSet;

fn build_client(config: &ApiConfig) -> Result<Client> {
    config.validate()?;

    let mut client_builder = Client::builder();
    if let Some(timeout) = config.timeout {
        client_builder = client_builder.timeout(timeout);
    }

    client_builder
        .build()
        .map_err(|e| ButtonError::config(format!("Failed to create HTTP client: {}", e)))
}

/// Batched GraphQL executor over HTTP
#[derive(Debug, Clone)]
pub struct HttpGraphqlBatch {
    url: String,
    client: Client,
}

impl HttpGraphqlBatch {
    /// Create an executor for the configured GraphQL endpoint
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Ok(Self {
            url: config.graphql_url.clone(),
            client: build_client(config)?,
        })
    }

    /// Get the endpoint url
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl GraphqlBatch for HttpGraphqlBatch {
    async fn execute(&self, request: GraphqlRequest) -> Result<Value> {
        tracing::debug!("Sending GraphQL batch to: {}", self.url);

        let mut http_request = self
            .client
            .post(&self.url)
            .header("x-app-name", "smart-payment-buttons")
            .json(&[&request]);

        if let Some(access_token) = &request.access_token {
            http_request = http_request.bearer_auth(access_token);
        }

        let response = http_request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            tracing::error!(
                "GraphQL batch failed with status: {}. Response body: {}",
                status,
                body
            );
            return Err(ButtonError::http(format!(
                "GraphQL request failed with status: {}",
                status
            )));
        }

        let body: Value = response.json().await?;
        let result = match body {
            Value::Array(mut results) if !results.is_empty() => results.swap_remove(0),
            other => other,
        };

        if let Some(errors) = result.get("errors").and_then(Value::as_array) {
            if let Some(first) = errors.first() {
                let message = first
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error");
                return Err(ButtonError::graphql(message));
            }
        }

        result
            .get("data")
            .cloned()
            .filter(|data| !data.is_null())
            .ok_or_else(|| ButtonError::graphql("Response has no data"))
    }
}

const ENABLE_VAULT_MUTATION: &str =
    "mutation EnableVault($orderID: String!) { enableVault(token: $orderID) }";

const VALIDATE_ORDER_QUERY: &str = "query GetCheckoutDetails($orderID: String!) { \
     checkoutSession(token: $orderID) { payees { merchantId email { stringValue } } } }";

const UPDATE_CLIENT_CONFIG_MUTATION: &str = "mutation UpdateClientConfig(\
     $orderID: String!, $fundingSource: ButtonFundingSourceType!, \
     $integrationArtifact: IntegrationArtifactType!, \
     $userExperienceFlow: UserExperienceFlowType!, $productFlow: ProductFlowType!) { \
     updateClientConfig(token: $orderID, fundingSource: $fundingSource, \
     integrationArtifact: $integrationArtifact, userExperienceFlow: $userExperienceFlow, \
     productFlow: $productFlow) }";

/// Button backend calls over HTTP
#[derive(Debug, Clone)]
pub struct HttpButtonApi {
    api_url: String,
    client: Client,
    graphql: HttpGraphqlBatch,
}

impl HttpButtonApi {
    /// Create a client for the configured endpoints
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            client: build_client(config)?,
            graphql: HttpGraphqlBatch::new(config)?,
        })
    }

    /// Get the REST root url
    pub fn url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl ButtonApi for HttpButtonApi {
    async fn enable_vault(&self, order_id: &str, client_access_token: &str) -> Result<()> {
        tracing::debug!("Enabling vault for order {}", order_id);
        let request = GraphqlRequest::new(
            ENABLE_VAULT_MUTATION,
            json!({ "orderID": order_id }),
        )
        .with_access_token(Some(client_access_token.to_string()));

        self.graphql.execute(request).await?;
        Ok(())
    }

    async fn validate_payment_method(
        &self,
        request: &ValidatePaymentMethodRequest,
    ) -> Result<ValidatePaymentMethodResponse> {
        let mut body = json!({
            "payment_source": {
                "token": {
                    "id": request.payment_method_id,
                    "type": "NONCE"
                }
            }
        });
        if request.enable_three_domain_secure {
            body["payment_source"]["contingencies"] = json!(["3D_SECURE"]);
        }

        let mut http_request = self
            .client
            .post(format!(
                "{}/v2/checkout/orders/{}/validate-payment-method",
                self.api_url, request.order_id
            ))
            .bearer_auth(&request.client_access_token)
            .header("PayPal-Client-Metadata-Id", &request.button_session_id)
            .json(&body);

        if let Some(partner_attribution_id) = &request.partner_attribution_id {
            http_request = http_request.header("PayPal-Partner-Attribution-Id", partner_attribution_id);
        }

        let response = http_request.send().await?;
        let status = response.status().as_u16();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);

        Ok(ValidatePaymentMethodResponse { status, body })
    }

    async fn delete_vault(&self, payment_method_id: &str, client_access_token: &str) -> Result<()> {
        let response = self
            .client
            .delete(format!(
                "{}/v2/vault/payment-tokens/{}",
                self.api_url, payment_method_id
            ))
            .bearer_auth(client_access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ButtonError::http(format!(
                "Vault deletion failed with status: {}",
                response.status()
            )));
        }

        Ok(())
    }

    async fn validate_order(
        &self,
        order_id: &str,
        client_id: &str,
        merchant_id: &[String],
    ) -> Result<()> {
        if merchant_id.is_empty() {
            return Ok(());
        }

        let data = self
            .graphql
            .execute(GraphqlRequest::new(
                VALIDATE_ORDER_QUERY,
                json!({ "orderID": order_id }),
            ))
            .await?;

        let payees: BTreeSet<String> = data
            .pointer("/checkoutSession/payees")
            .and_then(Value::as_array)
            .map(|payees| {
                payees
                    .iter()
                    .filter_map(|payee| payee.get("merchantId").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let expected: BTreeSet<String> = merchant_id.iter().cloned().collect();
        if payees != expected {
            tracing::warn!(
                "Order {} payees {:?} do not match merchant ids {:?} for client {}",
                order_id,
                payees,
                expected,
                client_id
            );
            return Err(ButtonError::order_validation(format!(
                "Payees of order {} do not match the expected merchant ids",
                order_id
            )));
        }

        Ok(())
    }

    async fn update_client_config(&self, update: &ClientConfigUpdate) -> Result<()> {
        let user_experience_flow = if update.inline { "INLINE" } else { "INCONTEXT" };
        let request = GraphqlRequest::new(
            UPDATE_CLIENT_CONFIG_MUTATION,
            json!({
                "orderID": update.order_id,
                "fundingSource": update.funding_source,
                "integrationArtifact": "PAYPAL_JS_SDK",
                "userExperienceFlow": user_experience_flow,
                "productFlow": "SMART_PAYMENT_BUTTONS"
            }),
        );

        tracing::debug!(
            operation = operations::UPDATE_CLIENT_CONFIG,
            order_id = %update.order_id,
            "Updating client config"
        );
        self.graphql.execute(request).await?;
        Ok(())
    }
}
