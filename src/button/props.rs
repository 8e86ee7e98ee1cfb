//! Integrator props, callbacks and service data

use crate::types::{FundingEligibility, FundingSource};
use crate::{ButtonError, Result};
use futures_util::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Approval handler supplied by the integrator
pub type OnApprove =
    Arc<dyn Fn(ApproveData, ApproveActions) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Cancellation handler supplied by the integrator
pub type OnCancel = Arc<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Shipping change handler supplied by the integrator
pub type OnShippingChange =
    Arc<dyn Fn(ShippingChangeData) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Error handler supplied by the integrator
pub type OnError = Arc<dyn Fn(&ButtonError) + Send + Sync>;

/// Billing agreement creator; mutually exclusive with implicit vaulting
pub type CreateBillingAgreement = Arc<dyn Fn() -> BoxFuture<'static, Result<String>> + Send + Sync>;

/// Subscription creator; mutually exclusive with implicit vaulting
pub type CreateSubscription = Arc<dyn Fn() -> BoxFuture<'static, Result<String>> + Send + Sync>;

/// Restart capability handed to the approval handler
pub type RestartFn = Arc<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Data passed to the approval handler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveData {
    #[serde(rename = "orderID", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(rename = "payerID", skip_serializing_if = "Option::is_none")]
    pub payer_id: Option<String>,
    #[serde(rename = "paymentID", skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(rename = "billingToken", skip_serializing_if = "Option::is_none")]
    pub billing_token: Option<String>,
    #[serde(rename = "subscriptionID", skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(rename = "buyerAccessToken", skip_serializing_if = "Option::is_none")]
    pub buyer_access_token: Option<String>,
}

/// Actions available to the approval handler
#[derive(Clone)]
pub struct ApproveActions {
    restart: RestartFn,
}

impl ApproveActions {
    /// Create approval actions around a restart capability
    pub fn new(restart: RestartFn) -> Self {
        Self { restart }
    }

    /// Restart the payment in a fresh checkout
    ///
    /// A restart hands the buyer over to a new checkout session and never
    /// completes; it only resolves if the new session cannot be initialized.
    pub async fn restart(&self) -> Result<()> {
        (self.restart)().await
    }
}

impl fmt::Debug for ApproveActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApproveActions")
            .field("restart", &"<function>")
            .finish()
    }
}

/// Data passed to the click validation hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickData {
    pub funding_source: FundingSource,
}

/// Data passed to the shipping change handler
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingChangeData {
    pub buyer_access_token: Option<String>,
    pub data: serde_json::Value,
}

/// Order creator returning the order identifier
#[derive(Clone)]
pub struct CreateOrder {
    inner: Arc<dyn Fn() -> BoxFuture<'static, Result<String>> + Send + Sync>,
}

impl CreateOrder {
    /// Wrap an async order creator
    pub fn new<F, Fut>(create: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        Self {
            inner: Arc::new(move || create().boxed()),
        }
    }

    /// Create an order
    pub async fn call(&self) -> Result<String> {
        (self.inner)().await
    }

    /// Wrap this creator so that the underlying call runs exactly once
    ///
    /// Every call of the returned creator, concurrent or later, observes the
    /// outcome of that single invocation.
    pub fn memoize(&self) -> Self {
        let cell: Arc<OnceCell<Result<String>>> = Arc::new(OnceCell::new());
        let base = self.clone();
        Self::new(move || {
            let cell = cell.clone();
            let base = base.clone();
            async move { cell.get_or_init(|| base.call()).await.clone() }
        })
    }
}

impl fmt::Debug for CreateOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CreateOrder(<function>)")
    }
}

/// Click validation hook; `Ok(false)` aborts the attempt
#[derive(Clone)]
pub struct ClickHandler {
    inner: Arc<dyn Fn(ClickData) -> BoxFuture<'static, Result<bool>> + Send + Sync>,
}

impl ClickHandler {
    /// Wrap an async click validation hook
    pub fn new<F, Fut>(validate: F) -> Self
    where
        F: Fn(ClickData) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool>> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |data: ClickData| validate(data).boxed()),
        }
    }

    /// Run the hook
    pub async fn call(&self, data: ClickData) -> Result<bool> {
        (self.inner)(data).await
    }

    /// Wrap this hook so that it runs once per attempt
    pub fn memoize(&self) -> Self {
        let cell: Arc<OnceCell<Result<bool>>> = Arc::new(OnceCell::new());
        let base = self.clone();
        Self::new(move |data: ClickData| {
            let cell = cell.clone();
            let base = base.clone();
            async move { cell.get_or_init(|| base.call(data)).await.clone() }
        })
    }
}

impl fmt::Debug for ClickHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClickHandler(<function>)")
    }
}

/// Integrator configuration and callbacks for one button widget
#[derive(Clone)]
pub struct Props {
    pub client_id: String,
    pub button_session_id: String,
    pub create_order: CreateOrder,
    pub on_approve: OnApprove,
    pub on_cancel: OnCancel,
    pub on_click: Option<ClickHandler>,
    pub on_shipping_change: Option<OnShippingChange>,
    pub on_error: OnError,
    pub create_billing_agreement: Option<CreateBillingAgreement>,
    pub create_subscription: Option<CreateSubscription>,
    pub locale: Option<String>,
    pub commit: bool,
    pub vault: bool,
    pub client_access_token: Option<String>,
    pub enable_three_domain_secure: bool,
    pub partner_attribution_id: Option<String>,
}

impl Props {
    /// Create props with the two mandatory callbacks
    pub fn new<F, Fut>(client_id: impl Into<String>, create_order: CreateOrder, on_approve: F) -> Self
    where
        F: Fn(ApproveData, ApproveActions) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            client_id: client_id.into(),
            button_session_id: uuid::Uuid::new_v4().simple().to_string(),
            create_order,
            on_approve: Arc::new(move |data: ApproveData, actions: ApproveActions| {
                on_approve(data, actions).boxed()
            }),
            on_cancel: Arc::new(|| async { Ok::<(), ButtonError>(()) }.boxed()),
            on_click: None,
            on_shipping_change: None,
            on_error: Arc::new(|err: &ButtonError| tracing::error!("Unhandled button error: {}", err)),
            create_billing_agreement: None,
            create_subscription: None,
            locale: None,
            commit: true,
            vault: false,
            client_access_token: None,
            enable_three_domain_secure: false,
            partner_attribution_id: None,
        }
    }

    /// Validate the props
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(ButtonError::config("Client ID cannot be empty"));
        }

        if self.create_billing_agreement.is_some() && self.create_subscription.is_some() {
            return Err(ButtonError::config(
                "Only one of createBillingAgreement and createSubscription may be passed",
            ));
        }

        Ok(())
    }

    /// Set the button session id
    pub fn with_button_session_id(mut self, button_session_id: impl Into<String>) -> Self {
        self.button_session_id = button_session_id.into();
        self
    }

    /// Set the cancellation handler
    pub fn with_on_cancel<F, Fut>(mut self, on_cancel: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.on_cancel = Arc::new(move || on_cancel().boxed());
        self
    }

    /// Set the click validation hook
    pub fn with_on_click<F, Fut>(mut self, on_click: F) -> Self
    where
        F: Fn(ClickData) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool>> + Send + 'static,
    {
        self.on_click = Some(ClickHandler::new(on_click));
        self
    }

    /// Set the shipping change handler
    pub fn with_on_shipping_change<F, Fut>(mut self, on_shipping_change: F) -> Self
    where
        F: Fn(ShippingChangeData) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.on_shipping_change = Some(Arc::new(move |data: ShippingChangeData| {
            on_shipping_change(data).boxed()
        }));
        self
    }

    /// Set the error handler
    pub fn with_on_error<F>(mut self, on_error: F) -> Self
    where
        F: Fn(&ButtonError) + Send + Sync + 'static,
    {
        self.on_error = Arc::new(on_error);
        self
    }

    /// Set the billing agreement creator
    pub fn with_create_billing_agreement<F, Fut>(mut self, create: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        self.create_billing_agreement = Some(Arc::new(move || create().boxed()));
        self
    }

    /// Set the subscription creator
    pub fn with_create_subscription<F, Fut>(mut self, create: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        self.create_subscription = Some(Arc::new(move || create().boxed()));
        self
    }

    /// Set the locale
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Set whether the buyer commits to pay in checkout
    pub fn with_commit(mut self, commit: bool) -> Self {
        self.commit = commit;
        self
    }

    /// Set whether vaulting was explicitly requested
    pub fn with_vault(mut self, vault: bool) -> Self {
        self.vault = vault;
        self
    }

    /// Set the client access token
    pub fn with_client_access_token(mut self, token: impl Into<String>) -> Self {
        self.client_access_token = Some(token.into());
        self
    }

    /// Enable 3DS contingency handling on payment method validation
    pub fn with_three_domain_secure(mut self, enabled: bool) -> Self {
        self.enable_three_domain_secure = enabled;
        self
    }

    /// Set the partner attribution id
    pub fn with_partner_attribution_id(mut self, id: impl Into<String>) -> Self {
        self.partner_attribution_id = Some(id.into());
        self
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("client_id", &self.client_id)
            .field("button_session_id", &self.button_session_id)
            .field("on_click", &self.on_click.is_some())
            .field("on_shipping_change", &self.on_shipping_change.is_some())
            .field("locale", &self.locale)
            .field("commit", &self.commit)
            .field("vault", &self.vault)
            .field("client_access_token", &self.client_access_token.is_some())
            .finish()
    }
}

/// Click tracking urls of a personalized message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalizationTracking {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click: Option<String>,
}

/// One personalized message shown on the button
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalizationContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking: Option<PersonalizationTracking>,
}

/// Personalization metadata served with the button
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personalization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<PersonalizationContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_text: Option<PersonalizationContent>,
}

impl Personalization {
    /// Click beacons to fire when the button is clicked
    pub fn click_beacons(&self) -> Vec<&str> {
        [&self.tagline, &self.button_text]
            .into_iter()
            .flatten()
            .filter_map(|content| content.tracking.as_ref())
            .filter_map(|tracking| tracking.click.as_deref())
            .collect()
    }
}

/// Data served alongside the button by the backend
#[derive(Debug, Clone, Default)]
pub struct ServiceData {
    pub funding_eligibility: FundingEligibility,
    pub buyer_country: Option<String>,
    pub merchant_id: Vec<String>,
    pub personalization: Option<Personalization>,
    pub native_eligibility: BTreeMap<FundingSource, bool>,
}

impl ServiceData {
    /// Create service data around resolved funding eligibility
    pub fn new(funding_eligibility: FundingEligibility) -> Self {
        Self {
            funding_eligibility,
            ..Default::default()
        }
    }

    /// Set the buyer country
    pub fn with_buyer_country(mut self, country: impl Into<String>) -> Self {
        self.buyer_country = Some(country.into());
        self
    }

    /// Set the merchant ids
    pub fn with_merchant_id(mut self, merchant_id: Vec<String>) -> Self {
        self.merchant_id = merchant_id;
        self
    }

    /// Set personalization metadata
    pub fn with_personalization(mut self, personalization: Personalization) -> Self {
        self.personalization = Some(personalization);
        self
    }

    /// Mark a funding source as eligible for native app hand-off
    pub fn with_native_eligibility(mut self, source: FundingSource, eligible: bool) -> Self {
        self.native_eligibility.insert(source, eligible);
        self
    }

    /// Whether the native app hand-off is available for the source
    pub fn is_native_eligible(&self, source: FundingSource) -> bool {
        self.native_eligibility.get(&source).copied().unwrap_or(false)
    }
}
