//! Injected collaborators used by the payment flows
//!
//! Rendering, windows, native hand-off and button UI live outside this crate.
//! Flows only talk to them through the traits in this module, bundled together
//! with the backend API and the telemetry sink in [`Components`].

use crate::api::ButtonApi;
use crate::button::props::{ApproveData, CreateOrder, OnError};
use crate::telemetry::{TelemetrySink, TracingTelemetry};
use crate::types::{ButtonRef, CardBrand, FundingSource};
use crate::Result;
use async_trait::async_trait;
use futures_util::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// A browser window opened for the buyer
pub trait PopupWindow: Send + Sync {
    /// Close the window
    fn close(&self);

    /// Whether the window has been closed
    fn is_closed(&self) -> bool;
}

/// Shared handle to a popup window
pub type WindowHandle = Arc<dyn PopupWindow>;

/// Opens popup windows; must run synchronously inside the user gesture
pub trait PopupOpener: Send + Sync {
    fn open_popup(&self, width: u32, height: u32) -> Result<WindowHandle>;
}

/// Browsing context a component renders into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    Top,
    Parent,
    Current,
}

/// How a component is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderContext {
    Popup,
    Iframe,
}

/// Component-side approval handler
pub type ComponentApprove = Arc<dyn Fn(ApproveData) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Component-side handler without arguments
pub type ComponentHook = Arc<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Component-side shipping change handler
pub type ComponentShippingChange =
    Arc<dyn Fn(serde_json::Value) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Component-side buyer authentication handler
pub type ComponentAuth = Arc<dyn Fn(String) + Send + Sync>;

/// Props handed to a rendered component
#[derive(Clone)]
pub struct ComponentProps {
    pub window: Option<WindowHandle>,
    pub button_session_id: String,
    pub client_access_token: Option<String>,
    pub buyer_access_token: Option<String>,
    pub funding_source: FundingSource,
    pub card: Option<CardBrand>,
    pub buyer_country: Option<String>,
    pub locale: Option<String>,
    pub commit: bool,
    pub csp_nonce: Option<String>,
    pub create_order: CreateOrder,
    pub on_approve: ComponentApprove,
    pub on_auth: ComponentAuth,
    pub on_cancel: ComponentHook,
    pub on_shipping_change: Option<ComponentShippingChange>,
    pub on_error: OnError,
    pub on_close: ComponentHook,
}

impl fmt::Debug for ComponentProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentProps")
            .field("window", &self.window.is_some())
            .field("button_session_id", &self.button_session_id)
            .field("funding_source", &self.funding_source)
            .field("card", &self.card)
            .field("buyer_country", &self.buyer_country)
            .field("locale", &self.locale)
            .field("commit", &self.commit)
            .field("csp_nonce", &self.csp_nonce)
            .finish()
    }
}

/// A renderable component such as the checkout or the card fields
#[async_trait]
pub trait Component: Send + Sync {
    /// Check whether the component can render into the target
    async fn can_render_to(&self, target: RenderTarget) -> Result<bool>;

    /// Create a component instance bound to the props
    fn init(&self, props: ComponentProps) -> Arc<dyn ComponentInstance>;
}

/// A component instance created for one attempt
#[async_trait]
pub trait ComponentInstance: Send + Sync {
    /// Render; resolves once the component is displayed
    async fn render_to(&self, target: RenderTarget, context: RenderContext) -> Result<()>;

    /// Tear the component down
    async fn close(&self) -> Result<()>;
}

/// Operation reported back by the popup bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupBridgeOp {
    Payment,
    Cancel,
}

/// Result of a popup bridge session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupBridgeResult {
    pub op: PopupBridgeOp,
    pub payer_id: Option<String>,
    pub payment_id: Option<String>,
    pub token: Option<String>,
}

/// Native-app popup bridge exposed by a hosting web view
#[async_trait]
pub trait PopupBridge: Send + Sync {
    /// URL the bridge returns to once the buyer is done
    fn return_url(&self) -> String;

    /// Open the url and wait for the buyer to come back
    async fn open(&self, url: Url) -> Result<PopupBridgeResult>;
}

/// Outcome of a native app hand-off
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeOutcome {
    Approve {
        payer_id: Option<String>,
        payment_id: Option<String>,
    },
    Cancel,
    /// The native app was unavailable; continue in web checkout
    Fallback,
}

/// Launches the native payment app
#[async_trait]
pub trait NativeLauncher: Send + Sync {
    async fn launch(&self, url: Url) -> Result<NativeOutcome>;
}

/// Button element operations
pub trait ButtonUi: Send + Sync {
    fn enable_loading_spinner(&self, button: &ButtonRef);

    fn disable_loading_spinner(&self, button: &ButtonRef);

    /// Remove the button element
    fn destroy_button(&self, button: &ButtonRef);

    /// Number of vaulted instrument buttons still rendered
    fn vaulted_button_count(&self) -> usize;

    /// Remove the "pay instantly" header above vaulted buttons
    fn destroy_vault_header(&self);
}

/// Every collaborator a button widget talks to
#[derive(Clone)]
pub struct Components {
    pub checkout: Arc<dyn Component>,
    pub card_fields: Arc<dyn Component>,
    pub popup_opener: Arc<dyn PopupOpener>,
    pub popup_bridge: Option<Arc<dyn PopupBridge>>,
    pub native: Option<Arc<dyn NativeLauncher>>,
    pub ui: Arc<dyn ButtonUi>,
    pub api: Arc<dyn ButtonApi>,
    pub telemetry: Arc<dyn TelemetrySink>,
}

impl Components {
    /// Bundle the mandatory collaborators; telemetry defaults to `tracing`
    pub fn new(
        checkout: Arc<dyn Component>,
        card_fields: Arc<dyn Component>,
        popup_opener: Arc<dyn PopupOpener>,
        ui: Arc<dyn ButtonUi>,
        api: Arc<dyn ButtonApi>,
    ) -> Self {
        Self {
            checkout,
            card_fields,
            popup_opener,
            popup_bridge: None,
            native: None,
            ui,
            api,
            telemetry: Arc::new(TracingTelemetry),
        }
    }

    /// Set the popup bridge
    pub fn with_popup_bridge(mut self, popup_bridge: Arc<dyn PopupBridge>) -> Self {
        self.popup_bridge = Some(popup_bridge);
        self
    }

    /// Set the native app launcher
    pub fn with_native(mut self, native: Arc<dyn NativeLauncher>) -> Self {
        self.native = Some(native);
        self
    }

    /// Set the telemetry sink
    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }
}

impl fmt::Debug for Components {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Components")
            .field("popup_bridge", &self.popup_bridge.is_some())
            .field("native", &self.native.is_some())
            .finish()
    }
}
