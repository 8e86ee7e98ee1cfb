//! Payment flows
//!
//! A payment flow is one complete checkout execution strategy. The set of
//! flows is closed and tried in a fixed order; the first flow eligible for the
//! button and for the attempt wins.
//!
//! # Architecture
//!
//! - [`registry`] - Ordered flow list, selection and setup
//! - [`checkout`] - Popup/iframe checkout state machine (the terminal fallback)
//! - [`vault_capture`] - Direct capture with a vaulted payment method
//! - [`card_fields`] - Inline card fields
//! - [`popup_bridge`] - Checkout through a native popup bridge
//! - [`native`] - Hand-off to the native payment app

use crate::button::props::{ClickHandler, CreateOrder, Props, ServiceData};
use crate::components::Components;
use crate::config::ButtonConfig;
use crate::session::SessionContext;
use crate::types::Payment;
use crate::Result;
use std::fmt;

pub mod card_fields;
pub mod checkout;
pub mod native;
pub mod popup_bridge;
pub mod registry;
pub mod vault_capture;

pub use checkout::{CheckoutInstance, CheckoutState};
pub use registry::{FlowRegistry, PAYMENT_FLOWS};

/// Everything a flow needs to know about the button it runs for
#[derive(Clone)]
pub struct ButtonContext {
    pub props: Props,
    pub config: ButtonConfig,
    pub service_data: ServiceData,
    pub components: Components,
    pub session: SessionContext,
}

impl ButtonContext {
    /// Create a context with a fresh session
    pub fn new(
        props: Props,
        config: ButtonConfig,
        service_data: ServiceData,
        components: Components,
    ) -> Self {
        Self {
            props,
            config,
            service_data,
            components,
            session: SessionContext::new(),
        }
    }

    /// Share an existing session
    pub fn with_session(mut self, session: SessionContext) -> Self {
        self.session = session;
        self
    }

    /// Context of one attempt, with the per-attempt order creator and click hook
    pub(crate) fn for_attempt(&self, create_order: CreateOrder, on_click: Option<ClickHandler>) -> Self {
        let mut ctx = self.clone();
        ctx.props.create_order = create_order;
        ctx.props.on_click = on_click;
        ctx
    }
}

impl fmt::Debug for ButtonContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonContext")
            .field("props", &self.props)
            .field("config", &self.config)
            .field("session", &self.session)
            .finish()
    }
}

/// The closed set of payment flows, in registry order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentFlow {
    VaultCapture,
    CardFields,
    PopupBridge,
    Native,
    Checkout,
}

impl PaymentFlow {
    /// Every flow in selection order
    pub const ALL: [PaymentFlow; 5] = [
        PaymentFlow::VaultCapture,
        PaymentFlow::CardFields,
        PaymentFlow::PopupBridge,
        PaymentFlow::Native,
        PaymentFlow::Checkout,
    ];

    /// Flow name used in telemetry
    pub fn name(&self) -> &'static str {
        match self {
            PaymentFlow::VaultCapture => "vault_capture",
            PaymentFlow::CardFields => "card_fields",
            PaymentFlow::PopupBridge => "popup_bridge",
            PaymentFlow::Native => "native",
            PaymentFlow::Checkout => "checkout",
        }
    }

    /// Whether the flow wants a loading spinner while it runs
    pub fn spinner(&self) -> bool {
        matches!(self, PaymentFlow::VaultCapture)
    }

    /// Whether the flow renders inside the button container
    pub fn inline(&self) -> bool {
        matches!(self, PaymentFlow::CardFields)
    }

    /// Prepare the flow once per button render
    pub async fn setup(&self, ctx: &ButtonContext) -> Result<()> {
        match self {
            PaymentFlow::Checkout => checkout::setup_checkout(ctx).await,
            PaymentFlow::VaultCapture
            | PaymentFlow::CardFields
            | PaymentFlow::PopupBridge
            | PaymentFlow::Native => Ok(()),
        }
    }

    /// Whether the flow can serve this button at all
    pub fn is_eligible(&self, ctx: &ButtonContext) -> bool {
        match self {
            PaymentFlow::VaultCapture => vault_capture::is_eligible(ctx),
            PaymentFlow::CardFields => card_fields::is_eligible(ctx),
            PaymentFlow::PopupBridge => popup_bridge::is_eligible(ctx),
            PaymentFlow::Native => native::is_eligible(ctx),
            PaymentFlow::Checkout => true,
        }
    }

    /// Whether the flow can serve this attempt
    pub fn is_payment_eligible(&self, ctx: &ButtonContext, payment: &Payment) -> bool {
        match self {
            PaymentFlow::VaultCapture => vault_capture::is_payment_eligible(ctx, payment),
            PaymentFlow::CardFields => card_fields::is_payment_eligible(ctx, payment),
            PaymentFlow::PopupBridge => popup_bridge::is_payment_eligible(ctx, payment),
            PaymentFlow::Native => native::is_payment_eligible(ctx, payment),
            PaymentFlow::Checkout => true,
        }
    }

    /// Create the flow instance for one attempt
    pub fn init(&self, ctx: &ButtonContext, payment: &Payment) -> Result<PaymentFlowInstance> {
        Ok(match self {
            PaymentFlow::VaultCapture => {
                PaymentFlowInstance::VaultCapture(vault_capture::init(ctx, payment))
            }
            PaymentFlow::CardFields => PaymentFlowInstance::CardFields(card_fields::init(ctx, payment)),
            PaymentFlow::PopupBridge => {
                PaymentFlowInstance::PopupBridge(popup_bridge::init(ctx, payment)?)
            }
            PaymentFlow::Native => PaymentFlowInstance::Native(native::init(ctx, payment)?),
            PaymentFlow::Checkout => {
                PaymentFlowInstance::Checkout(checkout::init_checkout(ctx, payment.clone())?)
            }
        })
    }
}

impl fmt::Display for PaymentFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A flow initialized for one attempt
pub enum PaymentFlowInstance {
    VaultCapture(vault_capture::VaultCaptureInstance),
    CardFields(card_fields::CardFieldsInstance),
    PopupBridge(popup_bridge::PopupBridgeInstance),
    Native(native::NativeInstance),
    Checkout(CheckoutInstance),
}

impl PaymentFlowInstance {
    /// Handle the user gesture
    pub async fn click(&self) -> Result<()> {
        match self {
            PaymentFlowInstance::Checkout(instance) => instance.click().await,
            PaymentFlowInstance::VaultCapture(_)
            | PaymentFlowInstance::CardFields(_)
            | PaymentFlowInstance::PopupBridge(_)
            | PaymentFlowInstance::Native(_) => Ok(()),
        }
    }

    /// Run the flow
    pub async fn start(&self) -> Result<()> {
        match self {
            PaymentFlowInstance::VaultCapture(instance) => instance.start().await,
            PaymentFlowInstance::CardFields(instance) => instance.start().await,
            PaymentFlowInstance::PopupBridge(instance) => instance.start().await,
            PaymentFlowInstance::Native(instance) => instance.start().await,
            PaymentFlowInstance::Checkout(instance) => instance.start().await,
        }
    }

    /// Tear the flow down
    pub async fn close(&self) -> Result<()> {
        match self {
            PaymentFlowInstance::VaultCapture(_) => Ok(()),
            PaymentFlowInstance::CardFields(instance) => instance.close().await,
            PaymentFlowInstance::PopupBridge(_) => Ok(()),
            PaymentFlowInstance::Native(instance) => instance.close().await,
            PaymentFlowInstance::Checkout(instance) => instance.close().await,
        }
    }
}

impl fmt::Debug for PaymentFlowInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentFlowInstance::VaultCapture(_) => PaymentFlow::VaultCapture,
            PaymentFlowInstance::CardFields(_) => PaymentFlow::CardFields,
            PaymentFlowInstance::PopupBridge(_) => PaymentFlow::PopupBridge,
            PaymentFlowInstance::Native(_) => PaymentFlow::Native,
            PaymentFlowInstance::Checkout(_) => PaymentFlow::Checkout,
        };
        f.debug_tuple("PaymentFlowInstance").field(&name).finish()
    }
}
