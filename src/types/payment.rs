//! Payment attempt types

use super::funding::{CardBrand, FundingSource};
use crate::button::props::CreateOrder;
use crate::components::WindowHandle;
use std::fmt;
use std::sync::Arc;

/// Wraps the base order creator for one attempt
pub type DecorateCreateOrder = Arc<dyn Fn(CreateOrder) -> CreateOrder + Send + Sync>;

/// Reference to the rendered button element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ButtonRef(String);

impl ButtonRef {
    /// Create a button reference from its element id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the element id
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// One checkout attempt, created per click or per menu action
#[derive(Clone)]
pub struct Payment {
    /// Button that started the attempt
    pub button: ButtonRef,
    /// Chosen funding source
    pub funding_source: FundingSource,
    /// Vaulted payment method backing the button, if any
    pub payment_method_id: Option<String>,
    /// Card brand for card buttons
    pub card: Option<CardBrand>,
    /// Window already opened for this attempt
    pub win: Option<WindowHandle>,
    /// Whether the attempt comes from a direct user click
    pub is_click: bool,
    /// Buyer access token known before the attempt
    pub buyer_access_token: Option<String>,
    /// Decoration applied to the order creator
    pub decorate_create_order: Option<DecorateCreateOrder>,
}

impl Payment {
    /// Create a click payment for a button and funding source
    pub fn new(button: ButtonRef, funding_source: FundingSource) -> Self {
        Self {
            button,
            funding_source,
            payment_method_id: None,
            card: None,
            win: None,
            is_click: true,
            buyer_access_token: None,
            decorate_create_order: None,
        }
    }

    /// Set the vaulted payment method id
    pub fn with_payment_method_id(mut self, payment_method_id: impl Into<String>) -> Self {
        self.payment_method_id = Some(payment_method_id.into());
        self
    }

    /// Set the card brand
    pub fn with_card(mut self, card: CardBrand) -> Self {
        self.card = Some(card);
        self
    }

    /// Set an already opened window
    pub fn with_window(mut self, win: WindowHandle) -> Self {
        self.win = Some(win);
        self
    }

    /// Mark whether the attempt comes from a direct click
    pub fn with_click(mut self, is_click: bool) -> Self {
        self.is_click = is_click;
        self
    }

    /// Set the buyer access token
    pub fn with_buyer_access_token(mut self, token: impl Into<String>) -> Self {
        self.buyer_access_token = Some(token.into());
        self
    }

    /// Set the order creator decoration
    pub fn with_decorate_create_order(mut self, decorate: DecorateCreateOrder) -> Self {
        self.decorate_create_order = Some(decorate);
        self
    }
}

impl fmt::Debug for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payment")
            .field("button", &self.button)
            .field("funding_source", &self.funding_source)
            .field("payment_method_id", &self.payment_method_id)
            .field("card", &self.card)
            .field("win", &self.win.is_some())
            .field("is_click", &self.is_click)
            .field("decorate_create_order", &"<function>")
            .finish()
    }
}
