//! Smart menu of a vaulted instrument button

use super::pay::PaymentOrchestrator;
use crate::api::ValidatePaymentMethodRequest;
use crate::button::props::CreateOrder;
use crate::components::{ButtonUi, WindowHandle};
use crate::types::{popup, ButtonRef, DecorateCreateOrder, FundingSource, Payment};
use crate::{ButtonError, Result};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Delay before the spinner shows while the menu is open
pub const MENU_SPINNER_DELAY: Duration = Duration::from_millis(50);

/// Action offered in the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuChoice {
    ChangeAccount,
    DeleteVault,
    SelectFundingShipping,
}

/// One menu entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub choice: MenuChoice,
    pub label: &'static str,
    /// Popup opened synchronously when the entry is picked, as `(width, height)`
    pub popup: Option<(u32, u32)>,
}

/// The buyer's pick, with the popup opened for it if any
#[derive(Clone)]
pub struct MenuSelection {
    pub choice: MenuChoice,
    pub win: Option<WindowHandle>,
}

impl fmt::Debug for MenuSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuSelection")
            .field("choice", &self.choice)
            .field("win", &self.win.is_some())
            .finish()
    }
}

/// Renders the menu and reports the buyer's pick
#[async_trait]
pub trait SmartMenu: Send + Sync {
    /// Display the entries; `None` when dismissed
    async fn display(&self, items: Vec<MenuItem>) -> Result<Option<MenuSelection>>;
}

/// Spinner shown only once a delay has elapsed
pub struct DeferredSpinner {
    ui: Arc<dyn ButtonUi>,
    button: ButtonRef,
    task: JoinHandle<()>,
}

impl DeferredSpinner {
    /// Schedule the spinner
    pub fn start(ui: Arc<dyn ButtonUi>, button: ButtonRef, delay: Duration) -> Self {
        let task = {
            let ui = ui.clone();
            let button = button.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                ui.enable_loading_spinner(&button);
            })
        };
        Self { ui, button, task }
    }

    /// Cancel the pending spinner and hide it
    pub fn finish(self) {
        self.task.abort();
        self.ui.disable_loading_spinner(&self.button);
    }
}

/// Menu actions available on a vaulted instrument button
#[derive(Clone)]
pub struct ButtonMenu {
    orchestrator: PaymentOrchestrator,
    menu: Arc<dyn SmartMenu>,
}

impl ButtonMenu {
    pub fn new(orchestrator: PaymentOrchestrator, menu: Arc<dyn SmartMenu>) -> Self {
        Self { orchestrator, menu }
    }

    /// The menu needs a vaulted instrument, a client id and an access token
    pub fn is_available(&self, payment: &Payment) -> bool {
        let props = &self.orchestrator.context().props;
        payment.payment_method_id.is_some()
            && !props.client_id.is_empty()
            && props.client_access_token.is_some()
    }

    /// Entries offered for a funding source
    pub fn choices(&self, funding_source: FundingSource) -> Vec<MenuItem> {
        let delete = MenuItem {
            choice: MenuChoice::DeleteVault,
            label: "Remove this payment method",
            popup: None,
        };

        match funding_source {
            FundingSource::Paypal => vec![
                MenuItem {
                    choice: MenuChoice::ChangeAccount,
                    label: "Use different account",
                    popup: Some((popup::WIDTH, popup::HEIGHT)),
                },
                delete,
            ],
            _ => vec![delete],
        }
    }

    /// Show the menu and run the picked action
    pub async fn open(&self, payment: Payment) -> Result<()> {
        if !self.is_available(&payment) {
            return Ok(());
        }

        let spinner = DeferredSpinner::start(
            self.orchestrator.context().components.ui.clone(),
            payment.button.clone(),
            MENU_SPINNER_DELAY,
        );
        let result = match self.menu.display(self.choices(payment.funding_source)).await {
            Ok(Some(selection)) => self.select(selection, payment).await,
            Ok(None) => Ok(()),
            Err(err) => Err(err),
        };
        spinner.finish();
        result
    }

    /// Run a menu action
    pub async fn select(&self, selection: MenuSelection, payment: Payment) -> Result<()> {
        tracing::debug!("Menu action {:?} on {}", selection.choice, payment.funding_source);
        match selection.choice {
            MenuChoice::ChangeAccount => {
                let win = match selection.win {
                    Some(win) => win,
                    None => self
                        .orchestrator
                        .context()
                        .components
                        .popup_opener
                        .open_popup(popup::WIDTH, popup::HEIGHT)?,
                };
                let mut payment = payment.with_window(win);
                payment.payment_method_id = None;
                self.orchestrator.initiate(payment).await
            }
            MenuChoice::DeleteVault => self.delete_vault(&payment).await,
            MenuChoice::SelectFundingShipping => self.select_funding_shipping(payment).await,
        }
    }

    fn identifiers(&self, payment: &Payment, action: &str) -> Result<(String, String)> {
        let props = &self.orchestrator.context().props;
        match (&props.client_access_token, &payment.payment_method_id) {
            (Some(token), Some(payment_method_id)) => Ok((token.clone(), payment_method_id.clone())),
            _ => Err(ButtonError::MissingIdentifiers {
                action: action.to_string(),
            }),
        }
    }

    async fn delete_vault(&self, payment: &Payment) -> Result<()> {
        let (client_access_token, payment_method_id) = self.identifiers(payment, "delete vault")?;
        let components = &self.orchestrator.context().components;

        components.ui.enable_loading_spinner(&payment.button);
        let deleted = components
            .api
            .delete_vault(&payment_method_id, &client_access_token)
            .await;
        components.ui.disable_loading_spinner(&payment.button);
        deleted?;

        components.ui.destroy_button(&payment.button);
        if components.ui.vaulted_button_count() == 0 {
            components.ui.destroy_vault_header();
        }
        Ok(())
    }

    async fn select_funding_shipping(&self, payment: Payment) -> Result<()> {
        let (client_access_token, payment_method_id) =
            self.identifiers(&payment, "select funding or shipping")?;
        let ctx = self.orchestrator.context();

        let template = ValidatePaymentMethodRequest {
            client_access_token,
            order_id: String::new(),
            payment_method_id,
            enable_three_domain_secure: ctx.props.enable_three_domain_secure,
            button_session_id: ctx.props.button_session_id.clone(),
            partner_attribution_id: ctx.props.partner_attribution_id.clone(),
        };
        let api = ctx.components.api.clone();

        let decorate: DecorateCreateOrder = Arc::new(move |base: CreateOrder| {
            let api = api.clone();
            let template = template.clone();
            CreateOrder::new(move || {
                let base = base.clone();
                let api = api.clone();
                let mut request = template.clone();
                async move {
                    let order_id = base.call().await?;
                    request.order_id = order_id.clone();
                    let response = api.validate_payment_method(&request).await?;
                    if response.status != 200 {
                        return Err(ButtonError::PaymentMethodValidation {
                            status: response.status,
                        });
                    }
                    Ok(order_id)
                }
            })
        });

        let mut payment = payment.with_decorate_create_order(decorate);
        payment.payment_method_id = None;
        self.orchestrator.initiate(payment).await
    }
}

impl fmt::Debug for ButtonMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonMenu")
            .field("orchestrator", &self.orchestrator)
            .finish()
    }
}
