//! Popup and iframe checkout
//!
//! The checkout flow renders the checkout component for one attempt and
//! drives it through approval, cancellation or close. It is always eligible
//! and serves as the fallback of every other flow.

use super::ButtonContext;
use crate::button::props::{ApproveActions, ApproveData, ClickData, CreateOrder, RestartFn, ShippingChangeData};
use crate::components::{
    ComponentInstance, ComponentProps, ComponentShippingChange, RenderContext, RenderTarget,
    WindowHandle,
};
use crate::config::WindowTopology;
use crate::session::SessionContext;
use crate::types::{popup, FundingEligibility, FundingSource, Payment};
use crate::{ButtonError, Result};
use futures_util::future::FutureExt;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OnceCell;

/// Lifecycle of a checkout instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    Idle,
    Initialized,
    Rendering,
    Rendered,
    Approved,
    Cancelled,
    Closed,
    Errored,
}

impl CheckoutState {
    /// Whether the attempt has reached an end state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CheckoutState::Approved
                | CheckoutState::Cancelled
                | CheckoutState::Closed
                | CheckoutState::Errored
        )
    }
}

/// Popup when a window exists or a direct click can open one, iframe otherwise
pub fn get_context(has_window: bool, is_click: bool, supports_popups: bool) -> RenderContext {
    if has_window || (is_click && supports_popups) {
        RenderContext::Popup
    } else {
        RenderContext::Iframe
    }
}

/// Where the checkout renders, given the cached top-window render check
pub fn render_target(session: &SessionContext, topology: &WindowTopology) -> RenderTarget {
    if session.can_render_top() && topology.has_distinct_top() {
        RenderTarget::Top
    } else if topology.has_parent {
        RenderTarget::Parent
    } else {
        RenderTarget::Current
    }
}

/// Reset the session and check the top window once per button render
pub async fn setup_checkout(ctx: &ButtonContext) -> Result<()> {
    ctx.session.release_checkout();

    if ctx.config.environment.topology.has_distinct_top() {
        let can_render_top = ctx.components.checkout.can_render_to(RenderTarget::Top).await?;
        tracing::debug!("Checkout can render to top window: {}", can_render_top);
        ctx.session.set_can_render_top(can_render_top);
    }

    Ok(())
}

/// Inputs of the vault auto-setup decision
#[derive(Debug, Clone, Copy)]
pub struct VaultSetup<'a> {
    pub vault: bool,
    pub client_access_token: Option<&'a str>,
    pub create_billing_agreement: bool,
    pub create_subscription: bool,
    pub funding_source: FundingSource,
    pub funding_eligibility: &'a FundingEligibility,
}

impl<'a> VaultSetup<'a> {
    /// Decision inputs of a button and funding source
    pub fn from_context(ctx: &'a ButtonContext, funding_source: FundingSource) -> Self {
        Self {
            vault: ctx.props.vault,
            client_access_token: ctx.props.client_access_token.as_deref(),
            create_billing_agreement: ctx.props.create_billing_agreement.is_some(),
            create_subscription: ctx.props.create_subscription.is_some(),
            funding_source,
            funding_eligibility: &ctx.service_data.funding_eligibility,
        }
    }
}

/// Whether the order should be set up for vaulting without buyer action
pub fn is_vault_auto_setup_eligible(setup: &VaultSetup<'_>) -> Result<bool> {
    if setup.client_access_token.is_none() {
        return Ok(false);
    }

    if setup.create_billing_agreement || setup.create_subscription {
        return Ok(false);
    }

    let vaultable = setup.funding_eligibility.is_vaultable(setup.funding_source);

    if setup.vault && !vaultable {
        return Err(ButtonError::VaultNotEligible {
            funding_source: setup.funding_source.to_string(),
        });
    }

    Ok(setup.vault || vaultable)
}

/// Enable vaulting for the order when eligible
///
/// Failures of the backend call are ignored unless vaulting was requested
/// explicitly.
pub async fn enable_vault_setup(
    ctx: &ButtonContext,
    funding_source: FundingSource,
    order_id: &str,
) -> Result<()> {
    let setup = VaultSetup::from_context(ctx, funding_source);
    if !is_vault_auto_setup_eligible(&setup)? {
        return Ok(());
    }

    let Some(client_access_token) = setup.client_access_token else {
        return Ok(());
    };

    match ctx
        .components
        .api
        .enable_vault(order_id, client_access_token)
        .await
    {
        Ok(()) => Ok(()),
        Err(err) if setup.vault => Err(err),
        Err(err) => {
            tracing::warn!("Implicit vault setup failed for order {}: {}", order_id, err);
            Ok(())
        }
    }
}

/// Restart capability that hands the attempt over to a fresh checkout
///
/// The restart runs at most once; the returned future stays pending once the
/// new checkout has started.
pub(crate) fn restart_with_checkout(ctx: ButtonContext, payment: Payment) -> RestartFn {
    let restarted = Arc::new(AtomicBool::new(false));
    Arc::new(move || {
        let ctx = ctx.clone();
        let payment = payment.clone().with_click(false);
        let restarted = restarted.clone();
        async move {
            if !restarted.swap(true, Ordering::AcqRel) {
                tracing::debug!("Restarting payment in a new checkout");
                let instance = init_checkout(&ctx, payment)?;
                instance.start().await?;
            }
            std::future::pending::<Result<()>>().await
        }
        .boxed()
    })
}

/// Initialize a checkout for one attempt
///
/// Fails with [`ButtonError::CheckoutAlreadyOpen`] while another checkout of the
/// same session is open.
pub fn init_checkout(ctx: &ButtonContext, payment: Payment) -> Result<CheckoutInstance> {
    ctx.session.try_open_checkout()?;

    let context = get_context(
        payment.win.is_some(),
        payment.is_click,
        ctx.config.environment.supports_popups,
    );

    let base = ctx.props.create_order.clone();
    let vault_ctx = ctx.clone();
    let funding_source = payment.funding_source;
    let create_order = CreateOrder::new(move || {
        let base = base.clone();
        let ctx = vault_ctx.clone();
        async move {
            let order_id = base.call().await?;
            enable_vault_setup(&ctx, funding_source, &order_id).await?;
            Ok(order_id)
        }
    })
    .memoize();

    tracing::debug!(
        "Initialized checkout for {} in {:?} context",
        payment.funding_source,
        context
    );

    Ok(CheckoutInstance {
        inner: Arc::new(CheckoutInner {
            restart: restart_with_checkout(ctx.clone(), payment.clone()),
            ctx: ctx.clone(),
            win: Mutex::new(payment.win.clone()),
            buyer_access_token: Mutex::new(payment.buyer_access_token.clone()),
            payment,
            context,
            create_order,
            state: Mutex::new(CheckoutState::Initialized),
            instance: Mutex::new(None),
            render_started: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            cancel_called: AtomicBool::new(false),
            started: OnceCell::new(),
        }),
    })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct CheckoutInner {
    ctx: ButtonContext,
    payment: Payment,
    context: RenderContext,
    create_order: CreateOrder,
    restart: RestartFn,
    state: Mutex<CheckoutState>,
    win: Mutex<Option<WindowHandle>>,
    buyer_access_token: Mutex<Option<String>>,
    instance: Mutex<Option<Arc<dyn ComponentInstance>>>,
    render_started: AtomicBool,
    closed: AtomicBool,
    cancel_called: AtomicBool,
    started: OnceCell<Result<()>>,
}

impl CheckoutInner {
    fn state(&self) -> CheckoutState {
        *lock(&self.state)
    }

    fn set_state(&self, state: CheckoutState) {
        *lock(&self.state) = state;
    }

    fn buyer_access_token(&self) -> Option<String> {
        lock(&self.buyer_access_token).clone()
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        self.ctx.session.release_checkout();
        {
            let mut state = lock(&self.state);
            if !state.is_terminal() {
                *state = CheckoutState::Closed;
            }
        }

        // Dropping the component instance releases the callbacks it holds
        let instance = lock(&self.instance).take();
        match instance {
            Some(instance) => instance.close().await,
            None => {
                if !self.render_started.load(Ordering::Acquire) {
                    if let Some(win) = lock(&self.win).take() {
                        win.close();
                    }
                }
                Ok(())
            }
        }
    }

    async fn call_on_cancel(&self) -> Result<()> {
        if self.cancel_called.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        (self.ctx.props.on_cancel)().await
    }

    async fn on_approve(&self, data: ApproveData) -> Result<()> {
        self.set_state(CheckoutState::Approved);
        if let Err(err) = self.close().await {
            tracing::warn!("Closing approved checkout failed: {}", err);
        }

        let order_id = self.create_order.call().await?;
        let data = ApproveData {
            order_id: Some(order_id),
            buyer_access_token: self.buyer_access_token().or(data.buyer_access_token),
            ..data
        };

        let actions = ApproveActions::new(self.restart.clone());
        if let Err(err) = (self.ctx.props.on_approve)(data, actions).await {
            tracing::error!("Approval handler failed: {}", err);
            (self.ctx.props.on_error)(&err);
        }
        Ok(())
    }

    async fn on_cancel(&self) -> Result<()> {
        {
            let mut state = lock(&self.state);
            if !state.is_terminal() {
                *state = CheckoutState::Cancelled;
            }
        }
        self.close().await?;
        self.call_on_cancel().await
    }

    async fn on_close(&self) -> Result<()> {
        self.ctx.session.release_checkout();
        lock(&self.instance).take();

        let approved = {
            let mut state = lock(&self.state);
            if !state.is_terminal() {
                *state = CheckoutState::Closed;
            }
            *state == CheckoutState::Approved
        };

        if approved {
            return Ok(());
        }
        self.call_on_cancel().await
    }
}

/// A checkout initialized for one attempt
#[derive(Clone)]
pub struct CheckoutInstance {
    inner: Arc<CheckoutInner>,
}

impl CheckoutInstance {
    /// Current lifecycle state
    pub fn state(&self) -> CheckoutState {
        self.inner.state()
    }

    /// Render context fixed at initialization
    pub fn context(&self) -> RenderContext {
        self.inner.context
    }

    /// Order creator handed to the component, including vault auto-setup
    pub fn create_order(&self) -> &CreateOrder {
        &self.inner.create_order
    }

    /// Handle the user gesture
    ///
    /// Without a click hook the checkout renders immediately. With one, a popup
    /// is opened inside the gesture, whatever the render context, and closed
    /// again if validation fails.
    pub async fn click(&self) -> Result<()> {
        let inner = &self.inner;
        let Some(on_click) = inner.ctx.props.on_click.clone() else {
            return self.start().await;
        };

        if lock(&inner.win).is_none() {
            let win = inner
                .ctx
                .components
                .popup_opener
                .open_popup(popup::WIDTH, popup::HEIGHT)?;
            *lock(&inner.win) = Some(win);
        }

        let valid = on_click
            .call(ClickData {
                funding_source: inner.payment.funding_source,
            })
            .await?;

        if !valid {
            if let Some(win) = lock(&inner.win).take() {
                win.close();
            }
        }
        Ok(())
    }

    /// Render the checkout; runs once per instance
    pub async fn start(&self) -> Result<()> {
        self.inner
            .started
            .get_or_init(|| self.render())
            .await
            .clone()
    }

    /// Tear the checkout down; later calls are no-ops
    pub async fn close(&self) -> Result<()> {
        self.inner.close().await
    }

    async fn render(&self) -> Result<()> {
        let inner = &self.inner;
        if inner.closed.load(Ordering::Acquire) {
            return Ok(());
        }

        let instance = inner.ctx.components.checkout.init(self.component_props());
        *lock(&inner.instance) = Some(instance.clone());
        inner.render_started.store(true, Ordering::Release);
        inner.set_state(CheckoutState::Rendering);

        let target = render_target(&inner.ctx.session, &inner.ctx.config.environment.topology);
        tracing::debug!("Rendering checkout to {:?} as {:?}", target, inner.context);

        match instance.render_to(target, inner.context).await {
            Ok(()) => {
                let mut state = lock(&inner.state);
                if *state == CheckoutState::Rendering {
                    *state = CheckoutState::Rendered;
                }
                Ok(())
            }
            Err(err) => {
                inner.set_state(CheckoutState::Errored);
                Err(err)
            }
        }
    }

    fn component_props(&self) -> ComponentProps {
        let inner = &self.inner;
        let ctx = &inner.ctx;

        let approve = self.inner.clone();
        let auth = self.inner.clone();
        let cancel = self.inner.clone();
        let close = self.inner.clone();

        let on_shipping_change = ctx.props.on_shipping_change.clone().map(|handler| {
            let shipping = self.inner.clone();
            let callback: ComponentShippingChange = Arc::new(move |data: serde_json::Value| {
                let data = ShippingChangeData {
                    buyer_access_token: shipping.buyer_access_token(),
                    data,
                };
                handler(data)
            });
            callback
        });

        ComponentProps {
            window: lock(&inner.win).clone(),
            button_session_id: ctx.props.button_session_id.clone(),
            client_access_token: ctx.props.client_access_token.clone(),
            buyer_access_token: inner.buyer_access_token(),
            funding_source: inner.payment.funding_source,
            card: inner.payment.card,
            buyer_country: ctx.service_data.buyer_country.clone(),
            locale: ctx.props.locale.clone(),
            commit: ctx.props.commit,
            csp_nonce: ctx.config.csp_nonce.clone(),
            create_order: inner.create_order.clone(),
            on_approve: Arc::new(move |data: ApproveData| {
                let inner = approve.clone();
                async move { inner.on_approve(data).await }.boxed()
            }),
            on_auth: Arc::new(move |token: String| {
                *lock(&auth.buyer_access_token) = Some(token);
            }),
            on_cancel: Arc::new(move || {
                let inner = cancel.clone();
                async move { inner.on_cancel().await }.boxed()
            }),
            on_shipping_change,
            on_error: ctx.props.on_error.clone(),
            on_close: Arc::new(move || {
                let inner = close.clone();
                async move { inner.on_close().await }.boxed()
            }),
        }
    }
}

impl fmt::Debug for CheckoutInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutInstance")
            .field("funding_source", &self.inner.payment.funding_source)
            .field("context", &self.inner.context)
            .field("state", &self.state())
            .finish()
    }
}
