//! Hand-off to the native payment app on mobile devices

use super::checkout::{init_checkout, restart_with_checkout, CheckoutInstance};
use super::ButtonContext;
use crate::button::props::{ApproveActions, ApproveData};
use crate::components::{NativeLauncher, NativeOutcome};
use crate::config::Platform;
use crate::types::{FundingSource, Payment};
use crate::{ButtonError, Result};
use std::sync::{Arc, Mutex, PoisonError};
use url::Url;
use uuid::Uuid;

pub fn is_eligible(ctx: &ButtonContext) -> bool {
    ctx.config.environment.platform == Platform::Mobile
        && ctx.components.native.is_some()
        && !ctx.props.vault
        && ctx.props.on_shipping_change.is_none()
}

pub fn is_payment_eligible(ctx: &ButtonContext, payment: &Payment) -> bool {
    matches!(
        payment.funding_source,
        FundingSource::Paypal | FundingSource::Venmo
    ) && ctx.service_data.is_native_eligible(payment.funding_source)
        && payment.win.is_none()
        && payment.payment_method_id.is_none()
}

pub fn init(ctx: &ButtonContext, payment: &Payment) -> Result<NativeInstance> {
    let launcher = ctx
        .components
        .native
        .clone()
        .ok_or_else(|| ButtonError::config("Native launcher is not available"))?;

    Ok(NativeInstance {
        ctx: ctx.clone(),
        payment: payment.clone(),
        launcher,
        session_uid: Uuid::new_v4().simple().to_string(),
        fallback: Mutex::new(None),
    })
}

/// Url handed to the native app
pub fn native_url(
    base: &Url,
    order_id: &str,
    session_uid: &str,
    button_session_id: &str,
    funding_source: FundingSource,
) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("token", order_id)
        .append_pair("sessionUID", session_uid)
        .append_pair("buttonSessionID", button_session_id)
        .append_pair("fundingSource", funding_source.as_str());
    url
}

/// Native hand-off initialized for one attempt
pub struct NativeInstance {
    ctx: ButtonContext,
    payment: Payment,
    launcher: Arc<dyn NativeLauncher>,
    session_uid: String,
    fallback: Mutex<Option<CheckoutInstance>>,
}

impl NativeInstance {
    /// Session id shared with the native app
    pub fn session_uid(&self) -> &str {
        &self.session_uid
    }

    pub async fn start(&self) -> Result<()> {
        let ctx = &self.ctx;
        let order_id = ctx.props.create_order.call().await?;

        let url = native_url(
            &ctx.config.native_url,
            &order_id,
            &self.session_uid,
            &ctx.props.button_session_id,
            self.payment.funding_source,
        );
        tracing::debug!("Launching native checkout at {}", url);

        match self.launcher.launch(url).await? {
            NativeOutcome::Approve {
                payer_id,
                payment_id,
            } => {
                let data = ApproveData {
                    order_id: Some(order_id),
                    payer_id,
                    payment_id,
                    buyer_access_token: self.payment.buyer_access_token.clone(),
                    ..Default::default()
                };
                let actions =
                    ApproveActions::new(restart_with_checkout(ctx.clone(), self.payment.clone()));
                (ctx.props.on_approve)(data, actions).await
            }
            NativeOutcome::Cancel => (ctx.props.on_cancel)().await,
            NativeOutcome::Fallback => {
                tracing::info!("Native checkout unavailable, falling back to web checkout");
                let checkout = init_checkout(ctx, self.payment.clone().with_click(false))?;
                *self.fallback.lock().unwrap_or_else(PoisonError::into_inner) =
                    Some(checkout.clone());
                checkout.start().await
            }
        }
    }

    /// Close the fallback checkout, if one was started
    pub async fn close(&self) -> Result<()> {
        let fallback = self
            .fallback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match fallback {
            Some(checkout) => checkout.close().await,
            None => Ok(()),
        }
    }
}
