//! Checkout through the popup bridge of a hosting native app

use super::checkout::restart_with_checkout;
use super::ButtonContext;
use crate::button::props::{ApproveActions, ApproveData};
use crate::components::{PopupBridge, PopupBridgeOp};
use crate::types::{FundingSource, Payment};
use crate::{ButtonError, Result};
use std::sync::Arc;
use url::Url;

pub fn is_eligible(ctx: &ButtonContext) -> bool {
    ctx.components.popup_bridge.is_some()
        && !ctx.props.vault
        && ctx.props.on_shipping_change.is_none()
}

pub fn is_payment_eligible(_ctx: &ButtonContext, payment: &Payment) -> bool {
    matches!(
        payment.funding_source,
        FundingSource::Paypal | FundingSource::Venmo
    ) && payment.win.is_none()
        && payment.payment_method_id.is_none()
}

pub fn init(ctx: &ButtonContext, payment: &Payment) -> Result<PopupBridgeInstance> {
    let bridge = ctx
        .components
        .popup_bridge
        .clone()
        .ok_or_else(|| ButtonError::config("Popup bridge is not available"))?;

    Ok(PopupBridgeInstance {
        ctx: ctx.clone(),
        payment: payment.clone(),
        bridge,
    })
}

/// Checkout url opened in the bridge
pub fn checkout_url(
    base: &Url,
    order_id: &str,
    funding_source: FundingSource,
    commit: bool,
    redirect_uri: &str,
) -> Url {
    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("token", order_id)
            .append_pair("fundingSource", funding_source.as_str());
        if commit {
            query.append_pair("useraction", "commit");
        }
        query.append_pair("redirect_uri", redirect_uri);
    }
    url
}

/// Popup bridge checkout initialized for one attempt
pub struct PopupBridgeInstance {
    ctx: ButtonContext,
    payment: Payment,
    bridge: Arc<dyn PopupBridge>,
}

impl PopupBridgeInstance {
    pub async fn start(&self) -> Result<()> {
        let ctx = &self.ctx;
        let order_id = ctx.props.create_order.call().await?;

        let url = checkout_url(
            &ctx.config.checkout_url,
            &order_id,
            self.payment.funding_source,
            ctx.props.commit,
            &self.bridge.return_url(),
        );
        tracing::debug!("Opening popup bridge at {}", url);

        let result = self.bridge.open(url).await?;
        match result.op {
            PopupBridgeOp::Payment => {
                let data = ApproveData {
                    order_id: Some(result.token.unwrap_or(order_id)),
                    payer_id: result.payer_id,
                    payment_id: result.payment_id,
                    buyer_access_token: self.payment.buyer_access_token.clone(),
                    ..Default::default()
                };
                let actions =
                    ApproveActions::new(restart_with_checkout(ctx.clone(), self.payment.clone()));
                (ctx.props.on_approve)(data, actions).await
            }
            PopupBridgeOp::Cancel => (ctx.props.on_cancel)().await,
        }
    }
}
