//! Direct capture with a vaulted payment method
//!
//! The buyer already stored the instrument, so no checkout is rendered: the
//! order is created, the payment method is validated against it and the
//! approval handler runs right away.

use super::checkout::restart_with_checkout;
use super::ButtonContext;
use crate::api::ValidatePaymentMethodRequest;
use crate::button::props::{ApproveActions, ApproveData};
use crate::types::Payment;
use crate::{ButtonError, Result};

/// Vault capture cannot collect a shipping address
pub fn is_eligible(ctx: &ButtonContext) -> bool {
    ctx.props.on_shipping_change.is_none()
}

pub fn is_payment_eligible(ctx: &ButtonContext, payment: &Payment) -> bool {
    payment.payment_method_id.is_some()
        && payment.win.is_none()
        && ctx.props.client_access_token.is_some()
}

pub fn init(ctx: &ButtonContext, payment: &Payment) -> VaultCaptureInstance {
    VaultCaptureInstance {
        ctx: ctx.clone(),
        payment: payment.clone(),
    }
}

/// Vault capture initialized for one attempt
pub struct VaultCaptureInstance {
    ctx: ButtonContext,
    payment: Payment,
}

impl VaultCaptureInstance {
    pub async fn start(&self) -> Result<()> {
        let ctx = &self.ctx;
        let (Some(client_access_token), Some(payment_method_id)) = (
            ctx.props.client_access_token.clone(),
            self.payment.payment_method_id.clone(),
        ) else {
            return Err(ButtonError::MissingIdentifiers {
                action: "capture vaulted payment".to_string(),
            });
        };

        let order_id = ctx.props.create_order.call().await?;

        let response = ctx
            .components
            .api
            .validate_payment_method(&ValidatePaymentMethodRequest {
                client_access_token,
                order_id: order_id.clone(),
                payment_method_id,
                enable_three_domain_secure: ctx.props.enable_three_domain_secure,
                button_session_id: ctx.props.button_session_id.clone(),
                partner_attribution_id: ctx.props.partner_attribution_id.clone(),
            })
            .await?;

        if response.status != 200 {
            return Err(ButtonError::PaymentMethodValidation {
                status: response.status,
            });
        }

        let payer_id = response
            .body
            .pointer("/payer/payer_id")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);

        let data = ApproveData {
            order_id: Some(order_id),
            payer_id,
            buyer_access_token: self.payment.buyer_access_token.clone(),
            ..Default::default()
        };
        let actions = ApproveActions::new(restart_with_checkout(ctx.clone(), self.payment.clone()));

        (ctx.props.on_approve)(data, actions).await
    }
}
