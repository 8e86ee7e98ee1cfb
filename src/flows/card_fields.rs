//! Inline card fields rendered inside the button container

use super::checkout::restart_with_checkout;
use super::ButtonContext;
use crate::button::props::{ApproveActions, ApproveData};
use crate::components::{ComponentInstance, ComponentProps, RenderContext, RenderTarget};
use crate::types::{FundingSource, Payment};
use crate::{ButtonError, Result};
use futures_util::future::FutureExt;
use std::sync::{Arc, Mutex, PoisonError};

/// Card fields need an unbranded card experience and no vaulting
pub fn is_eligible(ctx: &ButtonContext) -> bool {
    if ctx.props.vault {
        return false;
    }

    ctx.service_data
        .funding_eligibility
        .get(FundingSource::Card)
        .and_then(|card| card.branded)
        == Some(false)
}

pub fn is_payment_eligible(_ctx: &ButtonContext, payment: &Payment) -> bool {
    payment.funding_source == FundingSource::Card
        && payment.win.is_none()
        && payment.payment_method_id.is_none()
}

pub fn init(ctx: &ButtonContext, payment: &Payment) -> CardFieldsInstance {
    CardFieldsInstance {
        ctx: ctx.clone(),
        payment: payment.clone(),
        instance: Mutex::new(None),
    }
}

/// Card fields initialized for one attempt
pub struct CardFieldsInstance {
    ctx: ButtonContext,
    payment: Payment,
    instance: Mutex<Option<Arc<dyn ComponentInstance>>>,
}

impl CardFieldsInstance {
    /// Render the card fields into the button container
    pub async fn start(&self) -> Result<()> {
        let instance = self.ctx.components.card_fields.init(self.component_props());
        *self
            .instance
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(instance.clone());

        instance
            .render_to(RenderTarget::Current, RenderContext::Iframe)
            .await
    }

    /// Close the rendered card fields
    pub async fn close(&self) -> Result<()> {
        let instance = self
            .instance
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match instance {
            Some(instance) => instance.close().await,
            None => Ok(()),
        }
    }

    fn component_props(&self) -> ComponentProps {
        let ctx = &self.ctx;
        let create_order = ctx.props.create_order.clone();
        let on_approve = ctx.props.on_approve.clone();
        let on_cancel = ctx.props.on_cancel.clone();
        let restart = restart_with_checkout(ctx.clone(), self.payment.clone());

        ComponentProps {
            window: None,
            button_session_id: ctx.props.button_session_id.clone(),
            client_access_token: ctx.props.client_access_token.clone(),
            buyer_access_token: self.payment.buyer_access_token.clone(),
            funding_source: self.payment.funding_source,
            card: self.payment.card,
            buyer_country: ctx.service_data.buyer_country.clone(),
            locale: ctx.props.locale.clone(),
            commit: ctx.props.commit,
            csp_nonce: ctx.config.csp_nonce.clone(),
            create_order: create_order.clone(),
            on_approve: Arc::new(move |data: ApproveData| {
                let create_order = create_order.clone();
                let on_approve = on_approve.clone();
                let actions = ApproveActions::new(restart.clone());
                async move {
                    let order_id = create_order.call().await?;
                    let data = ApproveData {
                        order_id: Some(order_id),
                        ..data
                    };
                    on_approve(data, actions).await
                }
                .boxed()
            }),
            on_auth: Arc::new(|_: String| {}),
            on_cancel: Arc::new(move || on_cancel()),
            on_shipping_change: None,
            on_error: ctx.props.on_error.clone(),
            on_close: Arc::new(|| async { Ok::<(), ButtonError>(()) }.boxed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_context, TestHarness};
    use crate::types::{ButtonRef, FundingEligibility, FundingSourceEligibility};

    fn unbranded_context(harness: &TestHarness) -> ButtonContext {
        let mut ctx = test_context(harness);
        ctx.service_data.funding_eligibility = FundingEligibility::new().with_source(
            FundingSource::Card,
            FundingSourceEligibility::eligible(true).with_branded(false),
        );
        ctx
    }

    #[test]
    fn test_eligibility() {
        let harness = TestHarness::new();
        let ctx = unbranded_context(&harness);
        assert!(is_eligible(&ctx));

        let mut vaulting = ctx.clone();
        vaulting.props = vaulting.props.with_vault(true);
        assert!(!is_eligible(&vaulting));

        let branded = test_context(&harness);
        assert!(!is_eligible(&branded));

        let card = Payment::new(ButtonRef::new("button"), FundingSource::Card);
        assert!(is_payment_eligible(&ctx, &card));
        assert!(!is_payment_eligible(
            &ctx,
            &card.clone().with_payment_method_id("PM1")
        ));
        assert!(!is_payment_eligible(
            &ctx,
            &Payment::new(ButtonRef::new("button"), FundingSource::Paypal)
        ));
    }

    #[tokio::test]
    async fn test_renders_inline_and_approves() {
        let harness = TestHarness::new();
        let ctx = unbranded_context(&harness);
        let instance = init(
            &ctx,
            &Payment::new(ButtonRef::new("button"), FundingSource::Card),
        );

        instance.start().await.unwrap();
        assert_eq!(
            harness.card_fields.last_instance().renders(),
            vec![(RenderTarget::Current, RenderContext::Iframe)]
        );

        (harness.card_fields.last_props().on_approve)(ApproveData::default())
            .await
            .unwrap();
        assert_eq!(harness.approvals()[0].order_id.as_deref(), Some("ORDER1"));

        instance.close().await.unwrap();
        instance.close().await.unwrap();
        assert_eq!(harness.card_fields.last_instance().close_count(), 1);
    }
}
