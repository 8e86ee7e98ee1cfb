//! Payment orchestration for one button widget

use crate::api::ClientConfigUpdate;
use crate::button::props::ClickData;
use crate::flows::{ButtonContext, FlowRegistry, PaymentFlow, PaymentFlowInstance};
use crate::telemetry::TelemetryEvent;
use crate::types::{events, fpti, Payment};
use crate::Result;
use futures_util::future::join;

/// Drives a payment attempt from the click to the flow outcome
#[derive(Debug, Clone)]
pub struct PaymentOrchestrator {
    ctx: ButtonContext,
    registry: FlowRegistry,
}

impl PaymentOrchestrator {
    /// Create an orchestrator using the default flows
    pub fn new(ctx: ButtonContext) -> Self {
        Self {
            ctx,
            registry: FlowRegistry::default(),
        }
    }

    /// Use a custom flow registry
    pub fn with_registry(mut self, registry: FlowRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Button context shared by every attempt
    pub fn context(&self) -> &ButtonContext {
        &self.ctx
    }

    /// Validate the props and set up the eligible flows
    pub async fn setup(&self) -> Result<()> {
        self.ctx.props.validate()?;
        self.registry.setup_all(&self.ctx).await
    }

    /// Run one payment attempt
    ///
    /// Resolves once the selected flow has started and the order has been
    /// validated, or right away when the click hook rejects the attempt. The
    /// loading spinner is disabled exactly once whatever the outcome.
    pub async fn initiate(&self, payment: Payment) -> Result<()> {
        let result = self.run(&payment).await;
        self.ctx
            .components
            .ui
            .disable_loading_spinner(&payment.button);

        if let Err(err) = &result {
            tracing::error!(
                "Payment with {} failed: {}",
                payment.funding_source,
                err
            );
        }
        result
    }

    async fn run(&self, payment: &Payment) -> Result<()> {
        let base = self.ctx.props.create_order.clone();
        let create_order = match &payment.decorate_create_order {
            Some(decorate) => decorate(base),
            None => base,
        }
        .memoize();
        let on_click = self.ctx.props.on_click.as_ref().map(|hook| hook.memoize());
        let ctx = self.ctx.for_attempt(create_order.clone(), on_click.clone());
        let telemetry = ctx.components.telemetry.clone();

        if let Some(personalization) = &ctx.service_data.personalization {
            for beacon in personalization.click_beacons() {
                telemetry.send_beacon(beacon);
            }
        }

        let flow = self.registry.select_flow(&ctx, payment)?;
        tracing::debug!("Selected {} flow for {}", flow, payment.funding_source);
        let instance = flow.init(&ctx, payment)?;

        let event = TelemetryEvent::new(events::BUTTON_CLICK)
            .with_name(format!("pay_flow_{}", flow.name()))
            .with_field(fpti::STATE, fpti::STATE_BUTTON)
            .with_field(fpti::TRANSITION, fpti::TRANSITION_BUTTON_CLICK)
            .with_field(fpti::BUTTON_SESSION_UID, ctx.props.button_session_id.clone())
            .with_field(fpti::CHOSEN_FUNDING, payment.funding_source.as_str())
            .with_field(fpti::PAYMENT_FLOW, flow.name());

        let click_data = ClickData {
            funding_source: payment.funding_source,
        };
        let validation = async {
            telemetry.track(event);
            match &on_click {
                Some(hook) => hook.call(click_data).await,
                None => Ok(true),
            }
        };

        let (click_result, valid) = join(instance.click(), validation).await;
        let valid = match valid {
            Ok(valid) => valid,
            Err(err) => {
                close_quietly(&instance).await;
                return Err(err);
            }
        };

        if !valid {
            tracing::debug!("Click validation rejected the payment");
            close_quietly(&instance).await;
            return Ok(());
        }

        if let Err(err) = self.execute(&ctx, flow, &instance, payment, click_result).await {
            close_quietly(&instance).await;
            return Err(err);
        }
        Ok(())
    }

    async fn execute(
        &self,
        ctx: &ButtonContext,
        flow: PaymentFlow,
        instance: &PaymentFlowInstance,
        payment: &Payment,
        click_result: Result<()>,
    ) -> Result<()> {
        if flow.spinner() {
            ctx.components.ui.enable_loading_spinner(&payment.button);
        }

        let create_order = ctx.props.create_order.clone();
        let api = ctx.components.api.clone();
        let funding_source = payment.funding_source;
        let inline = flow.inline();
        tokio::spawn(async move {
            let update = match create_order.call().await {
                Ok(order_id) => {
                    api.update_client_config(&ClientConfigUpdate {
                        order_id,
                        funding_source,
                        inline,
                    })
                    .await
                }
                Err(err) => Err(err),
            };
            if let Err(err) = update {
                tracing::warn!(
                    event = events::UPDATE_CLIENT_CONFIG_ERROR,
                    "Client config update failed: {}",
                    err
                );
            }
        });

        instance.start().await?;
        let order_id = ctx.props.create_order.call().await?;
        ctx.components
            .api
            .validate_order(&order_id, &ctx.props.client_id, &ctx.service_data.merchant_id)
            .await?;
        click_result
    }
}

async fn close_quietly(instance: &PaymentFlowInstance) {
    if let Err(err) = instance.close().await {
        tracing::debug!("Closing {:?} failed: {}", instance, err);
    }
}
