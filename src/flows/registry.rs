//! Ordered registry of payment flows

use super::{ButtonContext, PaymentFlow};
use crate::types::Payment;
use crate::{ButtonError, Result};
use futures_util::future::join_all;

/// Default flows in selection order; checkout comes last as the fallback
pub const PAYMENT_FLOWS: [PaymentFlow; 5] = PaymentFlow::ALL;

/// Ordered list of the flows a button may use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRegistry {
    flows: Vec<PaymentFlow>,
}

impl FlowRegistry {
    /// Create a registry from flows in selection order
    pub fn new(flows: Vec<PaymentFlow>) -> Self {
        Self { flows }
    }

    /// Flows in selection order
    pub fn flows(&self) -> &[PaymentFlow] {
        &self.flows
    }

    /// Pick the first flow eligible for both the button and the attempt
    pub fn select_flow(&self, ctx: &ButtonContext, payment: &Payment) -> Result<PaymentFlow> {
        self.flows
            .iter()
            .copied()
            .find(|flow| flow.is_eligible(ctx) && flow.is_payment_eligible(ctx, payment))
            .ok_or_else(|| ButtonError::NoEligibleFlow {
                funding_source: payment.funding_source.to_string(),
            })
    }

    /// Set up every eligible flow concurrently
    ///
    /// Resolves once all setups have completed; the first failure in registry
    /// order is returned.
    pub async fn setup_all(&self, ctx: &ButtonContext) -> Result<()> {
        let setups = self
            .flows
            .iter()
            .filter(|flow| flow.is_eligible(ctx))
            .map(|flow| async move {
                let result = flow.setup(ctx).await;
                if let Err(err) = &result {
                    tracing::error!("Setup of {} flow failed: {}", flow, err);
                }
                result
            });

        join_all(setups).await.into_iter().collect::<Result<Vec<_>>>()?;
        Ok(())
    }
}

impl Default for FlowRegistry {
    fn default() -> Self {
        Self::new(PAYMENT_FLOWS.to_vec())
    }
}
