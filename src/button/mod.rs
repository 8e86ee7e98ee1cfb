//! The payment button
//!
//! This module wires integrator props to the payment flows.
//!
//! # Architecture
//!
//! - [`props`] - Integrator configuration, callbacks and service data
//! - [`pay`] - [`PaymentOrchestrator`] running one attempt per click
//! - [`menu`] - Actions of vaulted instrument buttons
//!
//! # Examples
//!
//! ```no_run
//! use smart_buttons::button::props::{CreateOrder, Props, ServiceData};
//! use smart_buttons::button::PaymentOrchestrator;
//! use smart_buttons::components::Components;
//! use smart_buttons::config::ButtonConfig;
//! use smart_buttons::flows::ButtonContext;
//! use smart_buttons::types::{ButtonRef, FundingSource, Payment};
//!
//! # async fn example(components: Components) -> smart_buttons::Result<()> {
//! let create_order = CreateOrder::new(|| async { Ok("ORDER1".to_string()) });
//! let props = Props::new("client-id", create_order, |data, _actions| async move {
//!     println!("approved {:?}", data.order_id);
//!     Ok(())
//! });
//!
//! let ctx = ButtonContext::new(props, ButtonConfig::default(), ServiceData::default(), components);
//! let orchestrator = PaymentOrchestrator::new(ctx);
//! orchestrator.setup().await?;
//! orchestrator
//!     .initiate(Payment::new(ButtonRef::new("paypal-button"), FundingSource::Paypal))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod menu;
pub mod pay;
pub mod props;


pub use menu::{ButtonMenu, MenuChoice, MenuItem, MenuSelection, SmartMenu};
pub use pay::PaymentOrchestrator;
pub use props::{ApproveActions, ApproveData, CreateOrder, Props, ServiceData};
