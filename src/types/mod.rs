//! Core types for the payment button
//!
//! This module defines the data structures shared by eligibility resolution and
//! the payment flows.
//!
//! # Architecture
//!
//! - [`funding`] - Funding source and card brand identifiers
//! - [`eligibility`] - Server-declared funding eligibility records
//! - [`payment`] - One checkout attempt and the button it belongs to
//! - [`constants`] - Popup dimensions, telemetry keys and operation names
//!
//! # Examples
//!
//! ```
//! use smart_buttons::types::{CardBrand, FundingEligibility, FundingSource, FundingSourceEligibility, VendorEligibility};
//!
//! let baseline = FundingEligibility::new()
//!     .with_source(FundingSource::Paypal, FundingSourceEligibility::eligible(true).with_vaultable(true))
//!     .with_source(
//!         FundingSource::Card,
//!         FundingSourceEligibility::eligible(true).with_vendor(
//!             CardBrand::Visa,
//!             VendorEligibility { eligible: Some(true), ..Default::default() },
//!         ),
//!     );
//!
//! assert!(baseline.is_vaultable(FundingSource::Paypal));
//! ```

pub mod constants;
pub mod eligibility;
pub mod funding;
pub mod payment;

// Re-export commonly used types
pub use constants::{events, fpti, operations, popup};
pub use eligibility::{
    FundingEligibility, FundingSourceEligibility, InstrumentLabel, VaultedInstrument,
    VendorEligibility,
};
pub use funding::{CardBrand, FundingSource};
pub use payment::{ButtonRef, DecorateCreateOrder, Payment};
