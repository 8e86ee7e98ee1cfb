//! # Smart payment buttons
//!
//! The core of an embeddable payment button: it resolves which funding
//! sources a buyer may use, picks a payment flow when a button is clicked and
//! drives that flow until the integrator's approval or cancellation handler
//! runs.
//!
//! ## Features
//!
//! - **Minimal eligibility queries**: only fields the page does not already
//!   know are requested, and the baseline always wins on conflicts
//! - **Graceful fallback**: any backend failure degrades to the baseline
//! - **Closed set of payment flows**: vault capture, card fields, popup bridge,
//!   native app and checkout, selected in a fixed priority order
//! - **Exactly-once order creation** per payment attempt
//! - **Pluggable collaborators**: UI, popups, components, API and telemetry
//!   are traits with `reqwest` and `tracing` backed defaults where it makes
//!   sense
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use smart_buttons::api::HttpGraphqlBatch;
//! use smart_buttons::config::ApiConfig;
//! use smart_buttons::eligibility::{
//!     resolve_funding_eligibility, FundingEligibilityOptions, RequestInfo,
//! };
//! use smart_buttons::types::{FundingEligibility, FundingSource, FundingSourceEligibility};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let executor = HttpGraphqlBatch::new(&ApiConfig::default())?;
//!
//!     let baseline = FundingEligibility::new()
//!         .with_source(FundingSource::Paypal, FundingSourceEligibility::eligible(true));
//!     let options = FundingEligibilityOptions::new("client-id", baseline)
//!         .with_buyer_country("US")
//!         .with_currency("USD");
//!
//!     let eligibility =
//!         resolve_funding_eligibility(&RequestInfo::default(), &executor, &options).await;
//!     println!("{}", serde_json::to_string_pretty(&eligibility)?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`types`**: Funding sources, eligibility records and payment attempts
//! - **`eligibility`**: Query minimization, merging and resolution
//! - **`api`**: GraphQL and REST adapters for the backend
//! - **`button`**: Integrator props, payment orchestration and the vault menu
//! - **`flows`**: The payment flows and their registry
//! - **`components`**: Host environment collaborators
//! - **`session`**: Per-button shared state
//! - **`telemetry`**: Telemetry and logging sinks
//! - **`config`**: API and environment configuration
//! - **`error`**: Error handling

pub mod api;
pub mod button;
pub mod components;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod flows;
pub mod session;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use error::{ButtonError, Result};

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
