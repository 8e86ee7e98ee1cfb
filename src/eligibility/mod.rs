//! Funding eligibility resolution
//!
//! The button starts from a baseline eligibility rendered with the page and
//! asks the backend only for the fields it does not know yet.
//!
//! # Architecture
//!
//! - [`query`] - Static field schema, known-fields mask and query rendering
//! - [`merge`] - Right-biased merge of a response into the baseline
//! - [`resolver`] - Network call with timeout and fallback to the baseline
//!
//! # Examples
//!
//! ```
//! use smart_buttons::eligibility::{EligibilityField, EligibilitySelection};
//! use smart_buttons::types::{FundingEligibility, FundingSource, FundingSourceEligibility};
//!
//! let baseline = FundingEligibility::new()
//!     .with_source(FundingSource::Sepa, FundingSourceEligibility::eligible(false));
//!
//! let selection = EligibilitySelection::for_baseline(&baseline);
//! assert!(!selection.requests(FundingSource::Sepa, EligibilityField::Eligible));
//! assert!(selection.requests(FundingSource::Paypal, EligibilityField::Eligible));
//! ```

pub mod merge;
pub mod query;
pub mod resolver;

#[cfg(test)]
mod tests;

pub use merge::{merge, Merge};
pub use query::{build_funding_eligibility_query, EligibilityField, EligibilitySelection, KnownFields};
pub use resolver::{
    resolve_funding_eligibility, FundingEligibilityOptions, FundingEligibilityVariables,
    RequestInfo,
};
