//! Error types for the payment button core

use thiserror::Error;

/// Result type alias for button operations
pub type Result<T> = std::result::Result<T, ButtonError>;

/// Errors raised while resolving eligibility or driving a payment flow
///
/// Every variant carries owned strings so that results can be cloned, which
/// memoized order creators and click validations rely on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ButtonError {
    /// No payment flow accepted the attempt
    #[error("Could not find eligible payment flow for funding source {funding_source}")]
    NoEligibleFlow { funding_source: String },

    /// A checkout instance is already open for this widget
    #[error("Checkout already rendered")]
    CheckoutAlreadyOpen,

    /// Vaulting was requested for a funding source the server does not allow
    #[error("SDK received vault=true parameter, but {funding_source} is not vaultable.")]
    VaultNotEligible { funding_source: String },

    /// A menu action was chosen without the identifiers it needs
    #[error("Can not {action} without client access token and payment method id")]
    MissingIdentifiers { action: String },

    /// Payment method validation answered with a non-200 status
    #[error("Validate payment failed with status: {status}")]
    PaymentMethodValidation { status: u16 },

    /// The created order failed server-side validation
    #[error("Order validation failed: {reason}")]
    OrderValidation { reason: String },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The inbound request could not be read
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Transport failure talking to the backend
    #[error("HTTP error: {message}")]
    Http { message: String },

    /// The GraphQL endpoint answered with errors or an unexpected shape
    #[error("GraphQL error: {message}")]
    Graphql { message: String },

    /// JSON encoding or decoding failed
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// An operation exceeded its deadline
    #[error("Timed out: {operation}")]
    Timeout { operation: String },

    /// A rendering component or window collaborator failed
    #[error("Component error: {message}")]
    Component { message: String },

    /// An integrator callback failed
    #[error("Callback error: {message}")]
    Callback { message: String },
}

impl ButtonError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create an HTTP error
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
        }
    }

    /// Create a GraphQL error
    pub fn graphql(message: impl Into<String>) -> Self {
        Self::Graphql {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Create a component error
    pub fn component(message: impl Into<String>) -> Self {
        Self::Component {
            message: message.into(),
        }
    }

    /// Create a callback error
    pub fn callback(message: impl Into<String>) -> Self {
        Self::Callback {
            message: message.into(),
        }
    }

    /// Create an order validation error
    pub fn order_validation(reason: impl Into<String>) -> Self {
        Self::OrderValidation {
            reason: reason.into(),
        }
    }

    /// Whether this error signals an integration mistake rather than a runtime failure
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::NoEligibleFlow { .. }
                | Self::CheckoutAlreadyOpen
                | Self::VaultNotEligible { .. }
                | Self::MissingIdentifiers { .. }
                | Self::Config { .. }
        )
    }
}

impl From<reqwest::Error> for ButtonError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::timeout(err.to_string());
        }
        Self::http(err.to_string())
    }
}

impl From<serde_json::Error> for ButtonError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for ButtonError {
    fn from(err: url::ParseError) -> Self {
        Self::config(format!("Invalid URL: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_error_message() {
        let err = ButtonError::VaultNotEligible {
            funding_source: "card".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "SDK received vault=true parameter, but card is not vaultable."
        );
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_runtime_errors_are_not_configuration_errors() {
        assert!(!ButtonError::http("boom").is_configuration_error());
        assert!(!ButtonError::PaymentMethodValidation { status: 500 }.is_configuration_error());
        assert!(ButtonError::CheckoutAlreadyOpen.is_configuration_error());
    }

    #[test]
    fn test_serde_error_conversion() {
        let err: ButtonError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, ButtonError::Serialization { .. }));
    }
}
