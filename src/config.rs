//! Configuration for the backend API and the browser environment

use crate::{ButtonError, Result};
use std::env;
use std::time::Duration;
use url::Url;

/// Default REST API root
pub const DEFAULT_API_URL: &str = "https://www.paypal.com";
/// Default GraphQL endpoint
pub const DEFAULT_GRAPHQL_URL: &str = "https://www.paypal.com/graphql";
/// Default checkout page
pub const DEFAULT_CHECKOUT_URL: &str = "https://www.paypal.com/checkoutnow";
/// Default native hand-off page
pub const DEFAULT_NATIVE_URL: &str = "https://www.paypal.com/smart/checkout/native";

/// Backend API configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Root URL of the REST API
    pub api_url: String,
    /// URL of the batched GraphQL endpoint
    pub graphql_url: String,
    /// Request timeout
    pub timeout: Option<Duration>,
}

impl ApiConfig {
    /// Create a new API config
    pub fn new(api_url: impl Into<String>, graphql_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            graphql_url: graphql_url.into(),
            timeout: None,
        }
    }

    /// Read the config from `SMART_BUTTONS_API_URL`, `SMART_BUTTONS_GRAPHQL_URL`
    /// and `SMART_BUTTONS_TIMEOUT_MS`, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let api_url = env::var("SMART_BUTTONS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let graphql_url =
            env::var("SMART_BUTTONS_GRAPHQL_URL").unwrap_or_else(|_| DEFAULT_GRAPHQL_URL.to_string());

        let mut config = Self::new(api_url, graphql_url);
        if let Ok(timeout) = env::var("SMART_BUTTONS_TIMEOUT_MS") {
            let millis: u64 = timeout.parse().map_err(|_| {
                ButtonError::config(format!("Invalid SMART_BUTTONS_TIMEOUT_MS: {}", timeout))
            })?;
            config = config.with_timeout(Duration::from_millis(millis));
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validate the API configuration
    pub fn validate(&self) -> Result<()> {
        validate_http_url("API URL", &self.api_url)?;
        validate_http_url("GraphQL URL", &self.graphql_url)?;
        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, DEFAULT_GRAPHQL_URL)
    }
}

fn validate_http_url(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ButtonError::config(format!("{} cannot be empty", name)));
    }

    let url = Url::parse(value)?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ButtonError::config(format!(
            "{} must start with http:// or https://",
            name
        )));
    }

    Ok(())
}

/// Device class the button runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Desktop,
    Mobile,
}

/// Position of the button window in the browsing context tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowTopology {
    /// The button window has a parent window
    pub has_parent: bool,
    /// A top-level window is reachable
    pub has_top: bool,
    /// The parent window is the top-level window
    pub top_is_parent: bool,
}

impl WindowTopology {
    /// A button rendered directly in the top-level window
    pub fn standalone() -> Self {
        Self::default()
    }

    /// A button framed directly by the top-level window
    pub fn framed() -> Self {
        Self {
            has_parent: true,
            has_top: true,
            top_is_parent: true,
        }
    }

    /// A button framed inside an intermediate frame
    pub fn nested() -> Self {
        Self {
            has_parent: true,
            has_top: true,
            top_is_parent: false,
        }
    }

    /// Whether the top window is distinct from the parent and worth probing
    pub fn has_distinct_top(&self) -> bool {
        self.has_top && self.has_parent && !self.top_is_parent
    }
}

/// Capabilities of the browser environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Environment {
    pub supports_popups: bool,
    pub platform: Platform,
    pub topology: WindowTopology,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            supports_popups: true,
            platform: Platform::Desktop,
            topology: WindowTopology::framed(),
        }
    }
}

/// Configuration of one button widget
#[derive(Debug, Clone)]
pub struct ButtonConfig {
    /// CSP nonce forwarded to rendered components
    pub csp_nonce: Option<String>,
    /// Browser environment
    pub environment: Environment,
    /// Checkout page used by the popup bridge
    pub checkout_url: Url,
    /// Native hand-off page
    pub native_url: Url,
}

impl ButtonConfig {
    /// Create a config with the default urls
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            ..Default::default()
        }
    }

    /// Set the CSP nonce
    pub fn with_csp_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.csp_nonce = Some(nonce.into());
        self
    }

    /// Set the checkout page
    pub fn with_checkout_url(mut self, url: &str) -> Result<Self> {
        self.checkout_url = Url::parse(url)?;
        Ok(self)
    }

    /// Set the native hand-off page
    pub fn with_native_url(mut self, url: &str) -> Result<Self> {
        self.native_url = Url::parse(url)?;
        Ok(self)
    }
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            csp_nonce: None,
            environment: Environment::default(),
            checkout_url: Url::parse(DEFAULT_CHECKOUT_URL).expect("default checkout url is valid"),
            native_url: Url::parse(DEFAULT_NATIVE_URL).expect("default native url is valid"),
        }
    }
}
