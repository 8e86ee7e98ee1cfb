//! Common constants for popups, telemetry and queries

/// Dimensions of the checkout popup window
pub mod popup {
    /// Popup width in pixels
    pub const WIDTH: u32 = 500;
    /// Popup height in pixels
    pub const HEIGHT: u32 = 590;
}

/// Structured telemetry keys and values
pub mod fpti {
    /// Event state key
    pub const STATE: &str = "state_name";
    /// Event transition key
    pub const TRANSITION: &str = "transition_name";
    /// Button session identifier key
    pub const BUTTON_SESSION_UID: &str = "button_session_id";
    /// Chosen funding source key
    pub const CHOSEN_FUNDING: &str = "selected_payment_method";
    /// Chosen payment flow key
    pub const PAYMENT_FLOW: &str = "payment_flow";
    /// Event timestamp key
    pub const TIMESTAMP: &str = "t";

    /// Button state value
    pub const STATE_BUTTON: &str = "smart_button";
    /// Button click transition value
    pub const TRANSITION_BUTTON_CLICK: &str = "process_button_click";
}

/// GraphQL operation names
pub mod operations {
    /// Funding eligibility query
    pub const GET_FUNDING_ELIGIBILITY: &str = "GetFundingEligibility";
    /// Vault enablement mutation
    pub const ENABLE_VAULT: &str = "EnableVault";
    /// Order validation query
    pub const VALIDATE_ORDER: &str = "GetCheckoutDetails";
    /// Client config update mutation
    pub const UPDATE_CLIENT_CONFIG: &str = "UpdateClientConfig";
}

/// Log event names
pub mod events {
    /// Eligibility resolution fell back to the baseline
    pub const FUNDING_ELIGIBILITY_FALLBACK: &str = "funding_eligibility_error_fallback";
    /// Best-effort client config update failed
    pub const UPDATE_CLIENT_CONFIG_ERROR: &str = "update_client_config_error";
    /// Button click
    pub const BUTTON_CLICK: &str = "button_click";
}
