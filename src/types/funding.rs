//! Funding source and card brand identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A payment method category offered by the button
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundingSource {
    Paypal,
    Venmo,
    Itau,
    Credit,
    Card,
    Sepa,
    Ideal,
    Bancontact,
    Giropay,
    Eps,
    Sofort,
    Mybank,
    P24,
    Zimpler,
    Wechatpay,
    Payu,
    Blik,
    Trustly,
    Oxxo,
    Maxima,
    Boleto,
}

impl FundingSource {
    /// Every funding source, in query declaration order
    pub const ALL: [FundingSource; 21] = [
        FundingSource::Paypal,
        FundingSource::Card,
        FundingSource::Venmo,
        FundingSource::Itau,
        FundingSource::Credit,
        FundingSource::Sepa,
        FundingSource::Ideal,
        FundingSource::Bancontact,
        FundingSource::Giropay,
        FundingSource::Eps,
        FundingSource::Sofort,
        FundingSource::Mybank,
        FundingSource::P24,
        FundingSource::Zimpler,
        FundingSource::Wechatpay,
        FundingSource::Payu,
        FundingSource::Blik,
        FundingSource::Trustly,
        FundingSource::Oxxo,
        FundingSource::Maxima,
        FundingSource::Boleto,
    ];

    /// Get the wire identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            FundingSource::Paypal => "paypal",
            FundingSource::Venmo => "venmo",
            FundingSource::Itau => "itau",
            FundingSource::Credit => "credit",
            FundingSource::Card => "card",
            FundingSource::Sepa => "sepa",
            FundingSource::Ideal => "ideal",
            FundingSource::Bancontact => "bancontact",
            FundingSource::Giropay => "giropay",
            FundingSource::Eps => "eps",
            FundingSource::Sofort => "sofort",
            FundingSource::Mybank => "mybank",
            FundingSource::P24 => "p24",
            FundingSource::Zimpler => "zimpler",
            FundingSource::Wechatpay => "wechatpay",
            FundingSource::Payu => "payu",
            FundingSource::Blik => "blik",
            FundingSource::Trustly => "trustly",
            FundingSource::Oxxo => "oxxo",
            FundingSource::Maxima => "maxima",
            FundingSource::Boleto => "boleto",
        }
    }

    /// Sources that are re-fetched in full regardless of what is already known
    pub fn always_refetched(&self) -> bool {
        matches!(self, FundingSource::Venmo | FundingSource::Itau)
    }
}

impl fmt::Display for FundingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FundingSource {
    type Err = crate::ButtonError;

    fn from_str(s: &str) -> crate::Result<Self> {
        let lower = s.to_lowercase();
        FundingSource::ALL
            .iter()
            .copied()
            .find(|source| source.as_str() == lower)
            .ok_or_else(|| crate::ButtonError::config(format!("Unknown funding source: {}", s)))
    }
}

/// A card network nested under the card funding source
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Hiper,
    Elo,
    Jcb,
}

impl CardBrand {
    /// Every card brand, in query declaration order
    pub const ALL: [CardBrand; 7] = [
        CardBrand::Visa,
        CardBrand::Mastercard,
        CardBrand::Amex,
        CardBrand::Discover,
        CardBrand::Hiper,
        CardBrand::Elo,
        CardBrand::Jcb,
    ];

    /// Get the wire identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            CardBrand::Visa => "visa",
            CardBrand::Mastercard => "mastercard",
            CardBrand::Amex => "amex",
            CardBrand::Discover => "discover",
            CardBrand::Hiper => "hiper",
            CardBrand::Elo => "elo",
            CardBrand::Jcb => "jcb",
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
