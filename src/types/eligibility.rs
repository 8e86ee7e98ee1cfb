//! Funding eligibility records

use super::funding::{CardBrand, FundingSource};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A vaulted instrument the buyer can pay with instantly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultedInstrument {
    pub id: String,
    pub label: InstrumentLabel,
}

/// Display label of a vaulted instrument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentLabel {
    pub description: String,
}

/// Eligibility of a single card brand
///
/// `None` means the field is unknown locally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorEligibility {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vaultable: Option<bool>,
    #[serde(rename = "vaultedInstruments", skip_serializing_if = "Option::is_none")]
    pub vaulted_instruments: Option<Vec<VaultedInstrument>>,
}

/// Eligibility of a single funding source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingSourceEligibility {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vaultable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branded: Option<bool>,
    #[serde(rename = "vaultedInstruments", skip_serializing_if = "Option::is_none")]
    pub vaulted_instruments: Option<Vec<VaultedInstrument>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_vendors"
    )]
    pub vendors: Option<BTreeMap<CardBrand, VendorEligibility>>,
}

impl FundingSourceEligibility {
    /// Eligibility record with only `eligible` known
    pub fn eligible(eligible: bool) -> Self {
        Self {
            eligible: Some(eligible),
            ..Default::default()
        }
    }

    /// Set the vaultable flag
    pub fn with_vaultable(mut self, vaultable: bool) -> Self {
        self.vaultable = Some(vaultable);
        self
    }

    /// Set the branded flag
    pub fn with_branded(mut self, branded: bool) -> Self {
        self.branded = Some(branded);
        self
    }

    /// Set the eligibility of one card brand
    pub fn with_vendor(mut self, brand: CardBrand, vendor: VendorEligibility) -> Self {
        self.vendors
            .get_or_insert_with(BTreeMap::new)
            .insert(brand, vendor);
        self
    }
}

/// Server-declared eligibility keyed by funding source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FundingEligibility {
    #[serde(deserialize_with = "deserialize_present")]
    sources: BTreeMap<FundingSource, FundingSourceEligibility>,
}

/// Map whose `null` entries are unknown and dropped
fn deserialize_present<'de, D, K, V>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
where
    D: Deserializer<'de>,
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
{
    let entries = BTreeMap::<K, Option<V>>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)))
        .collect())
}

fn deserialize_vendors<'de, D>(
    deserializer: D,
) -> Result<Option<BTreeMap<CardBrand, VendorEligibility>>, D::Error>
where
    D: Deserializer<'de>,
{
    let vendors = Option::<BTreeMap<CardBrand, Option<VendorEligibility>>>::deserialize(deserializer)?;
    Ok(vendors.map(|entries| {
        entries
            .into_iter()
            .filter_map(|(brand, vendor)| vendor.map(|vendor| (brand, vendor)))
            .collect()
    }))
}

impl FundingEligibility {
    /// Create an empty eligibility map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record of one funding source
    pub fn with_source(mut self, source: FundingSource, record: FundingSourceEligibility) -> Self {
        self.sources.insert(source, record);
        self
    }

    /// Get the record of one funding source
    pub fn get(&self, source: FundingSource) -> Option<&FundingSourceEligibility> {
        self.sources.get(&source)
    }

    /// Insert or replace the record of one funding source
    pub fn insert(&mut self, source: FundingSource, record: FundingSourceEligibility) {
        self.sources.insert(source, record);
    }

    /// Iterate over the known funding sources
    pub fn iter(&self) -> impl Iterator<Item = (&FundingSource, &FundingSourceEligibility)> {
        self.sources.iter()
    }

    /// Whether no funding source is known
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Whether the server declared the source eligible
    pub fn is_eligible(&self, source: FundingSource) -> bool {
        self.get(source)
            .and_then(|record| record.eligible)
            .unwrap_or(false)
    }

    /// Whether the server declared the source vaultable
    pub fn is_vaultable(&self, source: FundingSource) -> bool {
        self.get(source)
            .and_then(|record| record.vaultable)
            .unwrap_or(false)
    }

    pub(crate) fn sources_mut(&mut self) -> &mut BTreeMap<FundingSource, FundingSourceEligibility> {
        &mut self.sources
    }
}
