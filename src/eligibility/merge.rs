//! Right-biased merge of eligibility records

use crate::types::{FundingEligibility, FundingSourceEligibility, VendorEligibility};
use std::collections::BTreeMap;

/// Deep structural merge returning a new value
///
/// Every field defined on `other` wins; fields `other` leaves undefined keep
/// the value of `self`.
pub trait Merge {
    fn merge(&self, other: &Self) -> Self;
}

fn merge_option<T: Clone>(base: &Option<T>, other: &Option<T>) -> Option<T> {
    other.clone().or_else(|| base.clone())
}

fn merge_map<K: Ord + Clone, V: Merge + Clone>(
    base: &BTreeMap<K, V>,
    other: &BTreeMap<K, V>,
) -> BTreeMap<K, V> {
    let mut merged = base.clone();
    for (key, value) in other {
        let value = match base.get(key) {
            Some(existing) => existing.merge(value),
            None => value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged
}

impl Merge for VendorEligibility {
    fn merge(&self, other: &Self) -> Self {
        Self {
            eligible: merge_option(&self.eligible, &other.eligible),
            vaultable: merge_option(&self.vaultable, &other.vaultable),
            vaulted_instruments: merge_option(&self.vaulted_instruments, &other.vaulted_instruments),
        }
    }
}

impl Merge for FundingSourceEligibility {
    fn merge(&self, other: &Self) -> Self {
        let vendors = match (&self.vendors, &other.vendors) {
            (Some(base), Some(other)) => Some(merge_map(base, other)),
            (base, other) => merge_option(base, other),
        };

        Self {
            eligible: merge_option(&self.eligible, &other.eligible),
            vaultable: merge_option(&self.vaultable, &other.vaultable),
            branded: merge_option(&self.branded, &other.branded),
            vaulted_instruments: merge_option(&self.vaulted_instruments, &other.vaulted_instruments),
            vendors,
        }
    }
}

impl Merge for FundingEligibility {
    fn merge(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        let sources = merged.sources_mut();
        for (source, record) in other.iter() {
            let record = match sources.get(source) {
                Some(existing) => existing.merge(record),
                None => record.clone(),
            };
            sources.insert(*source, record);
        }
        merged
    }
}

/// Merge a server response into a baseline
pub fn merge(baseline: &FundingEligibility, server: &FundingEligibility) -> FundingEligibility {
    baseline.merge(server)
}
