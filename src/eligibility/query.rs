//! Funding eligibility query minimization
//!
//! A static schema lists every eligibility field the backend can answer. The
//! fields the baseline already defines form a [`KnownFields`] mask, and the
//! [`EligibilitySelection`] sent to the backend is the schema minus that mask.

use crate::types::{
    operations, CardBrand, FundingEligibility, FundingSource, FundingSourceEligibility,
    VendorEligibility,
};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

/// A scalar or list field of an eligibility record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EligibilityField {
    Eligible,
    Vaultable,
    Branded,
    VaultedInstruments,
}

impl EligibilityField {
    /// GraphQL field name
    pub fn as_str(&self) -> &'static str {
        match self {
            EligibilityField::Eligible => "eligible",
            EligibilityField::Vaultable => "vaultable",
            EligibilityField::Branded => "branded",
            EligibilityField::VaultedInstruments => "vaultedInstruments",
        }
    }

    fn selection(&self) -> &'static str {
        match self {
            EligibilityField::VaultedInstruments => {
                "vaultedInstruments { id label { description } }"
            }
            other => other.as_str(),
        }
    }
}

const PAYPAL_FIELDS: &[EligibilityField] = &[
    EligibilityField::Eligible,
    EligibilityField::Vaultable,
    EligibilityField::VaultedInstruments,
];

const CARD_FIELDS: &[EligibilityField] = &[EligibilityField::Eligible, EligibilityField::Branded];

const VENDOR_FIELDS: &[EligibilityField] = &[
    EligibilityField::Eligible,
    EligibilityField::Vaultable,
    EligibilityField::VaultedInstruments,
];

const DEFAULT_FIELDS: &[EligibilityField] = &[EligibilityField::Eligible];

/// Scalar fields the backend can answer for a funding source
pub fn schema_fields(source: FundingSource) -> &'static [EligibilityField] {
    match source {
        FundingSource::Paypal => PAYPAL_FIELDS,
        FundingSource::Card => CARD_FIELDS,
        _ => DEFAULT_FIELDS,
    }
}

/// Fields the backend can answer for a card brand
pub fn vendor_schema_fields() -> &'static [EligibilityField] {
    VENDOR_FIELDS
}

fn source_defined(record: &FundingSourceEligibility) -> BTreeSet<EligibilityField> {
    let mut fields = BTreeSet::new();
    if record.eligible.is_some() {
        fields.insert(EligibilityField::Eligible);
    }
    if record.vaultable.is_some() {
        fields.insert(EligibilityField::Vaultable);
    }
    if record.branded.is_some() {
        fields.insert(EligibilityField::Branded);
    }
    if record.vaulted_instruments.is_some() {
        fields.insert(EligibilityField::VaultedInstruments);
    }
    fields
}

fn vendor_defined(vendor: &VendorEligibility) -> BTreeSet<EligibilityField> {
    let mut fields = BTreeSet::new();
    if vendor.eligible.is_some() {
        fields.insert(EligibilityField::Eligible);
    }
    if vendor.vaultable.is_some() {
        fields.insert(EligibilityField::Vaultable);
    }
    if vendor.vaulted_instruments.is_some() {
        fields.insert(EligibilityField::VaultedInstruments);
    }
    fields
}

/// Fields already defined locally
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownFields {
    sources: BTreeMap<FundingSource, BTreeSet<EligibilityField>>,
    vendors: BTreeMap<CardBrand, BTreeSet<EligibilityField>>,
}

impl KnownFields {
    /// Compute the mask of a baseline
    pub fn from_baseline(baseline: &FundingEligibility) -> Self {
        let mut known = Self::default();
        for (source, record) in baseline.iter() {
            known.sources.insert(*source, source_defined(record));
            if *source == FundingSource::Card {
                for (brand, vendor) in record.vendors.iter().flatten() {
                    known.vendors.insert(*brand, vendor_defined(vendor));
                }
            }
        }
        known
    }

    /// Whether the field of a funding source is known
    pub fn is_known(&self, source: FundingSource, field: EligibilityField) -> bool {
        self.sources
            .get(&source)
            .map_or(false, |fields| fields.contains(&field))
    }

    /// Whether the field of a card brand is known
    pub fn is_vendor_known(&self, brand: CardBrand, field: EligibilityField) -> bool {
        self.vendors
            .get(&brand)
            .map_or(false, |fields| fields.contains(&field))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SourceSelection {
    fields: Vec<EligibilityField>,
    vendors: Vec<(CardBrand, Vec<EligibilityField>)>,
}

impl SourceSelection {
    fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.vendors.is_empty()
    }
}

/// Eligibility fields requested from the backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibilitySelection {
    sources: Vec<(FundingSource, SourceSelection)>,
}

impl EligibilitySelection {
    /// Every field of the schema
    pub fn full() -> Self {
        let sources = FundingSource::ALL
            .iter()
            .map(|source| {
                let vendors = if *source == FundingSource::Card {
                    CardBrand::ALL
                        .iter()
                        .map(|brand| (*brand, VENDOR_FIELDS.to_vec()))
                        .collect()
                } else {
                    Vec::new()
                };
                (
                    *source,
                    SourceSelection {
                        fields: schema_fields(*source).to_vec(),
                        vendors,
                    },
                )
            })
            .collect();

        Self { sources }
    }

    /// Only the fields the baseline does not define yet
    pub fn for_baseline(baseline: &FundingEligibility) -> Self {
        Self::full().without(&KnownFields::from_baseline(baseline))
    }

    /// Remove the known fields; sources re-fetched on every load keep their full selection
    pub fn without(self, known: &KnownFields) -> Self {
        let sources = self
            .sources
            .into_iter()
            .map(|(source, selection)| {
                if source.always_refetched() {
                    return (source, selection);
                }

                let fields = selection
                    .fields
                    .into_iter()
                    .filter(|field| !known.is_known(source, *field))
                    .collect();
                let vendors = selection
                    .vendors
                    .into_iter()
                    .map(|(brand, fields)| {
                        let fields = fields
                            .into_iter()
                            .filter(|field| !known.is_vendor_known(brand, *field))
                            .collect::<Vec<_>>();
                        (brand, fields)
                    })
                    .filter(|(_, fields)| !fields.is_empty())
                    .collect();

                (source, SourceSelection { fields, vendors })
            })
            .filter(|(_, selection)| !selection.is_empty())
            .collect();

        Self { sources }
    }

    /// Whether nothing is requested
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    fn source(&self, source: FundingSource) -> Option<&SourceSelection> {
        self.sources
            .iter()
            .find(|(candidate, _)| *candidate == source)
            .map(|(_, selection)| selection)
    }

    /// Whether the scalar field of a source is requested
    pub fn requests(&self, source: FundingSource, field: EligibilityField) -> bool {
        self.source(source)
            .map_or(false, |selection| selection.fields.contains(&field))
    }

    /// Whether the field of a card brand is requested
    pub fn requests_vendor(&self, brand: CardBrand, field: EligibilityField) -> bool {
        self.source(FundingSource::Card).map_or(false, |selection| {
            selection
                .vendors
                .iter()
                .any(|(candidate, fields)| *candidate == brand && fields.contains(&field))
        })
    }

    /// Drop everything from a response that was not requested
    pub fn restrict(&self, response: FundingEligibility) -> FundingEligibility {
        let mut restricted = FundingEligibility::new();

        for (source, record) in response.iter() {
            let source = *source;
            if self.source(source).is_none() {
                continue;
            }

            let keep = |field| self.requests(source, field);
            let vendors = record.vendors.as_ref().map(|vendors| {
                vendors
                    .iter()
                    .filter_map(|(brand, vendor)| {
                        let keep = |field| self.requests_vendor(*brand, field);
                        let vendor = VendorEligibility {
                            eligible: vendor.eligible.filter(|_| keep(EligibilityField::Eligible)),
                            vaultable: vendor
                                .vaultable
                                .filter(|_| keep(EligibilityField::Vaultable)),
                            vaulted_instruments: vendor
                                .vaulted_instruments
                                .clone()
                                .filter(|_| keep(EligibilityField::VaultedInstruments)),
                        };
                        (vendor != VendorEligibility::default()).then_some((*brand, vendor))
                    })
                    .collect::<BTreeMap<_, _>>()
            });

            let record = FundingSourceEligibility {
                eligible: record.eligible.filter(|_| keep(EligibilityField::Eligible)),
                vaultable: record.vaultable.filter(|_| keep(EligibilityField::Vaultable)),
                branded: record.branded.filter(|_| keep(EligibilityField::Branded)),
                vaulted_instruments: record
                    .vaulted_instruments
                    .clone()
                    .filter(|_| keep(EligibilityField::VaultedInstruments)),
                vendors: vendors.filter(|vendors| !vendors.is_empty()),
            };

            if record != FundingSourceEligibility::default() {
                restricted.insert(source, record);
            }
        }

        restricted
    }

    /// Render the `GetFundingEligibility` document
    pub fn to_query(&self) -> String {
        let mut query = String::new();
        let _ = writeln!(query, "query {}(", operations::GET_FUNDING_ELIGIBILITY);
        let declarations: Vec<String> = QUERY_VARIABLES
            .iter()
            .map(|(name, ty, _)| format!("    ${}: {}", name, ty))
            .collect();
        query.push_str(&declarations.join(",\n"));
        query.push_str("\n) {\n    fundingEligibility(\n");
        let arguments: Vec<String> = QUERY_VARIABLES
            .iter()
            .map(|(name, _, argument)| format!("        {}: ${}", argument, name))
            .collect();
        query.push_str(&arguments.join(",\n"));
        query.push_str("\n    ) {\n");

        for (source, selection) in &self.sources {
            let _ = writeln!(query, "        {} {{", source.as_str());
            for field in &selection.fields {
                let _ = writeln!(query, "            {}", field.selection());
            }
            if !selection.vendors.is_empty() {
                query.push_str("            vendors {\n");
                for (brand, fields) in &selection.vendors {
                    let _ = writeln!(query, "                {} {{", brand.as_str());
                    for field in fields {
                        let _ = writeln!(query, "                    {}", field.selection());
                    }
                    query.push_str("                }\n");
                }
                query.push_str("            }\n");
            }
            query.push_str("        }\n");
        }

        query.push_str("    }\n}\n");
        query
    }
}

/// Variable name, GraphQL type and argument name of the eligibility query
const QUERY_VARIABLES: &[(&str, &str, &str)] = &[
    ("clientID", "String", "clientId"),
    ("buyerCountry", "CountryCodes", "buyerCountry"),
    ("ip", "String", "ip"),
    ("cookies", "String", "cookies"),
    ("currency", "SupportedCountryCurrencies", "currency"),
    ("intent", "FundingEligibilityIntent", "intent"),
    ("commit", "Boolean", "commit"),
    ("vault", "Boolean", "vault"),
    ("disableFunding", "[ SupportedPaymentMethodsType ]", "disableFunding"),
    ("disableCard", "[ SupportedCardsType ]", "disableCard"),
    ("merchantID", "[ String ]", "merchantId"),
    ("buttonSessionID", "String", "buttonSessionId"),
    ("userAgent", "String", "userAgent"),
];

/// Build the minimized eligibility query for a baseline
pub fn build_funding_eligibility_query(baseline: &FundingEligibility) -> String {
    EligibilitySelection::for_baseline(baseline).to_query()
}
