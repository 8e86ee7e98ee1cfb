//! Tests for eligibility query minimization, merging and resolution

use super::*;
use crate::test_support::{MockGraphql, RecordingLogger};
use crate::types::{
    events, CardBrand, FundingEligibility, FundingSource, FundingSourceEligibility,
    InstrumentLabel, VaultedInstrument, VendorEligibility,
};
use crate::ButtonError;
use http::header::{COOKIE, USER_AGENT};
use http::{HeaderMap, HeaderValue};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn all_vendor_fields() -> VendorEligibility {
    VendorEligibility {
        eligible: Some(true),
        vaultable: Some(false),
        vaulted_instruments: Some(Vec::new()),
    }
}

fn page_request() -> RequestInfo {
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_static("session=abc"));
    headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));
    RequestInfo::from_parts(Some("203.0.113.9".to_string()), headers)
}

fn options(baseline: FundingEligibility, logger: Arc<RecordingLogger>) -> FundingEligibilityOptions {
    FundingEligibilityOptions::new("client-id", baseline)
        .with_logger(logger)
        .with_button_session_id("button-session")
}

#[test]
fn test_selection_skips_known_fields() {
    let baseline = FundingEligibility::new().with_source(
        FundingSource::Paypal,
        FundingSourceEligibility::eligible(true).with_vaultable(true),
    );

    let selection = EligibilitySelection::for_baseline(&baseline);
    assert!(!selection.requests(FundingSource::Paypal, EligibilityField::Eligible));
    assert!(!selection.requests(FundingSource::Paypal, EligibilityField::Vaultable));
    assert!(selection.requests(FundingSource::Paypal, EligibilityField::VaultedInstruments));
    assert!(selection.requests(FundingSource::Card, EligibilityField::Branded));
    assert!(!selection.requests(FundingSource::Sepa, EligibilityField::Branded));
}

#[test]
fn test_fully_known_source_is_omitted() {
    let baseline = FundingEligibility::new()
        .with_source(FundingSource::Sepa, FundingSourceEligibility::eligible(false));

    let query = build_funding_eligibility_query(&baseline);
    assert!(!query.contains("sepa {"));
    assert!(query.contains("ideal {"));
}

#[test]
fn test_always_refetched_sources() {
    let baseline = FundingEligibility::new()
        .with_source(FundingSource::Venmo, FundingSourceEligibility::eligible(true))
        .with_source(FundingSource::Itau, FundingSourceEligibility::eligible(false));

    let selection = EligibilitySelection::for_baseline(&baseline);
    assert!(selection.requests(FundingSource::Venmo, EligibilityField::Eligible));
    assert!(selection.requests(FundingSource::Itau, EligibilityField::Eligible));
}

#[test]
fn test_known_vendors_are_pruned() {
    let baseline = FundingEligibility::new().with_source(
        FundingSource::Card,
        FundingSourceEligibility::eligible(true)
            .with_branded(false)
            .with_vendor(CardBrand::Visa, all_vendor_fields())
            .with_vendor(
                CardBrand::Amex,
                VendorEligibility {
                    eligible: Some(false),
                    ..Default::default()
                },
            ),
    );

    let selection = EligibilitySelection::for_baseline(&baseline);
    assert!(!selection.requests(FundingSource::Card, EligibilityField::Eligible));
    assert!(!selection.requests_vendor(CardBrand::Visa, EligibilityField::Eligible));
    assert!(!selection.requests_vendor(CardBrand::Amex, EligibilityField::Eligible));
    assert!(selection.requests_vendor(CardBrand::Amex, EligibilityField::Vaultable));
    assert!(selection.requests_vendor(CardBrand::Mastercard, EligibilityField::Eligible));

    let query = selection.to_query();
    assert!(!query.contains("visa {"));
    assert!(query.contains("mastercard {"));
}

#[test]
fn test_query_document() {
    let query = build_funding_eligibility_query(&FundingEligibility::new());

    assert!(query.starts_with("query GetFundingEligibility("));
    for variable in [
        "$clientID: String",
        "$buyerCountry: CountryCodes",
        "$disableFunding: [ SupportedPaymentMethodsType ]",
        "$merchantID: [ String ]",
        "$userAgent: String",
    ] {
        assert!(query.contains(variable), "missing {}", variable);
    }
    assert!(query.contains("clientId: $clientID"));
    assert!(query.contains("vaultedInstruments { id label { description } }"));
    assert!(query.contains("vendors {"));
}

#[test]
fn test_known_fields_mask() {
    let baseline = FundingEligibility::new().with_source(
        FundingSource::Card,
        FundingSourceEligibility::eligible(true).with_vendor(CardBrand::Jcb, all_vendor_fields()),
    );

    let known = KnownFields::from_baseline(&baseline);
    assert!(known.is_known(FundingSource::Card, EligibilityField::Eligible));
    assert!(!known.is_known(FundingSource::Card, EligibilityField::Branded));
    assert!(known.is_vendor_known(CardBrand::Jcb, EligibilityField::VaultedInstruments));
    assert!(!known.is_vendor_known(CardBrand::Elo, EligibilityField::Eligible));
}

#[test]
fn test_merge_with_empty_response_keeps_baseline() {
    let baseline = FundingEligibility::new()
        .with_source(FundingSource::Paypal, FundingSourceEligibility::eligible(true))
        .with_source(
            FundingSource::Card,
            FundingSourceEligibility::eligible(true).with_vendor(CardBrand::Visa, all_vendor_fields()),
        );

    assert_eq!(merge(&baseline, &FundingEligibility::new()), baseline);
    assert_eq!(merge(&FundingEligibility::new(), &baseline), baseline);
}

#[test]
fn test_merge_is_deep_and_right_biased() {
    let baseline = FundingEligibility::new().with_source(
        FundingSource::Card,
        FundingSourceEligibility::eligible(true).with_vendor(
            CardBrand::Visa,
            VendorEligibility {
                eligible: Some(true),
                ..Default::default()
            },
        ),
    );
    let server = FundingEligibility::new().with_source(
        FundingSource::Card,
        FundingSourceEligibility {
            branded: Some(true),
            ..Default::default()
        }
        .with_vendor(
            CardBrand::Visa,
            VendorEligibility {
                vaultable: Some(true),
                ..Default::default()
            },
        )
        .with_vendor(
            CardBrand::Amex,
            VendorEligibility {
                eligible: Some(false),
                ..Default::default()
            },
        ),
    );

    let merged = merge(&baseline, &server);
    let card = merged.get(FundingSource::Card).unwrap();
    assert_eq!(card.eligible, Some(true));
    assert_eq!(card.branded, Some(true));

    let vendors = card.vendors.as_ref().unwrap();
    assert_eq!(
        vendors[&CardBrand::Visa],
        VendorEligibility {
            eligible: Some(true),
            vaultable: Some(true),
            vaulted_instruments: None,
        }
    );
    assert_eq!(vendors[&CardBrand::Amex].eligible, Some(false));

    assert_eq!(merge(&merged, &server), merged);
}

#[test]
fn test_restrict_drops_unrequested_fields() {
    let baseline = FundingEligibility::new()
        .with_source(FundingSource::Paypal, FundingSourceEligibility::eligible(false));
    let selection = EligibilitySelection::for_baseline(&baseline);

    let response: FundingEligibility = serde_json::from_value(json!({
        "paypal": { "eligible": true, "vaultable": true },
        "sepa": { "eligible": true }
    }))
    .unwrap();

    let restricted = selection.restrict(response);
    let paypal = restricted.get(FundingSource::Paypal).unwrap();
    assert_eq!(paypal.eligible, None);
    assert_eq!(paypal.vaultable, Some(true));
    assert!(restricted.is_eligible(FundingSource::Sepa));
}

#[tokio::test]
async fn test_resolve_merges_without_overwriting() {
    let baseline = FundingEligibility::new()
        .with_source(FundingSource::Paypal, FundingSourceEligibility::eligible(false));
    let executor = MockGraphql::returning(json!({
        "fundingEligibility": {
            "paypal": {
                "eligible": true,
                "vaultable": true,
                "vaultedInstruments": [
                    { "id": "PM1", "label": { "description": "jane@example.com" } }
                ]
            },
            "venmo": { "eligible": true }
        }
    }));
    let logger = Arc::new(RecordingLogger::default());
    let options = options(baseline, logger.clone()).with_client_access_token("ACCESS_TOKEN");

    let resolved = resolve_funding_eligibility(&page_request(), &executor, &options).await;

    let paypal = resolved.get(FundingSource::Paypal).unwrap();
    assert_eq!(paypal.eligible, Some(false));
    assert_eq!(paypal.vaultable, Some(true));
    assert_eq!(
        paypal.vaulted_instruments,
        Some(vec![VaultedInstrument {
            id: "PM1".to_string(),
            label: InstrumentLabel {
                description: "jane@example.com".to_string(),
            },
        }])
    );
    assert!(resolved.is_eligible(FundingSource::Venmo));
    assert!(logger.events().is_empty());

    let requests = executor.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].access_token.as_deref(), Some("ACCESS_TOKEN"));
    assert_eq!(requests[0].variables["clientID"], "client-id");
    assert_eq!(requests[0].variables["ip"], "203.0.113.9");
    assert_eq!(requests[0].variables["cookies"], "session=abc");
    assert_eq!(requests[0].variables["userAgent"], "Mozilla/5.0");
    assert_eq!(requests[0].variables["buttonSessionID"], "button-session");
}

#[tokio::test]
async fn test_resolve_keeps_sources_beside_a_null_record() {
    let executor = MockGraphql::returning(json!({
        "fundingEligibility": {
            "paypal": null,
            "sepa": { "eligible": true }
        }
    }));
    let logger = Arc::new(RecordingLogger::default());

    let resolved = resolve_funding_eligibility(
        &page_request(),
        &executor,
        &options(FundingEligibility::new(), logger.clone()),
    )
    .await;

    assert!(resolved.is_eligible(FundingSource::Sepa));
    assert!(resolved.get(FundingSource::Paypal).is_none());
    assert!(logger.events().is_empty());
}

#[tokio::test]
async fn test_resolve_falls_back_on_error() {
    let baseline = FundingEligibility::new()
        .with_source(FundingSource::Paypal, FundingSourceEligibility::eligible(true));
    let executor = MockGraphql::failing(ButtonError::graphql("backend unavailable"));
    let logger = Arc::new(RecordingLogger::default());

    let resolved =
        resolve_funding_eligibility(&page_request(), &executor, &options(baseline.clone(), logger.clone()))
            .await;

    assert_eq!(resolved, baseline);
    let logged = logger.events();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].0, events::FUNDING_ELIGIBILITY_FALLBACK);
    assert!(logged[0].1["err"]
        .as_str()
        .unwrap()
        .contains("backend unavailable"));
}

#[tokio::test]
async fn test_resolve_times_out() {
    let baseline = FundingEligibility::new()
        .with_source(FundingSource::Paypal, FundingSourceEligibility::eligible(true));
    let executor = MockGraphql::returning(json!({ "fundingEligibility": {} }))
        .with_delay(Duration::from_millis(200));
    let logger = Arc::new(RecordingLogger::default());
    let options = options(baseline.clone(), logger.clone()).with_timeout(Duration::from_millis(20));

    let resolved = resolve_funding_eligibility(&page_request(), &executor, &options).await;

    assert_eq!(resolved, baseline);
    assert_eq!(logger.events().len(), 1);
}

#[tokio::test]
async fn test_resolve_without_eligibility_data() {
    let baseline = FundingEligibility::new();
    let executor = MockGraphql::returning(json!({ "somethingElse": true }));
    let logger = Arc::new(RecordingLogger::default());

    let resolved =
        resolve_funding_eligibility(&page_request(), &executor, &options(baseline, logger.clone())).await;

    assert!(resolved.is_empty());
    assert_eq!(logger.events().len(), 1);
}

#[tokio::test]
async fn test_invalid_header_falls_back_before_query() {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_bytes(&[0xff]).unwrap());
    let request = RequestInfo::from_parts(None, headers);
    let baseline = FundingEligibility::new()
        .with_source(FundingSource::Paypal, FundingSourceEligibility::eligible(true));
    let executor = MockGraphql::returning(json!({ "fundingEligibility": {} }));
    let logger = Arc::new(RecordingLogger::default());

    let resolved =
        resolve_funding_eligibility(&request, &executor, &options(baseline.clone(), logger.clone()))
            .await;

    assert_eq!(resolved, baseline);
    assert!(executor.requests().is_empty());
    assert_eq!(logger.events().len(), 1);
}

#[test]
fn test_variables_are_normalized() {
    let options = FundingEligibilityOptions::new("client-id", FundingEligibility::new())
        .with_intent("capture")
        .with_buyer_country("US")
        .with_disable_funding(vec![FundingSource::Venmo, FundingSource::Credit])
        .with_disable_card(vec![CardBrand::Amex])
        .with_merchant_id(vec!["MERCHANT1".to_string()]);

    let variables = FundingEligibilityVariables::from_request(&RequestInfo::default(), &options).unwrap();
    assert_eq!(variables.intent.as_deref(), Some("CAPTURE"));
    assert_eq!(variables.disable_funding, vec!["VENMO", "CREDIT"]);
    assert_eq!(variables.disable_card, vec!["AMEX"]);
    assert_eq!(variables.ip, "");
    assert_eq!(variables.cookies, "");
    assert!(variables.commit);

    let value = serde_json::to_value(&variables).unwrap();
    assert_eq!(value["buyerCountry"], "US");
    assert_eq!(value["merchantID"], json!(["MERCHANT1"]));
    assert_eq!(value["disableCard"], json!(["AMEX"]));
}
