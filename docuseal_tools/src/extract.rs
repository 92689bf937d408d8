//! Response-shape extraction for envelope creation.
//!
//! The creation response has carried the envelope/submission id and signing links in several
//! different places across provider versions. Rather than probing nested maps ad hoc, each
//! known shape is a strategy function, and the strategies are tried in a fixed order; the
//! first non-blank hit wins. Adding support for a new response shape means appending one
//! strategy, not editing a probe cascade.
use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::data_objects::SigningUrlIndex;

/// Keys under which a per-signer link may appear inside a signer object.
const LINK_KEYS: [&str; 4] = ["link", "signing_url", "sign_url", "url"];
/// Keys under which arrays of signer objects may appear.
const SIGNER_LIST_KEYS: [&str; 3] = ["submitters", "recipients", "signers"];

type IdStrategy = fn(&Value) -> Option<String>;

/// Ordered list of body shapes that may carry the envelope id.
const ID_STRATEGIES: [IdStrategy; 4] = [id_at_top_level, id_in_named_object, id_under_data, id_in_named_object_under_data];

/// Extracts the envelope/submission id from a creation response: body strategies in order,
/// then the `Location` header's last path segment, then legacy id headers.
pub fn envelope_id(body: &Value, headers: &HeaderMap) -> Option<String> {
    ID_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(body))
        .or_else(|| id_from_location_header(headers))
        .or_else(|| id_from_legacy_headers(headers))
}

fn id_at_top_level(body: &Value) -> Option<String> {
    id_fields(body)
}

fn id_in_named_object(body: &Value) -> Option<String> {
    ["submission", "envelope"].iter().find_map(|key| id_fields(&body[*key]))
}

fn id_under_data(body: &Value) -> Option<String> {
    id_fields(&body["data"])
}

fn id_in_named_object_under_data(body: &Value) -> Option<String> {
    ["submission", "envelope"].iter().find_map(|key| id_fields(&body["data"][*key]))
}

/// The id itself may be a string or a number, under any of the historical key names.
fn id_fields(obj: &Value) -> Option<String> {
    ["id", "envelope_id", "submission_id"].iter().find_map(|key| scalar_as_string(&obj[*key]))
}

fn id_from_location_header(headers: &HeaderMap) -> Option<String> {
    // Location: .../submissions/{id} or .../envelopes/{id}
    let location = headers.get("Location").and_then(|v| v.to_str().ok())?;
    location.rsplit('/').next().filter(|s| !s.is_empty()).map(String::from)
}

fn id_from_legacy_headers(headers: &HeaderMap) -> Option<String> {
    ["X-Submission-Id", "X-Envelope-Id"]
        .iter()
        .find_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()))
        .filter(|s| !s.trim().is_empty())
        .map(String::from)
}

/// Harvests per-signer links from the signer arrays and the `signing_urls` map, at top
/// level and under `data`, into a role- and email-keyed index.
pub fn signing_urls(body: &Value) -> SigningUrlIndex {
    let mut index = SigningUrlIndex::default();
    collect_from_object(body, &mut index);
    collect_from_object(&body["data"], &mut index);
    index
}

fn collect_from_object(obj: &Value, index: &mut SigningUrlIndex) {
    for key in SIGNER_LIST_KEYS {
        let Some(list) = obj[key].as_array() else { continue };
        for item in list {
            let Some(link) = LINK_KEYS.iter().find_map(|k| non_blank_str(&item[*k])) else { continue };
            if let Some(role) = non_blank_str(&item["role"]) {
                index.insert_for_role(role, link.to_string());
            }
            if let Some(email) = non_blank_str(&item["email"]) {
                index.insert_for_email(email, link.to_string());
            }
        }
    }
    if let Some(urls) = obj["signing_urls"].as_object() {
        for (role, value) in urls {
            if let Some(link) = non_blank_str(value) {
                index.insert_for_role(role, link.to_string());
            }
        }
    }
}

/// A single link for "open the document" responses that don't break links out per signer:
/// top-level link keys, then the first signer entry, then the same keys under `data`.
pub fn fallback_signing_url(body: &Value) -> Option<String> {
    let top_level = || LINK_KEYS.iter().find_map(|k| non_blank_str(&body[*k]));
    let first_submitter = || {
        let first = body["submitters"].as_array().and_then(|list| list.first())?;
        LINK_KEYS.iter().find_map(|k| non_blank_str(&first[*k]))
    };
    let under_data = || LINK_KEYS.iter().find_map(|k| non_blank_str(&body["data"][*k]));
    top_level().or_else(first_submitter).or_else(under_data).map(String::from)
}

fn scalar_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_blank_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}
