use std::collections::HashMap;

use csg_common::helpers::normalize_key;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single signing party on an envelope. The role string is whatever the document template
/// uses to identify the slot ("First Party", "Second Party", ...); callers own the mapping
/// from their domain parties to roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signer {
    pub role: String,
    pub email: String,
    pub name: Option<String>,
}

impl Signer {
    pub fn new<S: Into<String>>(role: S, email: S, name: Option<String>) -> Self {
        Self { role: role.into(), email: email.into(), name }
    }

    pub fn role_or(&self, fallback: &str) -> String {
        if self.role.trim().is_empty() {
            fallback.to_string()
        } else {
            self.role.clone()
        }
    }
}

/// Per-signer signing links harvested from a creation response, indexed both by normalized
/// role and by lowercased email so callers can resolve a link by either.
#[derive(Debug, Clone, Default)]
pub struct SigningUrlIndex {
    pub by_role: HashMap<String, String>,
    pub by_email: HashMap<String, String>,
}

impl SigningUrlIndex {
    pub fn insert_for_role(&mut self, role: &str, url: String) {
        if let Some(key) = normalize_key(role) {
            self.by_role.entry(key).or_insert(url);
        }
    }

    pub fn insert_for_email(&mut self, email: &str, url: String) {
        if let Some(key) = normalize_key(email) {
            self.by_email.entry(key).or_insert(url);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_role.is_empty() && self.by_email.is_empty()
    }
}

/// Result of a successful envelope creation call.
///
/// `envelope_id` can legitimately be `None`: some provider versions omit the id from both
/// body and headers, in which case webhook reconciliation falls back to email matching.
#[derive(Debug, Clone)]
pub struct EnvelopeCreated {
    pub envelope_id: Option<String>,
    /// A link usable when no per-signer link could be attributed.
    pub signing_url: Option<String>,
    pub urls: SigningUrlIndex,
    /// The raw response body, kept for debug logging.
    pub raw: Value,
}

impl EnvelopeCreated {
    pub fn url_for_role(&self, role: &str) -> Option<&str> {
        normalize_key(role).and_then(|key| self.urls.by_role.get(&key)).map(String::as_str)
    }

    pub fn url_for_email(&self, email: &str) -> Option<&str> {
        normalize_key(email).and_then(|key| self.urls.by_email.get(&key)).map(String::as_str)
    }
}
