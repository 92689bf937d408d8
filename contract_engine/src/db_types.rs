use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use csg_common::helpers::normalize_key;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------     PartyRole       ---------------------------------------------------------
/// The two fixed signing parties on every contract. The document templates identify the
/// slots by the provider role strings "First Party" (seller) and "Second Party" (buyer);
/// this enum owns that mapping so role comparisons stay exhaustive and typo-proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartyRole {
    Seller,
    Buyer,
}

impl PartyRole {
    pub const BOTH: [PartyRole; 2] = [PartyRole::Seller, PartyRole::Buyer];

    /// The role string the e-signature provider uses for this party.
    pub fn provider_role(&self) -> &'static str {
        match self {
            PartyRole::Seller => "First Party",
            PartyRole::Buyer => "Second Party",
        }
    }

    /// Matches free-text role tokens from webhook payloads: the provider role string or the
    /// plain party name, case-insensitive and trimmed.
    pub fn matches_role_text(&self, text: &str) -> bool {
        let Some(normalized) = normalize_key(text) else { return false };
        let provider = self.provider_role().to_lowercase();
        let plain = match self {
            PartyRole::Seller => "seller",
            PartyRole::Buyer => "buyer",
        };
        normalized == provider || normalized == plain
    }
}

impl Display for PartyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartyRole::Seller => write!(f, "seller"),
            PartyRole::Buyer => write!(f, "buyer"),
        }
    }
}

//--------------------------------------    PartyStatus      ---------------------------------------------------------
/// One party's signing state. Stored and serialized as the upper-case tokens the rest of
/// the marketplace already uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartyStatus {
    #[default]
    Pending,
    Signed,
    Declined,
}

impl Display for PartyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartyStatus::Pending => write!(f, "PENDING"),
            PartyStatus::Signed => write!(f, "SIGNED"),
            PartyStatus::Declined => write!(f, "DECLINED"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid status token: {0}")]
pub struct StatusConversionError(String);

impl FromStr for PartyStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "SIGNED" => Ok(Self::Signed),
            "DECLINED" => Ok(Self::Declined),
            s => Err(StatusConversionError(s.to_string())),
        }
    }
}

//--------------------------------------   ContractStatus    ---------------------------------------------------------
/// The overall contract state. Outside of `Draft` this is a cache of
/// [`crate::reconcile::overall_status`] over the two party statuses, recomputed on every
/// update; it is never written independently of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    /// Created locally, not yet dispatched to the provider.
    #[default]
    Draft,
    PendingBoth,
    SignedSeller,
    SignedBuyer,
    SignedBoth,
    Declined,
}

impl Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractStatus::Draft => write!(f, "DRAFT"),
            ContractStatus::PendingBoth => write!(f, "PENDING_BOTH"),
            ContractStatus::SignedSeller => write!(f, "SIGNED_SELLER"),
            ContractStatus::SignedBuyer => write!(f, "SIGNED_BUYER"),
            ContractStatus::SignedBoth => write!(f, "SIGNED_BOTH"),
            ContractStatus::Declined => write!(f, "DECLINED"),
        }
    }
}

impl FromStr for ContractStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(Self::Draft),
            "PENDING_BOTH" => Ok(Self::PendingBoth),
            "SIGNED_SELLER" => Ok(Self::SignedSeller),
            "SIGNED_BUYER" => Ok(Self::SignedBuyer),
            "SIGNED_BOTH" => Ok(Self::SignedBoth),
            "DECLINED" => Ok(Self::Declined),
            s => Err(StatusConversionError(s.to_string())),
        }
    }
}

//--------------------------------------      Contract       ---------------------------------------------------------
/// The persisted contract record. One row per order; the row doubles as the API projection
/// (camelCase serialization matches the marketplace's existing DTOs).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: i64,
    pub order_id: i64,
    pub template_id: String,
    /// Assigned after the gateway call; immutable and unique once set. The primary
    /// webhook-matching key.
    pub envelope_id: Option<String>,
    pub content: Option<String>,
    pub seller_email: String,
    pub seller_name: Option<String>,
    pub seller_status: PartyStatus,
    pub seller_signing_url: Option<String>,
    pub seller_signed_at: Option<DateTime<Utc>>,
    pub buyer_email: String,
    pub buyer_name: Option<String>,
    pub buyer_status: PartyStatus,
    pub buyer_signing_url: Option<String>,
    pub buyer_signed_at: Option<DateTime<Utc>>,
    pub status: ContractStatus,
    /// Link to the fully executed document. Only meaningful once both parties signed.
    pub signed_file_url: Option<String>,
    pub signed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    pub fn party_email(&self, role: PartyRole) -> &str {
        match role {
            PartyRole::Seller => &self.seller_email,
            PartyRole::Buyer => &self.buyer_email,
        }
    }

    pub fn party_status(&self, role: PartyRole) -> PartyStatus {
        match role {
            PartyRole::Seller => self.seller_status,
            PartyRole::Buyer => self.buyer_status,
        }
    }

    pub fn set_party_status(&mut self, role: PartyRole, status: PartyStatus) {
        match role {
            PartyRole::Seller => self.seller_status = status,
            PartyRole::Buyer => self.buyer_status = status,
        }
    }

    pub fn party_signed_at(&self, role: PartyRole) -> Option<DateTime<Utc>> {
        match role {
            PartyRole::Seller => self.seller_signed_at,
            PartyRole::Buyer => self.buyer_signed_at,
        }
    }

    pub fn set_party_signed_at(&mut self, role: PartyRole, at: Option<DateTime<Utc>>) {
        match role {
            PartyRole::Seller => self.seller_signed_at = at,
            PartyRole::Buyer => self.buyer_signed_at = at,
        }
    }

    pub fn is_fully_signed(&self) -> bool {
        self.seller_status == PartyStatus::Signed && self.buyer_status == PartyStatus::Signed
    }
}

//--------------------------------------     NewContract     ---------------------------------------------------------
/// Input for the draft upsert. Party statuses, urls and timestamps are reset by the store;
/// only the resolved identities travel here.
#[derive(Debug, Clone)]
pub struct NewContract {
    pub order_id: i64,
    pub template_id: String,
    pub content: Option<String>,
    pub seller_email: String,
    pub seller_name: Option<String>,
    pub buyer_email: String,
    pub buyer_name: Option<String>,
}

//--------------------------------------    WebhookEvent     ---------------------------------------------------------
/// A provider webhook notification after payload normalization. Every field is optional;
/// the reconciliation engine decides what is actionable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub envelope_id: Option<String>,
    pub participant_email: Option<String>,
    pub participant_role: Option<String>,
    pub status: Option<String>,
    pub event_type: Option<String>,
    pub signed_file_url: Option<String>,
    pub signed_at: Option<DateTime<Utc>>,
}

impl WebhookEvent {
    /// True when the event carries something that could locate a contract.
    pub fn has_locator(&self) -> bool {
        let non_blank = |v: &Option<String>| v.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false);
        non_blank(&self.envelope_id) || non_blank(&self.participant_email)
    }
}

//-------------------------------------- ReconciliationOutcome ------------------------------------------------------
/// What a webhook delivery did. `NoMatch` is not an error: unmatched events are logged and
/// acknowledged so the provider does not retry indefinitely.
#[derive(Debug, Clone)]
pub enum ReconciliationOutcome {
    Updated(Box<Contract>),
    NoMatch,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn role_matching_accepts_provider_and_plain_tokens() {
        assert!(PartyRole::Seller.matches_role_text("First Party"));
        assert!(PartyRole::Seller.matches_role_text("  first party "));
        assert!(PartyRole::Seller.matches_role_text("SELLER"));
        assert!(!PartyRole::Seller.matches_role_text("Second Party"));
        assert!(!PartyRole::Seller.matches_role_text(""));
        assert!(PartyRole::Buyer.matches_role_text("second party"));
        assert!(PartyRole::Buyer.matches_role_text("Buyer"));
    }

    #[test]
    fn status_tokens_round_trip() {
        for status in [PartyStatus::Pending, PartyStatus::Signed, PartyStatus::Declined] {
            assert_eq!(status.to_string().parse::<PartyStatus>().unwrap(), status);
        }
        for status in [
            ContractStatus::Draft,
            ContractStatus::PendingBoth,
            ContractStatus::SignedSeller,
            ContractStatus::SignedBuyer,
            ContractStatus::SignedBoth,
            ContractStatus::Declined,
        ] {
            assert_eq!(status.to_string().parse::<ContractStatus>().unwrap(), status);
        }
        assert!("Signed".parse::<PartyStatus>().is_err());
    }
}
