//! The webhook reconciliation state machine.
//!
//! Pure functions over `(&mut Contract, &WebhookEvent)`: no I/O, no clock access beyond the
//! `now` argument, so every transition is unit-testable. The SQLite backend wraps a call to
//! [`apply_event`] in a single read-modify-write transaction; see
//! [`crate::traits::ContractSigningDatabase::reconcile_event`].
//!
//! The machine is idempotent with respect to replays of an identical event. It is *not*
//! order-independent for genuinely conflicting events (a decline arriving after a signed
//! event for the same party wins); last-write-wins by arrival order is the accepted
//! behaviour.
use chrono::{DateTime, Utc};
use csg_common::helpers::normalize_key;
use log::trace;

use crate::db_types::{Contract, ContractStatus, PartyRole, PartyStatus, WebhookEvent};

/// Known vendor status/event tokens and the party status they normalize to.
///
/// Lookup is by exact (trimmed, lowercased) token, not substring, so the mapping stays
/// auditable. Unknown tokens normalize to `None`, which is a party-status no-op rather than
/// a default guess. Notably absent: `submission.partially_completed`, which must never be
/// read as a whole-envelope completion.
const STATUS_TOKENS: [(&str, PartyStatus); 16] = [
    ("declined", PartyStatus::Declined),
    ("decline", PartyStatus::Declined),
    ("form.declined", PartyStatus::Declined),
    ("submission.declined", PartyStatus::Declined),
    ("signed", PartyStatus::Signed),
    ("sign", PartyStatus::Signed),
    ("completed", PartyStatus::Signed),
    ("complete", PartyStatus::Signed),
    ("form.completed", PartyStatus::Signed),
    ("submission.completed", PartyStatus::Signed),
    ("pending", PartyStatus::Pending),
    ("waiting", PartyStatus::Pending),
    ("awaiting", PartyStatus::Pending),
    ("sent", PartyStatus::Pending),
    ("opened", PartyStatus::Pending),
    ("in_progress", PartyStatus::Pending),
];

/// Maps a free-text vendor status to the tri-state party status, or `None` for tokens we
/// do not recognize.
pub fn classify_token(token: &str) -> Option<PartyStatus> {
    let normalized = normalize_key(token)?;
    STATUS_TOKENS.iter().find(|(t, _)| *t == normalized).map(|(_, status)| *status)
}

/// Normalizes an event's status and event-type fields, in that order of preference.
pub fn normalize_status(status: Option<&str>, event_type: Option<&str>) -> Option<PartyStatus> {
    status.and_then(classify_token).or_else(|| event_type.and_then(classify_token))
}

/// The overall contract status as a pure function of the two party statuses.
pub fn overall_status(seller: PartyStatus, buyer: PartyStatus) -> ContractStatus {
    use PartyStatus::*;
    match (seller, buyer) {
        (Declined, _) | (_, Declined) => ContractStatus::Declined,
        (Signed, Signed) => ContractStatus::SignedBoth,
        (Signed, _) => ContractStatus::SignedSeller,
        (_, Signed) => ContractStatus::SignedBuyer,
        (Pending, Pending) => ContractStatus::PendingBoth,
    }
}

/// What [`apply_event`] did to the contract, for logging and the contract-level timestamp
/// decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventEffect {
    /// The event was attributed to the seller and/or buyer party.
    pub participant_matched: bool,
    /// This event moved the contract from not-fully-signed to fully signed.
    pub completed_signing: bool,
}

/// Applies one normalized webhook event to a contract.
///
/// Replaying the same event twice produces the same final state: party `signed_at` is only
/// stamped on the transition into `Signed`, and every other write is either idempotent or
/// last-write-wins on identical input.
pub fn apply_event(contract: &mut Contract, event: &WebhookEvent, now: DateTime<Utc>) -> EventEffect {
    let normalized = normalize_status(event.status.as_deref(), event.event_type.as_deref());
    let was_fully_signed = contract.is_fully_signed();

    let mut matched = false;
    for role in PartyRole::BOTH {
        // An event can attribute to both parties when their emails collide; both get the
        // update in that case.
        if attributed_to(contract, role, event) {
            matched = true;
            if let Some(status) = normalized {
                update_party(contract, role, status, event.signed_at, now);
            }
        }
    }

    if !matched {
        apply_envelope_level(contract, normalized, event.signed_at, now);
    }

    if let Some(url) = event.signed_file_url.as_deref().filter(|u| !u.trim().is_empty()) {
        // last-write-wins
        contract.signed_file_url = Some(url.to_string());
    }

    let completed_signing = !was_fully_signed && contract.is_fully_signed();
    if let Some(ts) = event.signed_at {
        if completed_signing || !matched {
            contract.signed_at = Some(ts);
        }
    }

    contract.status = overall_status(contract.seller_status, contract.buyer_status);
    contract.updated_at = now;
    trace!(
        "Event applied to contract #{}: matched={matched} status={} seller={} buyer={}",
        contract.id,
        contract.status,
        contract.seller_status,
        contract.buyer_status
    );
    EventEffect { participant_matched: matched, completed_signing }
}

/// A webhook event belongs to a party when its email equals the stored party email
/// (case-insensitive) or its role token names that party.
fn attributed_to(contract: &Contract, role: PartyRole, event: &WebhookEvent) -> bool {
    let email_match = match (normalize_key(contract.party_email(role)), event.participant_email.as_deref()) {
        (Some(stored), Some(given)) => normalize_key(given).map(|g| g == stored).unwrap_or(false),
        _ => false,
    };
    let role_match =
        event.participant_role.as_deref().map(|text| role.matches_role_text(text)).unwrap_or(false);
    email_match || role_match
}

fn update_party(
    contract: &mut Contract,
    role: PartyRole,
    status: PartyStatus,
    event_ts: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) {
    let previous = contract.party_status(role);
    contract.set_party_status(role, status);
    match status {
        PartyStatus::Signed => {
            // Only stamp on the transition, so replaying a timestamp-less event does not
            // shift the recorded signing time.
            if previous != PartyStatus::Signed {
                contract.set_party_signed_at(role, Some(event_ts.unwrap_or(now)));
            }
        },
        PartyStatus::Declined => contract.set_party_signed_at(role, None),
        PartyStatus::Pending => {},
    }
}

/// Best-effort whole-envelope update when no party could be attributed. A coarse
/// envelope-level completion must not overwrite a more specific partial state, so it only
/// fires when neither party has reached a terminal status.
fn apply_envelope_level(
    contract: &mut Contract,
    normalized: Option<PartyStatus>,
    event_ts: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) {
    match normalized {
        Some(PartyStatus::Declined) => {
            for role in PartyRole::BOTH {
                update_party(contract, role, PartyStatus::Declined, event_ts, now);
            }
        },
        Some(PartyStatus::Signed) => {
            let terminal = |s: PartyStatus| matches!(s, PartyStatus::Signed | PartyStatus::Declined);
            if !terminal(contract.seller_status) && !terminal(contract.buyer_status) {
                for role in PartyRole::BOTH {
                    update_party(contract, role, PartyStatus::Signed, event_ts, now);
                }
            }
        },
        Some(PartyStatus::Pending) | None => {},
    }
}
