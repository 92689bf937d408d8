use thiserror::Error;

use crate::{
    db_types::{Contract, NewContract, ReconciliationOutcome, WebhookEvent},
    traits::{EnvelopeHandle, LookupError, OrderLookup, UserLookup},
};

#[derive(Debug, Clone, Error)]
pub enum ContractStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("No contract found for order {0}")]
    ContractNotFound(i64),
}

impl From<sqlx::Error> for ContractStoreError {
    fn from(e: sqlx::Error) -> Self {
        ContractStoreError::DatabaseError(e.to_string())
    }
}

impl From<LookupError> for ContractStoreError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::DatabaseError(msg) => ContractStoreError::DatabaseError(msg),
        }
    }
}

/// This trait defines the behaviour a storage backend must expose to support the contract
/// signing flow.
///
/// This behaviour includes:
/// * The one-row-per-order contract store (draft upsert, envelope attachment, fetches).
/// * Webhook reconciliation: locating the contract an event belongs to and persisting the
///   result of the state machine in a single atomic transaction.
#[allow(async_fn_in_trait)]
pub trait ContractSigningDatabase: Clone + OrderLookup + UserLookup {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Fetches the contract for the given order id, if one exists.
    async fn fetch_contract_by_order(&self, order_id: i64) -> Result<Option<Contract>, ContractStoreError>;

    /// Fetches the contract carrying the given provider envelope id, if any. Envelope ids
    /// are unique across contracts.
    async fn fetch_contract_by_envelope_id(&self, envelope_id: &str)
        -> Result<Option<Contract>, ContractStoreError>;

    /// Creates the draft contract for an order, or resets the existing row back to draft
    /// when the order already has one. At most one contract per order ever exists. A
    /// previously attached envelope id is left in place.
    ///
    /// Returns the stored row.
    async fn upsert_draft(&self, contract: NewContract) -> Result<Contract, ContractStoreError>;

    /// Records the gateway's response on the contract: envelope id, per-party signing urls,
    /// and the transition from draft to awaiting signatures.
    async fn attach_envelope(
        &self,
        order_id: i64,
        envelope: &EnvelopeHandle,
    ) -> Result<Contract, ContractStoreError>;

    /// Locates the contract the event refers to and applies the event to it, atomically.
    ///
    /// Matching tries the envelope id first. When the event has no envelope id, or no
    /// contract carries it, matching falls back to the most recently updated contract that
    /// lists the event's participant email as a party. An event that matches nothing is
    /// reported as [`ReconciliationOutcome::NoMatch`], not an error.
    async fn reconcile_event(&self, event: &WebhookEvent) -> Result<ReconciliationOutcome, ContractStoreError>;
}
