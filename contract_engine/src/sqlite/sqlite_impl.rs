//! `SqliteDatabase` is a concrete implementation of a contract signing backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in
//! the [`crate::traits`] module.
use std::fmt::Debug;

use chrono::Utc;
use log::*;
use sqlx::SqlitePool;

use super::db::{contracts, db_url, new_pool, orders, users};
use crate::{
    db_types::{Contract, NewContract, PartyRole, ReconciliationOutcome, WebhookEvent},
    reconcile,
    traits::{
        ContractSigningDatabase,
        ContractStoreError,
        EnvelopeHandle,
        LookupError,
        OrderLookup,
        OrderSummary,
        UserLookup,
        UserProfile,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl OrderLookup for SqliteDatabase {
    async fn fetch_order(&self, order_id: i64) -> Result<Option<OrderSummary>, LookupError> {
        let mut conn = self.pool.acquire().await.map_err(|e| LookupError::DatabaseError(e.to_string()))?;
        orders::fetch_order_summary(order_id, &mut conn).await
    }
}

impl UserLookup for SqliteDatabase {
    async fn fetch_user(&self, user_id: i64) -> Result<Option<UserProfile>, LookupError> {
        let mut conn = self.pool.acquire().await.map_err(|e| LookupError::DatabaseError(e.to_string()))?;
        users::fetch_user_profile(user_id, &mut conn).await
    }
}

impl ContractSigningDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch_contract_by_order(&self, order_id: i64) -> Result<Option<Contract>, ContractStoreError> {
        let mut conn = self.pool.acquire().await?;
        contracts::fetch_contract_by_order(order_id, &mut conn).await
    }

    async fn fetch_contract_by_envelope_id(
        &self,
        envelope_id: &str,
    ) -> Result<Option<Contract>, ContractStoreError> {
        let mut conn = self.pool.acquire().await?;
        contracts::fetch_contract_by_envelope_id(envelope_id, &mut conn).await
    }

    async fn upsert_draft(&self, contract: NewContract) -> Result<Contract, ContractStoreError> {
        // The RETURNING row must be read inside an explicit transaction, or the SQLite
        // driver rolls the statement back when the row stream is dropped.
        let mut tx = self.pool.begin().await?;
        let contract = contracts::upsert_draft(contract, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Contract #{} is the draft for order #{}", contract.id, contract.order_id);
        Ok(contract)
    }

    async fn attach_envelope(
        &self,
        order_id: i64,
        envelope: &EnvelopeHandle,
    ) -> Result<Contract, ContractStoreError> {
        let mut tx = self.pool.begin().await?;
        let existing = contracts::fetch_contract_by_order(order_id, &mut tx)
            .await?
            .ok_or(ContractStoreError::ContractNotFound(order_id))?;
        let seller_url = envelope.url_for(PartyRole::Seller, &existing.seller_email).map(String::from);
        let buyer_url = envelope.url_for(PartyRole::Buyer, &existing.buyer_email).map(String::from);
        let contract = contracts::attach_envelope(
            order_id,
            envelope.envelope_id.as_deref(),
            seller_url.as_deref(),
            buyer_url.as_deref(),
            &mut tx,
        )
        .await?;
        tx.commit().await?;
        debug!(
            "🗃️ Envelope {} attached to contract #{}",
            contract.envelope_id.as_deref().unwrap_or("<none>"),
            contract.id
        );
        Ok(contract)
    }

    /// Locates and updates the contract for a webhook event in a single atomic transaction,
    /// so concurrent deliveries for the same contract cannot produce a lost update.
    async fn reconcile_event(&self, event: &WebhookEvent) -> Result<ReconciliationOutcome, ContractStoreError> {
        let mut tx = self.pool.begin().await?;
        let by_envelope = match event.envelope_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => contracts::fetch_contract_by_envelope_id(id, &mut tx).await?,
            None => None,
        };
        let mut matched_by_fallback = false;
        let contract = match by_envelope {
            Some(c) => Some(c),
            None => match event.participant_email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
                Some(email) => {
                    let found = contracts::fetch_latest_contract_for_participant(email, &mut tx).await?;
                    matched_by_fallback = found.is_some();
                    found
                },
                None => None,
            },
        };
        let Some(mut contract) = contract else {
            tx.commit().await?;
            return Ok(ReconciliationOutcome::NoMatch);
        };
        if matched_by_fallback {
            trace!(
                "🗃️ Webhook matched contract #{} by participant email rather than envelope id",
                contract.id
            );
            // Adopt the event's envelope id when the row has none yet.
            if contract.envelope_id.is_none() {
                contract.envelope_id =
                    event.envelope_id.as_deref().map(str::trim).filter(|id| !id.is_empty()).map(String::from);
            }
        }
        reconcile::apply_event(&mut contract, event, Utc::now());
        let saved = contracts::save_reconciled(&contract, &mut tx).await?;
        tx.commit().await?;
        Ok(ReconciliationOutcome::Updated(Box::new(saved)))
    }
}
