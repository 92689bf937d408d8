use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Contract, NewContract},
    traits::ContractStoreError,
};

pub async fn fetch_contract_by_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Contract>, ContractStoreError> {
    let contract = sqlx::query_as(r#"SELECT * FROM contracts WHERE order_id = $1"#)
        .bind(order_id)
        .fetch_optional(conn)
        .await?;
    Ok(contract)
}

pub async fn fetch_contract_by_envelope_id(
    envelope_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Contract>, ContractStoreError> {
    let contract = sqlx::query_as(r#"SELECT * FROM contracts WHERE envelope_id = $1"#)
        .bind(envelope_id)
        .fetch_optional(conn)
        .await?;
    Ok(contract)
}

/// The most recently updated contract naming the given email as seller or buyer. Used as
/// the webhook matching fallback when no envelope id matches.
pub async fn fetch_latest_contract_for_participant(
    email: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Contract>, ContractStoreError> {
    let contract = sqlx::query_as(
        r#"
            SELECT * FROM contracts
            WHERE seller_email = $1 COLLATE NOCASE OR buyer_email = $1 COLLATE NOCASE
            ORDER BY updated_at DESC, id DESC
            LIMIT 1
        "#,
    )
    .bind(email.trim())
    .fetch_optional(conn)
    .await?;
    Ok(contract)
}

/// Inserts the draft contract for an order, or resets an existing row back to draft.
///
/// Party statuses, urls and timestamps are reset; a previously attached envelope id is left
/// in place so webhooks for the old envelope still find the row.
pub async fn upsert_draft(contract: NewContract, conn: &mut SqliteConnection) -> Result<Contract, ContractStoreError> {
    let contract = sqlx::query_as(
        r#"
            INSERT INTO contracts (
                order_id, template_id, content,
                seller_email, seller_name, buyer_email, buyer_name
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (order_id) DO UPDATE SET
                template_id = excluded.template_id,
                content = excluded.content,
                seller_email = excluded.seller_email,
                seller_name = excluded.seller_name,
                seller_status = 'PENDING',
                seller_signing_url = NULL,
                seller_signed_at = NULL,
                buyer_email = excluded.buyer_email,
                buyer_name = excluded.buyer_name,
                buyer_status = 'PENDING',
                buyer_signing_url = NULL,
                buyer_signed_at = NULL,
                status = 'DRAFT',
                signed_file_url = NULL,
                signed_at = NULL,
                updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(contract.order_id)
    .bind(contract.template_id)
    .bind(contract.content)
    .bind(contract.seller_email)
    .bind(contract.seller_name)
    .bind(contract.buyer_email)
    .bind(contract.buyer_name)
    .fetch_one(conn)
    .await?;
    Ok(contract)
}

/// Records the gateway response on the draft: envelope id, both signing urls, and the move
/// to `PENDING_BOTH`.
pub async fn attach_envelope(
    order_id: i64,
    envelope_id: Option<&str>,
    seller_url: Option<&str>,
    buyer_url: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Contract, ContractStoreError> {
    let contract: Option<Contract> = sqlx::query_as(
        r#"
            UPDATE contracts SET
                envelope_id = COALESCE($2, envelope_id),
                seller_signing_url = $3,
                buyer_signing_url = $4,
                seller_status = 'PENDING',
                buyer_status = 'PENDING',
                status = 'PENDING_BOTH',
                updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $1
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(envelope_id)
    .bind(seller_url)
    .bind(buyer_url)
    .fetch_optional(conn)
    .await?;
    contract.ok_or(ContractStoreError::ContractNotFound(order_id))
}

/// Writes back the mutable state of a reconciled contract. The identity columns never
/// change here.
pub async fn save_reconciled(contract: &Contract, conn: &mut SqliteConnection) -> Result<Contract, ContractStoreError> {
    let saved = sqlx::query_as(
        r#"
            UPDATE contracts SET
                envelope_id = $2,
                seller_status = $3,
                seller_signed_at = $4,
                buyer_status = $5,
                buyer_signed_at = $6,
                status = $7,
                signed_file_url = $8,
                signed_at = $9,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING *;
        "#,
    )
    .bind(contract.id)
    .bind(&contract.envelope_id)
    .bind(contract.seller_status)
    .bind(contract.seller_signed_at)
    .bind(contract.buyer_status)
    .bind(contract.buyer_signed_at)
    .bind(contract.status)
    .bind(&contract.signed_file_url)
    .bind(contract.signed_at)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Contract #{} saved with status {}", contract.id, contract.status);
    Ok(saved)
}
