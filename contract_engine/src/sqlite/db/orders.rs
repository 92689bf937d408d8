use sqlx::SqliteConnection;

use crate::traits::{LookupError, OrderSummary};

/// The contract flow only reads orders; the marketplace owns them.
pub async fn fetch_order_summary(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderSummary>, LookupError> {
    let row: Option<(i64, i64, i64, i64)> =
        sqlx::query_as(r#"SELECT id, buyer_id, seller_id, listing_id FROM orders WHERE id = $1"#)
            .bind(order_id)
            .fetch_optional(conn)
            .await?;
    Ok(row.map(|(order_id, buyer_id, seller_id, listing_id)| OrderSummary {
        order_id,
        buyer_id,
        seller_id,
        listing_id,
    }))
}
