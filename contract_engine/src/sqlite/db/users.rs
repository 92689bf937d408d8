use sqlx::SqliteConnection;

use crate::traits::{LookupError, UserProfile};

pub async fn fetch_user_profile(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<UserProfile>, LookupError> {
    let row: Option<(i64, String, String, Option<String>, String)> =
        sqlx::query_as(r#"SELECT id, username, email, display_name, role FROM users WHERE id = $1"#)
            .bind(user_id)
            .fetch_optional(conn)
            .await?;
    Ok(row.map(|(user_id, username, email, display_name, role)| UserProfile {
        user_id,
        username,
        email,
        display_name,
        role,
    }))
}
