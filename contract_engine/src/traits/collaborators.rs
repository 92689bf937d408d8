use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for LookupError {
    fn from(e: sqlx::Error) -> Self {
        LookupError::DatabaseError(e.to_string())
    }
}

/// The slice of a marketplace order the contract flow needs: who buys, who sells, and for
/// which listing. Orders themselves are owned by the wider marketplace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: i64,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub listing_id: i64,
}

/// A marketplace user as seen by the contract flow: enough to resolve a signer identity and
/// to make the access decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: String,
}

impl UserProfile {
    /// Staff can act on any contract regardless of order participation.
    pub fn is_staff(&self) -> bool {
        matches!(self.role.to_uppercase().as_str(), "ADMIN" | "MODERATOR")
    }

    /// The name placed on the signing document. Falls back to the username when no display
    /// name is set.
    pub fn signer_name(&self) -> &str {
        self.display_name.as_deref().filter(|n| !n.trim().is_empty()).unwrap_or(&self.username)
    }
}

#[allow(async_fn_in_trait)]
pub trait OrderLookup {
    /// Fetches the order summary for the given order id, or `None` if the order does not
    /// exist.
    async fn fetch_order(&self, order_id: i64) -> Result<Option<OrderSummary>, LookupError>;
}

#[allow(async_fn_in_trait)]
pub trait UserLookup {
    /// Fetches the user profile for the given user id, or `None` if the user does not
    /// exist.
    async fn fetch_user(&self, user_id: i64) -> Result<Option<UserProfile>, LookupError>;
}

#[cfg(test)]
mod test {
    use super::*;

    fn profile(role: &str, display_name: Option<&str>) -> UserProfile {
        UserProfile {
            user_id: 1,
            username: "ifan".to_string(),
            email: "ifan@example.com".to_string(),
            display_name: display_name.map(String::from),
            role: role.to_string(),
        }
    }

    #[test]
    fn staff_roles_are_case_insensitive() {
        assert!(profile("ADMIN", None).is_staff());
        assert!(profile("moderator", None).is_staff());
        assert!(!profile("MEMBER", None).is_staff());
        assert!(!profile("", None).is_staff());
    }

    #[test]
    fn signer_name_prefers_display_name() {
        assert_eq!(profile("MEMBER", Some("Ifan W")).signer_name(), "Ifan W");
        assert_eq!(profile("MEMBER", Some("  ")).signer_name(), "ifan");
        assert_eq!(profile("MEMBER", None).signer_name(), "ifan");
    }
}
