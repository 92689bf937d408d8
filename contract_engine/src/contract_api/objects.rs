use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A request to create and dispatch a signing envelope for an order.
///
/// Party emails and names are normally resolved from the order's buyer and seller profiles;
/// the explicit fields here override that resolution when the caller knows better (a seller
/// signing through a company mailbox, say).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewContractRequest {
    pub order_id: i64,
    pub template_id: String,
    pub seller_email: Option<String>,
    pub seller_name: Option<String>,
    pub buyer_email: Option<String>,
    pub buyer_name: Option<String>,
    /// Substituted into the document template by the provider.
    pub variables: Map<String, Value>,
    /// Travels with the envelope; echoed back on webhooks where supported.
    pub metadata: Map<String, Value>,
    pub content: Option<String>,
}
