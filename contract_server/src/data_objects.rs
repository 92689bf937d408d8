use std::fmt::Display;

use contract_engine::NewContractRequest;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /contracts/send`. Everything except the order id is optional; party
/// identities default to the order's buyer and seller profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractSendRequest {
    pub order_id: i64,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub seller_email: Option<String>,
    #[serde(default)]
    pub seller_name: Option<String>,
    #[serde(default)]
    pub buyer_email: Option<String>,
    #[serde(default)]
    pub buyer_name: Option<String>,
    #[serde(default)]
    pub variables: Map<String, Value>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ContractSendRequest {
    pub fn into_engine_request(self) -> NewContractRequest {
        NewContractRequest {
            order_id: self.order_id,
            template_id: self.template_id.unwrap_or_default(),
            seller_email: self.seller_email,
            seller_name: self.seller_name,
            buyer_email: self.buyer_email,
            buyer_name: self.buyer_name,
            variables: self.variables,
            metadata: self.metadata,
            content: self.content,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}
