use thiserror::Error;

use crate::traits::{ContractStoreError, LookupError, SignatureGatewayError};

#[derive(Debug, Error)]
pub enum ContractFlowError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Not permitted: {0}")]
    Authorization(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Signature gateway failure: {0}")]
    Gateway(#[from] SignatureGatewayError),
    #[error("Storage failure: {0}")]
    Database(String),
}

impl From<ContractStoreError> for ContractFlowError {
    fn from(e: ContractStoreError) -> Self {
        match e {
            ContractStoreError::ContractNotFound(order_id) => {
                ContractFlowError::NotFound(format!("contract for order {order_id}"))
            },
            ContractStoreError::DatabaseError(msg) => ContractFlowError::Database(msg),
        }
    }
}

impl From<LookupError> for ContractFlowError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::DatabaseError(msg) => ContractFlowError::Database(msg),
        }
    }
}
