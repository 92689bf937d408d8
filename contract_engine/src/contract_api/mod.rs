//! # Contract signing engine public API
//!
//! The `contract_api` module exposes the programmatic API for the contract signing flow.
//!
//! The pattern follows the rest of the marketplace engines: an API instance is created by
//! supplying a database backend implementing the backend traits it needs, plus a signature
//! gateway implementation.
//!
//! ```rust,ignore
//! use contract_engine::{ContractFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = ContractFlowApi::new(db, my_gateway);
//! let contract = api.create_draft_and_send(acting_user_id, req).await?;
//! ```
mod contract_flow_api;
mod errors;
mod objects;

pub use contract_flow_api::ContractFlowApi;
pub use errors::ContractFlowError;
pub use objects::NewContractRequest;
