//! Contract Signing Engine
//!
//! Core logic for the contract signing lifecycle: the persisted contract record, the
//! lifecycle API that dispatches a contract to the e-signature provider, and the webhook
//! reconciliation state machine that folds the provider's asynchronous, unordered,
//! possibly duplicated notifications into a single consistent contract row.
//!
//! The library is split along the same lines as the rest of the gateway:
//! 1. Backend traits and the SQLite implementation ([`traits`], `sqlite`). Contract rows are
//!    only ever touched through [`traits::ContractSigningDatabase`]; each webhook update is
//!    one atomic transaction so concurrent deliveries cannot produce a lost update.
//! 2. The public API ([`ContractFlowApi`]), which orchestrates draft creation,
//!    authorization, the gateway call and webhook processing.
//! 3. The pure reconciliation state machine ([`reconcile`]), kept free of I/O so the
//!    transition table can be tested in isolation.
pub mod db_types;
pub mod reconcile;
pub mod traits;

mod contract_api;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(all(feature = "sqlite", any(feature = "test_utils", test)))]
pub mod test_utils;

pub use contract_api::{ContractFlowApi, ContractFlowError, NewContractRequest};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
