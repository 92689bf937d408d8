//! # Backend and collaborator interfaces.
//!
//! This module defines the interface contracts between the contract-flow engine and its
//! environment.
//!
//! ## Storage
//! [`ContractSigningDatabase`] is the behaviour a storage backend must expose: the contract
//! store itself plus the read paths of the reconciliation engine. It pulls in
//! [`OrderLookup`] and [`UserLookup`] as supertraits because the lifecycle manager needs
//! marketplace orders and user profiles to resolve the signing parties, and in practice
//! these live in the same database as the contracts.
//!
//! ## Gateway
//! [`SignatureGateway`] abstracts the e-signature provider. The engine never sees provider
//! payloads; it hands over signer identities and gets back an [`EnvelopeHandle`] with the
//! envelope id and per-party signing urls.
mod collaborators;
mod contract_signing_database;
mod signature_gateway;

pub use collaborators::{LookupError, OrderLookup, OrderSummary, UserLookup, UserProfile};
pub use contract_signing_database::{ContractSigningDatabase, ContractStoreError};
pub use signature_gateway::{EnvelopeHandle, SignatureGateway, SignatureGatewayError, SignerInfo};
