//! # DocuSeal client tools
//!
//! A thin client for the DocuSeal e-signature API. The only operation the gateway needs is
//! envelope (submission) creation for a set of signers; everything else about the signing
//! ceremony happens on DocuSeal's side and comes back to us via webhooks.
//!
//! DocuSeal's API shape has drifted across versions, so both the request builder and the
//! response parser deliberately cover several historical field layouts. See [`extract`] for
//! the ordered extraction strategies used on responses.
mod api;
mod config;
mod error;

mod data_objects;
pub mod extract;

pub use api::DocuSealApi;
pub use config::DocuSealConfig;
pub use data_objects::{EnvelopeCreated, Signer, SigningUrlIndex};
pub use error::DocuSealApiError;
