//! # Contract signing server
//! This module hosts the HTTP surface of the contract signing gateway. It is responsible
//! for:
//! Accepting contract send requests from the marketplace frontend.
//! Listening for incoming webhook requests from the e-signature provider.
//! Normalizing webhook payloads and feeding them to the reconciliation engine.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for
//! more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/contracts/send`: Creates a contract for an order and dispatches it for signing.
//! * `/contracts/order/{order_id}`: Returns the contract for an order.
//! * `/contracts/webhook`: The webhook route for receiving signing events.

pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod routes;
pub mod server;
pub mod webhook;

#[cfg(test)]
mod endpoint_tests;
