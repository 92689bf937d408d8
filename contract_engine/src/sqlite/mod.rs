//! SQLite database module for the contract signing engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
