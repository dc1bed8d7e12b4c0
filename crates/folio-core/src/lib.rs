//! Core types and trait definitions for the Folio chat relay.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The store, relay and API crates all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod chat;
pub mod contact;
pub mod error;
pub mod prompt;
pub mod resume;
pub mod store;

pub use error::{Error, Result};
