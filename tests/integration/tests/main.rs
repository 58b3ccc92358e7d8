//! End-to-End Integration Tests
//!
//! These tests drive the token and migration endpoints through the Axum
//! router against the in-memory store.

mod common;
mod migration;
mod token_endpoint;
