//! Shared E2E test helpers.
//!
//! Provides matrix configurations over the acceptance fixtures or a
//! temporary fixture root, and recording mocks for the builder and
//! verifier seams.

pub mod config;
pub mod mocks;
