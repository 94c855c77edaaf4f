//! E2E tests for the packmatrix harness.
//!
//! These tests drive `ParallelExecutionController` end to end, either with
//! recording mocks for the builder and verifier or with the real
//! `BuildRequestExecutor` over `testdata/acceptance`.
//!
//! # Test Structure
//!
//! - `helpers/` -- Shared utilities (matrix configs, recording mocks)
//! - `scenarios/` -- Test files organized by behavior
//!
//! # Running
//!
//! ```bash
//! cargo test -p packmatrix-harness --test e2e
//! ```

mod helpers;
mod scenarios;
