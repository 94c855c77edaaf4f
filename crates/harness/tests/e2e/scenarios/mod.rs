//! E2E test scenarios.

mod fault_isolation;
mod packaging;
mod reporting;
mod skip_policy;
mod verification_args;
