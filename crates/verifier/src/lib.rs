#![doc = include_str!("../README.md")]

pub mod docker;
pub mod error;
pub mod spec;

pub use docker::{DockerCliVerifier, VerificationOutput, Verifier};
pub use error::VerifierError;
pub use spec::ContainerVerificationSpec;
