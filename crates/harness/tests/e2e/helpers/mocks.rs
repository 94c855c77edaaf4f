//! Recording mocks for the builder and verifier seams.
//!
//! Both mocks count calls and record what they were asked to do so tests
//! can assert that skipped cases never reach them.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use packmatrix_core::error::CaseError;
use packmatrix_harness::{ArtifactBuilder, BuildRequest, BuiltArtifact};
use packmatrix_verifier::{ContainerVerificationSpec, VerificationOutput, Verifier, VerifierError};

/// Builder that records requests and returns a fake artifact.
#[derive(Default)]
pub struct RecordingBuilder {
    calls: AtomicUsize,
    requests: Mutex<Vec<BuildRequest>>,
    /// Case id -> error to return instead of an artifact.
    failures: HashMap<String, CaseError>,
    /// Case id that panics inside `build`.
    panic_on: Option<String>,
}

#[allow(dead_code)]
impl RecordingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the case with id `case_id` fail with `err`.
    pub fn failing(mut self, case_id: &str, err: CaseError) -> Self {
        self.failures.insert(case_id.to_owned(), err);
        self
    }

    /// Make the case with id `case_id` panic.
    pub fn panicking(mut self, case_id: &str) -> Self {
        self.panic_on = Some(case_id.to_owned());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Case ids of every request seen, in call order.
    pub fn built_ids(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("requests lock poisoned")
            .iter()
            .map(|r| r.case_id.to_string())
            .collect()
    }

    pub fn requests(&self) -> Vec<BuildRequest> {
        self.requests.lock().expect("requests lock poisoned").clone()
    }
}

impl ArtifactBuilder for RecordingBuilder {
    fn build(&self, request: &BuildRequest) -> Result<BuiltArtifact, CaseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("requests lock poisoned")
            .push(request.clone());

        let id = request.case_id.as_str();
        if self.panic_on.as_deref() == Some(id) {
            panic!("injected panic for {id}");
        }
        if let Some(err) = self.failures.get(id) {
            return Err(err.clone());
        }
        Ok(BuiltArtifact {
            path: request.output.clone(),
            size_bytes: 42,
            sha256: "ab".repeat(32),
        })
    }
}

/// Verifier that records specs and reports a fixed exit code.
pub struct RecordingVerifier {
    specs: Mutex<Vec<ContainerVerificationSpec>>,
    /// Case id -> exit code; cases not listed exit 0.
    exits: HashMap<String, i32>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[allow(dead_code)]
impl RecordingVerifier {
    pub fn new() -> Self {
        Self {
            specs: Mutex::new(Vec::new()),
            exits: HashMap::new(),
            delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Make the case with id `case_id` exit with `code`.
    pub fn exiting(mut self, case_id: &str, code: i32) -> Self {
        self.exits.insert(case_id.to_owned(), code);
        self
    }

    /// Hold each verification for `delay` before returning.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.specs.lock().expect("specs lock poisoned").len()
    }

    pub fn specs(&self) -> Vec<ContainerVerificationSpec> {
        self.specs.lock().expect("specs lock poisoned").clone()
    }

    pub fn spec_for(&self, case_id: &str) -> Option<ContainerVerificationSpec> {
        self.specs()
            .into_iter()
            .find(|s| s.case_id.as_str() == case_id)
    }

    /// Highest number of verifications observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Verifier for RecordingVerifier {
    async fn run(
        &self,
        spec: &ContainerVerificationSpec,
    ) -> Result<VerificationOutput, VerifierError> {
        self.specs
            .lock()
            .expect("specs lock poisoned")
            .push(spec.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let code = self.exits.get(spec.case_id.as_str()).copied().unwrap_or(0);
        Ok(VerificationOutput {
            status: Some(code),
            success: code == 0,
            output: format!("Step 1/1 : FROM {}\nexit {code}\n", spec.target),
        })
    }
}
