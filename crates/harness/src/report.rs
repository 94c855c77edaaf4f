//! 실행 결과 리포트

use std::time::Duration;

use packmatrix_core::types::{CaseId, Outcome, TestCase};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 케이스 하나의 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseReport {
    pub id: CaseId,
    pub case: TestCase,
    pub outcome: Outcome,
}

/// 결과별 케이스 수
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Totals {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }
}

/// 한 번의 매트릭스 실행 결과 (열거 순서 유지)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub elapsed: Duration,
    pub totals: Totals,
    pub cases: Vec<CaseReport>,
}

impl RunReport {
    pub fn new(run_id: Uuid, elapsed: Duration, cases: Vec<CaseReport>) -> Self {
        let mut totals = Totals::default();
        for report in &cases {
            match report.outcome {
                Outcome::Pass(_) => totals.passed += 1,
                Outcome::Fail(_) => totals.failed += 1,
                Outcome::Skip { .. } => totals.skipped += 1,
            }
        }
        Self {
            run_id,
            elapsed,
            totals,
            cases,
        }
    }

    /// 실패한 케이스가 없으면 `true` (스킵은 실패가 아님)
    pub fn is_success(&self) -> bool {
        self.totals.failed == 0
    }

    /// ID로 케이스 결과를 찾습니다.
    pub fn get(&self, id: &str) -> Option<&CaseReport> {
        self.cases.iter().find(|c| c.id.as_str() == id)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases.iter().filter(|c| c.outcome.is_fail())
    }
}
