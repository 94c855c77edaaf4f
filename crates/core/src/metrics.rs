//! 메트릭 상수 및 설명 등록
//!
//! 하네스가 기록하는 메트릭 이름을 중앙에서 정의합니다.
//! 레코더가 설치되지 않으면 `metrics` 매크로는 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `packmatrix_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(packmatrix_core::metrics::CASES_TOTAL, packmatrix_core::metrics::LABEL_OUTCOME => "pass")
//!     .increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (pass, fail, skip)
pub const LABEL_OUTCOME: &str = "outcome";

/// 포맷 레이블 키 (apk, deb, rpm)
pub const LABEL_FORMAT: &str = "format";

// ─── 하네스 메트릭 ──────────────────────────────────────────────────

/// 결과별 케이스 수 (counter, labels: outcome, format)
pub const CASES_TOTAL: &str = "packmatrix_cases_total";

/// 케이스 하나의 소요 시간 (histogram, 초)
pub const CASE_DURATION_SECONDS: &str = "packmatrix_case_duration_seconds";

/// 생성된 패키지 바이트 수 (counter, label: format)
pub const ARTIFACT_BYTES_TOTAL: &str = "packmatrix_artifact_bytes_total";

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        CASES_TOTAL,
        "Number of matrix cases finished, by outcome and format"
    );
    describe_histogram!(
        CASE_DURATION_SECONDS,
        "Wall-clock time of a single matrix case in seconds"
    );
    describe_counter!(
        ARTIFACT_BYTES_TOTAL,
        "Total bytes of package artifacts written to the scratch directory"
    );
}
