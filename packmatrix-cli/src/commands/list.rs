//! `packmatrix list` command handler

use std::io::Write;

use serde::Serialize;

use packmatrix_core::config::PackmatrixConfig;
use packmatrix_harness::{SkipPolicy, TestMatrixGenerator};

use crate::cli::ListArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `list` command.
pub fn execute(
    args: ListArgs,
    config: &PackmatrixConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = build_list_report(args.filter.as_deref(), config);
    writer.render(&report)
}

fn build_list_report(filter: Option<&str>, config: &PackmatrixConfig) -> ListReport {
    let mut generator = TestMatrixGenerator::new();
    if let Some(filter) = filter {
        generator = generator.with_filter(filter);
    }
    let policy = SkipPolicy::from_config(&config.matrix);

    let cases: Vec<ListedCase> = generator
        .generate()
        .into_iter()
        .map(|case| ListedCase {
            id: case.id().to_string(),
            fixture: case.fixture_name(),
            artifact: case.artifact_name(),
            dockerfile: case.format.dockerfile(),
            target: case.target_stage().to_owned(),
            skip: policy.evaluate(&case).map(str::to_owned),
        })
        .collect();

    ListReport {
        total: cases.len(),
        skipped: cases.iter().filter(|c| c.skip.is_some()).count(),
        cases,
    }
}

#[derive(Serialize)]
struct ListReport {
    total: usize,
    skipped: usize,
    cases: Vec<ListedCase>,
}

#[derive(Serialize)]
struct ListedCase {
    id: String,
    fixture: String,
    artifact: String,
    dockerfile: String,
    target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    skip: Option<String>,
}

impl Render for ListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "{:<32} {:<30} {:<28} Target",
            "Case", "Fixture", "Artifact"
        )?;
        writeln!(w, "{}", "-".repeat(104))?;
        for case in &self.cases {
            let target = match &case.skip {
                Some(reason) => format!("{} ({})", case.target, reason.yellow()),
                None => case.target.clone(),
            };
            writeln!(
                w,
                "{:<32} {:<30} {:<28} {}",
                case.id, case.fixture, case.artifact, target
            )?;
        }
        writeln!(w)?;
        writeln!(
            w,
            "{} cases ({} skipped)",
            self.total.to_string().bold(),
            self.skipped
        )?;
        Ok(())
    }
}
