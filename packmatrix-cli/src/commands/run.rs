//! `packmatrix run` command handler

use std::io::Write;
use std::sync::Arc;

use packmatrix_core::config::PackmatrixConfig;
use packmatrix_core::types::Outcome;
use packmatrix_harness::{
    BuildRequestExecutor, ParallelExecutionController, RunReport, TestMatrixGenerator,
};
use packmatrix_verifier::DockerCliVerifier;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::commands::format_elapsed;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

type Controller = ParallelExecutionController<BuildRequestExecutor, DockerCliVerifier>;

/// Execute the `run` command.
pub async fn execute(
    args: RunArgs,
    mut config: PackmatrixConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    apply_overrides(&args, &mut config)?;
    packmatrix_core::metrics::describe_all();

    let mut generator = TestMatrixGenerator::new();
    if let Some(filter) = &args.filter {
        generator = generator.with_filter(filter.as_str());
    }
    let cases = generator.generate();
    if cases.is_empty() {
        warn!(filter = ?args.filter, "no cases match the filter");
    }

    let controller = build_controller(&config)?;
    info!(
        cases = cases.len(),
        fixture_root = %config.matrix.fixture_root.display(),
        build_only = controller.is_build_only(),
        "starting matrix run"
    );

    let report = controller.run(cases).await;
    writer.render(&report)?;

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::CasesFailed(report.totals.failed))
    }
}

/// Apply command-line flags on top of file and environment values.
fn apply_overrides(args: &RunArgs, config: &mut PackmatrixConfig) -> Result<(), CliError> {
    if let Some(max_parallel) = args.max_parallel {
        config.matrix.max_parallel = max_parallel;
    }
    if args.skip_ppc64le {
        config.matrix.skip_ppc64le = true;
    }
    if args.build_only {
        config.verifier.enabled = false;
    }
    config.validate()?;
    Ok(())
}

fn build_controller(config: &PackmatrixConfig) -> Result<Controller, CliError> {
    let mut builder = Controller::builder()
        .matrix(config.matrix.clone())
        .artifact_builder(Arc::new(BuildRequestExecutor::with_builtin()));
    if config.verifier.enabled {
        builder = builder.verifier(Arc::new(DockerCliVerifier::from_config(
            &config.verifier,
            config.matrix.fixture_root.clone(),
        )));
    }
    Ok(builder.build()?)
}

impl Render for RunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        for case in &self.cases {
            match &case.outcome {
                Outcome::Pass(details) => writeln!(
                    w,
                    "{}  {:<36} {:>8}  {}",
                    "PASS".green().bold(),
                    case.id.as_str(),
                    format_elapsed(details.elapsed),
                    details.artifact.display()
                )?,
                Outcome::Fail(details) => {
                    writeln!(
                        w,
                        "{}  {:<36} {:>8}  [{}] {}",
                        "FAIL".red().bold(),
                        case.id.as_str(),
                        format_elapsed(details.elapsed),
                        details.phase,
                        details.error
                    )?;
                    for line in details.output.lines() {
                        writeln!(w, "      | {}", line.dimmed())?;
                    }
                }
                Outcome::Skip { reason } => writeln!(
                    w,
                    "{}  {:<36} {:>8}  {}",
                    "SKIP".yellow().bold(),
                    case.id.as_str(),
                    "-",
                    reason
                )?,
            }
        }

        writeln!(w)?;
        writeln!(
            w,
            "Run {}: {} passed, {} failed, {} skipped ({})",
            self.run_id,
            self.totals.passed.to_string().green(),
            self.totals.failed.to_string().red(),
            self.totals.skipped.to_string().yellow(),
            format_elapsed(self.elapsed)
        )?;
        Ok(())
    }
}
