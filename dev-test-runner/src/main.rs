//! Runs conformance case files against a schema document and prints a pass/fail report.
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use typed_denorm::conformance::{self, CaseReport, Outcome};
use typed_denorm::Schema;

/// run current-type conformance cases
#[derive(Parser, Debug)]
struct Settings {
    /// schema document the cases refer to
    #[arg(long, default_value = "conformance/schema.json")]
    schema: PathBuf,

    /// case files (paths or quoted glob patterns); built-in table if omitted
    #[arg(long, short, num_args = 1..)]
    cases: Vec<String>,

    /// print passing cases too
    #[arg(long, short, default_value_t = false)]
    verbose: bool,

    /// emit the reports as JSON lines instead of text
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Settings::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}

fn run(settings: Settings) -> Result<bool> {
    let mut all_passed = true;

    if settings.cases.is_empty() {
        let reports = conformance::run_cases(&conformance::builtin_schema(), &conformance::builtin_cases());
        all_passed &= print_reports("built-in", &reports, &settings)?;
        return Ok(all_passed);
    }

    let schema = Schema::from_path(&settings.schema)?;
    let paths = typed_denorm::cli::resolve_file_path_patterns(&settings.cases)
        .map_err(|e| anyhow::anyhow!("failed to resolve case files: {e}"))?;
    for path in paths {
        let label = path.display().to_string();
        let src = std::fs::read_to_string(&path).with_context(|| format!("failed to read {label}"))?;
        let cases = conformance::cases_from_json_str(&src).map_err(|e| anyhow::anyhow!("{label}: {e}"))?;
        tracing::debug!(file = %label, cases = cases.len(), "loaded case file");
        let reports = conformance::run_cases(&schema, &cases);
        all_passed &= print_reports(&label, &reports, &settings)?;
    }
    Ok(all_passed)
}

fn print_reports(label: &str, reports: &[CaseReport], settings: &Settings) -> Result<bool> {
    let failed = reports.iter().filter(|r| !r.passed()).count();

    if settings.json {
        for report in reports {
            println!("{}", serde_json::to_string(report)?);
        }
        return Ok(failed == 0);
    }

    for report in reports {
        match &report.outcome {
            Outcome::Pass if settings.verbose => println!("  {} {}", "ok".green(), report.name),
            Outcome::Pass => {}
            Outcome::WrongType { expected, got } => println!(
                "  {} {}: current type {} (expected {})",
                "FAIL".red().bold(), report.name, got.yellow(), expected.green(),
            ),
            Outcome::Unexpected { detail } => println!("  {} {}: {detail}", "FAIL".red().bold(), report.name),
        }
    }
    let summary = format!("{label}: {} passed, {failed} failed", reports.len() - failed);
    if failed == 0 {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.red());
    }
    Ok(failed == 0)
}
