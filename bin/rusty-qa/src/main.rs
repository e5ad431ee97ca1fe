//! # Rusty-QA Runner
//!
//! The entry point that assembles the board from compile-time features and
//! runs the end-to-end scenarios against it. Exits with status 1 when any
//! scenario fails.

mod scenarios;
mod settings;

use std::rc::Rc;

use rq_core::harness::{HarnessReport, TestHarness};
use rq_core::QaService;

use crate::scenarios::Env;
use crate::settings::{ReportFormat, Settings};

// Feature-gated imports: the storage plugin is chosen at compile time
#[cfg(feature = "db-sqlite")]
use rq_db_sqlite::SqliteQuestionRepo;

#[cfg(not(feature = "db-sqlite"))]
compile_error!("rusty-qa needs a storage plugin; enable the `db-sqlite` feature");

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::load()?;
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(&settings.log_level));

    let runtime = Rc::new(tokio::runtime::Runtime::new()?);

    // 1. Initialize Database Implementation
    #[cfg(feature = "db-sqlite")]
    let repo = runtime.block_on(SqliteQuestionRepo::new(&settings.database_url))?;

    // 2. Wrap in the service (dynamic dispatch keeps plugins swappable)
    let env = Env {
        runtime,
        service: Rc::new(QaService::new(Box::new(repo))),
    };

    let mut harness = TestHarness::new();
    scenarios::register_all(&mut harness, &env);
    log::info!(
        "running {} scenarios against {}",
        harness.len(),
        settings.database_url
    );

    let report = harness.run();
    print_report(&report, settings.report_format)?;

    if !report.all_passed() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report(report: &HarnessReport, format: ReportFormat) -> anyhow::Result<()> {
    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        ReportFormat::Text => {
            for result in &report.results {
                let status = if result.is_passed() { "PASS" } else { "FAIL" };
                println!("[{status}] {}: {}", result.name(), result.message());
            }
            println!("{} passed, {} failed", report.passed, report.failed);
        }
    }
    Ok(())
}
