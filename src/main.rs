use cci_scrape::domain::model::RunReport;
use cci_scrape::utils::error::{ErrorSeverity, ScrapeError};
use cci_scrape::utils::{logger, validation::Validate};
use cci_scrape::{
    load_project_ids, CliConfig, CsvExporter, ScrapeEngine, ScrapePipeline, WebDriverSession,
};
use clap::Parser;
use std::time::Duration;

fn exit_code(e: &ScrapeError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: &ScrapeError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(e));
}

fn print_summary(report: &RunReport) {
    println!(
        "✅ Exported {} row(s) for {} project(s)",
        report.total_rows(),
        report.exported.len()
    );

    if !report.no_data.is_empty() {
        println!("[-] The following projects did not appear to have subcontracts associated with them:");
        for project in &report.no_data {
            println!("{}", project);
        }
    }

    if !report.failed.is_empty() {
        println!("[-] The following projects could not be retrieved (portal slow or unavailable):");
        for failed in &report.failed {
            println!("{}\t{}", failed.project, failed.reason);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::info!("Starting cci-scrape");
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = cli.validate() {
        fail(&e);
    }
    let config = cli.resolve().unwrap_or_else(|e| fail(&e));
    let projects = load_project_ids(&cli.projects).unwrap_or_else(|e| fail(&e));
    if projects.is_empty() {
        println!("No project numbers found in {}", cli.projects.display());
        return Ok(());
    }

    let session = WebDriverSession::connect(
        &config.browser,
        Duration::from_millis(config.timing.http_timeout_ms),
    )
    .await
    .unwrap_or_else(|e| fail(&e));

    let exporter = CsvExporter::new(&cli.output_dir, config.output.mode);
    let engine = ScrapeEngine::new_with_monitoring(ScrapePipeline::new(config, exporter), cli.monitor);

    let mut report = RunReport::default();
    let outcome = tokio::select! {
        result = engine.run_with_report(&session, &projects, &mut report) => result,
        _ = tokio::signal::ctrl_c() => Err(ScrapeError::Interrupted),
    };

    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close the browser session: {}", e);
    }

    if let Some(path) = &cli.report {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        tracing::info!("📁 Run report saved to: {}", path.display());
    }
    print_summary(&report);

    match outcome {
        Ok(()) => Ok(()),
        Err(e) => {
            println!(
                "[-] Stopped after {} of {} project(s)",
                report.processed(),
                projects.len()
            );
            fail(&e)
        }
    }
}
