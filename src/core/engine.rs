use crate::core::pipeline::ScrapePipeline;
use crate::domain::model::{
    ExportedProject, FailedProject, ProjectId, ProjectOutcome, RunReport,
};
use crate::domain::ports::{BrowserSession, Exporter};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Runs the pipeline over every project, one at a time, on a single browser
/// session.
pub struct ScrapeEngine<E: Exporter> {
    pipeline: ScrapePipeline<E>,
    monitor: SystemMonitor,
}

impl<E: Exporter> ScrapeEngine<E> {
    pub fn new(pipeline: ScrapePipeline<E>) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: ScrapePipeline<E>, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Processes `projects` in order. No-data and transient outcomes are
    /// recorded in the report; a fatal error stops the run.
    pub async fn run<B>(&self, session: &B, projects: &[ProjectId]) -> Result<RunReport>
    where
        B: BrowserSession + ?Sized,
    {
        let mut report = RunReport::default();
        self.run_with_report(session, projects, &mut report).await?;
        Ok(report)
    }

    /// Like [`ScrapeEngine::run`], but records into a report the caller
    /// keeps, so projects finished before a fatal error or an interrupt are
    /// still accounted for.
    pub async fn run_with_report<B>(
        &self,
        session: &B,
        projects: &[ProjectId],
        report: &mut RunReport,
    ) -> Result<()>
    where
        B: BrowserSession + ?Sized,
    {
        let total = projects.len();
        let delay = self.pipeline.config().timing.request_delay();

        tracing::info!("🚀 Scraping {} project(s)", total);

        for (index, project) in projects.iter().enumerate() {
            tracing::info!("🔎 [{}/{}] Project {}", index + 1, total, project);

            match self.pipeline.extract(session, project).await? {
                ProjectOutcome::Scraped(table) => {
                    let table = self.pipeline.transform(table);
                    let path = self.pipeline.load(project, &table).await?;
                    tracing::info!(
                        "✅ Project {}: {} row(s) -> {}",
                        project,
                        table.len(),
                        path.display()
                    );
                    report.exported.push(ExportedProject {
                        project: project.clone(),
                        rows: table.len(),
                        path,
                    });
                }
                ProjectOutcome::NoData => {
                    tracing::info!("∅ Project {}: no subcontract data found", project);
                    report.no_data.push(project.clone());
                }
                ProjectOutcome::Transient { reason } => {
                    tracing::error!("❌ Project {}: gave up ({})", project, reason);
                    report.failed.push(FailedProject {
                        project: project.clone(),
                        reason,
                    });
                }
            }

            self.monitor.log_stats(project.as_str());

            if index + 1 < total && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        self.monitor.log_final_stats();
        tracing::info!(
            "🏁 Done: {} exported ({} rows), {} without data, {} failed",
            report.exported.len(),
            report.total_rows(),
            report.no_data.len(),
            report.failed.len()
        );
        Ok(())
    }
}
