use crate::config::toml_config::ScrapeConfig;
use crate::core::form::FormDriver;
use crate::core::paginate::PaginationWalker;
use crate::core::transform::clean_table;
use crate::domain::model::{columns, Cell, ProjectId, ProjectOutcome, ResultTable};
use crate::domain::ports::{BrowserSession, Exporter};
use crate::utils::error::Result;
use std::path::PathBuf;

/// Extract, transform and load for a single project.
pub struct ScrapePipeline<E: Exporter> {
    config: ScrapeConfig,
    exporter: E,
}

impl<E: Exporter> ScrapePipeline<E> {
    pub fn new(config: ScrapeConfig, exporter: E) -> Self {
        Self { config, exporter }
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Searches the portal and collects every result page, retrying
    /// transient failures. Anything else is fatal for the run.
    pub async fn extract<B>(&self, session: &B, project: &ProjectId) -> Result<ProjectOutcome>
    where
        B: BrowserSession + ?Sized,
    {
        let attempts = self.config.timing.retry_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.extract_once(session, project).await {
                Ok(Some(table)) if !table.is_empty() => return Ok(ProjectOutcome::Scraped(table)),
                Ok(_) => return Ok(ProjectOutcome::NoData),
                Err(e) if e.is_transient() && attempt < attempts => {
                    tracing::warn!(
                        "⚠️ Project {} attempt {}/{} failed: {}",
                        project,
                        attempt,
                        attempts,
                        e
                    );
                    tokio::time::sleep(self.config.timing.retry_delay()).await;
                    attempt += 1;
                }
                Err(e) if e.is_transient() => {
                    return Ok(ProjectOutcome::Transient {
                        reason: e.to_string(),
                    })
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn extract_once<B>(&self, session: &B, project: &ProjectId) -> Result<Option<ResultTable>>
    where
        B: BrowserSession + ?Sized,
    {
        let form = FormDriver::new(session, &self.config);
        form.search(&self.config.portal.subcontract_report, project)
            .await?;

        let Some(mut table) = PaginationWalker::new(session, &self.config).walk().await? else {
            return Ok(None);
        };
        if table.is_empty() {
            return Ok(Some(table));
        }

        if self.config.portal.include_contract_amount {
            let amount = form.contract_amount(project).await?;
            table.set_constant_column(columns::ORIG_CONTRACT_AMOUNT, amount);
        }
        table.set_constant_column(columns::PROJECT_NUMBER, Cell::text(project.as_str()));
        Ok(Some(table))
    }

    pub fn transform(&self, mut table: ResultTable) -> ResultTable {
        let unparsed = clean_table(&mut table, &self.config.output);
        if unparsed > 0 {
            tracing::warn!("{} amount cell(s) kept as text", unparsed);
        }
        table
    }

    pub async fn load(&self, project: &ProjectId, table: &ResultTable) -> Result<PathBuf> {
        self.exporter.export(project, table).await
    }
}
