use crate::config::toml_config::ScrapeConfig;
use crate::core::wait::wait_for_element;
use crate::domain::model::{Cell, ProjectId};
use crate::domain::ports::{keys, BrowserSession, ElementRef, Locator};
use crate::utils::error::{Result, ScrapeError};

/// Fills in and submits the portal's report search form.
pub struct FormDriver<'a, B: ?Sized> {
    session: &'a B,
    config: &'a ScrapeConfig,
}

impl<'a, B: BrowserSession + ?Sized> FormDriver<'a, B> {
    pub fn new(session: &'a B, config: &'a ScrapeConfig) -> Self {
        Self { session, config }
    }

    /// Loads the entry page. The report-type select showing up is what tells
    /// us the portal is answering.
    pub async fn open_home(&self) -> Result<()> {
        self.session.navigate(&self.config.portal.base_url).await?;
        wait_for_element(
            self.session,
            &self.config.portal.selectors.report_type,
            &self.config.timing.page_load_wait(),
        )
        .await?;
        Ok(())
    }

    /// Picks the option whose visible text is `label`.
    pub async fn select_report(&self, label: &str) -> Result<()> {
        let select = self
            .find(&self.config.portal.selectors.report_type, "report type select")
            .await?;
        let options = self
            .session
            .find_children(&select, &Locator::tag_name("option"))
            .await?;

        for option in options {
            if self.session.text(&option).await?.trim() == label {
                tracing::debug!("Selecting report type '{}'", label);
                return self.session.click(&option).await;
            }
        }

        Err(ScrapeError::ElementNotFound {
            what: format!("report type option '{}'", label),
        })
    }

    pub async fn submit_project(&self, project: &ProjectId) -> Result<()> {
        let input = self
            .find(&self.config.portal.selectors.project_input, "project number input")
            .await?;
        self.session.clear(&input).await?;
        self.session.send_keys(&input, project.as_str()).await?;
        self.session.send_keys(&input, keys::ENTER).await
    }

    pub async fn search(&self, report: &str, project: &ProjectId) -> Result<()> {
        self.open_home().await?;
        self.select_report(report).await?;
        self.submit_project(project).await
    }

    /// Looks up the project's original contract amount with a second search.
    /// A missing field yields an empty cell instead of failing the project.
    pub async fn contract_amount(&self, project: &ProjectId) -> Result<Cell> {
        self.search(&self.config.portal.contract_report, project)
            .await?;

        match wait_for_element(
            self.session,
            &self.config.portal.selectors.contract_amount,
            &self.config.timing.page_load_wait(),
        )
        .await
        {
            Ok(field) => Ok(Cell::text(self.session.text(&field).await?.trim())),
            Err(ScrapeError::Timeout { .. }) => {
                tracing::warn!("No original contract amount shown for project {}", project);
                Ok(Cell::Empty)
            }
            Err(e) => Err(e),
        }
    }

    async fn find(&self, locator: &Locator, what: &str) -> Result<ElementRef> {
        self.session
            .find_element(locator)
            .await?
            .ok_or_else(|| ScrapeError::ElementNotFound {
                what: format!("{} ({})", what, locator),
            })
    }
}
