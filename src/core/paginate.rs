use crate::config::toml_config::{PageCountStrategy, ScrapeConfig};
use crate::core::table::parse_table;
use crate::core::wait::{wait_for_element, wait_until};
use crate::domain::model::{columns, Cell, ResultTable};
use crate::domain::ports::{BrowserSession, ElementRef, Locator};
use crate::utils::error::{Result, ScrapeError};

/// Page count under the legacy strategy: every navigation link minus the
/// first/prev/next/last decorations, never below one.
pub fn page_count_from_links(links: usize, decoration_links: usize) -> usize {
    links.saturating_sub(decoration_links).max(1)
}

pub fn is_disabled(class: Option<&str>, aria_disabled: Option<&str>) -> bool {
    class.is_some_and(|c| c.split_whitespace().any(|c| c.eq_ignore_ascii_case("disabled")))
        || aria_disabled.is_some_and(|a| a.eq_ignore_ascii_case("true"))
}

/// Highest page number among the navigation link texts, if any link is a
/// plain page number.
pub fn last_page_number<S: AsRef<str>>(link_texts: &[S]) -> Option<usize> {
    link_texts
        .iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|t| t.parse().ok())
        .max()
}

fn is_stale(error: &ScrapeError) -> bool {
    matches!(error, ScrapeError::WebDriverError { error, .. } if error == "stale element reference")
}

/// Walks every page of a submitted result and merges the page tables.
pub struct PaginationWalker<'a, B: ?Sized> {
    session: &'a B,
    config: &'a ScrapeConfig,
}

impl<'a, B: BrowserSession + ?Sized> PaginationWalker<'a, B> {
    pub fn new(session: &'a B, config: &'a ScrapeConfig) -> Self {
        Self { session, config }
    }

    /// `Ok(None)` when the results table never shows up: the portal has
    /// nothing for this project.
    pub async fn walk(&self) -> Result<Option<ResultTable>> {
        let selectors = &self.config.portal.selectors;
        let pagination = &self.config.pagination;

        match wait_for_element(
            self.session,
            &selectors.results_table,
            &self.config.timing.table_wait(),
        )
        .await
        {
            Ok(_) => {}
            Err(ScrapeError::Timeout { after, .. }) => {
                tracing::debug!("No results table after {:?}", after);
                return Ok(None);
            }
            Err(e) => return Err(e),
        }

        let planned_pages = match pagination.strategy {
            PageCountStrategy::LinkCount => Some(self.count_pages().await?),
            PageCountStrategy::FollowNext => None,
        };

        let mut merged = ResultTable::default();
        let mut page = 1;
        loop {
            let (page_table, markup) = self.extract_page().await?;
            tracing::debug!("Page {}: {} row(s)", page, page_table.len());
            merged.append(page_table);

            if page >= pagination.max_pages {
                tracing::warn!("Stopped after {} pages (pagination.max_pages)", page);
                break;
            }

            let next = match planned_pages {
                Some(total) if page < total => self.positional_next().await?,
                Some(_) => None,
                None => self.next_control(page).await?,
            };
            let Some(next) = next else {
                break;
            };

            self.session.click(&next).await?;
            if !self.wait_for_new_page(&markup).await? {
                tracing::warn!(
                    "Results did not change after clicking next on page {}; treating it as the last page",
                    page
                );
                break;
            }
            page += 1;
        }

        Ok(Some(merged))
    }

    /// Reads the current page's table and tags its rows with the prime
    /// contractor shown above it. Returns the raw markup too.
    async fn extract_page(&self) -> Result<(ResultTable, String)> {
        let selectors = &self.config.portal.selectors;
        let wait = self.config.timing.table_wait();

        wait_for_element(self.session, &selectors.results_panel, &wait).await?;
        let table = wait_for_element(self.session, &selectors.results_table, &wait).await?;
        let markup = self.session.outer_html(&table).await?;

        let mut page_table = parse_table(&markup)?;
        let contractor = match self.session.find_element(&selectors.prime_contractor).await? {
            Some(el) => Cell::text(self.session.text(&el).await?.trim()),
            None => Cell::Empty,
        };
        page_table.set_constant_column(columns::PRIME_CONTRACTOR, contractor);

        Ok((page_table, markup))
    }

    async fn navigation_links(&self) -> Result<Option<Vec<ElementRef>>> {
        let Some(nav) = self
            .session
            .find_element(&self.config.portal.selectors.page_navigation)
            .await?
        else {
            return Ok(None);
        };
        let links = self
            .session
            .find_children(&nav, &Locator::tag_name("a"))
            .await?;
        Ok(Some(links))
    }

    async fn count_pages(&self) -> Result<usize> {
        let pages = match self.navigation_links().await? {
            Some(links) => page_count_from_links(links.len(), self.config.pagination.decoration_links),
            None => 1,
        };
        tracing::debug!("Navigation shows {} page(s)", pages);
        Ok(pages)
    }

    /// The second-to-last navigation link, which the portal renders as "next".
    async fn positional_next(&self) -> Result<Option<ElementRef>> {
        Ok(self.navigation_links().await?.and_then(|mut links| {
            let len = links.len();
            (len >= 2).then(|| links.swap_remove(len - 2))
        }))
    }

    /// The enabled "next" link, matched by its text. Falls back to the
    /// second-to-last link when no text matches and the navigation has more
    /// links than decorations. `None` once `page` reaches the highest
    /// numbered link, even if "next" is still enabled there.
    async fn next_control(&self, page: usize) -> Result<Option<ElementRef>> {
        let Some(links) = self.navigation_links().await? else {
            return Ok(None);
        };

        let mut texts = Vec::with_capacity(links.len());
        for link in &links {
            texts.push(self.session.text(link).await?.trim().to_lowercase());
        }
        if let Some(last) = last_page_number(&texts) {
            if page >= last {
                tracing::debug!("Page {} is the last numbered page", page);
                return Ok(None);
            }
        }

        let labels: Vec<String> = self
            .config
            .pagination
            .next_labels
            .iter()
            .map(|l| l.trim().to_lowercase())
            .collect();

        let mut next = links
            .iter()
            .zip(&texts)
            .find(|(_, text)| labels.contains(text))
            .map(|(link, _)| link.clone());
        if next.is_none() && links.len() >= 2 && links.len() > self.config.pagination.decoration_links {
            next = links.get(links.len() - 2).cloned();
        }
        let Some(next) = next else {
            return Ok(None);
        };

        let class = self.session.attribute(&next, "class").await?;
        let aria = self.session.attribute(&next, "aria-disabled").await?;
        if is_disabled(class.as_deref(), aria.as_deref()) {
            return Ok(None);
        }
        Ok(Some(next))
    }

    /// Waits until the results table holds different markup than `previous`.
    async fn wait_for_new_page(&self, previous: &str) -> Result<bool> {
        let session = self.session;
        let locator = &self.config.portal.selectors.results_table;
        let wait = self.config.timing.table_wait();
        let result = wait_until(&wait, "next results page", move || async move {
            let Some(table) = session.find_element(locator).await? else {
                return Ok(None);
            };
            match session.outer_html(&table).await {
                Ok(markup) if markup != previous => Ok(Some(())),
                Ok(_) => Ok(None),
                Err(e) if is_stale(&e) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await;

        match result {
            Ok(()) => Ok(true),
            Err(ScrapeError::Timeout { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
