#![allow(dead_code)]

use async_trait::async_trait;
use cci_scrape::config::{PortalSelectors, ScrapeConfig};
use cci_scrape::domain::ports::{keys, BrowserSession, ElementRef, Locator};
use cci_scrape::{Result, ScrapeError};
use std::collections::HashMap;
use std::sync::Mutex;

pub const SUBCONTRACTS: &str = "Subcontracts";
pub const GENERAL_INFO: &str = "General Contract Level Information";

/// Rows of one result page: (sub contractor, value).
pub type Page = Vec<(String, String)>;

pub fn page(rows: &[(&str, &str)]) -> Page {
    rows.iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

#[derive(Default)]
struct PortalState {
    report: Option<String>,
    typed: String,
    submitted: Option<(String, String)>,
    page: usize,
    next_clicks: usize,
    stale_pending: bool,
    searches: Vec<(String, String)>,
}

/// An in-memory stand-in for the CCI portal behind a browser session.
///
/// The results navigation renders first/prev/<page numbers>/next/last links,
/// and the next link carries the `disabled` class on the last page.
pub struct FakePortal {
    selectors: PortalSelectors,
    subcontracts: HashMap<String, Vec<Page>>,
    contract_amounts: HashMap<String, String>,
    /// Report-type select never appears when false (portal down).
    pub ready: bool,
    /// Next link is never marked disabled.
    pub next_always_enabled: bool,
    /// Navigation shows only first/prev/next/last, no page numbers.
    pub hide_page_numbers: bool,
    /// The first table read after clicking next fails with a stale element.
    pub stale_after_click: bool,
    state: Mutex<PortalState>,
}

impl FakePortal {
    pub fn new() -> Self {
        Self {
            selectors: PortalSelectors::default(),
            subcontracts: HashMap::new(),
            contract_amounts: HashMap::new(),
            ready: true,
            next_always_enabled: false,
            hide_page_numbers: false,
            stale_after_click: false,
            state: Mutex::new(PortalState::default()),
        }
    }

    pub fn with_project(mut self, project: &str, pages: Vec<Page>) -> Self {
        self.subcontracts.insert(project.to_string(), pages);
        self
    }

    pub fn with_contract_amount(mut self, project: &str, amount: &str) -> Self {
        self.contract_amounts
            .insert(project.to_string(), amount.to_string());
        self
    }

    pub fn next_clicks(&self) -> usize {
        self.state.lock().unwrap().next_clicks
    }

    pub fn searches(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().searches.clone()
    }

    fn pages(&self, state: &PortalState) -> Option<&Vec<Page>> {
        match &state.submitted {
            Some((report, project)) if report == SUBCONTRACTS => self
                .subcontracts
                .get(project)
                .filter(|pages| !pages.is_empty()),
            _ => None,
        }
    }

    fn render_table(rows: &Page) -> String {
        let body: String = rows
            .iter()
            .map(|(name, value)| format!("<tr><td>{}</td><td>{}</td></tr>", name, value))
            .collect();
        format!(
            "<table id=\"subContractTable\"><thead><tr><th>Sub Contractor</th>\
             <th>SubCont  Value</th></tr></thead><tbody>{}</tbody></table>",
            body
        )
    }

    fn el(id: &str) -> ElementRef {
        ElementRef(id.to_string())
    }
}

#[async_trait]
impl BrowserSession for FakePortal {
    async fn navigate(&self, _url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.report = None;
        state.typed.clear();
        state.submitted = None;
        state.page = 0;
        Ok(())
    }

    async fn find_element(&self, locator: &Locator) -> Result<Option<ElementRef>> {
        let state = self.state.lock().unwrap();
        let s = &self.selectors;

        let found = if *locator == s.report_type {
            self.ready.then(|| Self::el("select"))
        } else if *locator == s.project_input {
            self.ready.then(|| Self::el("input"))
        } else if *locator == s.results_table || *locator == s.results_panel {
            self.pages(&state).map(|_| Self::el("table"))
        } else if *locator == s.page_navigation {
            self.pages(&state)
                .filter(|pages| pages.len() > 1)
                .map(|_| Self::el("nav"))
        } else if *locator == s.prime_contractor {
            self.pages(&state).map(|_| Self::el("contractor"))
        } else if *locator == s.contract_amount {
            match &state.submitted {
                Some((report, project))
                    if report == GENERAL_INFO && self.contract_amounts.contains_key(project) =>
                {
                    Some(Self::el("amount"))
                }
                _ => None,
            }
        } else {
            None
        };
        Ok(found)
    }

    async fn find_children(
        &self,
        parent: &ElementRef,
        _locator: &Locator,
    ) -> Result<Vec<ElementRef>> {
        let state = self.state.lock().unwrap();
        let children = match parent.0.as_str() {
            "select" => [SUBCONTRACTS, GENERAL_INFO, "Prime Contracts"]
                .iter()
                .map(|label| Self::el(&format!("option:{}", label)))
                .collect(),
            "nav" => {
                let count = self.pages(&state).map(Vec::len).unwrap_or(0);
                let mut links = vec![Self::el("link:first"), Self::el("link:prev")];
                if !self.hide_page_numbers {
                    links.extend((1..=count).map(|n| Self::el(&format!("link:page:{}", n))));
                }
                links.push(Self::el("link:next"));
                links.push(Self::el("link:last"));
                links
            }
            _ => Vec::new(),
        };
        Ok(children)
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(label) = element.0.strip_prefix("option:") {
            state.report = Some(label.to_string());
        } else if element.0 == "link:next" {
            state.next_clicks += 1;
            state.stale_pending = self.stale_after_click;
            let count = self.pages(&state).map(Vec::len).unwrap_or(0);
            if state.page + 1 < count {
                state.page += 1;
            }
        }
        Ok(())
    }

    async fn clear(&self, element: &ElementRef) -> Result<()> {
        if element.0 == "input" {
            self.state.lock().unwrap().typed.clear();
        }
        Ok(())
    }

    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if element.0 != "input" {
            return Ok(());
        }
        if text == keys::ENTER {
            let report = state.report.clone().unwrap_or_default();
            let project = state.typed.clone();
            state.searches.push((report.clone(), project.clone()));
            state.submitted = Some((report, project));
            state.page = 0;
        } else {
            state.typed.push_str(text);
        }
        Ok(())
    }

    async fn text(&self, element: &ElementRef) -> Result<String> {
        let state = self.state.lock().unwrap();
        let id = element.0.as_str();
        let text = if let Some(label) = id.strip_prefix("option:") {
            format!(" {} ", label)
        } else if let Some(n) = id.strip_prefix("link:page:") {
            n.to_string()
        } else {
            match id {
                "link:first" => "First".to_string(),
                "link:prev" => "Prev".to_string(),
                "link:next" => "Next".to_string(),
                "link:last" => "Last".to_string(),
                "contractor" => "  ACME Road Builders ".to_string(),
                "amount" => match &state.submitted {
                    Some((_, project)) => self
                        .contract_amounts
                        .get(project)
                        .cloned()
                        .unwrap_or_default(),
                    None => String::new(),
                },
                _ => String::new(),
            }
        };
        Ok(text)
    }

    async fn attribute(&self, element: &ElementRef, name: &str) -> Result<Option<String>> {
        let state = self.state.lock().unwrap();
        if element.0 == "link:next" && name == "class" {
            let count = self.pages(&state).map(Vec::len).unwrap_or(0);
            let last = state.page + 1 >= count;
            let class = if last && !self.next_always_enabled {
                "page-link disabled"
            } else {
                "page-link"
            };
            return Ok(Some(class.to_string()));
        }
        Ok(None)
    }

    async fn outer_html(&self, element: &ElementRef) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        if state.stale_pending {
            state.stale_pending = false;
            return Err(ScrapeError::WebDriverError {
                status: 404,
                error: "stale element reference".to_string(),
                message: "element is not attached to the page document".to_string(),
            });
        }
        let html = match (element.0.as_str(), self.pages(&state)) {
            ("table", Some(pages)) => Self::render_table(&pages[state.page]),
            _ => String::new(),
        };
        Ok(html)
    }
}

/// Defaults with waits short enough for tests.
pub fn fast_config() -> ScrapeConfig {
    let mut config = ScrapeConfig::default();
    config.timing.page_load_timeout_ms = 50;
    config.timing.table_timeout_ms = 50;
    config.timing.poll_interval_ms = 5;
    config.timing.request_delay_ms = 0;
    config.timing.retry_delay_ms = 0;
    config
}
