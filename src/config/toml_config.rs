use crate::domain::ports::Locator;
use crate::utils::error::{Result, ScrapeError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://mdotjboss.state.mi.us/CCI/";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub portal: PortalConfig,
    pub browser: BrowserConfig,
    pub timing: TimingConfig,
    pub pagination: PaginationConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub base_url: String,
    pub subcontract_report: String,
    pub contract_report: String,
    /// Run a second search per project for the original contract amount.
    pub include_contract_amount: bool,
    pub selectors: PortalSelectors,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            subcontract_report: "Subcontracts".to_string(),
            contract_report: "General Contract Level Information".to_string(),
            include_contract_amount: true,
            selectors: PortalSelectors::default(),
        }
    }
}

/// Where things live in the portal's DOM.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalSelectors {
    pub report_type: Locator,
    pub project_input: Locator,
    pub results_table: Locator,
    pub results_panel: Locator,
    pub page_navigation: Locator,
    pub prime_contractor: Locator,
    pub contract_amount: Locator,
}

impl Default for PortalSelectors {
    fn default() -> Self {
        Self {
            report_type: Locator::id("selectedReportType"),
            project_input: Locator::id("contractProjectNum"),
            results_table: Locator::id("subContractTable"),
            // The portal really spells it this way.
            results_panel: Locator::id("subcontrtactsId"),
            page_navigation: Locator::class_name("page-navigation"),
            prime_contractor: Locator::xpath(
                r#"//div[@id="subcontrtactsId"]/div[@class="panel-body"]/div[@class="row"][1]/div[2]"#,
            ),
            contract_amount: Locator::xpath(r#"//div[@id="federalDivId"]/div[10]/div[2]"#),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserKind {
    Chrome,
    Firefox,
    Edge,
}

impl FromStr for BrowserKind {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrome" | "chromium" => Ok(BrowserKind::Chrome),
            "firefox" => Ok(BrowserKind::Firefox),
            "edge" | "msedge" => Ok(BrowserKind::Edge),
            _ => Err(ScrapeError::UnsupportedBrowser {
                name: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub name: String,
    pub headless: bool,
    pub connect_attempts: u32,
    pub connect_retry_delay_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            name: "chrome".to_string(),
            headless: true,
            connect_attempts: 3,
            connect_retry_delay_ms: 2_000,
        }
    }
}

impl BrowserConfig {
    pub fn kind(&self) -> Result<BrowserKind> {
        self.name.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Bound on waiting for the search form after navigating.
    pub page_load_timeout_ms: u64,
    /// Bound on waiting for the results table after submitting.
    pub table_timeout_ms: u64,
    pub poll_interval_ms: u64,
    /// Pause after each project, to go easy on the portal.
    pub request_delay_ms: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub http_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            page_load_timeout_ms: 30_000,
            table_timeout_ms: 30_000,
            poll_interval_ms: 500,
            request_delay_ms: 3_000,
            retry_attempts: 2,
            retry_delay_ms: 5_000,
            http_timeout_ms: 60_000,
        }
    }
}

impl TimingConfig {
    pub fn page_load_wait(&self) -> WaitPolicy {
        WaitPolicy::new(self.page_load_timeout_ms, self.poll_interval_ms)
    }

    pub fn table_wait(&self) -> WaitPolicy {
        WaitPolicy::new(self.table_timeout_ms, self.poll_interval_ms)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// A bounded polling wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitPolicy {
    pub fn new(timeout_ms: u64, poll_interval_ms: u64) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_ms),
            poll_interval: Duration::from_millis(poll_interval_ms.max(1)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageCountStrategy {
    /// Advance while an enabled "next" control exists.
    FollowNext,
    /// Page count = navigation links minus `decoration_links`. Depends on the
    /// portal rendering exactly first/prev/next/last around the page numbers.
    LinkCount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub strategy: PageCountStrategy,
    pub decoration_links: usize,
    pub max_pages: usize,
    /// Visible texts that mark the "next" link, compared case-insensitively.
    pub next_labels: Vec<String>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            strategy: PageCountStrategy::FollowNext,
            decoration_links: 4,
            max_pages: 200,
            next_labels: ["next", ">", "›", "»", "next >"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputMode {
    /// One `YYYYMMDD.csv` per day, appended to by every project.
    DailyAppend,
    /// One `<project>.csv` per project, overwritten.
    PerProject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub mode: OutputMode,
    pub normalize_headers: bool,
    pub currency_columns: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::DailyAppend,
            normalize_headers: true,
            currency_columns: vec!["Orig. Contract Amt".to_string(), "SubCont Value".to_string()],
        }
    }
}

impl ScrapeConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| ScrapeError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are
    /// left untouched.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("portal.base_url", &self.portal.base_url)?;
        validation::validate_url("browser.webdriver_url", &self.browser.webdriver_url)?;
        self.browser.kind()?;

        validation::validate_non_empty_string(
            "portal.subcontract_report",
            &self.portal.subcontract_report,
        )?;
        if self.portal.include_contract_amount {
            validation::validate_non_empty_string(
                "portal.contract_report",
                &self.portal.contract_report,
            )?;
        }

        validation::validate_positive_number(
            "browser.connect_attempts",
            self.browser.connect_attempts.into(),
            1,
        )?;
        validation::validate_positive_number(
            "timing.retry_attempts",
            self.timing.retry_attempts.into(),
            1,
        )?;
        validation::validate_positive_number(
            "timing.poll_interval_ms",
            self.timing.poll_interval_ms,
            1,
        )?;
        validation::validate_positive_number(
            "pagination.max_pages",
            self.pagination.max_pages as u64,
            1,
        )?;

        if self.pagination.strategy == PageCountStrategy::FollowNext
            && self.pagination.next_labels.iter().all(|l| l.trim().is_empty())
        {
            return Err(ScrapeError::invalid(
                "pagination.next_labels",
                "[]",
                "At least one label is needed to find the next link",
            ));
        }

        Ok(())
    }
}

impl Validate for ScrapeConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
