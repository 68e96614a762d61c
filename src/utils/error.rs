use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("WebDriver command failed ({status}): {error}: {message}")]
    WebDriverError {
        status: u16,
        error: String,
        message: String,
    },

    #[error("WebDriver server unavailable at {endpoint} after {attempts} attempt(s): {reason}")]
    DriverUnavailable {
        endpoint: String,
        attempts: u32,
        reason: String,
    },

    #[error("Unsupported browser: {name}")]
    UnsupportedBrowser { name: String },

    #[error("Timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },

    #[error("Element not found: {what}")]
    ElementNotFound { what: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Run interrupted by user")]
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Browser,
    Portal,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScrapeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScrapeError::ConfigError { .. }
            | ScrapeError::InvalidConfigValueError { .. }
            | ScrapeError::UrlError(_)
            | ScrapeError::UnsupportedBrowser { .. } => ErrorCategory::Configuration,
            ScrapeError::HttpError(_) => ErrorCategory::Network,
            ScrapeError::WebDriverError { error, .. } if is_bad_request(error) => {
                ErrorCategory::Configuration
            }
            ScrapeError::WebDriverError { .. } | ScrapeError::DriverUnavailable { .. } => {
                ErrorCategory::Browser
            }
            ScrapeError::Timeout { .. } | ScrapeError::ElementNotFound { .. } => {
                ErrorCategory::Portal
            }
            ScrapeError::CsvError(_)
            | ScrapeError::SerializationError(_)
            | ScrapeError::ProcessingError { .. } => ErrorCategory::Data,
            ScrapeError::IoError(_) | ScrapeError::Interrupted => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ScrapeError::Interrupted => ErrorSeverity::Medium,
            _ if self.is_transient() => ErrorSeverity::Medium,
            ScrapeError::IoError(_) | ScrapeError::DriverUnavailable { .. } => {
                ErrorSeverity::Critical
            }
            _ => ErrorSeverity::High,
        }
    }

    /// Errors worth retrying for the same project: the portal may just be slow.
    pub fn is_transient(&self) -> bool {
        match self {
            ScrapeError::Timeout { .. } => true,
            ScrapeError::HttpError(e) => e.is_timeout() || e.is_connect(),
            ScrapeError::WebDriverError { error, .. } => matches!(
                error.as_str(),
                "stale element reference" | "timeout" | "script timeout" | "unknown error"
            ),
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ScrapeError::DriverUnavailable { .. } => {
                "Start a WebDriver server (e.g. `chromedriver --port=9515`) and check --webdriver-url"
            }
            ScrapeError::UnsupportedBrowser { .. } => "Use one of: chrome, firefox, edge",
            ScrapeError::InvalidConfigValueError { .. }
            | ScrapeError::ConfigError { .. }
            | ScrapeError::UrlError(_) => "Check the command line flags and the TOML config file",
            ScrapeError::Timeout { .. } => {
                "The portal may be slow or down; try again later or raise the timeouts"
            }
            ScrapeError::ElementNotFound { .. } => {
                "The portal layout may have changed; review [portal.selectors] in the config"
            }
            ScrapeError::WebDriverError { error, .. } if is_bad_request(error) => {
                "A locator was rejected by the browser; review [portal.selectors] in the config"
            }
            ScrapeError::WebDriverError { .. } => "Restart the WebDriver server and the run",
            ScrapeError::HttpError(_) => "Check network connectivity to the WebDriver server",
            ScrapeError::IoError(_) => "Check that the output directory is writable",
            ScrapeError::CsvError(_)
            | ScrapeError::SerializationError(_)
            | ScrapeError::ProcessingError { .. } => "Inspect the input and output files",
            ScrapeError::Interrupted => "Re-run to process the remaining projects",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScrapeError::DriverUnavailable { endpoint, .. } => {
                format!("Could not reach a browser driver at {}", endpoint)
            }
            ScrapeError::UnsupportedBrowser { name } => {
                format!("The browser '{}' is not supported", name)
            }
            ScrapeError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid {}: {}", field, reason)
            }
            ScrapeError::Timeout { what, .. } => {
                format!("The portal did not respond in time ({})", what)
            }
            other => other.to_string(),
        }
    }

    pub(crate) fn invalid(field: &str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        ScrapeError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// WebDriver error codes caused by what we sent rather than by the page.
fn is_bad_request(code: &str) -> bool {
    matches!(code, "invalid selector" | "invalid argument")
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
