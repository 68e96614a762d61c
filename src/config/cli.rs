use crate::config::toml_config::{OutputMode, ScrapeConfig};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "cci-scrape")]
#[command(about = "Export MDOT subcontract records for a list of project numbers")]
pub struct CliConfig {
    /// File listing project numbers, one per line (.csv or .txt)
    #[arg(long)]
    pub projects: PathBuf,

    /// Existing folder the CSV output is written to
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Optional TOML file with portal, browser and timing settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// chrome, firefox or edge
    #[arg(long)]
    pub browser: Option<String>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headed: bool,

    #[arg(long, value_enum)]
    pub output_mode: Option<OutputMode>,

    /// Pause between projects in milliseconds
    #[arg(long)]
    pub request_delay_ms: Option<u64>,

    /// Also write the run report as JSON to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    #[arg(long, help = "Log process CPU and memory after each project")]
    pub monitor: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    /// Loads the TOML config (or defaults) and applies command line overrides.
    pub fn resolve(&self) -> Result<ScrapeConfig> {
        let mut config = match &self.config {
            Some(path) => ScrapeConfig::from_file(path)?,
            None => ScrapeConfig::default(),
        };

        if let Some(url) = &self.webdriver_url {
            config.browser.webdriver_url = url.clone();
        }
        if let Some(browser) = &self.browser {
            config.browser.name = browser.clone();
        }
        if self.headed {
            config.browser.headless = false;
        }
        if let Some(mode) = self.output_mode {
            config.output.mode = mode;
        }
        if let Some(delay) = self.request_delay_ms {
            config.timing.request_delay_ms = delay;
        }

        config.validate()?;
        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_project_file("projects", &self.projects)?;
        validation::validate_output_dir("output_dir", &self.output_dir)?;
        Ok(())
    }
}
