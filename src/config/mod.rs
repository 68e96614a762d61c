pub mod toml_config;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::{
    BrowserConfig, BrowserKind, OutputMode, PageCountStrategy, PortalSelectors, ScrapeConfig,
    WaitPolicy,
};
