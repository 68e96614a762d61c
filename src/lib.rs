pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{load_project_ids, CsvExporter, WebDriverSession};
pub use crate::config::ScrapeConfig;
pub use crate::core::{engine::ScrapeEngine, pipeline::ScrapePipeline};
pub use crate::utils::error::{Result, ScrapeError};
