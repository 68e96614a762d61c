pub mod engine;
pub mod form;
pub mod paginate;
pub mod pipeline;
pub mod table;
pub mod transform;
pub mod wait;

pub use crate::domain::model::{Cell, ProjectId, ProjectOutcome, ResultTable, RunReport};
pub use crate::domain::ports::{BrowserSession, Exporter};
pub use crate::utils::error::Result;
