// Adapters layer: concrete implementations for the browser, input and output ports.

pub mod csv_export;
pub mod project_list;
pub mod webdriver;

pub use csv_export::CsvExporter;
pub use project_list::load_project_ids;
pub use webdriver::WebDriverSession;
