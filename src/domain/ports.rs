use crate::domain::model::{ProjectId, ResultTable};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// WebDriver key codes accepted by [`BrowserSession::send_keys`].
pub mod keys {
    pub const ENTER: &str = "\u{e007}";
}

/// How to find an element on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locator {
    Css(String),
    #[serde(rename = "xpath")]
    XPath(String),
    TagName(String),
}

impl Locator {
    pub fn id(id: &str) -> Self {
        Locator::Css(format!("#{}", id))
    }

    pub fn class_name(class: &str) -> Self {
        Locator::Css(format!(".{}", class))
    }

    pub fn xpath(expr: &str) -> Self {
        Locator::XPath(expr.to_string())
    }

    pub fn tag_name(tag: &str) -> Self {
        Locator::TagName(tag.to_string())
    }

    /// The W3C location strategy name and its value.
    pub fn strategy(&self) -> (&'static str, &str) {
        match self {
            Locator::Css(v) => ("css selector", v),
            Locator::XPath(v) => ("xpath", v),
            Locator::TagName(v) => ("tag name", v),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (using, value) = self.strategy();
        write!(f, "{} '{}'", using, value)
    }
}

/// Opaque handle to an element inside the current page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(pub String);

/// A remotely controlled browser. One session is driven by one caller at a
/// time; element handles go stale when the page navigates.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;

    /// `Ok(None)` when nothing matches right now.
    async fn find_element(&self, locator: &Locator) -> Result<Option<ElementRef>>;
    async fn find_children(&self, parent: &ElementRef, locator: &Locator)
        -> Result<Vec<ElementRef>>;

    async fn click(&self, element: &ElementRef) -> Result<()>;
    async fn clear(&self, element: &ElementRef) -> Result<()>;
    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<()>;

    async fn text(&self, element: &ElementRef) -> Result<String>;
    async fn attribute(&self, element: &ElementRef, name: &str) -> Result<Option<String>>;
    async fn outer_html(&self, element: &ElementRef) -> Result<String>;
}

/// Destination for one project's cleaned records.
pub trait Exporter: Send + Sync {
    fn export(
        &self,
        project: &ProjectId,
        table: &ResultTable,
    ) -> impl std::future::Future<Output = Result<PathBuf>> + Send;
}
