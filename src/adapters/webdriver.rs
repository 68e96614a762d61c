//! W3C WebDriver client over plain HTTP.
//!
//! Talks to chromedriver, geckodriver or msedgedriver. Only the handful of
//! commands the portal scraper needs are implemented.

use crate::config::toml_config::{BrowserConfig, BrowserKind};
use crate::domain::ports::{BrowserSession, ElementRef, Locator};
use crate::utils::error::{Result, ScrapeError};
use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

pub struct WebDriverSession {
    client: Client,
    endpoint: String,
    session_id: String,
}

impl WebDriverSession {
    /// Creates a browser session, retrying while the driver is unreachable.
    pub async fn connect(config: &BrowserConfig, http_timeout: Duration) -> Result<Self> {
        let kind = config.kind()?;
        let endpoint = normalize_endpoint(&config.webdriver_url)?;
        let client = Client::builder().timeout(http_timeout).build()?;
        let body = capabilities(kind, config.headless);
        let attempts = config.connect_attempts.max(1);

        let mut last_error = String::new();
        for attempt in 1..=attempts {
            tracing::debug!(
                "Requesting {:?} session from {} (attempt {}/{})",
                kind,
                endpoint,
                attempt,
                attempts
            );
            match new_session(&client, &endpoint, &body).await {
                Ok(session_id) => {
                    tracing::info!("🌐 Browser session {} opened", session_id);
                    return Ok(Self {
                        client,
                        endpoint,
                        session_id,
                    });
                }
                Err(e) => {
                    tracing::warn!("WebDriver not ready (attempt {}/{}): {}", attempt, attempts, e);
                    last_error = e.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(Duration::from_millis(config.connect_retry_delay_ms))
                            .await;
                    }
                }
            }
        }

        Err(ScrapeError::DriverUnavailable {
            endpoint,
            attempts,
            reason: last_error,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Ends the session and closes the browser.
    pub async fn close(self) -> Result<()> {
        self.command(Method::DELETE, "", None).await?;
        tracing::info!("🌐 Browser session {} closed", self.session_id);
        Ok(())
    }

    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}/session/{}{}", self.endpoint, self.session_id, path);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        unwrap_value(request.send().await?).await
    }

    async fn get(&self, path: &str) -> Result<Value> {
        self.command(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.command(Method::POST, path, Some(body)).await
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        tracing::debug!("Navigating to {}", url);
        self.post("/url", json!({ "url": url })).await?;
        Ok(())
    }

    async fn find_element(&self, locator: &Locator) -> Result<Option<ElementRef>> {
        let (using, value) = locator.strategy();
        match self
            .post("/element", json!({ "using": using, "value": value }))
            .await
        {
            Ok(found) => element_ref(&found).map(Some),
            Err(e) if is_no_such_element(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn find_children(
        &self,
        parent: &ElementRef,
        locator: &Locator,
    ) -> Result<Vec<ElementRef>> {
        let (using, value) = locator.strategy();
        let found = self
            .post(
                &format!("/element/{}/elements", parent.0),
                json!({ "using": using, "value": value }),
            )
            .await?;
        element_refs(&found)
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        self.post(&format!("/element/{}/click", element.0), json!({}))
            .await?;
        Ok(())
    }

    async fn clear(&self, element: &ElementRef) -> Result<()> {
        self.post(&format!("/element/{}/clear", element.0), json!({}))
            .await?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<()> {
        self.post(
            &format!("/element/{}/value", element.0),
            json!({ "text": text }),
        )
        .await?;
        Ok(())
    }

    async fn text(&self, element: &ElementRef) -> Result<String> {
        let value = self.get(&format!("/element/{}/text", element.0)).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn attribute(&self, element: &ElementRef, name: &str) -> Result<Option<String>> {
        let value = self
            .get(&format!("/element/{}/attribute/{}", element.0, name))
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn outer_html(&self, element: &ElementRef) -> Result<String> {
        let value = self
            .get(&format!("/element/{}/property/outerHTML", element.0))
            .await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ScrapeError::ProcessingError {
                message: format!("outerHTML of element {} is not a string", element.0),
            })
    }
}

fn normalize_endpoint(raw: &str) -> Result<String> {
    let url = Url::parse(raw)?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}

fn capabilities(kind: BrowserKind, headless: bool) -> Value {
    let (browser_name, options_key) = match kind {
        BrowserKind::Chrome => ("chrome", "goog:chromeOptions"),
        BrowserKind::Edge => ("MicrosoftEdge", "ms:edgeOptions"),
        BrowserKind::Firefox => ("firefox", "moz:firefoxOptions"),
    };
    let mut args: Vec<&str> = Vec::new();
    match kind {
        BrowserKind::Firefox => {
            if headless {
                args.push("-headless");
            }
        }
        BrowserKind::Chrome | BrowserKind::Edge => {
            args.push("--window-size=1366,900");
            if headless {
                args.push("--headless=new");
            }
        }
    }

    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": browser_name,
                options_key: { "args": args }
            }
        }
    })
}

async fn new_session(client: &Client, endpoint: &str, body: &Value) -> Result<String> {
    let response = client
        .post(format!("{}/session", endpoint))
        .json(body)
        .send()
        .await?;
    let value = unwrap_value(response).await?;
    value
        .get("sessionId")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ScrapeError::ProcessingError {
            message: "New session response has no sessionId".to_string(),
        })
}

/// Every W3C response wraps its payload in `{"value": ...}`; errors put
/// `error` and `message` inside it.
async fn unwrap_value(response: Response) -> Result<Value> {
    let status = response.status();
    let body: Value = response.json().await?;
    let value = match body {
        Value::Object(mut map) => map.remove("value").unwrap_or(Value::Null),
        other => other,
    };

    if status.is_success() {
        return Ok(value);
    }

    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Err(ScrapeError::WebDriverError {
        status: status.as_u16(),
        error: field("error"),
        message: field("message"),
    })
}

fn is_no_such_element(error: &ScrapeError) -> bool {
    matches!(error, ScrapeError::WebDriverError { error, .. } if error == "no such element")
}

fn element_ref(value: &Value) -> Result<ElementRef> {
    value
        .get(ELEMENT_KEY)
        .or_else(|| value.get(LEGACY_ELEMENT_KEY))
        .and_then(Value::as_str)
        .map(|id| ElementRef(id.to_string()))
        .ok_or_else(|| ScrapeError::ProcessingError {
            message: format!("Not a web element reference: {}", value),
        })
}

fn element_refs(value: &Value) -> Result<Vec<ElementRef>> {
    match value {
        Value::Array(items) => items.iter().map(element_ref).collect(),
        other => Err(ScrapeError::ProcessingError {
            message: format!("Expected a list of elements, got {}", other),
        }),
    }
}
