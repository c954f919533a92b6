pub mod error;

pub use error::{Result, WebdriverError};

use std::time::Duration;

use serde_json::{json, Value};
use tracing::debug;

/// Key used by the W3C protocol to wrap element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// The WebDriver Enter key. The W3C protocol dropped the legacy submit
/// endpoint; sending Enter to the element is the conformant equivalent.
const ENTER_KEY: &str = "\u{E007}";

/// Client for a single W3C WebDriver session (chromedriver, geckodriver,
/// a Selenium grid node). One client = one browser session.
pub struct WebdriverClient {
    client: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl WebdriverClient {
    /// Open a new session against the remote end.
    pub async fn connect(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| WebdriverError::Network(e.to_string()))?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": {
                        "args": ["--disable-blink-features=AutomationControlled", "--start-maximized"]
                    }
                }
            }
        });

        let value = raw_post(&client, &format!("{base_url}/session"), &body).await?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| WebdriverError::Protocol("missing sessionId in response".into()))?
            .to_string();

        debug!(session_id = session_id.as_str(), "WebDriver session created");
        Ok(Self {
            client,
            base_url,
            session_id,
        })
    }

    /// End the session. The browser window closes with it.
    pub async fn quit(&self) -> Result<()> {
        self.delete("").await.map(|_| ())
    }

    // --- Navigation ---

    pub async fn navigate(&self, url: &str) -> Result<()> {
        self.post("/url", json!({ "url": url })).await.map(|_| ())
    }

    pub async fn current_url(&self) -> Result<String> {
        self.get("/url").await.and_then(as_string)
    }

    pub async fn title(&self) -> Result<String> {
        self.get("/title").await.and_then(as_string)
    }

    // --- Elements ---

    /// Find all elements matching a CSS selector. Returns element ids.
    pub async fn find(&self, css: &str) -> Result<Vec<String>> {
        let value = self
            .post(
                "/elements",
                json!({ "using": "css selector", "value": css }),
            )
            .await?;
        parse_element_list(value)
    }

    /// Find all elements matching a CSS selector below a parent element.
    pub async fn find_in(&self, element_id: &str, css: &str) -> Result<Vec<String>> {
        let value = self
            .post(
                &format!("/element/{element_id}/elements"),
                json!({ "using": "css selector", "value": css }),
            )
            .await?;
        parse_element_list(value)
    }

    pub async fn text(&self, element_id: &str) -> Result<String> {
        self.get(&format!("/element/{element_id}/text"))
            .await
            .and_then(as_string)
    }

    pub async fn attribute(&self, element_id: &str, name: &str) -> Result<Option<String>> {
        let value = self
            .get(&format!("/element/{element_id}/attribute/{name}"))
            .await?;
        Ok(value.as_str().map(String::from))
    }

    pub async fn click(&self, element_id: &str) -> Result<()> {
        self.post(&format!("/element/{element_id}/click"), json!({}))
            .await
            .map(|_| ())
    }

    pub async fn send_keys(&self, element_id: &str, text: &str) -> Result<()> {
        self.post(&format!("/element/{element_id}/value"), json!({ "text": text }))
            .await
            .map(|_| ())
    }

    /// Submit the form an element belongs to by sending Enter to it.
    pub async fn press_enter(&self, element_id: &str) -> Result<()> {
        self.send_keys(element_id, ENTER_KEY).await
    }

    // --- Windows ---

    pub async fn window_handle(&self) -> Result<String> {
        self.get("/window").await.and_then(as_string)
    }

    /// Open a new tab and return its handle. Does not switch to it.
    pub async fn new_tab(&self) -> Result<String> {
        let value = self.post("/window/new", json!({ "type": "tab" })).await?;
        value
            .get("handle")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| WebdriverError::Protocol("missing handle in window/new response".into()))
    }

    pub async fn switch_window(&self, handle: &str) -> Result<()> {
        self.post("/window", json!({ "handle": handle }))
            .await
            .map(|_| ())
    }

    /// Close the current window. The session must be switched to another
    /// handle afterwards.
    pub async fn close_window(&self) -> Result<()> {
        self.delete("/window").await.map(|_| ())
    }

    // --- Wire helpers ---

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        raw_post(&self.client, &self.session_url(path), &body).await
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let resp = self.client.get(self.session_url(path)).send().await?;
        unwrap_value(resp).await
    }

    async fn delete(&self, path: &str) -> Result<Value> {
        let resp = self.client.delete(self.session_url(path)).send().await?;
        unwrap_value(resp).await
    }

    fn session_url(&self, path: &str) -> String {
        format!("{}/session/{}{}", self.base_url, self.session_id, path)
    }
}

async fn raw_post(client: &reqwest::Client, url: &str, body: &Value) -> Result<Value> {
    let resp = client
        .post(url)
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await?;
    unwrap_value(resp).await
}

/// Every WebDriver response is `{"value": ...}`; errors carry
/// `{"value": {"error": ..., "message": ...}}` with a non-2xx status.
async fn unwrap_value(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    let body: Value = match resp.json().await {
        Ok(v) => v,
        Err(_) if status.is_success() => Value::Null,
        Err(e) => {
            return Err(WebdriverError::Api {
                status: status.as_u16(),
                message: e.to_string(),
            })
        }
    };
    let value = body.get("value").cloned().unwrap_or(Value::Null);

    if !status.is_success() {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown WebDriver error")
            .to_string();
        return Err(WebdriverError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(value)
}

fn as_string(value: Value) -> Result<String> {
    value
        .as_str()
        .map(String::from)
        .ok_or_else(|| WebdriverError::Protocol(format!("expected string, got {value}")))
}

fn parse_element_list(value: Value) -> Result<Vec<String>> {
    let arr = value
        .as_array()
        .ok_or_else(|| WebdriverError::Protocol(format!("expected element array, got {value}")))?;
    arr.iter()
        .map(|entry| {
            entry
                .get(ELEMENT_KEY)
                .and_then(Value::as_str)
                .map(String::from)
                .ok_or_else(|| WebdriverError::Protocol("malformed element reference".into()))
        })
        .collect()
}
