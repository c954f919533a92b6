// Trait abstraction for the external page capability.
//
// PageSession is the only doorway to the remote browser surface. The
// engine never touches the wire protocol directly, which keeps every
// stage testable against FakeSession: no browser, no network,
// `cargo test` in seconds.

use anyhow::{bail, Result};
use async_trait::async_trait;

use webdriver_client::WebdriverClient;

/// Opaque handle to an element on the current page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Element(pub String);

/// Handle to a scratch browsing context (a secondary tab). Opened for
/// verification work, always closed before the owning stage returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab(pub String);

#[async_trait]
pub trait PageSession: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    async fn page_title(&self) -> Result<String>;

    /// Visible text of the whole page body.
    async fn body_text(&self) -> Result<String>;

    async fn find_all(&self, css: &str) -> Result<Vec<Element>>;

    async fn find_within(&self, parent: &Element, css: &str) -> Result<Vec<Element>>;

    async fn text_of(&self, el: &Element) -> Result<String>;

    async fn attr_of(&self, el: &Element, name: &str) -> Result<Option<String>>;

    async fn click(&self, el: &Element) -> Result<()>;

    async fn type_into(&self, el: &Element, text: &str) -> Result<()>;

    /// Submit the form the element belongs to.
    async fn submit(&self, el: &Element) -> Result<()>;

    /// Open a secondary tab and make it the active context.
    async fn open_scratch_tab(&self) -> Result<Tab>;

    /// Close a scratch tab. The caller must restore focus afterwards.
    async fn close_scratch_tab(&self, tab: Tab) -> Result<()>;

    /// Switch the active context back to the primary tab.
    async fn focus_primary(&self) -> Result<()>;

    /// First match for a selector, if any.
    async fn find_first(&self, css: &str) -> Result<Option<Element>> {
        Ok(self.find_all(css).await?.into_iter().next())
    }

    /// First match below a parent element, if any.
    async fn find_first_within(&self, parent: &Element, css: &str) -> Result<Option<Element>> {
        Ok(self.find_within(parent, css).await?.into_iter().next())
    }
}

// ---------------------------------------------------------------------------
// WebDriver binding
// ---------------------------------------------------------------------------

/// PageSession bound to a live WebDriver session. Remembers the primary
/// window handle so scratch-tab cleanup can always find its way home.
pub struct DriverSession {
    client: WebdriverClient,
    primary: String,
}

impl DriverSession {
    pub async fn start(client: WebdriverClient) -> Result<Self> {
        let primary = client.window_handle().await?;
        Ok(Self { client, primary })
    }

    /// End the underlying browser session.
    pub async fn quit(&self) -> Result<()> {
        Ok(self.client.quit().await?)
    }
}

#[async_trait]
impl PageSession for DriverSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        Ok(self.client.navigate(url).await?)
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.client.current_url().await?)
    }

    async fn page_title(&self) -> Result<String> {
        Ok(self.client.title().await?)
    }

    async fn body_text(&self) -> Result<String> {
        let Some(body) = self.client.find("body").await?.into_iter().next() else {
            bail!("page has no body element");
        };
        Ok(self.client.text(&body).await?)
    }

    async fn find_all(&self, css: &str) -> Result<Vec<Element>> {
        Ok(self.client.find(css).await?.into_iter().map(Element).collect())
    }

    async fn find_within(&self, parent: &Element, css: &str) -> Result<Vec<Element>> {
        Ok(self
            .client
            .find_in(&parent.0, css)
            .await?
            .into_iter()
            .map(Element)
            .collect())
    }

    async fn text_of(&self, el: &Element) -> Result<String> {
        Ok(self.client.text(&el.0).await?)
    }

    async fn attr_of(&self, el: &Element, name: &str) -> Result<Option<String>> {
        Ok(self.client.attribute(&el.0, name).await?)
    }

    async fn click(&self, el: &Element) -> Result<()> {
        Ok(self.client.click(&el.0).await?)
    }

    async fn type_into(&self, el: &Element, text: &str) -> Result<()> {
        Ok(self.client.send_keys(&el.0, text).await?)
    }

    async fn submit(&self, el: &Element) -> Result<()> {
        Ok(self.client.press_enter(&el.0).await?)
    }

    async fn open_scratch_tab(&self) -> Result<Tab> {
        let handle = self.client.new_tab().await?;
        self.client.switch_window(&handle).await?;
        Ok(Tab(handle))
    }

    async fn close_scratch_tab(&self, tab: Tab) -> Result<()> {
        // The tab may not be the active window by the time cleanup runs.
        self.client.switch_window(&tab.0).await?;
        self.client.close_window().await?;
        Ok(self.client.switch_window(&self.primary).await?)
    }

    async fn focus_primary(&self) -> Result<()> {
        Ok(self.client.switch_window(&self.primary).await?)
    }
}

/// Close a scratch tab and restore primary focus, logging rather than
/// propagating cleanup failures. Used on every exit path of a stage that
/// opened a tab, including error paths.
pub async fn release_scratch(session: &dyn PageSession, tab: Tab) {
    if let Err(e) = session.close_scratch_tab(tab).await {
        tracing::warn!(error = %e, "Failed to close scratch tab");
    }
    if let Err(e) = session.focus_primary().await {
        tracing::warn!(error = %e, "Failed to restore primary focus");
    }
}
