// Test doubles for the engine.
//
// FakeSession implements PageSession over an in-memory page registry:
// builder-style registration (`.on_page()`, `.on_query()`), Mutex inner
// state, and assertion helpers for scratch-tab bookkeeping, navigation
// counts, and typed text. ScriptedPrompt stands in for the operator.
// No browser, no network.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use internscout_common::{DelayRange, DelayRanges, Policy, RoleTitle};

use crate::outreach::orchestrator::{CancelFlag, OperatorPrompt};
use crate::traits::{Element, PageSession, Tab};

const PRIMARY: &str = "primary";

// ---------------------------------------------------------------------------
// Page and element builders
// ---------------------------------------------------------------------------

/// One element on a fake page: text, attributes, nested children keyed
/// by selector, and optional click behavior.
#[derive(Clone, Default)]
pub struct FakeElement {
    text: String,
    attrs: HashMap<String, String>,
    children: HashMap<String, Vec<FakeElement>>,
    navigates_to: Option<String>,
    click_fails: bool,
}

impl FakeElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn child(mut self, selector: &str, child: FakeElement) -> Self {
        self.children.entry(selector.to_string()).or_default().push(child);
        self
    }

    /// Clicking this element loads the given page.
    pub fn navigates_to(mut self, url: &str) -> Self {
        self.navigates_to = Some(url.to_string());
        self
    }

    /// Clicking this element errors.
    pub fn failing_click(mut self) -> Self {
        self.click_fails = true;
        self
    }
}

/// A link element shorthand: `<a>` with text and href.
pub fn link(text: &str, href: &str) -> FakeElement {
    FakeElement::new().text(text).attr("href", href)
}

#[derive(Clone, Default)]
pub struct FakePage {
    title: String,
    body_text: String,
    elements: HashMap<String, Vec<FakeElement>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn body_text(mut self, text: &str) -> Self {
        self.body_text = text.to_string();
        self
    }

    pub fn with(mut self, selector: &str, elements: Vec<FakeElement>) -> Self {
        self.elements
            .entry(selector.to_string())
            .or_default()
            .extend(elements);
        self
    }

    pub fn with_one(self, selector: &str, element: FakeElement) -> Self {
        self.with(selector, vec![element])
    }
}

// ---------------------------------------------------------------------------
// FakeSession
// ---------------------------------------------------------------------------

struct FakeSessionInner {
    pages: HashMap<String, FakePage>,
    failing_urls: HashSet<String>,
    /// Resolved element handles; ids index into this arena.
    arena: Vec<FakeElement>,
    /// Current URL per context handle.
    current: HashMap<String, Option<String>>,
    active: String,
    open_tabs: HashSet<String>,
    scratch_opened: u32,
    scratch_closed: u32,
    next_tab: u32,
    navigations: u32,
    typed: Vec<String>,
    last_typed: HashMap<String, String>,
    cancel_after: Option<(u32, CancelFlag)>,
}

/// In-memory PageSession. Unregistered URLs fail to navigate, matching
/// the real surface's behavior of erroring on dead pages; submitted
/// queries with no registered results yield an empty results page.
pub struct FakeSession {
    inner: Mutex<FakeSessionInner>,
}

impl FakeSession {
    pub fn new() -> Self {
        let mut current = HashMap::new();
        current.insert(PRIMARY.to_string(), None);
        Self {
            inner: Mutex::new(FakeSessionInner {
                pages: HashMap::new(),
                failing_urls: HashSet::new(),
                arena: Vec::new(),
                current,
                active: PRIMARY.to_string(),
                open_tabs: HashSet::new(),
                scratch_opened: 0,
                scratch_closed: 0,
                next_tab: 0,
                navigations: 0,
                typed: Vec::new(),
                last_typed: HashMap::new(),
                cancel_after: None,
            }),
        }
    }

    pub fn on_page(self, url: &str, page: FakePage) -> Self {
        self.inner.lock().unwrap().pages.insert(url.to_string(), page);
        self
    }

    /// Register the results page shown after submitting a search box
    /// whose typed text equals `query`.
    pub fn on_query(self, query: &str, page: FakePage) -> Self {
        self.inner
            .lock()
            .unwrap()
            .pages
            .insert(query_url(query), page);
        self
    }

    /// Make navigation to a URL fail.
    pub fn failing_url(self, url: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .failing_urls
            .insert(url.to_string());
        self
    }

    /// Trip a cancel flag once `n` navigations have happened. Used to
    /// simulate an interrupt landing mid-campaign.
    pub fn cancel_after_navigations(self, n: u32, flag: CancelFlag) -> Self {
        self.inner.lock().unwrap().cancel_after = Some((n, flag));
        self
    }

    // --- Assertion helpers ---

    pub fn scratch_opened(&self) -> u32 {
        self.inner.lock().unwrap().scratch_opened
    }

    pub fn scratch_closed(&self) -> u32 {
        self.inner.lock().unwrap().scratch_closed
    }

    /// Every opened scratch tab has been closed again.
    pub fn all_scratch_released(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.open_tabs.is_empty() && inner.scratch_opened == inner.scratch_closed
    }

    pub fn focused_primary(&self) -> bool {
        self.inner.lock().unwrap().active == PRIMARY
    }

    pub fn navigation_count(&self) -> u32 {
        self.inner.lock().unwrap().navigations
    }

    /// Every string typed into any element, in order.
    pub fn typed_values(&self) -> Vec<String> {
        self.inner.lock().unwrap().typed.clone()
    }

    fn element(&self, el: &Element) -> Result<FakeElement> {
        let inner = self.inner.lock().unwrap();
        let idx: usize = el
            .0
            .strip_prefix("el-")
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| anyhow::anyhow!("FakeSession: bad element id {}", el.0))?;
        inner
            .arena
            .get(idx)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("FakeSession: stale element id {}", el.0))
    }

    fn set_current(inner: &mut FakeSessionInner, url: &str) -> Result<()> {
        inner.navigations += 1;
        if let Some((n, flag)) = &inner.cancel_after {
            if inner.navigations >= *n {
                flag.set();
            }
        }
        if inner.failing_urls.contains(url) {
            bail!("FakeSession: navigation to {url} failed");
        }
        if !inner.pages.contains_key(url) {
            bail!("FakeSession: no page registered for {url}");
        }
        let active = inner.active.clone();
        inner.current.insert(active, Some(url.to_string()));
        Ok(())
    }

    fn current_page(inner: &FakeSessionInner) -> Result<FakePage> {
        let url = inner
            .current
            .get(&inner.active)
            .cloned()
            .flatten()
            .ok_or_else(|| anyhow::anyhow!("FakeSession: no page loaded in active context"))?;
        inner
            .pages
            .get(&url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("FakeSession: page vanished for {url}"))
    }

    fn register(inner: &mut FakeSessionInner, specs: Vec<FakeElement>) -> Vec<Element> {
        specs
            .into_iter()
            .map(|spec| {
                inner.arena.push(spec);
                Element(format!("el-{}", inner.arena.len() - 1))
            })
            .collect()
    }
}

impl Default for FakeSession {
    fn default() -> Self {
        Self::new()
    }
}

fn query_url(query: &str) -> String {
    format!("query:{query}")
}

#[async_trait]
impl PageSession for FakeSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        Self::set_current(&mut inner, url)
    }

    async fn current_url(&self) -> Result<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .current
            .get(&inner.active)
            .cloned()
            .flatten()
            .ok_or_else(|| anyhow::anyhow!("FakeSession: no page loaded"))
    }

    async fn page_title(&self) -> Result<String> {
        let inner = self.inner.lock().unwrap();
        Ok(Self::current_page(&inner)?.title)
    }

    async fn body_text(&self) -> Result<String> {
        let inner = self.inner.lock().unwrap();
        Ok(Self::current_page(&inner)?.body_text)
    }

    async fn find_all(&self, css: &str) -> Result<Vec<Element>> {
        let mut inner = self.inner.lock().unwrap();
        let specs = Self::current_page(&inner)?
            .elements
            .get(css)
            .cloned()
            .unwrap_or_default();
        Ok(Self::register(&mut inner, specs))
    }

    async fn find_within(&self, parent: &Element, css: &str) -> Result<Vec<Element>> {
        let spec = self.element(parent)?;
        let mut inner = self.inner.lock().unwrap();
        let specs = spec.children.get(css).cloned().unwrap_or_default();
        Ok(Self::register(&mut inner, specs))
    }

    async fn text_of(&self, el: &Element) -> Result<String> {
        Ok(self.element(el)?.text)
    }

    async fn attr_of(&self, el: &Element, name: &str) -> Result<Option<String>> {
        Ok(self.element(el)?.attrs.get(name).cloned())
    }

    async fn click(&self, el: &Element) -> Result<()> {
        let spec = self.element(el)?;
        if spec.click_fails {
            bail!("FakeSession: element not clickable");
        }
        if let Some(url) = spec.navigates_to {
            let mut inner = self.inner.lock().unwrap();
            Self::set_current(&mut inner, &url)?;
        }
        Ok(())
    }

    async fn type_into(&self, el: &Element, text: &str) -> Result<()> {
        // Validate the handle before recording.
        self.element(el)?;
        let mut inner = self.inner.lock().unwrap();
        inner.typed.push(text.to_string());
        inner.last_typed.insert(el.0.clone(), text.to_string());
        Ok(())
    }

    async fn submit(&self, el: &Element) -> Result<()> {
        self.element(el)?;
        let mut inner = self.inner.lock().unwrap();
        let Some(query) = inner.last_typed.get(&el.0).cloned() else {
            bail!("FakeSession: submit before typing");
        };
        let url = query_url(&query);
        // An unregistered query resolves to an empty results page.
        inner.pages.entry(url.clone()).or_default();
        Self::set_current(&mut inner, &url)
    }

    async fn open_scratch_tab(&self) -> Result<Tab> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_tab += 1;
        let handle = format!("scratch-{}", inner.next_tab);
        inner.open_tabs.insert(handle.clone());
        inner.scratch_opened += 1;
        inner.current.insert(handle.clone(), None);
        inner.active = handle.clone();
        Ok(Tab(handle))
    }

    async fn close_scratch_tab(&self, tab: Tab) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.open_tabs.remove(&tab.0) {
            bail!("FakeSession: closing unknown tab {}", tab.0);
        }
        inner.scratch_closed += 1;
        if inner.active == tab.0 {
            inner.active = PRIMARY.to_string();
        }
        Ok(())
    }

    async fn focus_primary(&self) -> Result<()> {
        self.inner.lock().unwrap().active = PRIMARY.to_string();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ScriptedPrompt
// ---------------------------------------------------------------------------

/// Operator stand-in. Approves or declines every send, counts how often
/// it was asked.
pub struct ScriptedPrompt {
    allow_sends: bool,
    confirms: Mutex<u32>,
}

impl ScriptedPrompt {
    pub fn allow_all() -> Self {
        Self {
            allow_sends: true,
            confirms: Mutex::new(0),
        }
    }

    pub fn deny_all() -> Self {
        Self {
            allow_sends: false,
            confirms: Mutex::new(0),
        }
    }

    pub fn confirms_asked(&self) -> u32 {
        *self.confirms.lock().unwrap()
    }
}

impl OperatorPrompt for ScriptedPrompt {
    fn wait_for_login(&self) -> Result<()> {
        Ok(())
    }

    fn confirm_send(&self, _contact_name: &str, _entity_name: &str) -> Result<bool> {
        *self.confirms.lock().unwrap() += 1;
        Ok(self.allow_sends)
    }

    fn confirm_discard(&self) -> Result<bool> {
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Policy helpers
// ---------------------------------------------------------------------------

pub fn zero_delays() -> DelayRanges {
    let zero = DelayRange::new(0.0, 0.0);
    DelayRanges {
        default: zero,
        within_scan: zero,
        after_search: zero,
        between_roles: zero,
        after_send: zero,
        between_entities: zero,
    }
}

/// Default policy with no pacing and a single role — the usual starting
/// point for campaign tests.
pub fn test_policy() -> Policy {
    Policy {
        delays: zero_delays(),
        roles: vec![RoleTitle::TalentAcquisition],
        ..Policy::default()
    }
}

// ---------------------------------------------------------------------------
// FakeSession self-tests
// ---------------------------------------------------------------------------
