//! Website resolution: find and verify an entity's own site via a web
//! search, rejecting job boards and social networks.

use anyhow::Result;
use tracing::{info, warn};

use internscout_common::WebsiteStatus;

use crate::sources::{self, ERROR_TITLE_MARKERS, EXCLUDED_HOSTS, INTERNSHIP_KEYWORDS};
use crate::traits::{release_scratch, PageSession};
use crate::urlnorm;

/// How many search-result links are considered per entity.
const CANDIDATE_LIMIT: usize = 5;

pub struct WebsiteResolution {
    pub status: WebsiteStatus,
    pub has_internship_signal: bool,
    pub mentions_target_location: bool,
}

impl WebsiteResolution {
    fn sentinel(status: WebsiteStatus) -> Self {
        Self {
            status,
            has_internship_signal: false,
            mentions_target_location: false,
        }
    }
}

/// Resolve an entity's website. All navigation happens in a scratch tab
/// that is released before this returns, success or not. A failed search
/// yields the Error sentinel; exhausted candidates yield NotFound.
pub async fn resolve_website(
    session: &dyn PageSession,
    entity_name: &str,
    location: &str,
) -> WebsiteResolution {
    let tab = match session.open_scratch_tab().await {
        Ok(tab) => tab,
        Err(e) => {
            warn!(company = entity_name, error = %e, "Could not open scratch tab");
            return WebsiteResolution::sentinel(WebsiteStatus::Error);
        }
    };

    let result = resolve_in_tab(session, entity_name, location).await;
    release_scratch(session, tab).await;

    match result {
        Ok(resolution) => resolution,
        Err(e) => {
            warn!(company = entity_name, error = %e, "Website search failed");
            WebsiteResolution::sentinel(WebsiteStatus::Error)
        }
    }
}

async fn resolve_in_tab(
    session: &dyn PageSession,
    entity_name: &str,
    location: &str,
) -> Result<WebsiteResolution> {
    let query = format!("{entity_name} {location} official website");
    session.navigate(&sources::web_search_url(&query)).await?;

    let links = session
        .find_all(sources::surface().search_result_link)
        .await?;

    let mut candidates = Vec::new();
    for link in links.iter().take(CANDIDATE_LIMIT) {
        let Some(href) = session.attr_of(link, "href").await.ok().flatten() else {
            continue;
        };
        let url = urlnorm::normalize(&href);
        if !url.starts_with("http") {
            continue;
        }
        if urlnorm::host_contains_any(&url, EXCLUDED_HOSTS) {
            continue;
        }
        candidates.push(url);
    }

    for url in candidates {
        info!(company = entity_name, url = url.as_str(), "Verifying candidate website");
        match visit_and_verify(session, &url, location).await {
            Ok(Some(resolution)) => return Ok(resolution),
            Ok(None) => info!(url = url.as_str(), "Candidate rejected by title check"),
            Err(e) => warn!(url = url.as_str(), error = %e, "Candidate failed to load"),
        }
    }

    Ok(WebsiteResolution::sentinel(WebsiteStatus::NotFound))
}

/// Visit a candidate and accept it unless its title marks a dead page.
/// Acceptance also derives the internship/location signals from the
/// landing page text.
async fn visit_and_verify(
    session: &dyn PageSession,
    url: &str,
    location: &str,
) -> Result<Option<WebsiteResolution>> {
    session.navigate(url).await?;

    let title = session.page_title().await?.to_lowercase();
    if ERROR_TITLE_MARKERS.iter().any(|m| title.contains(m)) {
        return Ok(None);
    }

    let text = session.body_text().await.unwrap_or_default().to_lowercase();
    let location_term = location
        .split(',')
        .next()
        .unwrap_or(location)
        .trim()
        .to_lowercase();

    Ok(Some(WebsiteResolution {
        status: WebsiteStatus::Verified(url.to_string()),
        has_internship_signal: INTERNSHIP_KEYWORDS.iter().any(|k| text.contains(k)),
        mentions_target_location: !location_term.is_empty() && text.contains(&location_term),
    }))
}
