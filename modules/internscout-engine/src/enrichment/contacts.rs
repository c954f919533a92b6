//! Contact discovery: pull up to two leads per entity from its own
//! team/about page, topping up from a profile-host-scoped web search.

use std::collections::HashSet;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use tracing::{info, warn};

use internscout_common::{
    ContactLead, ContactSource, Entity, RoleTitle, CONTACTS_PER_ENTITY,
};

use crate::dedup::DedupRegistry;
use crate::sources::{self, TEAM_PAGE_KEYWORDS, TITLE_KEYWORDS};
use crate::traits::{release_scratch, PageSession};
use crate::urlnorm;

/// Sequences of 2–4 capitalized words: the name-detection heuristic.
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+){1,3}\b").unwrap());

/// Characters of context inspected on each side of a name occurrence.
const CONTEXT_PAD: usize = 100;

/// Search-result links inspected during the fallback search.
const FALLBACK_LINK_LIMIT: usize = 10;

/// Discover up to two contact leads for an entity. On-site scan first,
/// web-search fallback second; the scratch tab is released on every
/// path.
pub async fn discover_contacts(
    session: &dyn PageSession,
    entity: &Entity,
    location: &str,
    registry: &mut DedupRegistry,
) -> Vec<ContactLead> {
    let tab = match session.open_scratch_tab().await {
        Ok(tab) => tab,
        Err(e) => {
            warn!(company = entity.name.as_str(), error = %e, "Could not open scratch tab");
            return Vec::new();
        }
    };

    let result = contacts_in_tab(session, entity, location, registry).await;
    release_scratch(session, tab).await;

    match result {
        Ok(leads) => leads,
        Err(e) => {
            warn!(company = entity.name.as_str(), error = %e, "Contact discovery failed");
            Vec::new()
        }
    }
}

async fn contacts_in_tab(
    session: &dyn PageSession,
    entity: &Entity,
    location: &str,
    registry: &mut DedupRegistry,
) -> Result<Vec<ContactLead>> {
    let mut leads = Vec::new();

    if let Some(website) = entity.website.as_ref().and_then(|w| w.url()) {
        leads = on_site_contacts(session, entity, website, registry).await?;
    }

    if leads.len() < CONTACTS_PER_ENTITY {
        info!(
            company = entity.name.as_str(),
            found = leads.len(),
            "Not enough contacts on site, falling back to web search"
        );
        let more = fallback_search(session, entity, location, registry).await?;
        leads.extend(more);
        leads.truncate(CONTACTS_PER_ENTITY);
    }

    Ok(leads)
}

async fn on_site_contacts(
    session: &dyn PageSession,
    entity: &Entity,
    website: &str,
    registry: &mut DedupRegistry,
) -> Result<Vec<ContactLead>> {
    session.navigate(website).await?;

    if let Some(team_url) = find_team_page(session).await? {
        info!(company = entity.name.as_str(), url = team_url.as_str(), "Found team page");
        session.navigate(&team_url).await?;
    }

    let page_text = session.body_text().await?;
    let profile_links = collect_profile_links(session).await?;

    let mut leads = Vec::new();
    for candidate in candidates_from_text(&page_text, &profile_links) {
        let lead = ContactLead {
            display_name: candidate.name,
            role_title: candidate.role,
            profile_url: candidate.profile_url,
            entity_name: entity.name.clone(),
            source: ContactSource::CompanySite,
        };
        if !registry.remember(lead.dedup_key()) {
            continue;
        }
        info!(company = entity.name.as_str(), name = lead.display_name.as_str(), "Contact found on site");
        leads.push(lead);
        if leads.len() >= CONTACTS_PER_ENTITY {
            break;
        }
    }
    Ok(leads)
}

/// First link whose target or visible text carries a team-page keyword,
/// in document order.
async fn find_team_page(session: &dyn PageSession) -> Result<Option<String>> {
    for link in session.find_all("a").await? {
        let href = session.attr_of(&link, "href").await.ok().flatten();
        let text = session.text_of(&link).await.unwrap_or_default().to_lowercase();
        let href_lower = href.as_deref().unwrap_or("").to_lowercase();

        if TEAM_PAGE_KEYWORDS
            .iter()
            .any(|k| href_lower.contains(k) || text.contains(k))
        {
            if let Some(href) = href {
                return Ok(Some(href));
            }
        }
    }
    Ok(None)
}

/// All links on the current page pointing at personal profiles, as
/// (visible text, href) pairs.
async fn collect_profile_links(session: &dyn PageSession) -> Result<Vec<(String, String)>> {
    let profile_host = sources::surface().profile_host;
    let mut links = Vec::new();
    for link in session.find_all("a").await? {
        let Some(href) = session.attr_of(&link, "href").await.ok().flatten() else {
            continue;
        };
        if !href.contains(profile_host) {
            continue;
        }
        let text = session.text_of(&link).await.unwrap_or_default();
        links.push((text, href));
    }
    Ok(links)
}

async fn fallback_search(
    session: &dyn PageSession,
    entity: &Entity,
    location: &str,
    registry: &mut DedupRegistry,
) -> Result<Vec<ContactLead>> {
    let profile_host = sources::surface().profile_host;
    let city = location.split(',').next().unwrap_or(location).trim();
    let query = format!(
        "{} {} team members site:{}",
        entity.name,
        city,
        profile_host.trim_end_matches('/')
    );
    session.navigate(&sources::web_search_url(&query)).await?;

    let mut leads = Vec::new();
    for link in session.find_all("a").await?.into_iter().take(FALLBACK_LINK_LIMIT) {
        let Some(href) = session.attr_of(&link, "href").await.ok().flatten() else {
            continue;
        };
        if !href.contains(profile_host) {
            continue;
        }
        let text = session.text_of(&link).await.unwrap_or_default();
        let name = clean_result_name(&text);
        if name.split_whitespace().count() < 2 {
            continue;
        }

        let lead = ContactLead {
            display_name: name,
            role_title: infer_role(&text.to_lowercase()),
            profile_url: Some(urlnorm::normalize(&href)),
            entity_name: entity.name.clone(),
            source: ContactSource::WebSearch,
        };
        if !registry.remember(lead.dedup_key()) {
            continue;
        }
        info!(company = entity.name.as_str(), name = lead.display_name.as_str(), "Contact found via web search");
        leads.push(lead);
        if leads.len() >= CONTACTS_PER_ENTITY {
            break;
        }
    }
    Ok(leads)
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

pub struct ContactCandidate {
    pub name: String,
    pub profile_url: Option<String>,
    pub role: RoleTitle,
}

/// Apply the name heuristic to page text. A name is accepted when its
/// surrounding context mentions a professional title, or when it
/// co-occurs with a profile link's visible text.
pub fn candidates_from_text(
    page_text: &str,
    profile_links: &[(String, String)],
) -> Vec<ContactCandidate> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for m in NAME_PATTERN.find_iter(page_text) {
        let name = m.as_str();
        if name.len() < 5 || !seen.insert(name.to_string()) {
            continue;
        }

        let window = window_around(page_text, m.start(), m.end());
        let window_lower = window.to_lowercase();
        let has_title = TITLE_KEYWORDS
            .iter()
            .any(|t| window_lower.contains(&t.to_lowercase()));
        let profile_url = profile_links
            .iter()
            .find(|(text, _)| text.contains(name))
            .map(|(_, href)| href.clone());

        if has_title || profile_url.is_some() {
            out.push(ContactCandidate {
                name: name.to_string(),
                profile_url,
                role: infer_role(&window_lower),
            });
        }
    }
    out
}

/// ±CONTEXT_PAD characters around a match, clamped to char boundaries.
fn window_around(text: &str, start: usize, end: usize) -> &str {
    let mut s = start.saturating_sub(CONTEXT_PAD);
    while s > 0 && !text.is_char_boundary(s) {
        s -= 1;
    }
    let mut e = (end + CONTEXT_PAD).min(text.len());
    while e < text.len() && !text.is_char_boundary(e) {
        e += 1;
    }
    &text[s..e]
}

/// Map surrounding context onto the fixed role list. Unknown contexts
/// land on Talent Acquisition, the most generic outreach target.
pub fn infer_role(context: &str) -> RoleTitle {
    if context.contains("talent acquisition") {
        RoleTitle::TalentAcquisition
    } else if context.contains("engineering manager") {
        RoleTitle::EngineeringManager
    } else if context.contains("ai lead") {
        RoleTitle::AiLead
    } else if context.contains("graduate program") {
        RoleTitle::GraduateProgramManager
    } else if context.contains("recruit") {
        RoleTitle::RecruitmentManager
    } else if context.contains("hr manager") || context.contains("human resources") {
        RoleTitle::HrManager
    } else {
        RoleTitle::TalentAcquisition
    }
}

/// Search-result link text tends to be "Name - Role - Company"; keep the
/// name part.
fn clean_result_name(text: &str) -> String {
    text.split(" - ")
        .next()
        .unwrap_or(text)
        .split(" | ")
        .next()
        .unwrap_or(text)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_near_title_keyword_is_accepted() {
        let text = "Our leadership\nJane Doe\nChief Executive Officer and CEO of the company";
        let candidates = candidates_from_text(text, &[]);
        assert!(candidates.iter().any(|c| c.name == "Jane Doe"));
    }

    #[test]
    fn name_without_title_or_profile_link_is_rejected() {
        let text = "Random Words appear here with no job context at all";
        // "Random Words" matches the pattern but has no title nearby.
        let candidates = candidates_from_text(text, &[]);
        assert!(candidates.is_empty());
    }

    #[test]
    fn profile_link_cooccurrence_accepts_without_title() {
        let text = "meet John Smith who enjoys gardening";
        let links = vec![(
            "John Smith".to_string(),
            "https://www.linkedin.com/in/johnsmith".to_string(),
        )];
        let candidates = candidates_from_text(text, &links);
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].profile_url.as_deref(),
            Some("https://www.linkedin.com/in/johnsmith")
        );
    }

    #[test]
    fn duplicate_names_collapse_to_first_occurrence() {
        let text = "Jane Doe, Director. Later again: Jane Doe, Director.";
        let candidates = candidates_from_text(text, &[]);
        assert_eq!(candidates.iter().filter(|c| c.name == "Jane Doe").count(), 1);
    }

    #[test]
    fn role_inference_prefers_specific_phrases() {
        assert_eq!(infer_role("senior talent acquisition partner"), RoleTitle::TalentAcquisition);
        assert_eq!(infer_role("engineering manager, platform"), RoleTitle::EngineeringManager);
        assert_eq!(infer_role("graduate program coordinator"), RoleTitle::GraduateProgramManager);
        assert_eq!(infer_role("recruiting at acme"), RoleTitle::RecruitmentManager);
        assert_eq!(infer_role("no signal here"), RoleTitle::TalentAcquisition);
    }

    #[test]
    fn result_names_are_cleaned_of_role_suffixes() {
        assert_eq!(clean_result_name("Jane Doe - Talent Acquisition - Acme"), "Jane Doe");
        assert_eq!(clean_result_name("John Smith | LinkedIn"), "John Smith");
        assert_eq!(clean_result_name("Plain Name"), "Plain Name");
    }

    #[test]
    fn context_window_respects_char_boundaries() {
        let text = format!("{}Jane Doe — Directrice générale", "é".repeat(120));
        let m = NAME_PATTERN.find(&text).unwrap();
        // Must not panic on multi-byte boundaries.
        let window = window_around(&text, m.start(), m.end());
        assert!(window.contains("Jane Doe"));
    }
}
