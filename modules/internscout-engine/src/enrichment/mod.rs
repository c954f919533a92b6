//! Entity enrichment: website resolution followed by contact discovery.
//!
//! Both sub-stages do their navigation in a scratch tab and restore the
//! primary context on every exit path. Nothing in here is fatal to the
//! run; unresolvable entities keep sentinel values.

pub mod contacts;
pub mod website;

use tracing::info;

use internscout_common::{ContactLead, Entity, WebsiteStatus};

use crate::dedup::DedupRegistry;
use crate::pacing::PacingPolicy;
use crate::traits::PageSession;

/// Stats from an enrichment pass.
#[derive(Debug, Default)]
pub struct EnrichmentStats {
    pub websites_verified: u32,
    pub websites_not_found: u32,
    pub websites_errored: u32,
    pub contacts_on_site: u32,
    pub contacts_from_search: u32,
}

impl std::fmt::Display for EnrichmentStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Enrichment Complete ===")?;
        writeln!(f, "Websites verified:    {}", self.websites_verified)?;
        writeln!(f, "Websites not found:   {}", self.websites_not_found)?;
        writeln!(f, "Website errors:       {}", self.websites_errored)?;
        writeln!(f, "Contacts (on site):   {}", self.contacts_on_site)?;
        write!(f, "Contacts (search):    {}", self.contacts_from_search)
    }
}

pub struct EnrichmentStage<'a> {
    session: &'a dyn PageSession,
    location: &'a str,
}

impl<'a> EnrichmentStage<'a> {
    pub fn new(session: &'a dyn PageSession, location: &'a str) -> Self {
        Self { session, location }
    }

    /// Resolve the entity's website in place, then collect up to two
    /// contact leads for it.
    pub async fn enrich(
        &self,
        entity: &mut Entity,
        registry: &mut DedupRegistry,
        pacing: &mut PacingPolicy,
        stats: &mut EnrichmentStats,
    ) -> Vec<ContactLead> {
        self.resolve_website(entity, stats).await;
        pacing.within_scan().await;

        let leads = contacts::discover_contacts(self.session, entity, self.location, registry).await;
        for lead in &leads {
            match lead.source {
                internscout_common::ContactSource::CompanySite => stats.contacts_on_site += 1,
                internscout_common::ContactSource::WebSearch => stats.contacts_from_search += 1,
            }
        }
        leads
    }

    /// Website resolution only, applied to the entity in place. Used by
    /// the enrich command, which skips contact discovery.
    pub async fn resolve_website(&self, entity: &mut Entity, stats: &mut EnrichmentStats) {
        let resolution = website::resolve_website(self.session, &entity.name, self.location).await;
        match &resolution.status {
            WebsiteStatus::Verified(url) => {
                info!(company = entity.name.as_str(), url = url.as_str(), "Website verified");
                stats.websites_verified += 1;
            }
            WebsiteStatus::NotFound => {
                info!(company = entity.name.as_str(), "No valid website found");
                stats.websites_not_found += 1;
            }
            WebsiteStatus::Error => stats.websites_errored += 1,
        }
        entity.website = Some(resolution.status);
        entity.has_internship_signal = resolution.has_internship_signal;
        entity.mentions_target_location = resolution.mentions_target_location;
    }
}
