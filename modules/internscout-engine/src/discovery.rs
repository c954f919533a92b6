//! Lead discovery: iterate job boards in order and collect relevant,
//! distinct companies up to the configured target.
//!
//! Failure containment is per layer: a bad card skips the card, a dead
//! board skips the board. Partial results always survive.

use anyhow::Result;
use tracing::{debug, info, warn};

use internscout_common::{entity_key, Entity, Policy};

use crate::dedup::DedupRegistry;
use crate::outreach::orchestrator::CancelFlag;
use crate::pacing::PacingPolicy;
use crate::relevance::RelevancePolicy;
use crate::sources::{self, BoardProfile};
use crate::traits::{Element, PageSession};

/// Stats from a discovery run.
#[derive(Debug, Default)]
pub struct DiscoveryStats {
    pub cards_seen: u32,
    pub accepted: u32,
    pub rejected_irrelevant: u32,
    pub duplicates_skipped: u32,
    pub card_failures: u32,
    pub boards_failed: u32,
}

impl std::fmt::Display for DiscoveryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Discovery: cards={}, accepted={}, irrelevant={}, duplicates={}, card_failures={}, boards_failed={}",
            self.cards_seen,
            self.accepted,
            self.rejected_irrelevant,
            self.duplicates_skipped,
            self.card_failures,
            self.boards_failed
        )
    }
}

/// Outcome of inspecting one result card. Every card lands in exactly
/// one branch, so failure handling stays an explicit, auditable match.
enum CardOutcome {
    Accepted(Entity),
    Skipped(SkipReason),
    Failed(anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    NotRelevant,
    Duplicate,
    MissingCompany,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotRelevant => write!(f, "not a relevant internship"),
            SkipReason::Duplicate => write!(f, "company already seen"),
            SkipReason::MissingCompany => write!(f, "no company name on card"),
        }
    }
}

pub struct DiscoveryPipeline<'a> {
    session: &'a dyn PageSession,
    relevance: RelevancePolicy,
    target: usize,
}

impl<'a> DiscoveryPipeline<'a> {
    pub fn new(session: &'a dyn PageSession, policy: &Policy) -> Self {
        Self {
            session,
            relevance: RelevancePolicy::from_policy(policy),
            target: policy.entity_target,
        }
    }

    /// Iterate all boards, in order, until the target is reached or the
    /// sources are exhausted. Output preserves discovery order.
    pub async fn run(
        &self,
        registry: &mut DedupRegistry,
        pacing: &mut PacingPolicy,
        cancel: &CancelFlag,
    ) -> (Vec<Entity>, DiscoveryStats) {
        let mut entities = Vec::new();
        let mut stats = DiscoveryStats::default();

        for profile in sources::job_boards() {
            if entities.len() >= self.target || cancel.is_set() {
                break;
            }
            info!(board = %profile.board, url = profile.search_url, "Searching job board");
            if let Err(e) = self
                .scan_board(&profile, registry, pacing, cancel, &mut entities, &mut stats)
                .await
            {
                warn!(board = %profile.board, error = %e, "Job board unavailable, skipping");
                stats.boards_failed += 1;
            }
        }

        info!("{stats}");
        (entities, stats)
    }

    /// Scan one board's bounded card prefix. Errors returned here are
    /// whole-source failures; card-level faults are absorbed below.
    async fn scan_board(
        &self,
        profile: &BoardProfile,
        registry: &mut DedupRegistry,
        pacing: &mut PacingPolicy,
        cancel: &CancelFlag,
        entities: &mut Vec<Entity>,
        stats: &mut DiscoveryStats,
    ) -> Result<()> {
        self.session.navigate(profile.search_url).await?;
        pacing.within_scan().await;

        let cards = self.session.find_all(profile.card_selector).await?;
        for card in cards.iter().take(profile.card_limit) {
            if entities.len() >= self.target {
                info!(target = self.target, "Entity target reached");
                return Ok(());
            }
            if cancel.is_set() {
                info!("Discovery interrupted, keeping partial results");
                return Ok(());
            }
            stats.cards_seen += 1;

            match self.inspect_card(profile, card, registry).await {
                CardOutcome::Accepted(entity) => {
                    info!(company = entity.name.as_str(), board = %profile.board, "Relevant company found");
                    entities.push(entity);
                    stats.accepted += 1;
                }
                CardOutcome::Skipped(SkipReason::Duplicate) => {
                    debug!(board = %profile.board, "Duplicate company skipped");
                    stats.duplicates_skipped += 1;
                }
                CardOutcome::Skipped(reason) => {
                    info!(board = %profile.board, reason = %reason, "Card rejected");
                    stats.rejected_irrelevant += 1;
                }
                CardOutcome::Failed(e) => {
                    warn!(board = %profile.board, error = %e, "Card extraction failed, skipping");
                    stats.card_failures += 1;
                }
            }
            pacing.within_scan().await;
        }
        Ok(())
    }

    /// Read one card: company name, detail expansion, description,
    /// relevance, dedup.
    async fn inspect_card(
        &self,
        profile: &BoardProfile,
        card: &Element,
        registry: &mut DedupRegistry,
    ) -> CardOutcome {
        let company_el = match self
            .session
            .find_first_within(card, profile.company_selector)
            .await
        {
            Ok(Some(el)) => el,
            Ok(None) => return CardOutcome::Skipped(SkipReason::MissingCompany),
            Err(e) => return CardOutcome::Failed(e),
        };
        let name = match self.session.text_of(&company_el).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => return CardOutcome::Failed(e),
        };
        if name.is_empty() {
            return CardOutcome::Skipped(SkipReason::MissingCompany);
        }

        // Detail expansion: the description panel only renders after the
        // card is opened.
        if let Err(e) = self.session.click(card).await {
            return CardOutcome::Failed(e);
        }
        let description = match self.read_description(profile).await {
            Ok(text) => text,
            Err(e) => return CardOutcome::Failed(e),
        };

        if !self.relevance.is_relevant(&description) {
            return CardOutcome::Skipped(SkipReason::NotRelevant);
        }
        if !registry.remember(entity_key(&name)) {
            return CardOutcome::Skipped(SkipReason::Duplicate);
        }
        CardOutcome::Accepted(Entity::new(name, profile.board, &description))
    }

    async fn read_description(&self, profile: &BoardProfile) -> Result<String> {
        let panel = self
            .session
            .find_first(profile.description_selector)
            .await?
            .ok_or_else(|| anyhow::anyhow!("description panel did not render"))?;
        self.session.text_of(&panel).await
    }
}
