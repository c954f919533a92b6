//! The outreach orchestrator: drives the campaign state machine per
//! (company, role) pair against the external surface.
//!
//! Every scan runs pending → searching → candidate_found →
//! action_attempted → recorded; whatever happens inside the action, the
//! terminal state is a recorded attempt. Action errors are swallowed at
//! this boundary so one refused send never ends a campaign.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use internscout_common::{
    AttemptOutcome, ContactLead, ContactSource, OutreachAttempt, OutreachError, Policy, RoleTitle,
};

use crate::dedup::DedupRegistry;
use crate::outreach::log::OutreachLog;
use crate::outreach::message;
use crate::pacing::PacingPolicy;
use crate::sources;
use crate::traits::{Element, PageSession};

/// Result entries inspected per role scan.
const RESULT_CAP: usize = 3;

// ---------------------------------------------------------------------------
// Support types
// ---------------------------------------------------------------------------

/// Cooperative cancellation, set by the ctrl-c handler and checked
/// between units of work. There is no preemption; a stage in flight
/// finishes (and records its attempt) before the campaign stops.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Campaign state machine phases, per (company, role) scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanPhase {
    Searching,
    CandidateFound,
    ActionAttempted,
    Recorded,
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanPhase::Searching => write!(f, "searching"),
            ScanPhase::CandidateFound => write!(f, "candidate_found"),
            ScanPhase::ActionAttempted => write!(f, "action_attempted"),
            ScanPhase::Recorded => write!(f, "recorded"),
        }
    }
}

/// One person found in a role scan.
pub struct Candidate {
    pub element: Element,
    pub display_name: String,
    pub can_connect: bool,
}

/// Seam for the two operator acknowledgments the campaign blocks on
/// (login, per-send confirmation) plus the discard guard. The console
/// binds this to real prompts; tests script it.
pub trait OperatorPrompt: Send + Sync {
    fn wait_for_login(&self) -> Result<()>;
    fn confirm_send(&self, contact_name: &str, entity_name: &str) -> Result<bool>;
    fn confirm_discard(&self) -> Result<bool>;
}

/// Stats from a campaign session.
#[derive(Debug, Default)]
pub struct CampaignStats {
    pub roles_scanned: u32,
    pub candidates_seen: u32,
    pub sent: u32,
    pub sent_without_note: u32,
    pub messages_sent: u32,
    pub skipped_already_connected: u32,
    pub no_message_access: u32,
    pub failed: u32,
}

impl CampaignStats {
    fn count(&mut self, outcome: AttemptOutcome) {
        match outcome {
            AttemptOutcome::Sent => self.sent += 1,
            AttemptOutcome::SentWithoutNote => self.sent_without_note += 1,
            AttemptOutcome::MessageSent => self.messages_sent += 1,
            AttemptOutcome::SkippedAlreadyConnected => self.skipped_already_connected += 1,
            AttemptOutcome::NoMessageAccess => self.no_message_access += 1,
            AttemptOutcome::Failed => self.failed += 1,
        }
    }
}

impl std::fmt::Display for CampaignStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Campaign Summary ===")?;
        writeln!(f, "Role scans:         {}", self.roles_scanned)?;
        writeln!(f, "Candidates seen:    {}", self.candidates_seen)?;
        writeln!(f, "Sent with note:     {}", self.sent)?;
        writeln!(f, "Sent without note:  {}", self.sent_without_note)?;
        writeln!(f, "Direct messages:    {}", self.messages_sent)?;
        writeln!(f, "Skipped (connected):{}", self.skipped_already_connected)?;
        writeln!(f, "No message access:  {}", self.no_message_access)?;
        write!(f, "Failed:             {}", self.failed)
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct Orchestrator<'a> {
    session: &'a dyn PageSession,
    prompt: &'a dyn OperatorPrompt,
    policy: Policy,
    location: String,
    pacing: PacingPolicy,
    rng: StdRng,
    log: OutreachLog,
    registry: DedupRegistry,
    stats: CampaignStats,
    cancel: CancelFlag,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        session: &'a dyn PageSession,
        prompt: &'a dyn OperatorPrompt,
        policy: Policy,
        location: String,
        store_path: PathBuf,
        seed: Option<u64>,
        cancel: CancelFlag,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let pacing = PacingPolicy::new(policy.delays.clone(), seed);
        Self {
            session,
            prompt,
            policy,
            location,
            pacing,
            rng,
            log: OutreachLog::new(store_path),
            registry: DedupRegistry::new(),
            stats: CampaignStats::default(),
            cancel,
        }
    }

    /// Replace the active policy without restarting the session
    /// (apply-configuration).
    pub fn apply_policy(&mut self, policy: Policy) {
        self.pacing.set_ranges(policy.delays.clone());
        info!(
            roles = policy.roles.len(),
            synonym_groups = policy.synonym_variants.len(),
            "Policy applied"
        );
        self.policy = policy;
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn history(&self) -> &[OutreachAttempt] {
        self.log.attempts()
    }

    pub fn stats(&self) -> &CampaignStats {
        &self.stats
    }

    pub fn flush(&mut self) -> Result<usize> {
        self.log.flush_to_storage()
    }

    pub fn discard_pending(&mut self) {
        self.log.discard_pending();
    }

    /// Route the discard confirmation through the operator seam.
    pub fn prompt_discard(&self) -> Result<bool> {
        self.prompt.confirm_discard()
    }

    /// Run the campaign over every company, in order. Stops early on
    /// interrupt; partial progress stays in the log.
    pub async fn run_all(&mut self, companies: &[String]) -> Result<()> {
        info!(companies = companies.len(), "Starting outreach campaign");
        for (i, company) in companies.iter().enumerate() {
            if self.cancel.is_set() {
                info!("Campaign interrupted, stopping before next company");
                return Err(OutreachError::Interrupted.into());
            }
            self.process_company(company).await?;
            if i + 1 < companies.len() {
                self.pacing.between_entities().await;
            }
        }
        info!("{}", self.stats);
        Ok(())
    }

    /// Scan every configured role for one company.
    pub async fn process_company(&mut self, company: &str) -> Result<()> {
        info!(company, "Processing company");
        let roles = self.policy.roles.clone();
        for (i, role) in roles.iter().enumerate() {
            if self.cancel.is_set() {
                return Err(OutreachError::Interrupted.into());
            }
            self.run_role_scan(company, *role).await?;
            if i + 1 < roles.len() {
                self.pacing.between_roles().await;
            }
        }
        Ok(())
    }

    /// One (company, role) scan through the state machine.
    async fn run_role_scan(&mut self, company: &str, role: RoleTitle) -> Result<()> {
        self.stats.roles_scanned += 1;
        debug!(phase = %ScanPhase::Searching, company, role = %role, "Role scan started");

        let query = format!("{} at {} in {}", role, company, self.location);
        let cards = match self.search_surface(&query).await {
            Ok(cards) => cards,
            Err(e) => {
                warn!(company, role = %role, error = %e, "People search failed, skipping role");
                return Ok(());
            }
        };
        if cards.is_empty() {
            info!(query = query.as_str(), "No people results");
            return Ok(());
        }

        let mut candidates = Vec::new();
        for card in cards.into_iter().take(RESULT_CAP) {
            match self.read_candidate(&card).await {
                Ok(Some(candidate)) => {
                    debug!(
                        phase = %ScanPhase::CandidateFound,
                        name = candidate.display_name.as_str(),
                        can_connect = candidate.can_connect,
                        "Candidate found"
                    );
                    candidates.push(candidate);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Could not read result card, skipping"),
            }
        }

        for (i, candidate) in candidates.iter().enumerate() {
            if self.cancel.is_set() {
                return Err(OutreachError::Interrupted.into());
            }
            self.act_on_candidate(company, role, candidate).await;
            if i + 1 < candidates.len() {
                self.pacing.within_scan().await;
            }
        }
        Ok(())
    }

    /// Ad-hoc bypass: the operator names a person and company directly,
    /// skipping discovery. Uses the direct-message variant of the
    /// action.
    pub async fn contact_person(
        &mut self,
        person_name: &str,
        entity_name: &str,
        role: RoleTitle,
    ) -> Result<()> {
        let lead = ContactLead {
            display_name: person_name.to_string(),
            role_title: role,
            profile_url: None,
            entity_name: entity_name.to_string(),
            source: ContactSource::WebSearch,
        };
        let key = lead.dedup_key();
        if self.registry.seen(&key) {
            info!(name = person_name, "Contact already actioned this run");
            return Ok(());
        }

        debug!(phase = %ScanPhase::Searching, name = person_name, "Ad hoc person search");
        let query = format!("{person_name} {entity_name}");
        let cards = match self.search_surface(&query).await {
            Ok(cards) => cards,
            Err(e) => {
                warn!(name = person_name, error = %e, "Person search failed");
                return Ok(());
            }
        };
        let Some(card) = cards.into_iter().next() else {
            info!(name = person_name, "Person not found");
            return Ok(());
        };
        debug!(phase = %ScanPhase::CandidateFound, name = person_name, "Person located");

        match self.prompt.confirm_send(person_name, entity_name) {
            Ok(true) => {}
            Ok(false) => {
                info!(name = person_name, "Send declined by operator");
                return Ok(());
            }
            Err(e) => {
                warn!(error = %e, "Send confirmation failed, skipping");
                return Ok(());
            }
        }

        self.registry.remember(key);
        debug!(phase = %ScanPhase::ActionAttempted, name = person_name, "Sending direct message");
        let outcome = match self.try_message_flow(&card, person_name, entity_name).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(name = person_name, error = %e, "Direct message failed");
                AttemptOutcome::Failed
            }
        };
        self.record(entity_name, role, person_name, outcome);
        if outcome == AttemptOutcome::MessageSent {
            self.pacing.after_send().await;
        }
        Ok(())
    }

    // --- Internals ---

    /// Navigate to the people search, run a query, return result cards.
    async fn search_surface(&mut self, query: &str) -> Result<Vec<Element>> {
        let surface = sources::surface();
        self.session.navigate(surface.people_search_url).await?;
        self.pacing.within_scan().await;

        let search_box = self
            .session
            .find_first(surface.search_box)
            .await?
            .context("search box not found")?;
        info!(query, "Searching people");
        self.session.type_into(&search_box, query).await?;
        self.session.submit(&search_box).await?;
        self.pacing.after_search().await;

        Ok(self.session.find_all(surface.result_card).await?)
    }

    async fn read_candidate(&self, card: &Element) -> Result<Option<Candidate>> {
        let surface = sources::surface();
        let Some(name_el) = self
            .session
            .find_first_within(card, surface.result_name)
            .await?
        else {
            return Ok(None);
        };
        let display_name = self.session.text_of(&name_el).await?.trim().to_string();
        if display_name.is_empty() {
            return Ok(None);
        }
        let can_connect = !self
            .session
            .find_within(card, surface.connect_button)
            .await?
            .is_empty();
        Ok(Some(Candidate {
            element: card.clone(),
            display_name,
            can_connect,
        }))
    }

    /// Act on one candidate. Never returns an error: every path ends in
    /// either a recorded attempt or an explicit decision not to act.
    async fn act_on_candidate(&mut self, company: &str, role: RoleTitle, candidate: &Candidate) {
        self.stats.candidates_seen += 1;

        let lead = ContactLead {
            display_name: candidate.display_name.clone(),
            role_title: role,
            profile_url: None,
            entity_name: company.to_string(),
            source: ContactSource::WebSearch,
        };
        let key = lead.dedup_key();
        if self.registry.seen(&key) {
            debug!(name = candidate.display_name.as_str(), "Contact already actioned this run");
            return;
        }

        if !candidate.can_connect {
            info!(
                name = candidate.display_name.as_str(),
                "Cannot connect, already connected or pending"
            );
            self.registry.remember(key);
            self.record(
                company,
                role,
                &candidate.display_name,
                AttemptOutcome::SkippedAlreadyConnected,
            );
            return;
        }

        match self.prompt.confirm_send(&candidate.display_name, company) {
            Ok(true) => {}
            Ok(false) => {
                info!(name = candidate.display_name.as_str(), "Send declined by operator");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Send confirmation failed, skipping");
                return;
            }
        }

        self.registry.remember(key);
        debug!(
            phase = %ScanPhase::ActionAttempted,
            name = candidate.display_name.as_str(),
            "Sending connection request"
        );
        let outcome = match self.try_connect_flow(company, candidate).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    name = candidate.display_name.as_str(),
                    error = %e,
                    "Connection request failed"
                );
                AttemptOutcome::Failed
            }
        };
        self.record(company, role, &candidate.display_name, outcome);

        if matches!(outcome, AttemptOutcome::Sent | AttemptOutcome::SentWithoutNote) {
            self.pacing.after_send().await;
        }
    }

    /// Connect flow: click connect, prefer the note path, fall back to a
    /// plain send when the note UI is unavailable or fails.
    async fn try_connect_flow(
        &mut self,
        company: &str,
        candidate: &Candidate,
    ) -> Result<AttemptOutcome> {
        let surface = sources::surface();
        let connect = self
            .session
            .find_first_within(&candidate.element, surface.connect_button)
            .await?
            .context("connect affordance disappeared")?;
        self.session.click(&connect).await?;
        self.pacing.within_scan().await;

        if let Some(add_note) = self.session.find_first(surface.add_note_button).await? {
            match self
                .send_with_note(&add_note, &candidate.display_name, company)
                .await
            {
                Ok(()) => return Ok(AttemptOutcome::Sent),
                Err(e) => warn!(error = %e, "Note flow failed, sending without note"),
            }
        }

        let send = self
            .session
            .find_first(surface.send_fallback_button)
            .await?
            .context("no send control available")?;
        self.session.click(&send).await?;
        info!(name = candidate.display_name.as_str(), "Connection request sent without note");
        Ok(AttemptOutcome::SentWithoutNote)
    }

    async fn send_with_note(
        &mut self,
        add_note: &Element,
        display_name: &str,
        company: &str,
    ) -> Result<()> {
        let surface = sources::surface();
        self.session.click(add_note).await?;
        self.pacing.within_scan().await;

        let note = self.compose_varied_note(display_name, company);
        let field = self
            .session
            .find_first(surface.note_field)
            .await?
            .context("note field missing")?;
        self.session.type_into(&field, &note).await?;
        self.pacing.within_scan().await;

        let send = self
            .session
            .find_first(surface.send_button)
            .await?
            .context("send button missing")?;
        self.session.click(&send).await?;
        info!(name = display_name, "Connection request sent with note");
        Ok(())
    }

    /// Direct-message variant used by the ad-hoc person flow.
    async fn try_message_flow(
        &mut self,
        card: &Element,
        person_name: &str,
        entity_name: &str,
    ) -> Result<AttemptOutcome> {
        let surface = sources::surface();
        let Some(message_btn) = self
            .session
            .find_first_within(card, surface.message_button)
            .await?
        else {
            info!(name = person_name, "No message access for contact");
            return Ok(AttemptOutcome::NoMessageAccess);
        };
        self.session.click(&message_btn).await?;
        self.pacing.within_scan().await;

        let field = self
            .session
            .find_first(surface.message_field)
            .await?
            .context("message field missing")?;
        let note = self.compose_varied_note(person_name, entity_name);
        self.session.type_into(&field, &note).await?;

        let send = self
            .session
            .find_first(surface.send_button)
            .await?
            .context("send control missing")?;
        self.session.click(&send).await?;
        info!(name = person_name, "Direct message sent");
        Ok(AttemptOutcome::MessageSent)
    }

    fn compose_varied_note(&mut self, display_name: &str, company: &str) -> String {
        let first_name = display_name.split_whitespace().next().unwrap_or(display_name);
        let note = message::compose_note(&self.policy.message_template, first_name, company);
        message::vary_wording(&note, &self.policy.synonym_variants, &mut self.rng)
    }

    /// The one terminal transition: every action lands here exactly once.
    fn record(&mut self, company: &str, role: RoleTitle, contact_name: &str, outcome: AttemptOutcome) {
        debug!(phase = %ScanPhase::Recorded, name = contact_name, outcome = %outcome, "Attempt recorded");
        self.stats.count(outcome);
        self.log.append(OutreachAttempt {
            timestamp: Utc::now(),
            contact_name: contact_name.to_string(),
            entity_name: company.to_string(),
            role_title: role,
            outcome,
        });
    }
}
