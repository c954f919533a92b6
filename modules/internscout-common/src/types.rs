use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Descriptions are truncated at construction; reports never need more.
pub const DESCRIPTION_MAX_CHARS: usize = 200;

/// At most this many contact leads are retained per entity, across all
/// discovery sources combined.
pub const CONTACTS_PER_ENTITY: usize = 2;

// --- Enums ---

/// Which discovery source produced an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceBoard {
    Seek,
    Indeed,
    Jora,
    /// Loaded from an operator-supplied roster file, not discovered.
    Roster,
}

impl std::fmt::Display for SourceBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceBoard::Seek => write!(f, "Seek"),
            SourceBoard::Indeed => write!(f, "Indeed"),
            SourceBoard::Jora => write!(f, "Jora"),
            SourceBoard::Roster => write!(f, "Roster"),
        }
    }
}

/// Where a contact lead came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactSource {
    CompanySite,
    WebSearch,
}

impl std::fmt::Display for ContactSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContactSource::CompanySite => write!(f, "company_site"),
            ContactSource::WebSearch => write!(f, "web_search"),
        }
    }
}

/// Fixed candidate list of roles worth contacting. The policy file picks
/// the subset a campaign actually scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleTitle {
    AiLead,
    EngineeringManager,
    TalentAcquisition,
    HrManager,
    RecruitmentManager,
    GraduateProgramManager,
}

impl RoleTitle {
    /// Every candidate role, in menu order.
    pub const ALL: [RoleTitle; 6] = [
        RoleTitle::AiLead,
        RoleTitle::EngineeringManager,
        RoleTitle::TalentAcquisition,
        RoleTitle::HrManager,
        RoleTitle::RecruitmentManager,
        RoleTitle::GraduateProgramManager,
    ];

    /// The phrasing used in people-search queries and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleTitle::AiLead => "AI Lead",
            RoleTitle::EngineeringManager => "Engineering Manager",
            RoleTitle::TalentAcquisition => "Talent Acquisition",
            RoleTitle::HrManager => "HR Manager",
            RoleTitle::RecruitmentManager => "Recruitment Manager",
            RoleTitle::GraduateProgramManager => "Graduate Program Manager",
        }
    }
}

impl std::fmt::Display for RoleTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of website resolution for an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebsiteStatus {
    Verified(String),
    NotFound,
    Error,
}

impl WebsiteStatus {
    pub fn url(&self) -> Option<&str> {
        match self {
            WebsiteStatus::Verified(url) => Some(url),
            _ => None,
        }
    }
}

impl std::fmt::Display for WebsiteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebsiteStatus::Verified(url) => write!(f, "{url}"),
            WebsiteStatus::NotFound => write!(f, "Not found"),
            WebsiteStatus::Error => write!(f, "Error"),
        }
    }
}

/// Terminal outcome of one outreach action. Every action ends in exactly
/// one of these, recorded in the outreach log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Sent,
    SentWithoutNote,
    MessageSent,
    SkippedAlreadyConnected,
    NoMessageAccess,
    Failed,
}

impl std::fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AttemptOutcome::Sent => "sent",
            AttemptOutcome::SentWithoutNote => "sent_without_note",
            AttemptOutcome::MessageSent => "message_sent",
            AttemptOutcome::SkippedAlreadyConnected => "skipped_already_connected",
            AttemptOutcome::NoMessageAccess => "no_message_access",
            AttemptOutcome::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

// --- Core records ---

/// A company discovered as a candidate employer. Created by discovery,
/// enriched in place, never deleted within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub source_board: SourceBoard,
    pub raw_description: String,
    pub website: Option<WebsiteStatus>,
    pub has_internship_signal: bool,
    pub mentions_target_location: bool,
}

impl Entity {
    pub fn new(name: impl Into<String>, source_board: SourceBoard, description: &str) -> Self {
        Self {
            name: name.into(),
            source_board,
            raw_description: description.chars().take(DESCRIPTION_MAX_CHARS).collect(),
            website: None,
            has_internship_signal: false,
            mentions_target_location: false,
        }
    }

    /// Dedup key: case-sensitive exact name match.
    pub fn dedup_key(&self) -> String {
        entity_key(&self.name)
    }
}

pub fn entity_key(name: &str) -> String {
    format!("entity:{name}")
}

/// A person associated with an entity, considered for outreach.
/// Immutable after creation; outcomes are recorded separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactLead {
    pub display_name: String,
    pub role_title: RoleTitle,
    pub profile_url: Option<String>,
    pub entity_name: String,
    pub source: ContactSource,
}

impl ContactLead {
    /// Uniqueness key: profile URL when present, else name scoped to the
    /// owning entity.
    pub fn dedup_key(&self) -> String {
        match &self.profile_url {
            Some(url) => format!("contact:{url}"),
            None => format!("contact:{} @ {}", self.display_name, self.entity_name),
        }
    }

    pub fn first_name(&self) -> &str {
        self.display_name
            .split_whitespace()
            .next()
            .unwrap_or(&self.display_name)
    }

    pub fn profile_url_display(&self) -> &str {
        self.profile_url.as_deref().unwrap_or("Not found")
    }
}

/// One logged outreach action (or decision not to act). Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutreachAttempt {
    pub timestamp: DateTime<Utc>,
    pub contact_name: String,
    pub entity_name: String,
    pub role_title: RoleTitle,
    pub outcome: AttemptOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_is_truncated_at_construction() {
        let long = "x".repeat(500);
        let entity = Entity::new("Acme", SourceBoard::Seek, &long);
        assert_eq!(entity.raw_description.chars().count(), DESCRIPTION_MAX_CHARS);
    }

    #[test]
    fn entity_dedup_key_is_case_sensitive() {
        let a = Entity::new("Acme", SourceBoard::Seek, "");
        let b = Entity::new("ACME", SourceBoard::Seek, "");
        assert_ne!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn contact_dedup_key_prefers_profile_url() {
        let with_url = ContactLead {
            display_name: "Jane Doe".into(),
            role_title: RoleTitle::TalentAcquisition,
            profile_url: Some("https://example.com/in/janedoe".into()),
            entity_name: "Acme".into(),
            source: ContactSource::CompanySite,
        };
        let without_url = ContactLead {
            profile_url: None,
            ..with_url.clone()
        };
        assert_eq!(with_url.dedup_key(), "contact:https://example.com/in/janedoe");
        assert_eq!(without_url.dedup_key(), "contact:Jane Doe @ Acme");
    }

    #[test]
    fn first_name_falls_back_to_full_name() {
        let lead = ContactLead {
            display_name: "Madonna".into(),
            role_title: RoleTitle::HrManager,
            profile_url: None,
            entity_name: "Acme".into(),
            source: ContactSource::WebSearch,
        };
        assert_eq!(lead.first_name(), "Madonna");
    }

    #[test]
    fn outcome_renders_log_store_values() {
        assert_eq!(AttemptOutcome::Sent.to_string(), "sent");
        assert_eq!(
            AttemptOutcome::SkippedAlreadyConnected.to_string(),
            "skipped_already_connected"
        );
    }
}
