use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::RoleTitle;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the WebDriver remote end (e.g. a local chromedriver).
    pub webdriver_url: String,

    /// Location phrase appended to search queries and used for the
    /// mentions-location check.
    pub target_location: String,

    /// Root directory for the outreach log store and reports.
    pub data_dir: PathBuf,

    /// Path to the operator-editable policy file.
    pub policy_path: PathBuf,

    /// Fixed RNG seed for reproducible pacing and message variation.
    pub seed: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            webdriver_url: required_env("WEBDRIVER_URL"),
            target_location: env::var("TARGET_LOCATION")
                .unwrap_or_else(|_| "Sydney, Australia".to_string()),
            data_dir: PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string())),
            policy_path: PathBuf::from(
                env::var("POLICY_PATH").unwrap_or_else(|_| "policy.json".to_string()),
            ),
            seed: env::var("SEED")
                .ok()
                .map(|s| s.parse().expect("SEED must be a number")),
        }
    }

    pub fn log(&self) {
        info!(
            webdriver_url = self.webdriver_url.as_str(),
            target_location = self.target_location.as_str(),
            data_dir = %self.data_dir.display(),
            policy_path = %self.policy_path.display(),
            seeded = self.seed.is_some(),
            "Configuration loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

// ---------------------------------------------------------------------------
// Policy — operator-tunable knobs, re-readable mid-session
// ---------------------------------------------------------------------------

/// A uniform delay window in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl DelayRange {
    pub const fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }
}

/// Delay windows per campaign position. Shorter within a scan, longer
/// between entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayRanges {
    pub default: DelayRange,
    pub within_scan: DelayRange,
    pub after_search: DelayRange,
    pub between_roles: DelayRange,
    pub after_send: DelayRange,
    pub between_entities: DelayRange,
}

impl Default for DelayRanges {
    fn default() -> Self {
        Self {
            default: DelayRange::new(10.0, 20.0),
            within_scan: DelayRange::new(3.0, 5.0),
            after_search: DelayRange::new(5.0, 8.0),
            between_roles: DelayRange::new(15.0, 25.0),
            after_send: DelayRange::new(20.0, 35.0),
            between_entities: DelayRange::new(25.0, 40.0),
        }
    }
}

/// One substitutable word and its accepted alternate spellings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynonymGroup {
    pub word: String,
    pub variants: Vec<String>,
}

/// Campaign policy: everything the operator may tune mid-session via the
/// console's apply-configuration command. Serialized as JSON next to the
/// binary; missing file means defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Connection-note template. `{first_name}` and `{company}` are
    /// filled per contact.
    pub message_template: String,

    /// Whole-word substitution table used to vary the note per attempt.
    pub synonym_variants: Vec<SynonymGroup>,

    /// Roles scanned per entity, in order.
    pub roles: Vec<RoleTitle>,

    /// Relevance classifier keyword lists (case-insensitive substrings).
    pub positive_keywords: Vec<String>,
    pub negative_keywords: Vec<String>,

    /// Discovery stops once this many distinct entities are collected.
    pub entity_target: usize,

    pub delays: DelayRanges,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            message_template: "Hi {first_name},\n\n\
                I'm a university student seeking a technical AI internship in Sydney. \
                I've built RAG agents and SQL automation tools, and have strong \
                experience in Python and machine learning.\n\n\
                I'd greatly appreciate any guidance or potential referral \
                opportunities at {company}.\n\nBest regards"
                .to_string(),
            synonym_variants: vec![
                group("greatly", &["really", "truly"]),
                group("strong", &["solid", "deep"]),
                group("guidance", &["advice", "direction"]),
                group("opportunities", &["openings", "possibilities"]),
                group("built", &["developed", "created"]),
            ],
            roles: vec![
                RoleTitle::AiLead,
                RoleTitle::EngineeringManager,
                RoleTitle::TalentAcquisition,
                RoleTitle::HrManager,
            ],
            positive_keywords: [
                "artificial intelligence",
                "machine learning",
                "ai",
                "ml",
                "data science",
                "python",
                "tensorflow",
                "pytorch",
                "deep learning",
                "neural network",
                "computer vision",
                "nlp",
                "natural language",
                "data analysis",
                "software",
                "algorithm",
                "model",
                "automation",
                "programming",
                "coding",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            negative_keywords: [
                "medical intern",
                "clinical",
                "hospital",
                "patient care",
                "nursing",
                "physician",
                "doctor",
                "healthcare provider",
                "medical student",
                "residency",
                "clinical rotation",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            entity_target: 100,
            delays: DelayRanges::default(),
        }
    }
}

fn group(word: &str, variants: &[&str]) -> SynonymGroup {
    SynonymGroup {
        word: word.to_string(),
        variants: variants.iter().map(|v| v.to_string()).collect(),
    }
}

impl Policy {
    /// Read the policy file, falling back to defaults when it does not
    /// exist. A malformed file is an error — silently reverting to
    /// defaults mid-session would surprise the operator.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "No policy file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read policy file {}", path.display()))?;
        let policy: Policy = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse policy file {}", path.display()))?;
        info!(path = %path.display(), roles = policy.roles.len(), "Policy loaded");
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_has_roles_and_keywords() {
        let policy = Policy::default();
        assert!(!policy.roles.is_empty());
        assert!(policy.positive_keywords.iter().any(|k| k == "machine learning"));
        assert!(policy.negative_keywords.iter().any(|k| k == "clinical"));
        assert_eq!(policy.entity_target, 100);
    }

    #[test]
    fn load_missing_file_falls_back_to_defaults() {
        let policy = Policy::load(Path::new("/nonexistent/policy.json")).unwrap();
        assert_eq!(policy.entity_target, Policy::default().entity_target);
    }

    #[test]
    fn load_round_trips_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.json");
        let mut policy = Policy::default();
        policy.entity_target = 5;
        policy.roles = vec![RoleTitle::TalentAcquisition];
        std::fs::write(&path, serde_json::to_string_pretty(&policy).unwrap()).unwrap();

        let loaded = Policy::load(&path).unwrap();
        assert_eq!(loaded.entity_target, 5);
        assert_eq!(loaded.roles, vec![RoleTitle::TalentAcquisition]);
    }

    #[test]
    fn partial_policy_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.json");
        std::fs::write(&path, r#"{"entity_target": 7}"#).unwrap();

        let loaded = Policy::load(&path).unwrap();
        assert_eq!(loaded.entity_target, 7);
        assert!(!loaded.roles.is_empty());
    }

    #[test]
    fn malformed_policy_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(Policy::load(&path).is_err());
    }
}
