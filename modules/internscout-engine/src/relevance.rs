//! Keyword relevance classifier for job descriptions.
//!
//! Closed-world default-reject: a description passes only if a positive
//! keyword matches and no negative keyword does. The lists are policy
//! data, not an algorithm to tune.

use internscout_common::Policy;

pub struct RelevancePolicy {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl RelevancePolicy {
    pub fn from_policy(policy: &Policy) -> Self {
        Self {
            positive: policy
                .positive_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            negative: policy
                .negative_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
        }
    }

    /// Case-insensitive substring match. Negative keywords win.
    pub fn is_relevant(&self, text: &str) -> bool {
        let text = text.to_lowercase();

        if self.negative.iter().any(|k| text.contains(k.as_str())) {
            return false;
        }
        self.positive.iter().any(|k| text.contains(k.as_str()))
    }
}

impl Default for RelevancePolicy {
    fn default() -> Self {
        Self::from_policy(&Policy::default())
    }
}
