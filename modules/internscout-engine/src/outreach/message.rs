//! Note composition: fill the policy template per contact, then vary
//! the wording so repeated notes don't share an exact fingerprint.

use rand::rngs::StdRng;
use rand::seq::{index, IndexedRandom};
use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

use internscout_common::SynonymGroup;

static WORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z]+").unwrap());

/// Fill the `{first_name}` / `{company}` placeholders.
pub fn compose_note(template: &str, first_name: &str, company: &str) -> String {
    template
        .replace("{first_name}", first_name)
        .replace("{company}", company)
}

/// Substitute 1–2 whole words with alternates from the synonym table.
/// Uniformly random per call; deterministic given the RNG state. Words
/// inside other words are never touched, and the original
/// capitalization of a replaced word is preserved.
pub fn vary_wording(message: &str, variants: &[SynonymGroup], rng: &mut StdRng) -> String {
    // Candidate positions: whole words present in the variant table.
    let mut candidates: Vec<(usize, usize, &SynonymGroup)> = Vec::new();
    for m in WORD_PATTERN.find_iter(message) {
        let lowered = m.as_str().to_lowercase();
        if let Some(group) = variants
            .iter()
            .find(|g| g.word == lowered && !g.variants.is_empty())
        {
            candidates.push((m.start(), m.end(), group));
        }
    }
    if candidates.is_empty() {
        return message.to_string();
    }

    let count = if candidates.len() == 1 {
        1
    } else {
        rng.random_range(1..=2)
    };
    let mut chosen: Vec<usize> = index::sample(rng, candidates.len(), count).into_vec();
    chosen.sort_unstable();

    let mut out = String::with_capacity(message.len());
    let mut cursor = 0;
    for idx in chosen {
        let (start, end, group) = candidates[idx];
        let original = &message[start..end];
        let replacement = group
            .variants
            .choose(rng)
            .expect("non-empty variant list")
            .clone();
        out.push_str(&message[cursor..start]);
        out.push_str(&match_capitalization(original, &replacement));
        cursor = end;
    }
    out.push_str(&message[cursor..]);
    out
}

fn match_capitalization(original: &str, replacement: &str) -> String {
    if original.chars().next().is_some_and(|c| c.is_uppercase()) {
        let mut chars = replacement.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        replacement.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn groups() -> Vec<SynonymGroup> {
        vec![
            SynonymGroup {
                word: "greatly".into(),
                variants: vec!["really".into(), "truly".into()],
            },
            SynonymGroup {
                word: "strong".into(),
                variants: vec!["solid".into()],
            },
        ]
    }

    #[test]
    fn placeholders_are_filled() {
        let note = compose_note("Hi {first_name}, about {company}.", "Jane", "Acme");
        assert_eq!(note, "Hi Jane, about Acme.");
    }

    #[test]
    fn variation_is_deterministic_under_a_seed() {
        let msg = "I would greatly value a strong referral";
        let a = vary_wording(msg, &groups(), &mut StdRng::seed_from_u64(3));
        let b = vary_wording(msg, &groups(), &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
        assert_ne!(a, msg);
    }

    #[test]
    fn only_whole_words_are_substituted() {
        // "strongly" contains "strong" but must survive untouched.
        let msg = "I strongly agree";
        let out = vary_wording(msg, &groups(), &mut StdRng::seed_from_u64(1));
        assert_eq!(out, msg);
    }

    #[test]
    fn at_most_two_words_change() {
        let msg = "greatly strong greatly strong";
        for seed in 0..20 {
            let out = vary_wording(msg, &groups(), &mut StdRng::seed_from_u64(seed));
            let changed = msg
                .split_whitespace()
                .zip(out.split_whitespace())
                .filter(|(a, b)| a != b)
                .count();
            assert!((1..=2).contains(&changed), "seed {seed} changed {changed} words");
        }
    }

    #[test]
    fn capitalization_is_preserved() {
        let groups = vec![SynonymGroup {
            word: "greatly".into(),
            variants: vec!["truly".into()],
        }];
        let out = vary_wording("Greatly appreciated", &groups, &mut StdRng::seed_from_u64(0));
        assert_eq!(out, "Truly appreciated");
    }

    #[test]
    fn message_without_candidates_is_unchanged() {
        let msg = "Nothing to vary here";
        assert_eq!(vary_wording(msg, &groups(), &mut StdRng::seed_from_u64(0)), msg);
    }
}
