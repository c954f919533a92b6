//! Roster loading: the newline-delimited list of target company names.
//!
//! The file format is what the discovery report writer emits — numbered
//! entries under a banner — so generated lists can be fed straight back
//! into the outreach command.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

/// Lines starting with any of these are headers, not company names.
const HEADER_MARKERS: &[&str] = &["AI INTERNSHIP", "COMPANIES WITH", "Generated", "==="];

pub fn load_roster(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read roster file {}", path.display()))?;
    let companies = parse_roster(&raw);
    info!(path = %path.display(), companies = companies.len(), "Roster loaded");
    Ok(companies)
}

pub fn parse_roster(raw: &str) -> Vec<String> {
    raw.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || HEADER_MARKERS.iter().any(|m| line.starts_with(m)) {
                return None;
            }
            Some(strip_numbering(line).to_string())
        })
        .collect()
}

/// Remove a leading "N. " list prefix, if present.
fn strip_numbering(line: &str) -> &str {
    match line.split_once(". ") {
        Some((prefix, rest)) if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) => {
            rest
        }
        _ => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_entries_are_stripped() {
        let parsed = parse_roster("1. Acme\n12. Globex Corp\n");
        assert_eq!(parsed, vec!["Acme", "Globex Corp"]);
    }

    #[test]
    fn headers_and_blanks_are_skipped() {
        let raw = "AI INTERNSHIP COMPANIES - SYDNEY, AUSTRALIA\n\
                   Generated: 2026-08-01 10:00:00\n\
                   ============================================================\n\
                   \n\
                   1. Acme\n";
        assert_eq!(parse_roster(raw), vec!["Acme"]);
    }

    #[test]
    fn unnumbered_lines_pass_through() {
        assert_eq!(parse_roster("Acme\nGlobex\n"), vec!["Acme", "Globex"]);
    }

    #[test]
    fn company_names_with_dots_are_not_split() {
        assert_eq!(parse_roster("Acme Inc. Sydney\n"), vec!["Acme Inc. Sydney"]);
    }
}
