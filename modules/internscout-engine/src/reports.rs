//! Report writers: regenerated each run, never re-read by the engine.
//! The text company list is deliberately in the same shape the roster
//! parser accepts, so a discovery run can feed the outreach command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use internscout_common::{ContactLead, Entity, WebsiteStatus};

use crate::outreach::log::csv_field;

/// Write the company-name CSV and the numbered text list.
pub fn write_company_list(
    dir: &Path,
    location: &str,
    entities: &[Entity],
) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let csv_path = dir.join("ai_internship_companies.csv");
    let mut csv = String::from("Company Name\n");
    for entity in entities {
        csv.push_str(&csv_field(&entity.name));
        csv.push('\n');
    }
    std::fs::write(&csv_path, csv)?;

    let txt_path = dir.join("company_list.txt");
    let mut txt = String::new();
    txt.push_str(&format!(
        "AI INTERNSHIP COMPANIES - {}\n",
        location.to_uppercase()
    ));
    txt.push_str(&format!(
        "Generated: {}\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    ));
    txt.push_str(&"=".repeat(60));
    txt.push_str("\n\n");
    for (i, entity) in entities.iter().enumerate() {
        txt.push_str(&format!("{}. {}\n", i + 1, entity.name));
    }
    std::fs::write(&txt_path, txt)?;

    info!(companies = entities.len(), path = %txt_path.display(), "Company list saved");
    Ok((csv_path, txt_path))
}

/// Write the company/website CSV and its text companion.
pub fn write_website_report(dir: &Path, entities: &[Entity]) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let csv_path = dir.join("companies_with_websites.csv");
    let mut csv = String::from("Company,Website\n");
    for entity in entities {
        let website = entity
            .website
            .clone()
            .unwrap_or(WebsiteStatus::NotFound)
            .to_string();
        csv.push_str(&format!("{},{}\n", csv_field(&entity.name), csv_field(&website)));
    }
    std::fs::write(&csv_path, csv)?;

    let txt_path = dir.join("companies_websites.txt");
    let mut txt = String::from("COMPANIES WITH WEBSITES\n");
    txt.push_str(&format!(
        "Generated: {}\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    ));
    txt.push_str(&"=".repeat(60));
    txt.push_str("\n\n");
    for entity in entities {
        let website = entity
            .website
            .clone()
            .unwrap_or(WebsiteStatus::NotFound)
            .to_string();
        txt.push_str(&format!("Company: {}\n", entity.name));
        txt.push_str(&format!("Website: {website}\n"));
        txt.push_str(&"-".repeat(40));
        txt.push('\n');
    }
    std::fs::write(&txt_path, txt)?;

    let found = entities
        .iter()
        .filter(|e| matches!(e.website, Some(WebsiteStatus::Verified(_))))
        .count();
    info!(found, total = entities.len(), path = %csv_path.display(), "Website report saved");
    Ok((csv_path, txt_path))
}

/// Write the full research report with per-company contact blocks.
pub fn write_research_report(
    dir: &Path,
    location: &str,
    entities: &[Entity],
    contacts: &[ContactLead],
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = dir.join("research_report.txt");
    let mut out = String::from("COMPANY RESEARCH REPORT\n");
    out.push_str(&format!(
        "Generated: {}\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&"=".repeat(60));
    out.push_str("\n\n");

    let location_term = location.split(',').next().unwrap_or(location).trim();
    for entity in entities {
        let website = entity
            .website
            .clone()
            .unwrap_or(WebsiteStatus::NotFound)
            .to_string();
        out.push_str(&format!("COMPANY: {}\n", entity.name));
        out.push_str(&format!("Source board: {}\n", entity.source_board));
        out.push_str(&format!("Website: {website}\n"));
        out.push_str(&format!("Has internships: {}\n", entity.has_internship_signal));
        out.push_str(&format!(
            "Mentions {location_term}: {}\n",
            entity.mentions_target_location
        ));

        let entity_contacts: Vec<_> = contacts
            .iter()
            .filter(|c| c.entity_name == entity.name)
            .collect();
        out.push_str(&format!("\nContacts found: {}\n", entity_contacts.len()));
        for contact in entity_contacts {
            out.push_str(&format!(
                "  - {} ({})\n",
                contact.display_name, contact.role_title
            ));
            out.push_str(&format!("    Profile: {}\n", contact.profile_url_display()));
        }
        out.push('\n');
        out.push_str(&"-".repeat(60));
        out.push_str("\n\n");
    }
    std::fs::write(&path, out)?;

    info!(companies = entities.len(), path = %path.display(), "Research report saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use internscout_common::{ContactSource, RoleTitle, SourceBoard};

    use crate::roster;

    fn entities() -> Vec<Entity> {
        let mut acme = Entity::new("Acme", SourceBoard::Seek, "ml work");
        acme.website = Some(WebsiteStatus::Verified("https://acme.com".into()));
        acme.has_internship_signal = true;
        let globex = Entity::new("Globex", SourceBoard::Indeed, "python work");
        vec![acme, globex]
    }

    #[test]
    fn company_list_round_trips_through_the_roster_parser() {
        let dir = tempfile::tempdir().unwrap();
        let (_, txt_path) =
            write_company_list(dir.path(), "Sydney, Australia", &entities()).unwrap();

        let raw = std::fs::read_to_string(txt_path).unwrap();
        assert_eq!(roster::parse_roster(&raw), vec!["Acme", "Globex"]);
    }

    #[test]
    fn website_report_renders_sentinels() {
        let dir = tempfile::tempdir().unwrap();
        let (csv_path, _) = write_website_report(dir.path(), &entities()).unwrap();

        let csv = std::fs::read_to_string(csv_path).unwrap();
        assert!(csv.contains("Acme,https://acme.com"));
        assert!(csv.contains("Globex,Not found"));
    }

    #[test]
    fn research_report_groups_contacts_by_company() {
        let dir = tempfile::tempdir().unwrap();
        let contacts = vec![ContactLead {
            display_name: "Jane Doe".into(),
            role_title: RoleTitle::TalentAcquisition,
            profile_url: None,
            entity_name: "Acme".into(),
            source: ContactSource::CompanySite,
        }];
        let path =
            write_research_report(dir.path(), "Sydney, Australia", &entities(), &contacts).unwrap();

        let report = std::fs::read_to_string(path).unwrap();
        assert!(report.contains("COMPANY: Acme"));
        assert!(report.contains("Jane Doe (Talent Acquisition)"));
        assert!(report.contains("Profile: Not found"));
        assert!(report.contains("Contacts found: 0")); // Globex block
    }
}
