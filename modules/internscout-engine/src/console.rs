//! Interactive operator console for the outreach campaign.
//!
//! A plain dispatcher: every command re-enters the orchestrator over the
//! same log and dedup state, in any order, any number of times. The only
//! blocking acknowledgments are the login wait and the per-send
//! confirmations.

use std::path::Path;

use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, FuzzySelect, Input, Select};
use tracing::{info, warn};

use internscout_common::{OutreachError, Policy, RoleTitle};

use crate::outreach::orchestrator::{OperatorPrompt, Orchestrator};

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct ConsolePrompt {
    theme: ColorfulTheme,
}

impl ConsolePrompt {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OperatorPrompt for ConsolePrompt {
    fn wait_for_login(&self) -> Result<()> {
        println!();
        println!("{}", style("PLEASE LOG IN MANUALLY").bold());
        println!("1. The browser window has opened the network's login page");
        println!("2. Log in with your credentials");
        println!("3. Complete any security checks (2FA, captcha)");
        println!("4. Wait on the home/feed page, then confirm here");
        loop {
            let done = Confirm::with_theme(&self.theme)
                .with_prompt("Did you log in successfully?")
                .default(false)
                .interact()?;
            if done {
                println!("{}", style("Login confirmed, starting automation").green());
                return Ok(());
            }
            println!("Complete the login first, then confirm.");
        }
    }

    fn confirm_send(&self, contact_name: &str, entity_name: &str) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(format!("Send request to {contact_name} at {entity_name}?"))
            .default(true)
            .interact()?)
    }

    fn confirm_discard(&self) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt("Quit WITHOUT saving the outreach log?")
            .default(false)
            .interact()?)
    }
}

// ---------------------------------------------------------------------------
// Menu loop
// ---------------------------------------------------------------------------

pub async fn run_console(
    orchestrator: &mut Orchestrator<'_>,
    companies: &[String],
    policy_path: &Path,
) -> Result<()> {
    let theme = ColorfulTheme::default();
    let items = [
        "Run full campaign",
        "Run one company",
        "Inspect one company",
        "Contact a person directly",
        "Show outreach history",
        "Apply configuration",
        "Save log and quit",
        "Quit without saving",
    ];

    loop {
        println!();
        let choice = Select::with_theme(&theme)
            .with_prompt("Outreach")
            .items(&items)
            .default(0)
            .interact()?;

        match choice {
            0 => {
                if let Err(e) = orchestrator.run_all(companies).await {
                    if is_interrupt(&e) {
                        return stop_after_interrupt(orchestrator);
                    }
                    return Err(e);
                }
            }
            1 => {
                let Some(company) = pick_company(&theme, companies)? else {
                    continue;
                };
                if let Err(e) = orchestrator.process_company(&company).await {
                    if is_interrupt(&e) {
                        return stop_after_interrupt(orchestrator);
                    }
                    return Err(e);
                }
            }
            2 => {
                let Some(company) = pick_company(&theme, companies)? else {
                    continue;
                };
                inspect_company(orchestrator, &company);
            }
            3 => {
                let name: String = Input::with_theme(&theme)
                    .with_prompt("Person name")
                    .interact_text()?;
                let company: String = Input::with_theme(&theme)
                    .with_prompt("Company")
                    .interact_text()?;
                let role_idx = Select::with_theme(&theme)
                    .with_prompt("Role")
                    .items(&RoleTitle::ALL.map(|r| r.to_string()))
                    .default(0)
                    .interact()?;
                if let Err(e) = orchestrator
                    .contact_person(name.trim(), company.trim(), RoleTitle::ALL[role_idx])
                    .await
                {
                    if is_interrupt(&e) {
                        return stop_after_interrupt(orchestrator);
                    }
                    return Err(e);
                }
            }
            4 => show_history(orchestrator),
            5 => match Policy::load(policy_path) {
                Ok(policy) => {
                    println!(
                        "Applied policy: {} roles, target {} companies",
                        policy.roles.len(),
                        policy.entity_target
                    );
                    orchestrator.apply_policy(policy);
                }
                Err(e) => eprintln!("Could not load policy: {e:#}"),
            },
            6 => {
                let rows = orchestrator.flush()?;
                println!("Saved {rows} new log rows. Goodbye.");
                return Ok(());
            }
            _ => {
                match orchestrator.prompt_discard() {
                    Ok(true) => {
                        orchestrator.discard_pending();
                        warn!("Session ended without saving the outreach log");
                        return Ok(());
                    }
                    Ok(false) => continue,
                    Err(e) => {
                        warn!(error = %e, "Discard confirmation failed");
                        continue;
                    }
                }
            }
        }
    }
}

fn pick_company(theme: &ColorfulTheme, companies: &[String]) -> Result<Option<String>> {
    if companies.is_empty() {
        println!("No companies loaded.");
        return Ok(None);
    }
    let idx = FuzzySelect::with_theme(theme)
        .with_prompt("Company")
        .items(companies)
        .default(0)
        .interact()?;
    Ok(companies.get(idx).cloned())
}

fn inspect_company(orchestrator: &Orchestrator<'_>, company: &str) {
    let attempts: Vec<_> = orchestrator
        .history()
        .iter()
        .filter(|a| a.entity_name == company)
        .collect();
    println!();
    println!("{}", style(company).bold());
    println!(
        "Roles configured: {}",
        orchestrator
            .policy()
            .roles
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    if attempts.is_empty() {
        println!("No outreach attempts yet this session.");
        return;
    }
    for attempt in attempts {
        println!(
            "  {}  {} ({}) — {}",
            attempt.timestamp.format("%H:%M:%S"),
            attempt.contact_name,
            attempt.role_title,
            attempt.outcome
        );
    }
}

fn show_history(orchestrator: &Orchestrator<'_>) {
    let history = orchestrator.history();
    println!();
    if history.is_empty() {
        println!("No outreach attempts yet this session.");
        return;
    }
    for attempt in history {
        println!(
            "{}  {} ({}) at {} — {}",
            attempt.timestamp.format("%Y-%m-%d %H:%M:%S"),
            attempt.contact_name,
            attempt.role_title,
            attempt.entity_name,
            attempt.outcome
        );
    }
    println!("Total interactions logged: {}", history.len());
}

fn is_interrupt(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<OutreachError>(),
        Some(OutreachError::Interrupted)
    )
}

fn stop_after_interrupt(orchestrator: &mut Orchestrator<'_>) -> Result<()> {
    info!("Interrupt received, flushing outreach log before exit");
    let rows = orchestrator.flush()?;
    println!("Interrupted — saved {rows} new log rows.");
    Ok(())
}
