use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use internscout_common::{Config, Entity, Policy, SourceBoard};
use webdriver_client::WebdriverClient;

use internscout_engine::console::{self, ConsolePrompt};
use internscout_engine::dedup::DedupRegistry;
use internscout_engine::discovery::DiscoveryPipeline;
use internscout_engine::enrichment::{EnrichmentStage, EnrichmentStats};
use internscout_engine::outreach::orchestrator::{CancelFlag, OperatorPrompt, Orchestrator};
use internscout_engine::pacing::PacingPolicy;
use internscout_engine::reports;
use internscout_engine::roster;
use internscout_engine::sources;
use internscout_engine::traits::{DriverSession, PageSession};

#[derive(Parser)]
#[command(name = "internscout")]
#[command(about = "Internship company discovery and outreach campaigns")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search job boards for relevant companies, enrich them, and write
    /// the discovery reports
    Discover,

    /// Resolve official websites for a roster of company names
    Enrich {
        /// Newline-delimited company list
        roster: PathBuf,
    },

    /// Run the interactive outreach console over a roster of companies
    Outreach {
        /// Newline-delimited company list
        roster: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("internscout=info".parse()?))
        .init();
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::from_env();
    config.log();
    let policy = Policy::load(&config.policy_path)?;

    // One interrupt guard for every command: finish the current step,
    // then stop, flush, and clean up.
    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, finishing current step then stopping");
                cancel.set();
            }
        });
    }

    info!("Connecting to WebDriver...");
    let client = WebdriverClient::connect(&config.webdriver_url).await?;
    let session = DriverSession::start(client).await?;

    let result = match cli.command {
        Commands::Discover => run_discover(&session, &config, &policy, &cancel).await,
        Commands::Enrich { roster } => {
            run_enrich(&session, &config, &policy, &roster, &cancel).await
        }
        Commands::Outreach { roster } => {
            run_outreach(&session, &config, policy, &roster, cancel.clone()).await
        }
    };

    info!("Closing browser session...");
    if let Err(e) = session.quit().await {
        warn!(error = %e, "Failed to close browser session");
    }
    result
}

/// Discovery: job boards → relevance + dedup → enrichment → reports.
/// An interrupt keeps partial results and still writes the reports.
async fn run_discover(
    session: &DriverSession,
    config: &Config,
    policy: &Policy,
    cancel: &CancelFlag,
) -> Result<()> {
    let mut registry = DedupRegistry::new();
    let mut pacing = PacingPolicy::new(policy.delays.clone(), config.seed);

    let pipeline = DiscoveryPipeline::new(session, policy);
    let (mut entities, _) = pipeline.run(&mut registry, &mut pacing, cancel).await;

    let stage = EnrichmentStage::new(session, &config.target_location);
    let mut stats = EnrichmentStats::default();
    let mut contacts = Vec::new();
    let total = entities.len();
    for (i, entity) in entities.iter_mut().enumerate() {
        if cancel.is_set() {
            warn!("Enrichment interrupted, writing partial reports");
            break;
        }
        info!(company = entity.name.as_str(), progress = format!("{}/{total}", i + 1).as_str(), "Enriching company");
        contacts.extend(stage.enrich(entity, &mut registry, &mut pacing, &mut stats).await);
        if i + 1 < total {
            pacing.default_wait().await;
        }
    }

    reports::write_company_list(&config.data_dir, &config.target_location, &entities)?;
    reports::write_website_report(&config.data_dir, &entities)?;
    reports::write_research_report(&config.data_dir, &config.target_location, &entities, &contacts)?;
    info!("{stats}");
    Ok(())
}

/// Website resolution only, for an existing company list.
async fn run_enrich(
    session: &DriverSession,
    config: &Config,
    policy: &Policy,
    roster_path: &std::path::Path,
    cancel: &CancelFlag,
) -> Result<()> {
    let companies = roster::load_roster(roster_path)?;
    if companies.is_empty() {
        anyhow::bail!("No companies found in {}", roster_path.display());
    }

    let mut pacing = PacingPolicy::new(policy.delays.clone(), config.seed);
    let stage = EnrichmentStage::new(session, &config.target_location);
    let mut stats = EnrichmentStats::default();
    let mut entities: Vec<Entity> = companies
        .into_iter()
        .map(|name| Entity::new(name, SourceBoard::Roster, ""))
        .collect();

    let total = entities.len();
    for (i, entity) in entities.iter_mut().enumerate() {
        if cancel.is_set() {
            warn!("Interrupted, writing partial website report");
            break;
        }
        info!(company = entity.name.as_str(), progress = format!("{}/{total}", i + 1).as_str(), "Finding website");
        stage.resolve_website(entity, &mut stats).await;
        if i + 1 < total {
            pacing.within_scan().await;
        }
    }

    reports::write_website_report(&config.data_dir, &entities)?;
    info!("{stats}");
    Ok(())
}

/// The outreach campaign console. The log is flushed on every exit path
/// except an operator-confirmed discard.
async fn run_outreach(
    session: &DriverSession,
    config: &Config,
    policy: Policy,
    roster_path: &std::path::Path,
    cancel: CancelFlag,
) -> Result<()> {
    let companies = roster::load_roster(roster_path)?;
    if companies.is_empty() {
        anyhow::bail!("No companies found in {}", roster_path.display());
    }

    let prompt = ConsolePrompt::new();
    session.navigate(sources::surface().login_url).await?;
    prompt.wait_for_login()?;

    let store_path = config.data_dir.join("outreach_history.csv");
    let mut orchestrator = Orchestrator::new(
        session,
        &prompt,
        policy,
        config.target_location.clone(),
        store_path,
        config.seed,
        cancel,
    );

    let result = console::run_console(&mut orchestrator, &companies, &config.policy_path).await;

    // The console flushes on its own exits; this covers error paths.
    // The watermark makes a second flush a no-op.
    if let Err(e) = orchestrator.flush() {
        error!(error = %e, "Failed to flush outreach log");
    }
    result
}
