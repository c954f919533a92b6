//! Discovery pipeline scenarios over FakeSession: relevance filtering,
//! name dedup, per-card and per-board failure containment, early stop.
//!
//! Run with: cargo test -p internscout-engine --test discovery_test

use internscout_common::Policy;

use internscout_engine::dedup::DedupRegistry;
use internscout_engine::discovery::DiscoveryPipeline;
use internscout_engine::outreach::orchestrator::CancelFlag;
use internscout_engine::pacing::PacingPolicy;
use internscout_engine::sources;
use internscout_engine::testing::{test_policy, FakeElement, FakePage, FakeSession};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn seek_board() -> sources::BoardProfile {
    sources::job_boards().remove(0)
}

/// A job card that expands into a detail page when clicked.
fn card(company: &str, detail_url: &str) -> FakeElement {
    FakeElement::new()
        .child(seek_board().company_selector, FakeElement::new().text(company))
        .navigates_to(detail_url)
}

/// The detail page holding a description panel.
fn detail(description: &str) -> FakePage {
    FakePage::new().with_one(
        seek_board().description_selector,
        FakeElement::new().text(description),
    )
}

fn seek_page(cards: Vec<FakeElement>) -> FakePage {
    FakePage::new().with(seek_board().card_selector, cards)
}

async fn run_discovery(session: &FakeSession, policy: &Policy) -> (Vec<String>, internscout_engine::discovery::DiscoveryStats) {
    let mut registry = DedupRegistry::new();
    let mut pacing = PacingPolicy::unpaced();
    let pipeline = DiscoveryPipeline::new(session, policy);
    let (entities, stats) = pipeline.run(&mut registry, &mut pacing, &CancelFlag::new()).await;
    (entities.iter().map(|e| e.name.clone()).collect(), stats)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn relevance_and_dedup_filter_the_card_stream() {
    let board = seek_board();
    let session = FakeSession::new()
        .on_page(
            board.search_url,
            seek_page(vec![
                card("Acme", "detail:acme"),
                card("MedCorp", "detail:medcorp"),
                card("Acme", "detail:acme-2"),
            ]),
        )
        .on_page("detail:acme", detail("Python machine learning intern"))
        .on_page("detail:medcorp", detail("We need a clinical nursing intern"))
        .on_page("detail:acme-2", detail("Another deep learning internship"));

    let (names, stats) = run_discovery(&session, &test_policy()).await;

    assert_eq!(names, vec!["Acme"]);
    assert_eq!(stats.cards_seen, 3);
    assert_eq!(stats.accepted, 1);
    assert_eq!(stats.rejected_irrelevant, 1);
    assert_eq!(stats.duplicates_skipped, 1);
}

#[tokio::test]
async fn a_dead_board_keeps_results_from_the_others() {
    let boards = sources::job_boards();
    let jora = &boards[2];
    let jora_card = FakeElement::new()
        .child(jora.company_selector, FakeElement::new().text("Globex"))
        .navigates_to("detail:globex");
    let session = FakeSession::new()
        .failing_url(boards[0].search_url)
        .on_page(
            jora.search_url,
            FakePage::new().with_one(jora.card_selector, jora_card),
        )
        .on_page(
            "detail:globex",
            FakePage::new()
                .with_one(jora.description_selector, FakeElement::new().text("python automation role")),
        );

    let (names, stats) = run_discovery(&session, &test_policy()).await;

    assert_eq!(names, vec!["Globex"]);
    // Seek failed outright, Indeed was never registered.
    assert_eq!(stats.boards_failed, 2);
}

#[tokio::test]
async fn a_broken_card_is_skipped_without_aborting_the_board() {
    let board = seek_board();
    let session = FakeSession::new()
        .on_page(
            board.search_url,
            seek_page(vec![
                card("BrokenCo", "detail:missing"), // detail page never registered
                card("Acme", "detail:acme"),
            ]),
        )
        .on_page("detail:acme", detail("software engineering internship"));

    let (names, stats) = run_discovery(&session, &test_policy()).await;

    assert_eq!(names, vec!["Acme"]);
    assert_eq!(stats.card_failures, 1);
    assert_eq!(stats.accepted, 1);
}

#[tokio::test]
async fn discovery_stops_at_the_entity_target() {
    let board = seek_board();
    let session = FakeSession::new()
        .on_page(
            board.search_url,
            seek_page(vec![card("Acme", "detail:acme"), card("Globex", "detail:globex")]),
        )
        .on_page("detail:acme", detail("machine learning intern"))
        .on_page("detail:globex", detail("data science intern"));

    let mut policy = test_policy();
    policy.entity_target = 1;
    let (names, stats) = run_discovery(&session, &policy).await;

    assert_eq!(names, vec!["Acme"]);
    assert_eq!(stats.accepted, 1);
    // The second card was never inspected.
    assert_eq!(stats.cards_seen, 1);
}

#[tokio::test]
async fn output_preserves_discovery_order() {
    let board = seek_board();
    let session = FakeSession::new()
        .on_page(
            board.search_url,
            seek_page(vec![
                card("Zeta", "detail:zeta"),
                card("Alpha", "detail:alpha"),
            ]),
        )
        .on_page("detail:zeta", detail("nlp internship"))
        .on_page("detail:alpha", detail("computer vision internship"));

    let (names, _) = run_discovery(&session, &test_policy()).await;
    assert_eq!(names, vec!["Zeta", "Alpha"]);
}
