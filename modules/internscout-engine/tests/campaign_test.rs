//! Orchestrator scenarios over FakeSession: the full connect flow, the
//! one-record-per-action invariant, contact dedup, swallowed action
//! failures, the direct-message variant, and interrupt handling with a
//! flushed partial log.
//!
//! Run with: cargo test -p internscout-engine --test campaign_test

use std::path::PathBuf;

use internscout_common::{AttemptOutcome, RoleTitle};

use internscout_engine::outreach::orchestrator::{CancelFlag, Orchestrator};
use internscout_engine::sources;
use internscout_engine::testing::{
    test_policy, FakeElement, FakePage, FakeSession, ScriptedPrompt,
};

const LOCATION: &str = "Sydney, Australia";

// ---------------------------------------------------------------------------
// Page builders
// ---------------------------------------------------------------------------

fn people_query(role: RoleTitle, company: &str) -> String {
    format!("{role} at {company} in {LOCATION}")
}

/// The search landing page with its search box.
fn search_page() -> FakePage {
    FakePage::new().with_one(sources::surface().search_box, FakeElement::new())
}

/// A result card for one person. `connect_to` is the modal page the
/// connect button opens, if the person is connectable at all.
fn person_card(name: &str, connect_to: Option<&str>) -> FakeElement {
    let surface = sources::surface();
    let mut card =
        FakeElement::new().child(surface.result_name, FakeElement::new().text(name));
    if let Some(url) = connect_to {
        card = card.child(surface.connect_button, FakeElement::new().navigates_to(url));
    }
    card
}

fn results_page(cards: Vec<FakeElement>) -> FakePage {
    FakePage::new().with(sources::surface().result_card, cards)
}

/// The connect modal with the full note flow available.
fn note_modal() -> FakePage {
    let surface = sources::surface();
    FakePage::new()
        .with_one(surface.add_note_button, FakeElement::new())
        .with_one(surface.note_field, FakeElement::new())
        .with_one(surface.send_button, FakeElement::new())
}

fn store_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("outreach_history.csv")
}

fn orchestrator<'a>(
    session: &'a FakeSession,
    prompt: &'a ScriptedPrompt,
    store: PathBuf,
    cancel: CancelFlag,
) -> Orchestrator<'a> {
    Orchestrator::new(
        session,
        prompt,
        test_policy(),
        LOCATION.to_string(),
        store,
        Some(42),
        cancel,
    )
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn connectable_candidates_get_noted_requests_and_others_are_skipped() {
    let surface = sources::surface();
    let session = FakeSession::new()
        .on_page(surface.people_search_url, search_page())
        .on_query(
            &people_query(RoleTitle::TalentAcquisition, "Acme"),
            results_page(vec![
                person_card("Jane Doe", Some("modal:jane")),
                person_card("John Smith", None),
            ]),
        )
        .on_page("modal:jane", note_modal());

    let dir = tempfile::tempdir().unwrap();
    let prompt = ScriptedPrompt::allow_all();
    let mut orch = orchestrator(&session, &prompt, store_path(&dir), CancelFlag::new());

    orch.run_all(&["Acme".to_string()]).await.unwrap();

    let history = orch.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].contact_name, "Jane Doe");
    assert_eq!(history[0].outcome, AttemptOutcome::Sent);
    assert_eq!(history[1].contact_name, "John Smith");
    assert_eq!(history[1].outcome, AttemptOutcome::SkippedAlreadyConnected);

    // Only the eligible candidate needed operator confirmation.
    assert_eq!(prompt.confirms_asked(), 1);

    // The note was personalized from the template.
    let typed = session.typed_values();
    let note = typed
        .iter()
        .find(|t| t.contains("Jane"))
        .expect("a note was typed");
    assert!(note.contains("Acme"));
}

#[tokio::test]
async fn a_failing_action_records_failed_and_the_campaign_continues() {
    let surface = sources::surface();
    let broken_card = FakeElement::new()
        .child(surface.result_name, FakeElement::new().text("Jane Doe"))
        .child(surface.connect_button, FakeElement::new().failing_click());
    let session = FakeSession::new()
        .on_page(surface.people_search_url, search_page())
        .on_query(
            &people_query(RoleTitle::TalentAcquisition, "Acme"),
            results_page(vec![broken_card, person_card("John Smith", Some("modal:john"))]),
        )
        .on_page("modal:john", note_modal());

    let dir = tempfile::tempdir().unwrap();
    let prompt = ScriptedPrompt::allow_all();
    let mut orch = orchestrator(&session, &prompt, store_path(&dir), CancelFlag::new());

    orch.run_all(&["Acme".to_string()]).await.unwrap();

    let history = orch.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].outcome, AttemptOutcome::Failed);
    assert_eq!(history[1].contact_name, "John Smith");
    assert_eq!(history[1].outcome, AttemptOutcome::Sent);
}

#[tokio::test]
async fn note_ui_unavailable_falls_back_to_a_plain_send() {
    let surface = sources::surface();
    // Modal without an add-note button, only the bare send control.
    let bare_modal =
        FakePage::new().with_one(surface.send_fallback_button, FakeElement::new());
    let session = FakeSession::new()
        .on_page(surface.people_search_url, search_page())
        .on_query(
            &people_query(RoleTitle::TalentAcquisition, "Acme"),
            results_page(vec![person_card("Jane Doe", Some("modal:jane"))]),
        )
        .on_page("modal:jane", bare_modal);

    let dir = tempfile::tempdir().unwrap();
    let prompt = ScriptedPrompt::allow_all();
    let mut orch = orchestrator(&session, &prompt, store_path(&dir), CancelFlag::new());

    orch.run_all(&["Acme".to_string()]).await.unwrap();

    assert_eq!(orch.history().len(), 1);
    assert_eq!(orch.history()[0].outcome, AttemptOutcome::SentWithoutNote);
}

#[tokio::test]
async fn the_same_contact_is_never_actioned_twice_in_a_run() {
    let surface = sources::surface();
    let mut policy = test_policy();
    policy.roles = vec![RoleTitle::TalentAcquisition, RoleTitle::HrManager];

    let session = FakeSession::new()
        .on_page(surface.people_search_url, search_page())
        .on_query(
            &people_query(RoleTitle::TalentAcquisition, "Acme"),
            results_page(vec![person_card("Jane Doe", Some("modal:jane"))]),
        )
        .on_query(
            &people_query(RoleTitle::HrManager, "Acme"),
            results_page(vec![person_card("Jane Doe", Some("modal:jane"))]),
        )
        .on_page("modal:jane", note_modal());

    let dir = tempfile::tempdir().unwrap();
    let prompt = ScriptedPrompt::allow_all();
    let cancel = CancelFlag::new();
    let mut orch = Orchestrator::new(
        &session,
        &prompt,
        policy,
        LOCATION.to_string(),
        store_path(&dir),
        Some(42),
        cancel,
    );

    orch.run_all(&["Acme".to_string()]).await.unwrap();

    // Found in both role scans, actioned in exactly one.
    assert_eq!(orch.history().len(), 1);
}

#[tokio::test]
async fn declined_sends_record_nothing() {
    let surface = sources::surface();
    let session = FakeSession::new()
        .on_page(surface.people_search_url, search_page())
        .on_query(
            &people_query(RoleTitle::TalentAcquisition, "Acme"),
            results_page(vec![person_card("Jane Doe", Some("modal:jane"))]),
        )
        .on_page("modal:jane", note_modal());

    let dir = tempfile::tempdir().unwrap();
    let prompt = ScriptedPrompt::deny_all();
    let mut orch = orchestrator(&session, &prompt, store_path(&dir), CancelFlag::new());

    orch.run_all(&["Acme".to_string()]).await.unwrap();

    assert_eq!(prompt.confirms_asked(), 1);
    assert!(orch.history().is_empty());
}

#[tokio::test]
async fn direct_message_flow_covers_all_three_outcomes() {
    let surface = sources::surface();
    let message_modal = FakePage::new()
        .with_one(surface.message_field, FakeElement::new())
        .with_one(surface.send_button, FakeElement::new());
    let messageable = FakeElement::new()
        .child(surface.result_name, FakeElement::new().text("Jane Doe"))
        .child(surface.message_button, FakeElement::new().navigates_to("modal:msg"));
    let session = FakeSession::new()
        .on_page(surface.people_search_url, search_page())
        .on_query("Jane Doe Acme", results_page(vec![messageable]))
        .on_query(
            "John Smith Acme",
            results_page(vec![person_card("John Smith", None)]),
        )
        .on_page("modal:msg", message_modal);

    let dir = tempfile::tempdir().unwrap();
    let prompt = ScriptedPrompt::allow_all();
    let mut orch = orchestrator(&session, &prompt, store_path(&dir), CancelFlag::new());

    orch.contact_person("Jane Doe", "Acme", RoleTitle::TalentAcquisition)
        .await
        .unwrap();
    orch.contact_person("John Smith", "Acme", RoleTitle::HrManager)
        .await
        .unwrap();

    let history = orch.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].outcome, AttemptOutcome::MessageSent);
    assert_eq!(history[1].outcome, AttemptOutcome::NoMessageAccess);
}

#[tokio::test]
async fn attempt_volume_is_bounded_by_companies_roles_and_the_result_cap() {
    let surface = sources::surface();
    let companies: Vec<String> = (1..=3).map(|i| format!("Company{i}")).collect();

    let mut session = FakeSession::new().on_page(surface.people_search_url, search_page());
    for company in &companies {
        // Five results registered; only the first three may be inspected.
        let cards = (1..=5)
            .map(|i| person_card(&format!("Person{i} {company}"), None))
            .collect();
        session = session.on_query(
            &people_query(RoleTitle::TalentAcquisition, company),
            results_page(cards),
        );
    }

    let dir = tempfile::tempdir().unwrap();
    let prompt = ScriptedPrompt::allow_all();
    let mut orch = orchestrator(&session, &prompt, store_path(&dir), CancelFlag::new());

    orch.run_all(&companies).await.unwrap();

    // ≤ companies × roles × result cap, and here exactly 3 × 1 × 3.
    assert_eq!(orch.history().len(), 9);
    assert!(orch
        .history()
        .iter()
        .all(|a| a.outcome == AttemptOutcome::SkippedAlreadyConnected));
}

#[tokio::test]
async fn an_interrupt_flushes_the_partial_log_and_cleans_up() {
    let surface = sources::surface();
    let companies: Vec<String> = (1..=10).map(|i| format!("Company{i}")).collect();
    let cancel = CancelFlag::new();

    let mut session = FakeSession::new().on_page(surface.people_search_url, search_page());
    for company in &companies {
        session = session.on_query(
            &people_query(RoleTitle::TalentAcquisition, company),
            results_page(vec![person_card(&format!("Contact {company}"), None)]),
        );
    }
    // Each company costs two navigations (search page + submitted query);
    // tripping on the seventh lands mid-company-4, before it acts.
    let session = session.cancel_after_navigations(7, cancel.clone());

    let dir = tempfile::tempdir().unwrap();
    let store = store_path(&dir);
    let prompt = ScriptedPrompt::allow_all();
    let mut orch = orchestrator(&session, &prompt, store.clone(), cancel);

    let err = orch.run_all(&companies).await.unwrap_err();
    assert!(err.to_string().contains("interrupted"));

    // Exactly the first three companies' attempts, flushed to the store.
    assert_eq!(orch.history().len(), 3);
    orch.flush().unwrap();
    let stored = std::fs::read_to_string(&store).unwrap();
    assert_eq!(stored.lines().count(), 4); // header + 3 rows
    for i in 1..=3 {
        assert!(stored.contains(&format!("Company{i}")));
    }
    assert!(!stored.contains("Company4"));

    assert!(session.all_scratch_released());
    assert!(session.focused_primary());
}

#[tokio::test]
async fn applied_policy_changes_the_scanned_roles_mid_session() {
    let surface = sources::surface();
    let session = FakeSession::new()
        .on_page(surface.people_search_url, search_page())
        .on_query(
            &people_query(RoleTitle::HrManager, "Acme"),
            results_page(vec![person_card("Jane Doe", None)]),
        );

    let dir = tempfile::tempdir().unwrap();
    let prompt = ScriptedPrompt::allow_all();
    let mut orch = orchestrator(&session, &prompt, store_path(&dir), CancelFlag::new());

    let mut policy = test_policy();
    policy.roles = vec![RoleTitle::HrManager];
    orch.apply_policy(policy);

    orch.run_all(&["Acme".to_string()]).await.unwrap();

    assert_eq!(orch.history().len(), 1);
    assert_eq!(orch.history()[0].role_title, RoleTitle::HrManager);
}

#[tokio::test]
async fn seeded_runs_type_identical_notes() {
    let surface = sources::surface();
    let build = || {
        FakeSession::new()
            .on_page(surface.people_search_url, search_page())
            .on_query(
                &people_query(RoleTitle::TalentAcquisition, "Acme"),
                results_page(vec![person_card("Jane Doe", Some("modal:jane"))]),
            )
            .on_page("modal:jane", note_modal())
    };

    let dir = tempfile::tempdir().unwrap();
    let prompt = ScriptedPrompt::allow_all();

    let session_a = build();
    let mut orch_a = orchestrator(&session_a, &prompt, dir.path().join("a.csv"), CancelFlag::new());
    orch_a.run_all(&["Acme".to_string()]).await.unwrap();

    let session_b = build();
    let mut orch_b = orchestrator(&session_b, &prompt, dir.path().join("b.csv"), CancelFlag::new());
    orch_b.run_all(&["Acme".to_string()]).await.unwrap();

    assert_eq!(session_a.typed_values(), session_b.typed_values());
}
