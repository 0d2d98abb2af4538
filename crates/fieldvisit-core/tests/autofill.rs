//! Stale-lookup guard and autofill form behaviour.

use fieldvisit_core::{
    Autofill, DirectoryLookup, FormField, LookupField, LookupTracker, OpenVisit, Resolution,
    ResolutionSource, VisitError, VisitLifecycle,
};
use fieldvisit_protocol::BusinessInfo;
use fieldvisit_store::{InMemoryRecordStore, RecordStore};
use fieldvisit_test_utils::{RecordingSink, ScriptedDirectory};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn info(address: &str) -> BusinessInfo {
    BusinessInfo {
        address: address.to_string(),
        contact: "+27 11 000 0000".to_string(),
        distance_km: 10.0,
    }
}

fn hit(address: &str) -> Resolution {
    Resolution {
        info: info(address),
        source: ResolutionSource::Directory("Test".to_string()),
    }
}

#[test]
fn tracker_tags_requests_in_issue_order() {
    let tracker = LookupTracker::new();
    let first = tracker.issue(LookupField::BusinessName);
    let second = tracker.issue(LookupField::BusinessName);
    assert_eq!((first.sequence, second.sequence), (1, 2));
    assert!(!tracker.is_current(&first));
    assert!(tracker.is_current(&second));
}

#[tokio::test]
async fn later_request_wins_when_earlier_resolves_last() {
    let autofill = Autofill::new(Arc::new(ScriptedDirectory::new()), 3);
    let first = autofill.on_business_name_input("Shop").expect("first ticket");
    let second = autofill
        .on_business_name_input("Shoprite")
        .expect("second ticket");
    assert_eq!((first.sequence, second.sequence), (1, 2));

    assert!(autofill.apply_resolution(second, hit("from request 2")));
    assert!(!autofill.apply_resolution(first, hit("from request 1")));
    assert_eq!(autofill.form().address, "from request 2");
}

#[tokio::test(start_paused = true)]
async fn slow_stale_lookup_never_overwrites_newer_result() {
    let directory = ScriptedDirectory::new()
        .with_response("Shop", Duration::from_millis(3000), info("stale address"))
        .with_response("Shoprite", Duration::from_millis(500), info("fresh address"));
    let directory = Arc::new(directory);
    let sink = Arc::new(RecordingSink::new());
    let autofill = Autofill::new(directory.clone(), 3).with_notifier(sink.clone());

    autofill.on_business_name_input("Shop").expect("first");
    tokio::time::sleep(Duration::from_millis(100)).await;
    autofill.on_business_name_input("Shoprite").expect("second");
    autofill.settle().await;
    tokio::time::sleep(Duration::from_millis(5000)).await;

    let form = autofill.form();
    assert_eq!(form.business_name, "Shoprite");
    assert_eq!(form.address, "fresh address");
    assert_eq!(sink.titles(), vec!["Business Found!"]);
    assert_eq!(directory.calls(), vec!["Shop", "Shoprite"]);
}

#[tokio::test(start_paused = true)]
async fn short_input_cancels_pending_lookup() {
    let directory = Arc::new(
        ScriptedDirectory::new().with_response("Shoprite", Duration::from_millis(500), info("x")),
    );
    let autofill = Autofill::new(directory.clone(), 3);

    autofill.on_business_name_input("Shoprite").expect("ticket");
    assert_eq!(autofill.on_business_name_input("Sh"), None);
    tokio::time::sleep(Duration::from_millis(1000)).await;

    let form = autofill.form();
    assert_eq!(form.business_name, "Sh");
    assert_eq!(form.address, "");
}

#[tokio::test(start_paused = true)]
async fn names_of_two_characters_or_fewer_never_look_up() {
    let directory = Arc::new(ScriptedDirectory::new());
    let autofill = Autofill::new(directory.clone(), 3);
    for input in ["", "S", "Sh", "  Sh  "] {
        assert_eq!(autofill.on_business_name_input(input), None);
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(directory.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn discarded_view_ignores_late_results() {
    let directory = Arc::new(
        ScriptedDirectory::new().with_response("Checkers", Duration::from_millis(2000), info("x")),
    );
    let autofill = Autofill::new(directory, 3);
    let ticket = autofill.on_business_name_input("Checkers").expect("ticket");
    autofill.discard();
    tokio::time::sleep(Duration::from_millis(3000)).await;

    assert_eq!(autofill.form().address, "");
    assert!(!autofill.apply_resolution(ticket, hit("late")));
}

#[tokio::test(start_paused = true)]
async fn directory_lookup_fills_form_and_submit_opens_visit() {
    let sink = Arc::new(RecordingSink::new());
    let directory = Arc::new(DirectoryLookup::new(Duration::from_millis(2000)));
    let store = Arc::new(InMemoryRecordStore::new());
    let lifecycle = VisitLifecycle::new(store.clone(), directory.clone());
    let autofill = Autofill::new(directory, 3).with_notifier(sink.clone());

    autofill.on_business_name_input("Pick n Pay").expect("ticket");
    autofill.settle().await;
    let form = autofill.form();
    assert_eq!(form.address, "123 Main Road, Cape Town, Western Cape, 8001");
    assert_eq!(form.distance_km, "15.2");
    assert_eq!(
        sink.last().expect("notification").message,
        "Auto-populated details for Pick n Pay"
    );

    autofill.set_field(FormField::Contact, "+27 21 000 0000");
    let record = autofill.submit(&lifecycle).await.expect("submit");
    assert_eq!(record.contact, "+27 21 000 0000");
    assert_eq!(record.distance_km, 15.2);
    assert_eq!(store.list().expect("list").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn unknown_business_reports_estimated_details() {
    let sink = Arc::new(RecordingSink::new());
    let directory = Arc::new(DirectoryLookup::new(Duration::from_millis(10)).with_seed(5));
    let autofill = Autofill::new(directory, 3).with_notifier(sink.clone());

    autofill.on_business_name_input("Acme Plumbing").expect("ticket");
    autofill.settle().await;

    assert!(autofill.form().is_complete());
    assert_eq!(sink.titles(), vec!["Business Located"]);
}

#[tokio::test]
async fn incomplete_form_is_not_submitted() {
    let sink = Arc::new(RecordingSink::new());
    let store = Arc::new(InMemoryRecordStore::new());
    let directory = Arc::new(ScriptedDirectory::new());
    let lifecycle = VisitLifecycle::new(store.clone(), directory.clone());
    let autofill = Autofill::new(directory, 3).with_notifier(sink.clone());

    autofill.on_business_name_input("Shoprite");
    autofill.set_field(FormField::Address, "456 Church Street");
    let err = autofill.submit(&lifecycle).await.unwrap_err();
    assert!(matches!(err, VisitError::Validation(_)));

    autofill.set_field(FormField::Contact, "+27 11 517 4000");
    autofill.set_field(FormField::DistanceKm, "far");
    let err = autofill.submit(&lifecycle).await.unwrap_err();
    assert!(matches!(err, VisitError::Validation(_)));

    assert_eq!(sink.titles(), vec!["Incomplete Form", "Incomplete Form"]);
    assert!(store.list().expect("list").is_empty());
    assert_eq!(
        lifecycle.open(OpenVisit::named("")).await.unwrap_err().title(),
        "Missing Information"
    );
}

#[tokio::test(start_paused = true)]
async fn attaching_a_notifier_keeps_pending_lookups_and_sequence() {
    let directory = Arc::new(
        ScriptedDirectory::new().with_response("Shoprite", Duration::from_millis(500), info("kept")),
    );
    let sink = Arc::new(RecordingSink::new());
    let autofill = Autofill::new(directory, 3);
    autofill.set_field(FormField::Contact, "typed before");
    let first = autofill.on_business_name_input("Shoprite").expect("ticket");

    let autofill = autofill.with_notifier(sink.clone());
    autofill.settle().await;

    let form = autofill.form();
    assert_eq!(form.address, "kept");
    assert_eq!(sink.titles(), vec!["Business Found!"]);
    let second = autofill.on_business_name_input("Shoprite").expect("ticket");
    assert_eq!((first.sequence, second.sequence), (1, 2));
}
