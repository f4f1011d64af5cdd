//! New-contact queue and reconciliation behavior, driven end to end against
//! a scripted toolkit under paused time.

mod common;

use std::time::Duration;

use common::*;
use cti_bridge::prelude::*;

const HOST: &str = "https://org.lightning.force.com";

fn contact_modal_url() -> String {
    format!(
        "{}/lightning/o/Contact/new?backgroundContext=%2Flightning%2Fpage%2Fhome",
        HOST
    )
}

fn home_url() -> String {
    format!("{}/lightning/page/home", HOST)
}

fn record_url(id: &str) -> String {
    format!("{}/lightning/r/Contact/{}/view", HOST, id)
}

/// A page that is neither a modal, the background page, nor a record view.
fn elsewhere_url() -> String {
    format!("{}/lightning/r/Account/001zz/view", HOST)
}

#[tokio::test(start_paused = true)]
async fn no_match_opens_the_modal_and_queues_the_call() {
    let mut h = harness();
    let call = incoming_call(1, "555-1234");

    h.engine.on_call_updated(call.clone()).await;

    let stats = h.engine.stats().await;
    assert_eq!(stats.queued_contacts, 1);
    assert_eq!(stats.opened_contacts, 1);
    assert!(h.engine.is_queued(&call.key()).await);
    assert_eq!(h.toolkit.deferred_pops(), 1);
    assert!(h.call_info_events().is_empty());

    // A fresh arrival surfaces the softphone panel.
    assert!(h
        .toolkit
        .recorded()
        .iter()
        .any(|c| matches!(c, ToolkitCall::PanelVisibility(true))));
}

#[tokio::test(start_paused = true)]
async fn second_unmatched_call_waits_for_the_first_modal() {
    let mut h = harness();

    h.engine.on_call_updated(incoming_call(1, "555-0001")).await;
    h.engine.on_call_updated(incoming_call(2, "555-0002")).await;

    let stats = h.engine.stats().await;
    assert_eq!(stats.queued_contacts, 2);
    assert_eq!(stats.opened_contacts, 1);
    // Only the first entry's modal was requested.
    assert_eq!(h.toolkit.deferred_pops(), 1);
    assert!(h.call_info_events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn pop_is_suppressed_while_the_agent_sits_on_a_modal_page() {
    let mut h = harness();

    // Agent already has a new-record page open when the call arrives.
    h.engine.on_navigation_changed(nav(&contact_modal_url())).await;
    h.engine.on_call_updated(incoming_call(1, "555-1234")).await;

    let stats = h.engine.stats().await;
    assert_eq!(stats.queued_contacts, 1);
    assert_eq!(stats.opened_contacts, 0);
    assert_eq!(h.toolkit.deferred_pops(), 0);

    // Leaving the modal page lets the queue run after the settle delay.
    h.engine.on_navigation_changed(nav(&home_url())).await;
    assert_eq!(h.toolkit.deferred_pops(), 0);
    tokio::time::sleep(Duration::from_millis(2_600)).await;
    assert_eq!(h.toolkit.deferred_pops(), 1);
    assert_eq!(h.engine.stats().await.opened_contacts, 1);
    assert!(h.call_info_events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn navigation_save_attaches_the_new_record() {
    let mut h = harness();
    let call = incoming_call(1, "555-1234");

    h.engine.on_call_updated(call.clone()).await;
    h.engine.on_navigation_changed(nav(&contact_modal_url())).await;
    h.engine
        .on_navigation_changed(nav_with_record(
            &record_url("003xx"),
            "003xx",
            "Jane Doe",
            "Contact",
        ))
        .await;

    let infos = h.call_info_events();
    assert_eq!(infos.len(), 1);
    let (info_call, contacts) = &infos[0];
    assert_eq!(info_call.key(), call.key());
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].id, "003xx");
    assert_eq!(contacts[0].name, "Jane Doe [Contact]");

    assert_eq!(h.engine.stats().await.queued_contacts, 0);
}

#[tokio::test(start_paused = true)]
async fn navigation_cancel_removes_the_entry_silently() {
    let mut h = harness();

    h.engine.on_call_updated(incoming_call(1, "555-1234")).await;
    h.engine.on_navigation_changed(nav(&contact_modal_url())).await;
    // Back to the page recorded beneath the modal: a cancel.
    h.engine.on_navigation_changed(nav(&home_url())).await;

    assert!(h.call_info_events().is_empty());
    assert_eq!(h.engine.stats().await.queued_contacts, 0);
}

#[tokio::test(start_paused = true)]
async fn repeated_navigation_to_the_same_url_has_no_side_effects() {
    let mut h = harness();
    let call = incoming_call(1, "555-1234");

    h.engine.on_call_updated(call.clone()).await;
    h.engine.on_navigation_changed(nav(&contact_modal_url())).await;
    let save = nav_with_record(&record_url("003xx"), "003xx", "Jane Doe", "Contact");
    h.engine.on_navigation_changed(save.clone()).await;
    assert_eq!(h.call_info_events().len(), 1);
    let calls_before = h.toolkit.recorded().len();

    // The stream fires a duplicate notification with no page change.
    h.engine.on_navigation_changed(save).await;

    assert!(h.widget_events().is_empty());
    assert_eq!(h.toolkit.recorded().len(), calls_before);
}

#[tokio::test(start_paused = true)]
async fn the_next_queued_entry_is_promoted_after_the_settle_delay() {
    let h = harness();

    h.engine.on_call_updated(incoming_call(1, "555-0001")).await;
    h.engine.on_call_updated(incoming_call(2, "555-0002")).await;
    assert_eq!(h.toolkit.deferred_pops(), 1);

    h.engine.on_navigation_changed(nav(&contact_modal_url())).await;
    h.engine.on_navigation_changed(nav(&home_url())).await; // cancel of entry 1

    // Entry 2 is not promoted until the settle delay has passed.
    assert_eq!(h.toolkit.deferred_pops(), 1);
    tokio::time::sleep(Duration::from_millis(2_600)).await;
    assert_eq!(h.toolkit.deferred_pops(), 2);

    let stats = h.engine.stats().await;
    assert_eq!(stats.queued_contacts, 1);
    assert_eq!(stats.opened_contacts, 1);
}

/// Builds the state where one opened entry has been demoted by a later
/// promotion: entry A resolves, B is promoted immediately on arrival, C
/// arrives and is promoted by the queue run, demoting B while its modal
/// outcome is still unknown.
async fn demoted_entry_setup(h: &mut Harness, b_number: &str, c_number: &str) -> (Call, Call) {
    h.engine.on_call_updated(incoming_call(1, "555-0001")).await;
    h.engine.on_navigation_changed(nav(&contact_modal_url())).await;
    // Agent wanders off the modal without saving or cancelling cleanly.
    h.engine.on_navigation_changed(nav(&elsewhere_url())).await;
    assert_eq!(h.engine.stats().await.queued_contacts, 0);

    let call_b = incoming_call(2, b_number);
    let call_c = incoming_call(3, c_number);
    h.engine.on_call_updated(call_b.clone()).await; // promoted immediately
    h.engine.on_call_updated(call_c.clone()).await; // queued behind B

    // The settle-delay queue run promotes C, demoting B.
    tokio::time::sleep(Duration::from_millis(2_600)).await;
    assert_eq!(h.toolkit.deferred_pops(), 3);

    // C's modal resolves as a save.
    h.engine.on_navigation_changed(nav(&contact_modal_url())).await;
    h.engine
        .on_navigation_changed(nav_with_record(
            &record_url("003cc"),
            "003cc",
            "Cara Voss",
            "Contact",
        ))
        .await;

    (call_b, call_c)
}

#[tokio::test(start_paused = true)]
async fn re_poll_resolves_a_demoted_entry_and_stops_its_timer() {
    let mut h = harness();
    // B: fresh search misses, first poll misses, second poll matches.
    h.toolkit.script_search(
        "555-0002",
        vec![
            no_match_response(),
            no_match_response(),
            match_response("003bb", "Bob Ray", "Contact"),
        ],
    );

    let (call_b, call_c) = demoted_entry_setup(&mut h, "555-0002", "555-0003").await;

    let infos = h.call_info_events();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].0.key(), call_c.key());

    // Default schedule: polls every 3 s. First poll misses...
    tokio::time::sleep(Duration::from_millis(3_100)).await;
    assert_eq!(h.toolkit.searches_for("555-0002"), 2);
    assert!(h.engine.is_queued(&call_b.key()).await);

    // ...second poll matches: entry resolved, call-info fired.
    tokio::time::sleep(Duration::from_millis(3_000)).await;
    let infos = h.call_info_events();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].0.key(), call_b.key());
    assert_eq!(infos[0].1[0].name, "Bob Ray [Contact]");
    assert!(!h.engine.is_queued(&call_b.key()).await);

    // The timer is gone: no further polls ever fire for this identity.
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(h.toolkit.searches_for("555-0002"), 3);
    assert_eq!(h.engine.stats().await.poll_tasks, 0);
}

#[tokio::test(start_paused = true)]
async fn re_poll_gives_up_after_the_attempt_budget() {
    let mut h = harness();
    // B never matches: every poll misses.
    let (call_b, _) = demoted_entry_setup(&mut h, "555-0002", "555-0003").await;
    assert_eq!(h.toolkit.searches_for("555-0002"), 1);

    // Default budget: 5 attempts, 3 s apart. Let them all run.
    tokio::time::sleep(Duration::from_secs(16)).await;
    assert_eq!(h.toolkit.searches_for("555-0002"), 6);
    assert!(!h.engine.is_queued(&call_b.key()).await);

    // No 6th poll, ever.
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(h.toolkit.searches_for("555-0002"), 6);
    assert_eq!(h.engine.stats().await.poll_tasks, 0);

    // Giving up is silent.
    assert!(h.call_info_events().iter().all(|(c, _)| c.key() != call_b.key()));
}

#[tokio::test(start_paused = true)]
async fn entry_matching_the_resolved_call_polls_on_the_focused_schedule() {
    let mut h = harness();
    // B and C are calls from the same number; once C's record is saved, B's
    // re-search should run on the focused 1 s cadence and find it.
    h.toolkit.script_search(
        "555-7777",
        vec![
            no_match_response(), // B fresh arrival
            no_match_response(), // C fresh arrival
            no_match_response(), // focused poll 1
            no_match_response(), // focused poll 2
            match_response("003jj", "Jane Doe", "Contact"), // focused poll 3
        ],
    );

    let (call_b, _) = demoted_entry_setup(&mut h, "555-7777", "555-7777").await;
    h.call_info_events(); // drain C's save notification

    // Three focused polls fit in just over three seconds; the default
    // schedule would have managed one.
    tokio::time::sleep(Duration::from_millis(3_200)).await;
    assert_eq!(h.toolkit.searches_for("555-7777"), 5);
    assert!(!h.engine.is_queued(&call_b.key()).await);

    let infos = h.call_info_events();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].0.key(), call_b.key());
    assert_eq!(infos[0].1[0].id, "003jj");
}

#[tokio::test(start_paused = true)]
async fn logout_clears_calls_queue_and_timers() {
    let mut h = harness();
    // Reach a state with a tracked call, two queue entries, and a live
    // poll timer.
    let (call_b, _) = demoted_entry_setup(&mut h, "555-0002", "555-0003").await;
    h.engine.on_call_updated(incoming_call(4, "555-0004")).await;
    assert!(h.engine.is_queued(&call_b.key()).await);
    let searches_before = h.toolkit.searches_for("555-0002");

    h.engine.on_logged_out().await;

    let stats = h.engine.stats().await;
    assert_eq!(stats.active_calls, 0);
    assert_eq!(stats.queued_contacts, 0);
    assert_eq!(stats.opened_contacts, 0);
    assert_eq!(stats.poll_tasks, 0);
    assert!(h
        .toolkit
        .recorded()
        .iter()
        .any(|c| matches!(c, ToolkitCall::DisableClickToDial)));

    // A new login starts from empty state, and no stale timer ever fires.
    h.engine.on_logged_in().await;
    tokio::time::sleep(Duration::from_secs(60)).await;
    let stats = h.engine.stats().await;
    assert_eq!(stats.active_calls, 0);
    assert_eq!(stats.queued_contacts, 0);
    assert_eq!(h.toolkit.searches_for("555-0002"), searches_before);
}
