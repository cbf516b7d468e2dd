// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
//! End-to-end coordinator behavior with scripted confirmations: ordering,
//! rollback, and stale-response discard under overlapping triggers.

use plume_app_core::notice::NoticeBoard;
use plume_dry_tests::{RecordingObserver, ScriptedConfirm};
use plume_optimistic::{
    ActionState, ConfirmError, Coordinator, CoordinatorEvent, Generation, NoticeObserver,
    Settlement, WithTimeout,
};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn offline() -> ConfirmError {
    ConfirmError::Unavailable("offline".into())
}

fn likes(initial: ActionState) -> (Coordinator, ScriptedConfirm, RecordingObserver) {
    let confirm = ScriptedConfirm::manual();
    let recorder = RecordingObserver::new();
    let coordinator = Coordinator::builder(initial)
        .label("post-1/like")
        .observer(recorder.clone())
        .build(confirm.clone());
    (coordinator, confirm, recorder)
}

#[tokio::test]
async fn like_confirmed_keeps_optimistic_value() {
    let (c, confirm, _) = likes(ActionState::new(false, 10));
    let t = c.trigger();
    assert_eq!(c.state(), ActionState::new(true, 11));

    assert!(confirm.succeed(t.generation(), ActionState::new(true, 11)));
    assert_eq!(
        t.settled().await,
        Settlement::Confirmed(ActionState::new(true, 11))
    );
    assert_eq!(c.state(), ActionState::new(true, 11));
    assert!(!c.is_pending());
}

#[tokio::test]
async fn unlike_rejected_rolls_back() {
    let (c, confirm, recorder) = likes(ActionState::new(true, 5));
    let t = c.trigger();
    assert_eq!(c.state(), ActionState::new(false, 4));

    confirm.fail(t.generation(), offline());
    t.settled().await;
    assert_eq!(c.state(), ActionState::new(true, 5));
    assert_eq!(recorder.rollbacks(), 1);
}

#[tokio::test]
async fn server_truth_replaces_optimistic_guess() {
    let (c, confirm, _) = likes(ActionState::new(false, 10));
    let t = c.trigger();
    // other readers liked the post meanwhile
    confirm.succeed(t.generation(), ActionState::new(true, 17));
    t.settled().await;
    assert_eq!(c.state(), ActionState::new(true, 17));
}

#[tokio::test]
async fn each_trigger_gets_a_fresh_increasing_generation() {
    let (c, confirm, _) = likes(ActionState::default());
    let gens: Vec<Generation> = (0..5).map(|_| c.trigger().generation()).collect();
    assert_eq!(gens[0], Generation::FIRST);
    assert!(gens.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(confirm.parked(), gens);
    assert_eq!(c.current_generation(), gens.last().copied());
}

#[tokio::test]
async fn confirm_receives_pre_optimistic_state() {
    let (c, confirm, _) = likes(ActionState::new(false, 3));
    c.trigger();
    c.trigger();
    let reqs = confirm.requests();
    assert_eq!(reqs[0].prior, ActionState::new(false, 3));
    assert_eq!(reqs[0].requested, ActionState::new(true, 4));
    assert_eq!(reqs[1].prior, ActionState::new(true, 4));
    assert_eq!(reqs[1].requested, ActionState::new(false, 3));
}

#[tokio::test]
async fn late_success_of_older_trigger_is_discarded() {
    let (c, confirm, _) = likes(ActionState::new(false, 10));
    let t1 = c.trigger();
    let t2 = c.trigger();

    confirm.succeed(t2.generation(), ActionState::new(false, 10));
    assert!(t2.settled().await.applied());
    confirm.succeed(t1.generation(), ActionState::new(true, 11));
    assert_eq!(t1.settled().await, Settlement::Discarded { error: None });

    assert_eq!(c.state(), ActionState::new(false, 10));
}

#[tokio::test]
async fn late_failure_of_older_trigger_does_not_roll_back() {
    let (c, confirm, recorder) = likes(ActionState::new(false, 10));
    let t1 = c.trigger();
    let t2 = c.trigger();

    confirm.succeed(t2.generation(), ActionState::new(false, 10));
    t2.settled().await;
    confirm.fail(t1.generation(), offline());
    t1.settled().await;

    assert_eq!(c.state(), ActionState::new(false, 10));
    assert_eq!(recorder.rollbacks(), 0);
}

#[tokio::test]
async fn older_response_arriving_first_cannot_settle_newer_trigger() {
    let (c, confirm, _) = likes(ActionState::new(false, 10));
    let t1 = c.trigger();
    let t2 = c.trigger();

    confirm.succeed(t1.generation(), ActionState::new(true, 11));
    t1.settled().await;
    // newest trigger is still unconfirmed; its optimistic state stands
    assert!(c.is_pending());
    assert_eq!(c.state(), ActionState::new(false, 10));

    confirm.fail(t2.generation(), offline());
    t2.settled().await;
    // rollback target is the state right before t2's optimistic update
    assert_eq!(c.state(), ActionState::new(true, 11));
    assert!(!c.is_pending());
}

#[tokio::test]
async fn events_arrive_in_causal_order() {
    let (c, confirm, recorder) = likes(ActionState::new(false, 0));
    let t = c.trigger();
    confirm.succeed(t.generation(), ActionState::new(true, 1));
    t.settled().await;

    let events = recorder.events();
    assert!(matches!(events[0], CoordinatorEvent::Optimistic { .. }));
    assert!(matches!(
        events[1],
        CoordinatorEvent::Settled {
            settlement: Settlement::Confirmed(_),
            ..
        }
    ));
}

#[tokio::test]
async fn reset_snapshot_makes_pending_triggers_stale() {
    let (c, confirm, recorder) = likes(ActionState::new(false, 2));
    let t = c.trigger();
    c.reset(ActionState::new(true, 40));
    assert!(!c.is_pending());

    confirm.fail(t.generation(), offline());
    t.settled().await;
    assert_eq!(c.state(), ActionState::new(true, 40));
    assert_eq!(recorder.rollbacks(), 0);
}

#[tokio::test]
async fn idle_waits_for_newest_trigger() {
    let (c, confirm, _) = likes(ActionState::new(false, 0));
    let t1 = c.trigger();
    let t2 = c.trigger();
    let waiter = {
        let c = c.clone();
        tokio::spawn(async move { c.idle().await })
    };
    confirm.succeed(t1.generation(), ActionState::new(true, 1));
    confirm.succeed(t2.generation(), ActionState::new(false, 0));
    assert_eq!(waiter.await.unwrap(), ActionState::new(false, 0));
}

#[tokio::test]
async fn rollback_posts_failure_notice() {
    let board = Arc::new(Mutex::new(NoticeBoard::new(3)));
    let confirm = ScriptedConfirm::rejecting(ConfirmError::Rejected("post locked".into()));
    let c = Coordinator::builder(ActionState::new(false, 1))
        .observer(NoticeObserver::new(
            board.clone(),
            "Failed to toggle like",
            Duration::from_secs(4),
        ))
        .build(confirm);

    c.trigger().settled().await;
    let views = board.lock().unwrap().visible(Instant::now());
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].title, "Failed to toggle like");
    assert_eq!(c.state(), ActionState::new(false, 1));
}

#[tokio::test(start_paused = true)]
async fn timed_out_confirmation_rolls_back() {
    let never = ScriptedConfirm::manual();
    let c = Coordinator::new(
        ActionState::new(true, 8),
        WithTimeout::new(never.clone(), Duration::from_secs(10)),
    );
    let settlement = c.trigger().settled().await;
    assert!(matches!(
        settlement,
        Settlement::RolledBack {
            error: ConfirmError::TimedOut(_),
            ..
        }
    ));
    assert_eq!(c.state(), ActionState::new(true, 8));
    assert_eq!(never.parked().len(), 1);
}
