use super::*;

use client_core::{ResultSet, SlotFile};
use crate::controller::events::UiErrorCategory;

fn preview() -> PreviewImage {
    PreviewImage {
        width: 1,
        height: 1,
        rgba: vec![0, 0, 0, 255],
    }
}

fn load(state: &mut ShellState, slot: SlotId, name: &str, bytes: Vec<u8>) {
    let BackendCommand::LoadSlotFile { request, .. } =
        state.pick_slot_file(slot, PathBuf::from(name))
    else {
        panic!("expected a load command");
    };
    state.apply(UiEvent::SlotFileLoaded {
        slot,
        request,
        file: SlotFile::new(name, Some("image/png".into()), bytes),
        preview: Ok(preview()),
    });
}

fn ready_state() -> ShellState {
    let mut state = ShellState::new();
    load(&mut state, SlotId::Slot1, "a.png", vec![1]);
    load(&mut state, SlotId::Slot2, "b.png", vec![2]);
    state
}

fn submit(state: &mut ShellState) -> SubmissionId {
    match state.submit() {
        Some(BackendCommand::Combine(ticket)) => ticket.id,
        _ => panic!("expected a combine command"),
    }
}

fn results() -> ResultSet {
    [("a_result", "http://x/a.png"), ("b_result", "http://x/b.png")]
        .into_iter()
        .collect()
}

fn finish(state: &mut ShellState, id: SubmissionId, outcome: Result<ResultSet, CombineError>) -> Vec<BackendCommand> {
    state.apply(UiEvent::CombineFinished(CombineCompletion { id, outcome }))
}

#[test]
fn submit_is_gated_on_both_slots() {
    let mut state = ShellState::new();
    assert!(!state.can_submit());
    load(&mut state, SlotId::Slot1, "a.png", vec![1]);
    assert!(!state.can_submit());
    load(&mut state, SlotId::Slot2, "b.png", vec![2]);
    assert!(state.can_submit());
    assert_eq!(state.submit_label(), "Combine Images");
}

#[test]
fn submit_with_missing_slot_shows_validation_error() {
    let mut state = ShellState::new();
    load(&mut state, SlotId::Slot1, "a.png", vec![1]);
    assert!(state.submit().is_none());
    let OutcomeView::Error(error) = state.outcome() else {
        panic!("expected an error");
    };
    assert_eq!(error.message(), client_core::VALIDATION_ERROR_MESSAGE);
    assert_eq!(error.category(), UiErrorCategory::Validation);
}

#[test]
fn in_flight_blocks_second_submit_and_shows_loading() {
    let mut state = ready_state();
    submit(&mut state);
    assert!(!state.can_submit());
    assert_eq!(state.submit_label(), "Processing...");
    assert!(matches!(state.outcome(), OutcomeView::Loading));
    assert!(state.submit().is_none());
}

#[test]
fn success_schedules_one_fetch_per_card_in_order() {
    let mut state = ready_state();
    let id = submit(&mut state);
    let commands = finish(&mut state, id, Ok(results()));

    let keys: Vec<_> = commands
        .iter()
        .map(|cmd| match cmd {
            BackendCommand::FetchResultImage { submission_id, key, .. } => {
                assert_eq!(*submission_id, id);
                key.as_str()
            }
            _ => panic!("expected fetch commands"),
        })
        .collect();
    assert_eq!(keys, ["a_result", "b_result"]);

    let OutcomeView::Results(view) = state.outcome() else {
        panic!("expected results");
    };
    let labels: Vec<_> = view.visible().map(|card| card.label.as_str()).collect();
    assert_eq!(labels, ["A", "B"]);
    assert_eq!(view.image_state("a_result"), ImageLoadState::Pending);
}

#[test]
fn failed_image_hides_only_its_card() {
    let mut state = ready_state();
    let id = submit(&mut state);
    finish(&mut state, id, Ok(results()));

    state.apply(UiEvent::ResultImageFailed {
        submission_id: id,
        key: "a_result".into(),
        url: "http://x/a.png".into(),
        reason: "404".into(),
    });
    state.apply(UiEvent::ResultImageLoaded {
        submission_id: id,
        key: "b_result".into(),
        image: preview(),
        original_bytes: vec![9],
    });

    let OutcomeView::Results(view) = state.outcome() else {
        panic!("expected results");
    };
    let keys: Vec<_> = view.visible().map(|card| card.key.as_str()).collect();
    assert_eq!(keys, ["b_result"]);
    assert_eq!(state.submission().phase(), Phase::Succeeded);
}

#[test]
fn empty_result_set_renders_no_cards() {
    let mut state = ready_state();
    let id = submit(&mut state);
    assert!(finish(&mut state, id, Ok(ResultSet::new())).is_empty());
    let OutcomeView::Results(view) = state.outcome() else {
        panic!("expected results");
    };
    assert_eq!(view.visible().count(), 0);
    assert_eq!(view.empty_message(), Some("The server returned no results."));
}

#[test]
fn all_images_failing_is_not_reported_as_no_results() {
    let mut state = ready_state();
    let id = submit(&mut state);
    finish(&mut state, id, Ok(results()));
    for key in ["a_result", "b_result"] {
        state.apply(UiEvent::ResultImageFailed {
            submission_id: id,
            key: key.into(),
            url: format!("http://x/{key}.png"),
            reason: "404".into(),
        });
    }

    let OutcomeView::Results(view) = state.outcome() else {
        panic!("expected results");
    };
    assert_eq!(view.cards.len(), 2);
    assert_eq!(
        view.empty_message(),
        Some("None of the result images could be loaded.")
    );
}

#[test]
fn unqueued_file_load_stops_the_slot_spinner() {
    let mut state = ShellState::new();
    let BackendCommand::LoadSlotFile { slot, request, .. } =
        state.pick_slot_file(SlotId::Slot2, PathBuf::from("b.png"))
    else {
        panic!("expected a load command");
    };
    assert!(state.is_loading_slot(slot));

    state.slot_load_not_queued(slot, request);
    assert!(!state.is_loading_slot(slot));
    assert!(!state.can_submit());
}

#[test]
fn unqueued_stale_load_keeps_newer_pick_pending() {
    let mut state = ShellState::new();
    let BackendCommand::LoadSlotFile { request: old, .. } =
        state.pick_slot_file(SlotId::Slot1, PathBuf::from("old.png"))
    else {
        panic!("expected a load command");
    };
    state.pick_slot_file(SlotId::Slot1, PathBuf::from("new.png"));

    state.slot_load_not_queued(SlotId::Slot1, old);
    assert!(state.is_loading_slot(SlotId::Slot1));
}

#[test]
fn non_image_pick_warns_in_status() {
    let mut state = ShellState::new();
    state.pick_slot_file(SlotId::Slot1, PathBuf::from("/tmp/notes.txt"));
    assert!(state.status.contains("notes.txt"), "{}", state.status);
    assert!(state.is_loading_slot(SlotId::Slot1));

    let mut state = ShellState::new();
    state.pick_slot_file(SlotId::Slot1, PathBuf::from("/tmp/photo.PNG"));
    assert!(state.status.is_empty());
}

#[test]
fn server_error_replaces_results() {
    let mut state = ready_state();
    let id = submit(&mut state);
    finish(&mut state, id, Ok(results()));

    let id = submit(&mut state);
    finish(
        &mut state,
        id,
        Err(CombineError::Server {
            status: 400,
            message: Some("bad format".into()),
        }),
    );
    let OutcomeView::Error(error) = state.outcome() else {
        panic!("expected an error");
    };
    assert_eq!(error.message(), "bad format");
    assert_eq!(error.category(), UiErrorCategory::Server);
    assert_eq!(error.context(), UiErrorContext::Combine);
}

#[test]
fn reselecting_a_slot_keeps_results() {
    let mut state = ready_state();
    let id = submit(&mut state);
    finish(&mut state, id, Ok(results()));

    load(&mut state, SlotId::Slot1, "c.png", vec![3]);
    assert!(matches!(state.outcome(), OutcomeView::Results(_)));
    assert_eq!(state.preview(SlotId::Slot1).map(|p| p.generation), Some(2));
}

#[test]
fn reset_discards_late_response() {
    let mut state = ready_state();
    let id = submit(&mut state);
    state.reset();
    assert!(matches!(state.outcome(), OutcomeView::Idle));
    assert!(state.can_submit());

    assert!(finish(&mut state, id, Ok(results())).is_empty());
    assert!(matches!(state.outcome(), OutcomeView::Idle));
}

#[test]
fn superseded_file_load_is_ignored() {
    let mut state = ShellState::new();
    let BackendCommand::LoadSlotFile { request: first, .. } =
        state.pick_slot_file(SlotId::Slot1, PathBuf::from("old.png"))
    else {
        panic!("expected a load command");
    };
    load(&mut state, SlotId::Slot1, "new.png", vec![1]);

    state.apply(UiEvent::SlotFileLoaded {
        slot: SlotId::Slot1,
        request: first,
        file: SlotFile::new("old.png", None, vec![7]),
        preview: Ok(preview()),
    });
    assert_eq!(
        state.slots().file(SlotId::Slot1).map(SlotFile::name),
        Some("new.png")
    );
    assert!(!state.is_loading_slot(SlotId::Slot1));
}

#[test]
fn zero_byte_file_leaves_slot_unfilled() {
    let mut state = ready_state();
    load(&mut state, SlotId::Slot2, "empty.png", Vec::new());
    assert!(!state.can_submit());
    assert!(state.preview(SlotId::Slot2).is_none());
}

#[test]
fn result_images_for_old_submissions_are_ignored() {
    let mut state = ready_state();
    let old = submit(&mut state);
    finish(&mut state, old, Ok(results()));
    let current = submit(&mut state);
    finish(&mut state, current, Ok(results()));

    state.apply(UiEvent::ResultImageFailed {
        submission_id: old,
        key: "a_result".into(),
        url: "http://x/a.png".into(),
        reason: "gone".into(),
    });
    let OutcomeView::Results(view) = state.outcome() else {
        panic!("expected results");
    };
    assert_eq!(view.image_state("a_result"), ImageLoadState::Pending);
}
