// Host-side tests for input buffering and key mapping.

use glam::Vec2;
use holo_window::core::*;

#[test]
fn key_mapping_covers_viewer_keys() {
    assert_eq!(
        key_action_for("ArrowLeft"),
        Some(KeyAction::Move(DirectionKey::Left))
    );
    assert_eq!(
        key_action_for("ArrowRight"),
        Some(KeyAction::Move(DirectionKey::Right))
    );
    assert_eq!(
        key_action_for("ArrowUp"),
        Some(KeyAction::Move(DirectionKey::Up))
    );
    assert_eq!(
        key_action_for("ArrowDown"),
        Some(KeyAction::Move(DirectionKey::Down))
    );
    assert_eq!(key_action_for("q"), Some(KeyAction::Move(DirectionKey::Closer)));
    assert_eq!(key_action_for("E"), Some(KeyAction::Move(DirectionKey::Farther)));
    assert_eq!(key_action_for("r"), Some(KeyAction::ResetView));
    assert_eq!(key_action_for("Escape"), Some(KeyAction::StopTracking));
    assert_eq!(key_action_for("h"), None);
    assert_eq!(key_action_for("Enter"), None);
}

#[test]
fn unknown_keys_are_not_consumed() {
    let mut input = InputState::default();
    assert!(!input.key_down("x"));
    assert!(!input.key_up("x"));
    let frame = input.drain();
    assert!(frame.held.is_empty());
    assert!(!frame.reset_requested);
}

#[test]
fn drag_accumulates_only_while_pointer_is_down() {
    let mut input = InputState::default();
    input.pointer_move(50.0, 50.0);
    assert_eq!(input.drain().pointer_delta, Vec2::ZERO);

    input.pointer_down(0, 10.0, 10.0);
    assert!(input.is_dragging());
    input.pointer_move(12.0, 11.0);
    input.pointer_move(15.0, 12.0);
    input.pointer_up();
    input.pointer_move(100.0, 100.0);
    assert!(!input.is_dragging());

    assert_eq!(input.drain().pointer_delta, Vec2::new(5.0, 2.0));
    assert_eq!(input.drain().pointer_delta, Vec2::ZERO);
}

#[test]
fn secondary_buttons_do_not_drag() {
    let mut input = InputState::default();
    input.pointer_down(2, 0.0, 0.0);
    input.pointer_move(40.0, 0.0);
    assert!(!input.is_dragging());
    assert_eq!(input.drain().pointer_delta, Vec2::ZERO);
}

#[test]
fn wheel_accumulates_until_drained() {
    let mut input = InputState::default();
    input.wheel(120.0);
    input.wheel(-20.0);
    input.wheel(f32::NAN);
    assert_eq!(input.drain().wheel_delta, 100.0);
    assert_eq!(input.drain().wheel_delta, 0.0);
}

#[test]
fn held_keys_persist_across_frames_until_released() {
    let mut input = InputState::default();
    assert!(input.key_down("ArrowLeft"));
    assert!(input.key_down("ArrowLeft"));
    assert!(input.key_down("q"));
    for _ in 0..3 {
        let frame = input.drain();
        assert!(frame.held.is_held(DirectionKey::Left));
        assert!(frame.held.is_held(DirectionKey::Closer));
        assert_eq!(frame.held.iter().count(), 2);
    }
    assert!(input.key_up("ArrowLeft"));
    let frame = input.drain();
    assert!(!frame.held.is_held(DirectionKey::Left));
    assert!(frame.held.is_held(DirectionKey::Closer));
}

#[test]
fn reset_and_stop_requests_fire_once() {
    let mut input = InputState::default();
    input.key_down("R");
    input.key_down("Escape");
    let frame = input.drain();
    assert!(frame.reset_requested);
    assert!(frame.stop_tracking_requested);
    assert!(frame.held.is_empty());
    let frame = input.drain();
    assert!(!frame.reset_requested);
    assert!(!frame.stop_tracking_requested);

    input.request_reset();
    assert!(input.drain().reset_requested);
}

#[test]
fn release_all_drops_keys_and_drag() {
    let mut input = InputState::default();
    input.key_down("ArrowUp");
    input.pointer_down(0, 0.0, 0.0);
    input.release_all();
    assert!(!input.is_dragging());
    input.pointer_move(30.0, 30.0);
    let frame = input.drain();
    assert!(frame.held.is_empty());
    assert_eq!(frame.pointer_delta, Vec2::ZERO);
}
