// Host-side tests for the head tracker: sessions, baseline, filtering, model lookup.

use glam::{Vec2, Vec3};
use holo_window::core::constants::TRACKING_SENSITIVITY_MAX;
use holo_window::core::*;
use std::collections::VecDeque;

fn screen() -> Vec2 {
    Vec2::new(16.0 / 9.0, 1.0)
}

/// A face box centered at `(cx, cy)` with the given width, in video-normalized units.
fn face(cx: f32, cy: f32, width: f32) -> FaceLandmarks {
    let h = width * 1.3;
    FaceLandmarks::new(vec![
        Vec2::new(cx - width / 2.0, cy - h / 2.0),
        Vec2::new(cx + width / 2.0, cy + h / 2.0),
        Vec2::new(cx, cy),
    ])
}

fn active_tracker(cfg: TrackingConfig) -> HeadTracker {
    let mut t = HeadTracker::new(cfg);
    let token = t.begin_start().expect("idle tracker starts");
    assert!(t.finish_start(token, Ok(())));
    t
}

#[derive(Default)]
struct ScriptedDetector {
    script: VecDeque<Result<Vec<FaceLandmarks>, TrackingError>>,
    calls: usize,
}

impl ScriptedDetector {
    fn with(items: Vec<Result<Vec<FaceLandmarks>, TrackingError>>) -> Self {
        Self {
            script: items.into(),
            calls: 0,
        }
    }
}

impl FaceDetector for ScriptedDetector {
    fn detect(&mut self, _timestamp_ms: f64) -> Result<Vec<FaceLandmarks>, TrackingError> {
        self.calls += 1;
        self.script.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[test]
fn observation_summarizes_landmark_box() {
    let obs = FaceObservation::from_landmarks(&face(0.4, 0.6, 0.2)).expect("face");
    assert!((obs.center - Vec2::new(0.4, 0.6)).length() < 1e-6);
    assert!((obs.width - 0.2).abs() < 1e-6);

    assert!(FaceObservation::from_landmarks(&FaceLandmarks::default()).is_none());
    let flat = FaceLandmarks::new(vec![Vec2::new(0.5, 0.1), Vec2::new(0.5, 0.9)]);
    assert!(FaceObservation::from_landmarks(&flat).is_none());

    let noisy = FaceLandmarks::new(vec![
        Vec2::new(f32::NAN, 0.5),
        Vec2::new(0.3, 0.4),
        Vec2::new(0.5, 0.6),
    ]);
    let obs = FaceObservation::from_landmarks(&noisy).expect("finite points remain");
    assert!((obs.width - 0.2).abs() < 1e-6);
}

#[test]
fn interleaved_landmarks_drop_trailing_value() {
    let lm = FaceLandmarks::from_interleaved(&[0.1, 0.2, 0.3, 0.4, 0.5]);
    assert_eq!(lm.points, vec![Vec2::new(0.1, 0.2), Vec2::new(0.3, 0.4)]);
}

#[test]
fn first_detection_becomes_baseline() {
    let mut t = active_tracker(TrackingConfig::default());
    assert!(t.baseline().is_none());
    let out = t.ingest(0.0, &[face(0.45, 0.55, 0.25)], screen());
    assert_eq!(out, Vec3::ZERO);
    let baseline = t.baseline().expect("baseline");
    assert!((baseline.center.x - 0.45).abs() < 1e-6);
    assert_eq!(t.status(), &TrackingStatus::Tracking);
    assert_eq!(t.state(), SessionState::Active { face_visible: true });
}

#[test]
fn head_motion_maps_to_eye_direction() {
    let mut t = active_tracker(TrackingConfig::default());
    t.ingest(0.0, &[face(0.5, 0.5, 0.2)], screen());
    // Moving right in a mirrored selfie image means the head moved left.
    let out = t.ingest(40.0, &[face(0.6, 0.4, 0.2)], screen());
    assert!(out.x < 0.0);
    assert!(out.y > 0.0);
    assert!(out.z.abs() < 1e-6);

    let mut cfg = TrackingConfig::default();
    cfg.mirror_x = false;
    let mut t = active_tracker(cfg);
    t.ingest(0.0, &[face(0.5, 0.5, 0.2)], screen());
    assert!(t.ingest(40.0, &[face(0.6, 0.5, 0.2)], screen()).x > 0.0);

    // A wider face is closer to the camera.
    let mut t = active_tracker(TrackingConfig::default());
    t.ingest(0.0, &[face(0.5, 0.5, 0.2)], screen());
    assert!(t.ingest(40.0, &[face(0.5, 0.5, 0.3)], screen()).z < 0.0);
}

#[test]
fn output_converges_monotonically_and_stays_bounded() {
    let cfg = TrackingConfig::default();
    let max_xy = screen() * cfg.max_lateral_fraction;
    let mut t = active_tracker(cfg.clone());
    t.ingest(0.0, &[face(0.5, 0.5, 0.2)], screen());
    let mut prev = Vec3::ZERO;
    for i in 1..200 {
        // Far outside any sane range: pinned to the bounds.
        let out = t.ingest(i as f64 * 40.0, &[face(0.0, 1.0, 0.01)], screen());
        assert!(out.x >= prev.x);
        assert!(out.y <= prev.y);
        assert!(out.z >= prev.z);
        assert!(out.x <= max_xy.x + 1e-5);
        assert!(out.y >= -max_xy.y - 1e-5);
        assert!(out.z <= cfg.depth_max + 1e-5);
        prev = out;
    }
    assert!((prev.x - max_xy.x).abs() < 1e-4);
    assert!((prev.y + max_xy.y).abs() < 1e-4);
    assert!((prev.z - cfg.depth_max).abs() < 1e-4);

    let mut t = active_tracker(cfg.clone());
    t.ingest(0.0, &[face(0.5, 0.5, 0.2)], screen());
    for i in 1..200 {
        let out = t.ingest(i as f64 * 40.0, &[face(0.5, 0.5, 0.9)], screen());
        assert!(out.z >= cfg.depth_min - 1e-5);
    }
}

#[test]
fn missing_face_decays_output_toward_zero() {
    let mut t = active_tracker(TrackingConfig::default());
    t.ingest(0.0, &[face(0.5, 0.5, 0.2)], screen());
    for i in 1..20 {
        t.ingest(i as f64 * 40.0, &[face(0.7, 0.3, 0.25)], screen());
    }
    let mut prev = t.output().length();
    assert!(prev > 0.0);
    for i in 20..60 {
        let out = t.ingest(i as f64 * 40.0, &[], screen());
        let len = out.length();
        assert!(len < prev, "output did not shrink: {} >= {}", len, prev);
        assert!((len - prev * 0.88).abs() < 1e-5);
        prev = len;
    }
    assert_eq!(t.status(), &TrackingStatus::NoFace);
    assert_eq!(t.state(), SessionState::Active { face_visible: false });
    assert!(t.is_active());
}

#[test]
fn polling_is_rate_limited() {
    let mut t = active_tracker(TrackingConfig::default());
    let mut det = ScriptedDetector::default();
    assert!(t.poll(0.0, &mut det, screen()).is_some());
    assert!(t.poll(10.0, &mut det, screen()).is_none());
    assert!(t.poll(33.0, &mut det, screen()).is_none());
    assert!(t.poll(34.0, &mut det, screen()).is_some());
    assert_eq!(det.calls, 2);
}

#[test]
fn inactive_tracker_never_polls() {
    let mut t = HeadTracker::new(TrackingConfig::default());
    let mut det = ScriptedDetector::default();
    assert!(!t.should_poll(0.0));
    assert!(t.poll(0.0, &mut det, screen()).is_none());
    assert_eq!(det.calls, 0);
    assert_eq!(t.ingest(0.0, &[face(0.5, 0.5, 0.2)], screen()), Vec3::ZERO);
    assert!(t.baseline().is_none());
}

#[test]
fn detection_error_counts_as_no_face() {
    let mut t = active_tracker(TrackingConfig::default());
    let mut det = ScriptedDetector::with(vec![
        Ok(vec![face(0.5, 0.5, 0.2)]),
        Ok(vec![face(0.8, 0.5, 0.2)]),
        Err(TrackingError::Detection("gpu lost".to_string())),
    ]);
    t.poll(0.0, &mut det, screen());
    let moved = t.poll(40.0, &mut det, screen()).expect("polled");
    let after = t.poll(80.0, &mut det, screen()).expect("polled");
    assert!(after.length() < moved.length());
    assert_eq!(t.status(), &TrackingStatus::NoFace);
    assert!(t.is_active());
}

#[test]
fn lost_stream_ends_the_session() {
    let mut t = active_tracker(TrackingConfig::default());
    let mut det = ScriptedDetector::with(vec![
        Ok(vec![face(0.5, 0.5, 0.2)]),
        Ok(vec![face(0.8, 0.5, 0.2)]),
        Err(TrackingError::Media("camera disconnected".to_string())),
    ]);
    t.poll(0.0, &mut det, screen());
    assert_ne!(t.poll(40.0, &mut det, screen()).expect("polled"), Vec3::ZERO);
    assert_eq!(t.poll(80.0, &mut det, screen()), Some(Vec3::ZERO));
    assert_eq!(t.state(), SessionState::Idle);
    assert!(matches!(t.status(), TrackingStatus::Failed(TrackingError::Media(_))));
    assert_eq!(t.poll(200.0, &mut det, screen()), None);
    assert_eq!(det.calls, 3);
}

#[test]
fn calibrate_rebases_on_latest_observation() {
    let mut t = active_tracker(TrackingConfig::default());
    assert!(!t.calibrate());
    t.ingest(0.0, &[face(0.5, 0.5, 0.2)], screen());
    let mut out = Vec3::ZERO;
    for i in 1..10 {
        out = t.ingest(i as f64 * 40.0, &[face(0.6, 0.5, 0.2)], screen());
    }
    assert!(out.x.abs() > 0.0);

    assert!(t.calibrate());
    let baseline = t.baseline().expect("baseline");
    assert!((baseline.center.x - 0.6).abs() < 1e-6);

    // Holding still at the new reference eases the output back to zero.
    let mut prev = out.length();
    for i in 10..30 {
        let len = t.ingest(i as f64 * 40.0, &[face(0.6, 0.5, 0.2)], screen()).length();
        assert!(len < prev);
        prev = len;
    }
}

#[test]
fn reset_baseline_takes_next_detection() {
    let mut t = active_tracker(TrackingConfig::default());
    t.ingest(0.0, &[face(0.5, 0.5, 0.2)], screen());
    t.ingest(40.0, &[face(0.7, 0.5, 0.2)], screen());
    t.reset_baseline();
    assert!(t.baseline().is_none());
    assert_eq!(t.output(), Vec3::ZERO);
    assert_eq!(t.ingest(80.0, &[face(0.7, 0.5, 0.2)], screen()), Vec3::ZERO);
}

#[test]
fn sensitivity_is_clamped() {
    let mut t = HeadTracker::new(TrackingConfig::default());
    t.set_sensitivity(10.0);
    assert_eq!(t.sensitivity(), TRACKING_SENSITIVITY_MAX);
    t.set_sensitivity(-1.0);
    assert_eq!(t.sensitivity(), 0.0);

    let mut t = active_tracker(TrackingConfig::default());
    t.set_sensitivity(0.0);
    t.ingest(0.0, &[face(0.5, 0.5, 0.2)], screen());
    assert_eq!(
        t.ingest(40.0, &[face(0.9, 0.1, 0.4)], screen()),
        Vec3::ZERO
    );
}

#[test]
fn session_start_transitions() {
    let mut t = HeadTracker::new(TrackingConfig::default());
    assert_eq!(t.state(), SessionState::Idle);
    assert_eq!(t.status(), &TrackingStatus::Off);

    let token = t.begin_start().expect("starts");
    assert_eq!(t.state(), SessionState::Starting);
    assert!(t.begin_start().is_none());

    assert!(!t.finish_start(token, Err(TrackingError::PermissionDenied)));
    assert_eq!(t.state(), SessionState::Idle);
    assert_eq!(
        t.status(),
        &TrackingStatus::Failed(TrackingError::PermissionDenied)
    );
    assert_eq!(
        t.status().status_line(),
        TrackingError::PermissionDenied.user_message()
    );

    let token = t.begin_start().expect("retry after failure");
    assert!(t.finish_start(token, Ok(())));
    assert!(t.is_active());
}

#[test]
fn stale_start_is_ignored() {
    let mut t = HeadTracker::new(TrackingConfig::default());
    let first = t.begin_start().expect("starts");
    t.stop();
    assert!(!t.finish_start(first, Ok(())));
    assert_eq!(t.state(), SessionState::Idle);

    let first = t.begin_start().expect("starts");
    t.stop();
    let second = t.begin_start().expect("starts again");
    assert!(!t.finish_start(first, Ok(())));
    assert_eq!(t.state(), SessionState::Starting);
    assert!(t.finish_start(second, Ok(())));
    assert!(t.is_active());
}

#[test]
fn stop_zeroes_output_immediately() {
    let mut t = active_tracker(TrackingConfig::default());
    t.ingest(0.0, &[face(0.5, 0.5, 0.2)], screen());
    t.ingest(40.0, &[face(0.8, 0.5, 0.2)], screen());
    assert_ne!(t.output(), Vec3::ZERO);
    t.stop();
    assert_eq!(t.output(), Vec3::ZERO);
    assert!(t.baseline().is_none());
    assert_eq!(t.status(), &TrackingStatus::Off);
}

#[test]
fn failure_while_active_keeps_error_status() {
    let mut t = active_tracker(TrackingConfig::default());
    t.fail(TrackingError::Media("track ended".to_string()));
    assert_eq!(t.state(), SessionState::Idle);
    assert!(matches!(t.status(), TrackingStatus::Failed(TrackingError::Media(_))));
    t.stop();
    assert!(matches!(t.status(), TrackingStatus::Failed(_)));
}

#[test]
fn dom_exception_names_map_to_error_kinds() {
    assert_eq!(
        TrackingError::from_dom_exception("NotAllowedError"),
        TrackingError::PermissionDenied
    );
    assert_eq!(
        TrackingError::from_dom_exception("NotFoundError"),
        TrackingError::DeviceNotFound
    );
    assert_eq!(
        TrackingError::from_dom_exception("NotReadableError"),
        TrackingError::DeviceBusy
    );
    assert_eq!(
        TrackingError::from_dom_exception("SecurityError"),
        TrackingError::InsecureContext
    );
    assert_eq!(
        TrackingError::from_dom_exception("WeirdError"),
        TrackingError::Media("WeirdError".to_string())
    );
}

#[test]
fn capability_check_requires_secure_context_and_camera_api() {
    let ok = TrackingCapabilities {
        secure_context: true,
        media_devices: true,
    };
    assert_eq!(ok.check(), Ok(()));
    let insecure = TrackingCapabilities {
        secure_context: false,
        media_devices: true,
    };
    assert_eq!(insecure.check(), Err(TrackingError::InsecureContext));
    let no_api = TrackingCapabilities {
        secure_context: true,
        media_devices: false,
    };
    assert_eq!(no_api.check(), Err(TrackingError::Unsupported));
}

#[test]
fn model_resolver_falls_back_to_remote() {
    let resolver = TrackingConfig::default().model_sources;
    let resolver = ModelResolver::new(resolver);
    let mut tried = Vec::new();
    let loaded = pollster::block_on(resolver.resolve(|source| {
        tried.push(source.clone());
        let result = match source {
            ModelSource::Local(_) => Err("404"),
            ModelSource::Remote(url) => Ok(url.clone()),
        };
        std::future::ready(result)
    }));
    assert_eq!(
        loaded,
        Ok(holo_window::core::constants::MODEL_REMOTE_URL.to_string())
    );
    assert_eq!(tried.len(), 2);
    assert!(matches!(tried[0], ModelSource::Local(_)));
}

#[test]
fn model_resolver_prefers_local_source() {
    let resolver = ModelResolver::new(TrackingConfig::default().model_sources);
    let mut calls = 0;
    let loaded = pollster::block_on(resolver.resolve(|source| {
        calls += 1;
        std::future::ready(Ok::<_, ()>(source.location().to_string()))
    }));
    assert_eq!(
        loaded,
        Ok(holo_window::core::constants::MODEL_LOCAL_PATH.to_string())
    );
    assert_eq!(calls, 1);
}

#[test]
fn model_resolver_reports_exhaustion() {
    let resolver = ModelResolver::new(TrackingConfig::default().model_sources);
    let loaded: Result<(), TrackingError> =
        pollster::block_on(resolver.resolve(|_| std::future::ready(Err::<(), _>("offline"))));
    assert_eq!(loaded, Err(TrackingError::ModelLoadFailed { attempts: 2 }));
}
