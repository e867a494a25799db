//! Animation System Tests
//!
//! Tests for:
//! - Track sampling under Constant / Linear / Cubic interpolation
//! - Time mapping (clamp and loop)
//! - Quaternion tracks staying unit length
//! - FastTrack agreeing with Track
//! - Clip sampling and optimization
//! - CrossFadeController playback and fades

use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use glam::{Quat, Vec3};

use marrow::math::quat_same_rotation;
use marrow::{
    Clip, CrossFadeController, FastTrack, Frame, Interpolation, KeyframeSampler, MarrowError, Pose,
    QuaternionTrack, ScalarTrack, Skeleton, Track, Transform, VectorTrack, optimize_clip,
    optimize_track,
};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const MODES: [Interpolation; 3] = [
    Interpolation::Constant,
    Interpolation::Linear,
    Interpolation::Cubic,
];

fn scalar_track(interpolation: Interpolation) -> ScalarTrack {
    Track::from_frames(
        vec![
            Frame::with_tangents(0.0, 0.0, 0.0, 1.0),
            Frame::with_tangents(0.5, 2.0, -1.0, 0.5),
            Frame::with_tangents(1.25, -1.0, 0.0, 0.0),
            Frame::with_tangents(2.0, 3.0, 2.0, 0.0),
        ],
        interpolation,
    )
    .unwrap()
}

fn rotation_track(interpolation: Interpolation) -> QuaternionTrack {
    Track::from_frames(
        vec![
            Frame::new(0.0, Quat::IDENTITY),
            Frame::new(1.0, Quat::from_rotation_y(FRAC_PI_2)),
            // Opposite hemisphere on purpose
            Frame::new(2.0, -Quat::from_rotation_y(PI * 0.9)),
            Frame::new(3.0, Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0).normalize(), 1.0)),
        ],
        interpolation,
    )
    .unwrap()
}

// ============================================================================
// Track: keyframe reproduction
// ============================================================================

#[test]
fn track_reproduces_keyframes_in_every_mode() {
    for mode in MODES {
        let track = scalar_track(mode);
        for frame in track.frames() {
            let value = track.sample(frame.time, false);
            assert!(
                approx(value, frame.value),
                "{mode:?}: expected {} at t={}, got {value}",
                frame.value,
                frame.time
            );
        }
    }
}

#[test]
fn quaternion_track_reproduces_keyframes() {
    for mode in MODES {
        let track = rotation_track(mode);
        for frame in track.frames() {
            let value = track.sample(frame.time, false);
            assert!(
                quat_same_rotation(value, frame.value.normalize(), EPSILON),
                "{mode:?}: keyframe at t={} not reproduced",
                frame.time
            );
        }
    }
}

#[test]
fn constant_track_holds_until_next_frame() {
    let track = scalar_track(Interpolation::Constant);
    assert!(approx(track.sample(0.49, false), 0.0));
    assert!(approx(track.sample(0.5, false), 2.0));
    assert!(approx(track.sample(1.9, false), -1.0));
    assert!(approx(track.sample(5.0, false), 3.0));
}

// ============================================================================
// Track: time mapping
// ============================================================================

#[test]
fn scalar_clamp_scenario() {
    let track = ScalarTrack::from_frames(
        vec![Frame::new(0.0, 0.0), Frame::new(1.0, 1.0)],
        Interpolation::Linear,
    )
    .unwrap();

    assert!(approx(track.sample(-1.0, false), 0.0));
    assert!(approx(track.sample(0.5, false), 0.5));
    assert!(approx(track.sample(2.0, false), 1.0));
}

#[test]
fn looping_track_is_periodic() {
    for mode in MODES {
        let track = scalar_track(mode);
        let duration = track.duration();
        for i in 0..20 {
            let t = i as f32 * 0.1;
            let base = track.sample(t, true);
            for k in [-2_i32, -1, 1, 3] {
                let shifted = track.sample(t + k as f32 * duration, true);
                assert!(
                    (base - shifted).abs() < 1e-3,
                    "{mode:?}: t={t}, k={k}: {base} vs {shifted}"
                );
            }
        }
    }
}

#[test]
fn adjust_time_to_fit_maps_into_range() {
    let track = scalar_track(Interpolation::Linear);
    assert!(approx(track.adjust_time_to_fit(2.5, true), 0.5));
    assert!(approx(track.adjust_time_to_fit(-0.5, true), 1.5));
    assert!(approx(track.adjust_time_to_fit(2.5, false), 2.0));
}

// ============================================================================
// Track: degenerate input
// ============================================================================

#[test]
fn inert_tracks_return_defaults() {
    init_logger();

    let empty = VectorTrack::new(Interpolation::Linear);
    assert_eq!(empty.sample(1.0, true), Vec3::ZERO);

    let mut single = QuaternionTrack::new(Interpolation::Cubic);
    single.push_frame(Frame::new(0.0, Quat::from_rotation_x(1.0)));
    assert_eq!(single.sample(0.0, false), Quat::IDENTITY);
    assert!(!single.is_animated());
}

#[test]
fn from_frames_rejects_bad_input() {
    let err = VectorTrack::from_frames(
        vec![Frame::new(0.0, Vec3::ZERO), Frame::new(-1.0, Vec3::ONE)],
        Interpolation::Linear,
    )
    .unwrap_err();
    assert!(matches!(err, MarrowError::NonIncreasingFrameTime { index: 1, .. }));

    let err = VectorTrack::from_frames(
        vec![Frame::new(0.0, Vec3::new(f32::INFINITY, 0.0, 0.0))],
        Interpolation::Linear,
    )
    .unwrap_err();
    assert_eq!(err, MarrowError::NonFiniteFrame { index: 0 });
}

// ============================================================================
// Quaternion tracks
// ============================================================================

#[test]
fn quaternion_samples_are_unit_length() {
    for mode in MODES {
        let track = rotation_track(mode);
        for i in -20..80 {
            let t = i as f32 * 0.05;
            for looping in [false, true] {
                let q = track.sample(t, looping);
                assert!(
                    approx(q.length(), 1.0),
                    "{mode:?}: |q| = {} at t={t}",
                    q.length()
                );
            }
        }
    }
}

#[test]
fn quaternion_linear_takes_short_arc() {
    let track = QuaternionTrack::from_frames(
        vec![
            Frame::new(0.0, Quat::from_rotation_z(0.2)),
            Frame::new(1.0, -Quat::from_rotation_z(0.4)),
        ],
        Interpolation::Linear,
    )
    .unwrap();

    let mid = track.sample(0.5, false);
    assert!(quat_same_rotation(mid, Quat::from_rotation_z(0.3), 1e-3));
}

// ============================================================================
// FastTrack
// ============================================================================

#[test]
fn fast_track_agrees_with_track() {
    for mode in MODES {
        let track = scalar_track(mode);
        let fast = optimize_track(&track);
        for i in -100..400 {
            let t = i as f32 * 0.0071;
            for looping in [false, true] {
                let expected = track.sample(t, looping);
                let actual = fast.sample(t, looping);
                assert!(
                    approx(expected, actual),
                    "{mode:?} looping={looping} t={t}: {expected} vs {actual}"
                );
            }
        }
    }
}

#[test]
fn fast_quaternion_track_agrees_with_track() {
    let track = rotation_track(Interpolation::Cubic);
    let fast = FastTrack::from(track.clone());
    for i in 0..=300 {
        let t = i as f32 * 0.01;
        assert!(quat_same_rotation(
            track.sample(t, true),
            fast.sample(t, true),
            EPSILON
        ));
    }
}

#[test]
fn fast_track_with_offset_start() {
    let track = ScalarTrack::from_frames(
        vec![
            Frame::new(1.5, 1.0),
            Frame::new(1.51, 4.0),
            Frame::new(3.0, -2.0),
        ],
        Interpolation::Linear,
    )
    .unwrap();
    let fast = optimize_track(&track);
    for i in 0..200 {
        let t = 1.4 + i as f32 * 0.009;
        assert!(approx(track.sample(t, false), fast.sample(t, false)), "t={t}");
    }
}

// ============================================================================
// Clip
// ============================================================================

fn wave_clip() -> Clip {
    let mut clip = Clip::new("wave");
    *clip.track_mut(1).rotation_mut() = rotation_track(Interpolation::Linear);
    *clip.track_mut(0).position_mut() = VectorTrack::from_frames(
        vec![
            Frame::new(0.5, Vec3::ZERO),
            Frame::new(1.5, Vec3::new(0.0, 1.0, 0.0)),
        ],
        Interpolation::Linear,
    )
    .unwrap();
    clip.recalculate_duration();
    clip
}

#[test]
fn clip_duration_spans_valid_tracks() {
    let mut clip = wave_clip();
    // Inert track does not widen the range
    clip.track_mut(2)
        .scale_mut()
        .push_frame(Frame::new(10.0, Vec3::ONE));
    clip.recalculate_duration();

    assert!(approx(clip.start_time(), 0.0));
    assert!(approx(clip.end_time(), 3.0));
    assert_eq!(clip.len(), 3);
}

#[test]
fn clip_clamps_when_not_looping() {
    let mut clip = wave_clip();
    clip.set_looping(false);

    let mut pose = Pose::new(2);
    let time = clip.sample(&mut pose, 10.0);
    assert!(approx(time, 3.0));
    assert!(pose.local_transform(0).position.abs_diff_eq(Vec3::Y, EPSILON));
}

#[test]
fn fast_clip_matches_clip() {
    let clip = wave_clip();
    let fast = optimize_clip(&clip);
    assert_eq!(fast.name(), "wave");
    assert!(fast.looping());

    let mut a = Pose::new(2);
    let mut b = Pose::new(2);
    for i in 0..100 {
        let t = i as f32 * 0.037;
        clip.sample(&mut a, t);
        fast.sample(&mut b, t);
        assert_eq!(a, b, "t={t}");
    }
}

// ============================================================================
// CrossFadeController
// ============================================================================

fn single_joint_skeleton() -> Arc<Skeleton> {
    let rest = Pose::from_parts(
        vec![Transform::from_position(Vec3::new(0.0, 0.0, 5.0))],
        vec![None],
    )
    .unwrap();
    Arc::new(Skeleton::new(rest.clone(), rest, vec!["root".into()]).unwrap())
}

fn slide_clip(name: &str, from: Vec3, to: Vec3) -> Arc<Clip> {
    let mut clip = Clip::new(name);
    *clip.track_mut(0).position_mut() = VectorTrack::from_frames(
        vec![Frame::new(0.0, from), Frame::new(1.0, to)],
        Interpolation::Linear,
    )
    .unwrap();
    clip.recalculate_duration();
    Arc::new(clip)
}

#[test]
fn cross_fade_loops_back_to_start_pose() {
    init_logger();

    let skeleton = single_joint_skeleton();
    let clip = slide_clip("a", Vec3::ZERO, Vec3::X);

    let mut start_pose = skeleton.rest_pose().clone();
    clip.sample(&mut start_pose, clip.start_time());

    let mut controller = CrossFadeController::with_skeleton(skeleton);
    controller.play(clip);
    for _ in 0..4 {
        controller.update(0.25);
    }

    assert!(approx(controller.time(), 0.0));
    assert_eq!(controller.pose(), &start_pose);
}

#[test]
fn cross_fade_blends_by_elapsed_time() {
    let skeleton = single_joint_skeleton();
    let a = slide_clip("a", Vec3::ZERO, Vec3::ZERO);
    let b = slide_clip("b", Vec3::Y, Vec3::Y);

    let mut controller = CrossFadeController::with_skeleton(skeleton);
    controller.play(a.clone());
    controller.fade_to(b.clone(), 1.0);
    assert!(controller.is_fading());

    controller.update(0.25);
    let position = controller.pose().local_transform(0).position;
    assert!(position.abs_diff_eq(Vec3::new(0.0, 0.25, 0.0), EPSILON));

    // Re-queueing the pending target is ignored
    controller.fade_to(b.clone(), 1.0);
    assert_eq!(controller.targets().len(), 1);

    for _ in 0..4 {
        controller.update(0.25);
    }
    assert!(!controller.is_fading());
    assert!(Arc::ptr_eq(controller.current_clip().unwrap(), &b));
    assert!(controller.pose().local_transform(0).position.abs_diff_eq(Vec3::Y, EPSILON));
}

#[test]
fn cross_fade_promotion_drops_earlier_targets() {
    let skeleton = single_joint_skeleton();
    let a = slide_clip("a", Vec3::ZERO, Vec3::ZERO);
    let b = slide_clip("b", Vec3::X, Vec3::X);
    let c = slide_clip("c", Vec3::Z, Vec3::Z);

    let mut controller = CrossFadeController::with_skeleton(skeleton);
    controller.play(a);
    controller.fade_to(b, 10.0);
    controller.fade_to(c.clone(), 0.1);

    controller.update(0.2);
    controller.update(0.2);
    assert!(Arc::ptr_eq(controller.current_clip().unwrap(), &c));
    assert!(controller.targets().is_empty());
}

#[test]
fn fade_to_without_clip_plays() {
    let skeleton = single_joint_skeleton();
    let a = slide_clip("a", Vec3::ZERO, Vec3::X);

    let mut controller = CrossFadeController::with_skeleton(skeleton);
    controller.fade_to(a.clone(), 0.5);
    assert!(!controller.is_fading());
    assert!(Arc::ptr_eq(controller.current_clip().unwrap(), &a));
}
