//! Scenario tests for the scroll-scrubbed showcase timeline.
//!
//! Conventions used in this codebase:
//! - The scrub value `s` lives in [0, 1]; out-of-range values clamp.
//! - The pose at any `s` is derived fresh from the base pose; nothing
//!   accumulates between calls.
//! - Entry deltas are additive on top of the base; rotation is per-axis
//!   Euler radians.

use std::f32::consts::{FRAC_PI_4, PI};

use glam::{vec3, Vec3};
use scrollscene::stage::showcase_timeline;
use scrollscene::timeline::RootPose;

const BASE_POSITION: Vec3 = Vec3::new(0.25, -0.55, 0.0);
const BASE_ROTATION: Vec3 = Vec3::new(0.0, FRAC_PI_4, 0.0);

fn approx_eq3(a: Vec3, b: Vec3, eps: f32) -> bool {
    (a - b).abs().max_element() <= eps
}

fn assert_pose(actual: RootPose, position: Vec3, rotation: Vec3) {
    assert!(
        approx_eq3(actual.position, position, 1e-5),
        "position {:?} != {:?}",
        actual.position,
        position
    );
    assert!(
        approx_eq3(actual.rotation, rotation, 1e-5),
        "rotation {:?} != {:?}",
        actual.rotation,
        rotation
    );
}

#[test]
fn start_of_range_is_the_base_pose() {
    let timeline = showcase_timeline();
    assert_pose(timeline.scrub(0.0), BASE_POSITION, BASE_ROTATION);
}

#[test]
fn segments_complete_at_their_third_boundaries() {
    let timeline = showcase_timeline();

    // First third: only the slide-back completes.
    assert_pose(
        timeline.scrub(1.0 / 3.0),
        BASE_POSITION + vec3(0.0, 0.1, -0.75),
        BASE_ROTATION,
    );

    // Second third: the downward tilt completes on top of it.
    assert_pose(
        timeline.scrub(2.0 / 3.0),
        BASE_POSITION + vec3(0.0, 0.1, -0.75),
        BASE_ROTATION + vec3(PI / 15.0, 0.0, 0.0),
    );
}

#[test]
fn final_segment_start_leaves_co_timed_pair_unapplied() {
    let timeline = showcase_timeline();

    // Exactly at the start of the last third: the tilt has just reached
    // full strength, the co-timed turn and slide have contributed nothing.
    let pose = timeline.scrub(2.0 / 3.0);
    assert!((pose.rotation.x - PI / 15.0).abs() < 1e-5);
    assert!((pose.rotation.y - BASE_ROTATION.y).abs() < 1e-5);
    assert!(approx_eq3(
        pose.position,
        BASE_POSITION + vec3(0.0, 0.1, -0.75),
        1e-5
    ));
}

#[test]
fn co_timed_entries_progress_in_lockstep() {
    let timeline = showcase_timeline();

    // Halfway through the last third, the turn and the slide are each at
    // half strength.
    let pose = timeline.scrub(2.0 / 3.0 + 1.0 / 6.0);
    assert_pose(
        pose,
        BASE_POSITION + vec3(0.0, 0.1, -0.75) + vec3(-0.25, -0.025, 0.3),
        BASE_ROTATION + vec3(PI / 15.0, -PI / 2.0, 0.0),
    );
}

#[test]
fn end_of_range_applies_every_delta_in_full() {
    let timeline = showcase_timeline();
    assert_pose(
        timeline.scrub(1.0),
        BASE_POSITION + vec3(0.0, 0.1, -0.75) + vec3(-0.5, -0.05, 0.6),
        BASE_ROTATION + vec3(PI / 15.0, -PI, 0.0),
    );
}

#[test]
fn scrubbing_is_idempotent_and_reversible() {
    let timeline = showcase_timeline();

    // Jump around arbitrarily; every revisit of a value reproduces the
    // same pose bit for bit.
    let sweep = [0.0, 0.9, 0.2, 1.0, 0.2, 0.5, 0.0, 0.66, 0.9];
    let mut seen: Vec<(f32, RootPose)> = Vec::new();

    for &s in &sweep {
        let pose = timeline.scrub(s);
        for &(prev_s, prev_pose) in &seen {
            if prev_s == s {
                assert_eq!(pose.position, prev_pose.position);
                assert_eq!(pose.rotation, prev_pose.rotation);
            }
        }
        seen.push((s, pose));
    }
}

#[test]
fn out_of_range_scrub_clamps_to_the_endpoints() {
    let timeline = showcase_timeline();

    let start = timeline.scrub(0.0);
    let clamped_low = timeline.scrub(-3.0);
    assert_eq!(start.position, clamped_low.position);
    assert_eq!(start.rotation, clamped_low.rotation);

    let end = timeline.scrub(1.0);
    let clamped_high = timeline.scrub(7.5);
    assert_eq!(end.position, clamped_high.position);
    assert_eq!(end.rotation, clamped_high.rotation);
}
