//! Scroll-scrubbed transform timeline.
//!
//! The timeline is a pure function of a scrub value `s` in [0, 1]: every
//! call re-derives the root pose from the pose at `s = 0` plus each
//! entry's delta scaled by its clamped local progress. Nothing is ever
//! accumulated frame to frame, so scrubbing is idempotent and fully
//! reversible no matter how `s` jumps around.

pub mod scroll;

pub use scroll::ScrollBinding;

use glam::Vec3;
use std::collections::HashMap;

/// Additive deltas one entry applies over its scrub span. Rotation is in
/// per-axis Euler radians; unset axes stay zero and have no effect.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PoseDelta {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl PoseDelta {
    pub fn position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn rotation(rotation: Vec3) -> Self {
        Self {
            rotation,
            ..Default::default()
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Position plus Euler rotation of the asset root.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RootPose {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl RootPose {
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self { position, rotation }
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    delta: PoseDelta,
    /// Normalized scrub offset where this entry starts applying.
    start: f32,
    /// Normalized scrub span over which the delta ramps 0 -> 1.
    duration: f32,
}

/// Declares timeline entries in order. Unlabeled entries are laid out
/// back to back; the first entry carrying a label pins that label at the
/// then-current end of the timeline, and later entries with the same
/// label start at that same offset (simultaneous multi-axis motion).
#[derive(Default)]
pub struct TimelineBuilder {
    entries: Vec<(PoseDelta, f32, Option<String>)>,
}

impl TimelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to(mut self, delta: PoseDelta) -> Self {
        self.entries.push((delta, 1.0, None));
        self
    }

    pub fn to_at(mut self, label: &str, delta: PoseDelta) -> Self {
        self.entries.push((delta, 1.0, Some(label.to_string())));
        self
    }

    /// Same as [`to`](Self::to) with an explicit duration weight relative
    /// to the other entries.
    pub fn to_weighted(mut self, delta: PoseDelta, weight: f32) -> Self {
        self.entries.push((delta, weight.max(0.0), None));
        self
    }

    pub fn build(self, base: RootPose) -> ScrollTimeline {
        let mut labels: HashMap<String, f32> = HashMap::new();
        let mut end = 0.0f32;
        let mut laid_out: Vec<Entry> = Vec::with_capacity(self.entries.len());

        for (delta, weight, label) in self.entries {
            let start = match label {
                Some(label) => *labels.entry(label).or_insert(end),
                None => end,
            };
            end = end.max(start + weight);
            laid_out.push(Entry {
                delta,
                start,
                duration: weight,
            });
        }

        // Normalize so the declared spans cover exactly [0, 1].
        if end > 0.0 {
            for entry in &mut laid_out {
                entry.start /= end;
                entry.duration /= end;
            }
        }

        ScrollTimeline {
            base,
            entries: laid_out,
        }
    }
}

/// The built timeline: an ordered set of spans over [0, 1] plus the base
/// pose they modify.
pub struct ScrollTimeline {
    base: RootPose,
    entries: Vec<Entry>,
}

impl ScrollTimeline {
    pub fn builder() -> TimelineBuilder {
        TimelineBuilder::new()
    }

    pub fn base(&self) -> RootPose {
        self.base
    }

    /// Normalized (start, end) span of each entry, in declaration order.
    pub fn spans(&self) -> Vec<(f32, f32)> {
        self.entries
            .iter()
            .map(|entry| (entry.start, entry.start + entry.duration))
            .collect()
    }

    /// Evaluate the timeline at scrub value `s`.
    ///
    /// Entries apply in declaration order, each contributing
    /// `delta * clamp((s - start) / duration, 0, 1)` on top of the base
    /// pose. `s` outside [0, 1] clamps to the nearest endpoint.
    pub fn scrub(&self, s: f32) -> RootPose {
        let s = s.clamp(0.0, 1.0);
        let mut pose = self.base;

        for entry in &self.entries {
            let local = if entry.duration > 0.0 {
                ((s - entry.start) / entry.duration).clamp(0.0, 1.0)
            } else if s >= entry.start {
                1.0
            } else {
                0.0
            };

            pose.position += entry.delta.position * local;
            pose.rotation += entry.delta.rotation * local;
        }

        pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec3;
    use std::f32::consts::PI;

    fn pose_eq(a: RootPose, b: RootPose, eps: f32) -> bool {
        a.position.abs_diff_eq(b.position, eps) && a.rotation.abs_diff_eq(b.rotation, eps)
    }

    fn showcase_timeline(base: RootPose) -> ScrollTimeline {
        ScrollTimeline::builder()
            .to(PoseDelta::position(vec3(0.0, 0.1, -0.75)))
            .to(PoseDelta::rotation(vec3(PI / 15.0, 0.0, 0.0)))
            .to_at("third", PoseDelta::rotation(vec3(0.0, -PI, 0.0)))
            .to_at("third", PoseDelta::position(vec3(-0.5, -0.05, 0.6)))
            .build(base)
    }

    #[test]
    fn sequential_entries_partition_the_unit_range() {
        let timeline = showcase_timeline(RootPose::default());
        let spans = timeline.spans();

        let third = 1.0 / 3.0;
        assert!((spans[0].0 - 0.0).abs() < 1e-6 && (spans[0].1 - third).abs() < 1e-6);
        assert!((spans[1].0 - third).abs() < 1e-6 && (spans[1].1 - 2.0 * third).abs() < 1e-6);
        // Labeled pair shares the final slot.
        assert_eq!(spans[2], spans[3]);
        assert!((spans[2].0 - 2.0 * third).abs() < 1e-6 && (spans[2].1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn scrub_is_idempotent() {
        let base = RootPose::new(vec3(0.25, -0.55, 0.0), vec3(0.0, PI / 4.0, 0.0));
        let timeline = showcase_timeline(base);

        for s in [0.0, 0.17, 0.33, 0.5, 0.66, 0.91, 1.0] {
            let first = timeline.scrub(s);
            let second = timeline.scrub(s);
            assert_eq!(first, second, "scrub({}) drifted between calls", s);
        }
    }

    #[test]
    fn scrub_is_reversible() {
        let base = RootPose::new(vec3(0.25, -0.55, 0.0), vec3(0.0, PI / 4.0, 0.0));
        let timeline = showcase_timeline(base);

        let at_zero = timeline.scrub(0.0);
        // Sweep up and back down; the endpoint must be bit-identical.
        for step in 0..=100 {
            timeline.scrub(step as f32 / 100.0);
        }
        for step in (0..=100).rev() {
            timeline.scrub(step as f32 / 100.0);
        }
        assert_eq!(timeline.scrub(0.0), at_zero);
        assert!(pose_eq(at_zero, base, 1e-7));
    }

    #[test]
    fn labeled_entries_apply_simultaneously() {
        let timeline = ScrollTimeline::builder()
            .to(PoseDelta::position(vec3(1.0, 0.0, 0.0)))
            .to_at("sync", PoseDelta::rotation(vec3(0.0, 1.0, 0.0)))
            .to_at("sync", PoseDelta::position(vec3(0.0, 0.0, 2.0)))
            .build(RootPose::default());

        // Halfway through the shared slot both deltas are half applied.
        let pose = timeline.scrub(0.75);
        assert!((pose.rotation.y - 0.5).abs() < 1e-6);
        assert!((pose.position.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_scrub_clamps() {
        let timeline = showcase_timeline(RootPose::default());
        assert_eq!(timeline.scrub(-0.5), timeline.scrub(0.0));
        assert_eq!(timeline.scrub(1.5), timeline.scrub(1.0));
    }

    #[test]
    fn zero_duration_entry_is_a_step() {
        let timeline = ScrollTimeline::builder()
            .to_weighted(PoseDelta::position(vec3(1.0, 0.0, 0.0)), 0.0)
            .to(PoseDelta::position(vec3(0.0, 1.0, 0.0)))
            .build(RootPose::default());

        assert_eq!(timeline.scrub(0.0).position.x, 1.0);
        assert_eq!(timeline.scrub(1.0).position, vec3(1.0, 1.0, 0.0));
    }
}
