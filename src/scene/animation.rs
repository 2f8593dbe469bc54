use glam::{Quat, Vec3};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationInterpolation {
    Step,
    Linear,
}

#[derive(Debug, Clone)]
pub enum AnimationOutput {
    Vec3(Vec<Vec3>),
    Quat(Vec<Quat>),
}

/// Keyframe track: strictly increasing times with one output per key.
#[derive(Debug, Clone)]
pub struct AnimationSampler {
    pub times: Vec<f32>,
    pub output: AnimationOutput,
    pub interpolation: AnimationInterpolation,
}

impl AnimationSampler {
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    fn sample_indices(&self, time: f32) -> Option<(usize, usize, f32)> {
        if self.times.is_empty() {
            return None;
        }

        if self.times.len() == 1 {
            return Some((0, 0, 0.0));
        }

        if time <= self.times[0] {
            return Some((0, 0, 0.0));
        }

        let last_index = self.times.len() - 1;
        if time >= self.times[last_index] {
            return Some((last_index, last_index, 0.0));
        }

        match self
            .times
            .binary_search_by(|probe| probe.partial_cmp(&time).unwrap())
        {
            Ok(index) => Some((index, index, 0.0)),
            Err(upper) => {
                if upper == 0 || upper >= self.times.len() {
                    return None;
                }
                let lower = upper - 1;
                let start = self.times[lower];
                let end = self.times[upper];
                let span = end - start;
                let factor = if span.abs() < f32::EPSILON {
                    0.0
                } else {
                    ((time - start) / span).clamp(0.0, 1.0)
                };
                Some((lower, upper, factor))
            }
        }
    }

    pub fn sample_vec3(&self, time: f32) -> Option<Vec3> {
        let values = match &self.output {
            AnimationOutput::Vec3(values) => values,
            _ => return None,
        };

        let (lower, upper, factor) = self.sample_indices(time)?;

        if lower == upper || matches!(self.interpolation, AnimationInterpolation::Step) {
            return Some(values[lower]);
        }

        Some(values[lower].lerp(values[upper], factor))
    }

    pub fn sample_quat(&self, time: f32) -> Option<Quat> {
        let values = match &self.output {
            AnimationOutput::Quat(values) => values,
            _ => return None,
        };

        let (lower, upper, factor) = self.sample_indices(time)?;

        if lower == upper || matches!(self.interpolation, AnimationInterpolation::Step) {
            return Some(values[lower]);
        }

        let a = values[lower].normalize();
        let b = values[upper].normalize();
        Some(a.slerp(b, factor).normalize())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformProperty {
    Translation,
    Rotation,
    Scale,
}

#[derive(Debug, Clone)]
pub struct AnimationChannel {
    pub sampler: AnimationSampler,
    pub entity: hecs::Entity,
    pub property: TransformProperty,
}

#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<AnimationChannel>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration: 0.0,
            channels: Vec::new(),
        }
    }

    pub fn add_channel(&mut self, channel: AnimationChannel) {
        self.duration = self.duration.max(channel.sampler.end_time());
        self.channels.push(channel);
    }

    pub fn sample(&self, time: f32, updates: &mut HashMap<hecs::Entity, TransformUpdate>) {
        for channel in &self.channels {
            let entry = updates.entry(channel.entity).or_default();
            match channel.property {
                TransformProperty::Translation => {
                    if let Some(value) = channel.sampler.sample_vec3(time) {
                        entry.translation = Some(value);
                    }
                }
                TransformProperty::Rotation => {
                    if let Some(value) = channel.sampler.sample_quat(time) {
                        entry.rotation = Some(value);
                    }
                }
                TransformProperty::Scale => {
                    if let Some(value) = channel.sampler.sample_vec3(time) {
                        entry.scale = Some(value);
                    }
                }
            }
        }
    }
}

/// Playback cursor over one clip. The idle clip loops; nothing else in
/// this system is clock-driven.
#[derive(Debug, Clone)]
pub struct AnimationState {
    pub clip_index: usize,
    pub time: f32,
    pub speed: f32,
    pub looping: bool,
    pub playing: bool,
}

impl AnimationState {
    pub fn new(clip_index: usize) -> Self {
        Self {
            clip_index,
            time: 0.0,
            speed: 1.0,
            looping: true,
            playing: true,
        }
    }

    pub fn advance(&mut self, dt: f32, duration: f32) -> f32 {
        if !self.playing {
            return self.time;
        }

        let mut time = self.time + dt * self.speed;
        let duration = duration.max(0.0);

        if duration > 0.0 {
            if self.looping {
                time = time.rem_euclid(duration);
                if time < 0.0 {
                    time += duration;
                }
            } else {
                if time >= duration {
                    time = duration;
                    self.playing = false;
                } else if time < 0.0 {
                    time = 0.0;
                }
            }
        }

        self.time = time;
        time
    }
}

#[derive(Debug, Default, Clone)]
pub struct TransformUpdate {
    pub translation: Option<Vec3>,
    pub rotation: Option<Quat>,
    pub scale: Option<Vec3>,
}
