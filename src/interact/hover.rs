use instant::Instant;
use std::time::Duration;

/// Fixed length of the hover-triggered blend ramp.
pub const BLEND_TRANSITION_SECS: f32 = 3.0;

#[derive(Debug, Clone, Copy)]
struct Active {
    from: f32,
    started: Instant,
}

/// One-shot eased ramp of the blend progress toward 0.0.
///
/// Triggering while a ramp is in flight restarts it from the current
/// value; the target never changes, so the sampled value is monotonic
/// non-increasing across any sequence of triggers.
#[derive(Debug, Clone, Copy)]
pub struct BlendTransition {
    duration: Duration,
    active: Option<Active>,
}

impl BlendTransition {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Arm (or re-arm) the ramp, starting from `current` at `now`.
    pub fn trigger(&mut self, now: Instant, current: f32) {
        self.active = Some(Active {
            from: current.clamp(0.0, 1.0),
            started: now,
        });
    }

    /// Value of the blend progress at `now`, or `None` once the ramp has
    /// delivered its final value (or was never armed). The caller pairs
    /// every returned value with a `mark_dirty` on the material.
    pub fn sample(&mut self, now: Instant) -> Option<f32> {
        let active = self.active?;

        let elapsed = now.saturating_duration_since(active.started);
        let t = if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        };

        if t >= 1.0 {
            self.active = None;
            return Some(0.0);
        }

        Some(active.from * (1.0 - ease_out_quad(t)))
    }
}

impl Default for BlendTransition {
    fn default() -> Self {
        Self::new(Duration::from_secs_f32(BLEND_TRANSITION_SECS))
    }
}

// Quadratic ease-out: fast start, gentle landing; strictly monotonic on
// [0, 1].
fn ease_out_quad(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Handle to an attached external listener. Unsubscribing (or dropping)
/// runs the detach closure exactly once, so teardown paths cannot leave a
/// listener pointed at a dead material.
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.run_detach();
    }

    fn run_detach(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn at(start: Instant, seconds: f32) -> Instant {
        start + Duration::from_secs_f32(seconds)
    }

    #[test]
    fn ramp_runs_from_trigger_value_to_zero() {
        let start = Instant::now();
        let mut transition = BlendTransition::default();
        transition.trigger(start, 1.0);

        assert_eq!(transition.sample(start), Some(1.0));
        let end = transition.sample(at(start, BLEND_TRANSITION_SECS)).unwrap();
        assert!(end.abs() < 1e-6);
        assert!(!transition.is_active());
        assert_eq!(transition.sample(at(start, 4.0)), None);
    }

    #[test]
    fn ramp_is_monotonic_non_increasing() {
        let start = Instant::now();
        let mut transition = BlendTransition::default();
        transition.trigger(start, 1.0);

        let mut previous = f32::INFINITY;
        for step in 0..=30 {
            let t = step as f32 * 0.1;
            if let Some(value) = transition.sample(at(start, t)) {
                assert!(
                    value <= previous + 1e-6,
                    "value rose from {} to {} at t={}",
                    previous,
                    value,
                    t
                );
                previous = value;
            }
        }
        assert!(previous.abs() < 1e-6);
    }

    #[test]
    fn retrigger_restarts_from_current_value_toward_zero() {
        let start = Instant::now();
        let mut transition = BlendTransition::default();
        transition.trigger(start, 1.0);

        let midway = transition.sample(at(start, 1.5)).unwrap();
        assert!(midway > 0.0 && midway < 1.0);

        // Re-enter at 1.5s: the ramp restarts from the midway value.
        transition.trigger(at(start, 1.5), midway);
        assert_eq!(transition.sample(at(start, 1.5)), Some(midway));

        let later = transition
            .sample(at(start, 1.5 + BLEND_TRANSITION_SECS))
            .unwrap();
        assert!(later.abs() < 1e-6);
    }

    #[test]
    fn untriggered_transition_yields_nothing() {
        let mut transition = BlendTransition::default();
        assert_eq!(transition.sample(Instant::now()), None);
    }

    #[test]
    fn subscription_detaches_exactly_once() {
        let count = Rc::new(Cell::new(0));

        let counted = count.clone();
        let sub = Subscription::new(move || counted.set(counted.get() + 1));
        sub.unsubscribe();
        assert_eq!(count.get(), 1);

        let counted = count.clone();
        {
            let _dropped = Subscription::new(move || counted.set(counted.get() + 1));
        }
        assert_eq!(count.get(), 2);
    }
}
