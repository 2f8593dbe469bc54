/// Maps a document scroll offset to a [0, 1] scrub value.
///
/// The range runs from the trigger element's top hitting the top of the
/// viewport to the end-trigger element's bottom hitting the bottom of the
/// viewport. Purely derived from layout: rebuild it whenever layout
/// changes, never persist it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollBinding {
    start: f64,
    end: f64,
}

impl ScrollBinding {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Derive the binding from layout: absolute document offsets of the
    /// trigger's top edge and the end-trigger's bottom edge, plus the
    /// viewport height.
    pub fn from_layout(trigger_top: f64, end_trigger_bottom: f64, viewport_height: f64) -> Self {
        Self {
            start: trigger_top,
            end: end_trigger_bottom - viewport_height,
        }
    }

    /// Scrub value for the given scroll offset, clamped to [0, 1].
    /// Degenerate (empty or inverted) ranges always report 0.
    pub fn progress(&self, scroll_offset: f64) -> f32 {
        let span = self.end - self.start;
        if span <= 0.0 {
            return 0.0;
        }
        (((scroll_offset - self.start) / span).clamp(0.0, 1.0)) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_spans_the_range() {
        let binding = ScrollBinding::new(100.0, 500.0);
        assert_eq!(binding.progress(0.0), 0.0);
        assert_eq!(binding.progress(100.0), 0.0);
        assert!((binding.progress(300.0) - 0.5).abs() < 1e-6);
        assert_eq!(binding.progress(500.0), 1.0);
        assert_eq!(binding.progress(900.0), 1.0);
    }

    #[test]
    fn layout_derivation_accounts_for_viewport() {
        // Trigger top at 200px; end-trigger bottom at 2000px; 800px
        // viewport. The range ends when the bottom edge reaches the
        // viewport bottom, i.e. at scroll offset 1200.
        let binding = ScrollBinding::from_layout(200.0, 2000.0, 800.0);
        assert_eq!(binding, ScrollBinding::new(200.0, 1200.0));
        assert!((binding.progress(700.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn degenerate_range_reports_zero() {
        let binding = ScrollBinding::new(300.0, 300.0);
        assert_eq!(binding.progress(250.0), 0.0);
        assert_eq!(binding.progress(350.0), 0.0);

        let inverted = ScrollBinding::new(500.0, 100.0);
        assert_eq!(inverted.progress(300.0), 0.0);
    }
}
