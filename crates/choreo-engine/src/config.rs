//! Engine configuration.

use choreo_grammar::motion::{Easing, Length, Seconds, Unit};

/// Timing applied when a motion description leaves a value out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingDefaults {
    pub enter_duration: Seconds,
    pub transform_duration: Seconds,
    pub delay: Seconds,
    pub easing: Easing,
}

impl Default for TimingDefaults {
    fn default() -> Self {
        Self {
            enter_duration: Seconds(0.7),
            transform_duration: Seconds(1.0),
            delay: Seconds(0.0),
            easing: Easing::EaseInOut,
        }
    }
}

/// Names and defaults shared by every job an engine builds.
///
/// ```rust
/// use choreo_engine::config::EngineConfig;
///
/// let cfg = EngineConfig::default().animated_class("is-animating");
/// assert_eq!(cfg.transition_end, "transitionend");
/// assert_eq!(cfg.animated_class, "is-animating");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Host event signalling that a CSS transition finished.
    pub transition_end: String,
    /// Host event signalling that a keyframe animation finished.
    pub animation_end: String,
    /// Marker class added alongside a keyframe class while it plays.
    pub animated_class: String,
    /// Entry distance when an `enter` names none.
    pub default_distance: Length,
    pub timing: TimingDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            transition_end: "transitionend".into(),
            animation_end: "animationend".into(),
            animated_class: "animated".into(),
            default_distance: Length::new(100.0, Unit::Percent),
            timing: TimingDefaults::default(),
        }
    }
}

impl EngineConfig {
    pub fn transition_end(mut self, event: impl Into<String>) -> Self {
        self.transition_end = event.into();
        self
    }

    pub fn animation_end(mut self, event: impl Into<String>) -> Self {
        self.animation_end = event.into();
        self
    }

    pub fn animated_class(mut self, class: impl Into<String>) -> Self {
        self.animated_class = class.into();
        self
    }

    pub fn default_distance(mut self, distance: Length) -> Self {
        self.default_distance = distance;
        self
    }

    pub fn timing(mut self, timing: TimingDefaults) -> Self {
        self.timing = timing;
        self
    }
}
