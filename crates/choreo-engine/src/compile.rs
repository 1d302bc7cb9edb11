//! Motion descriptions → style classes.
//!
//! Compilation runs in two steps. [`AnimationDescriptor`] normalizes the
//! parsed [`MotionAttrs`] (defaults applied, signs resolved). [`compile`]
//! then renders the descriptor into rule bodies and resolves them through a
//! [`StyleEngine`]. Keys are derived only from the normalized descriptor, so
//! equal descriptors always map to the same classes.

use std::fmt;

use choreo_grammar::motion::{Degrees, Easing, Length, MotionAttrs, ScaleDirection, Seconds, Side};

use crate::config::EngineConfig;
use crate::style::StyleEngine;

// ── Descriptor ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    fn of(side: Side) -> Self {
        if side.is_vertical() { Axis::Y } else { Axis::X }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "X",
            Axis::Y => "Y",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub duration: Seconds,
    pub delay: Seconds,
    pub easing: Easing,
}

impl fmt::Display for Timing {
    /// `0.7s ease-in-out 0s`, the shorthand order of a `transition` entry.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.duration, self.easing, self.delay)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Motion {
    /// Start hidden and displaced by `offset` along `axis`, then slide in.
    Enter { axis: Axis, offset: Length, scale: Option<f32> },
    /// Move to a target transform and stay there.
    Transform {
        translate_x: Option<Length>,
        translate_y: Option<Length>,
        skew: Option<Degrees>,
        scale: Option<f32>,
    },
}

/// Normalized input of [`compile`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationDescriptor {
    pub motion: Motion,
    pub timing: Timing,
}

impl AnimationDescriptor {
    pub fn enter(attrs: &MotionAttrs, config: &EngineConfig) -> Self {
        let side = attrs.enter.or_else(|| attrs.move_side()).unwrap_or(Side::Left);
        let distance = attrs.distance().unwrap_or(config.default_distance);
        let offset = if side.is_negative() { distance.negated() } else { distance };
        Self {
            motion: Motion::Enter { axis: Axis::of(side), offset, scale: scale_factor(attrs) },
            timing: timing(attrs, config.timing.enter_duration, config),
        }
    }

    pub fn transform(attrs: &MotionAttrs, config: &EngineConfig) -> Self {
        let mut translate_x = None;
        let mut translate_y = None;
        for m in &attrs.moves {
            let (Some(side), Some(distance)) = (m.side, m.distance) else { continue };
            let signed = if side.is_negative() { distance.negated() } else { distance };
            if side.is_vertical() {
                translate_y = Some(signed);
            } else {
                translate_x = Some(signed);
            }
        }
        let skew = attrs.twist.map(|t| match t.side {
            Side::Right => Degrees(-t.angle.0),
            _ => t.angle,
        });
        Self {
            motion: Motion::Transform { translate_x, translate_y, skew, scale: scale_factor(attrs) },
            timing: timing(attrs, config.timing.transform_duration, config),
        }
    }
}

fn timing(attrs: &MotionAttrs, duration: Seconds, config: &EngineConfig) -> Timing {
    Timing {
        duration: attrs.duration.unwrap_or(duration),
        delay: attrs.delay.unwrap_or(config.timing.delay),
        easing: attrs.easing.unwrap_or(config.timing.easing),
    }
}

/// `1 + delta` where `delta` is the power as a fraction, negated for `up`.
/// A zero power means no scaling.
fn scale_factor(attrs: &MotionAttrs) -> Option<f32> {
    let scale = attrs.scale?;
    if scale.power == 0.0 {
        return None;
    }
    let mut delta = scale.power * 0.01;
    if scale.direction == Some(ScaleDirection::Up) {
        delta = -delta;
    }
    // Rounded so float noise never yields two keys for one rule.
    Some(((1.0 + delta) * 10_000.0).round() / 10_000.0)
}

// ── Rendering ─────────────────────────────────────────────────────────────

/// Classes produced for one effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledStyle {
    Enter { initial: String, transition: String },
    Transform { target: String, transition: String },
}

impl CompiledStyle {
    pub fn transition(&self) -> &str {
        match self {
            CompiledStyle::Enter { transition, .. } | CompiledStyle::Transform { transition, .. } => transition,
        }
    }
}

pub fn compile(desc: &AnimationDescriptor, styles: &dyn StyleEngine) -> CompiledStyle {
    match &desc.motion {
        Motion::Enter { axis, offset, scale } => {
            let mut transform = format!("translate{axis}({offset})");
            let mut key = format!("translate{axis}_{offset}_hidden");
            if let Some(s) = scale {
                transform.push_str(&format!(" scale({s})"));
                key.push_str(&format!("_scale{s}"));
            }
            let body = format!("transform: {transform}; opacity: 0;");
            let transition = transition_class(&desc.timing, &["transform", "opacity"], styles);
            CompiledStyle::Enter { initial: styles.resolve(&key, &body), transition }
        }
        Motion::Transform { translate_x, translate_y, skew, scale } => {
            let mut parts = Vec::new();
            let mut key = String::from("transform");
            if let Some(s) = skew {
                parts.push(format!("skewX({s})"));
                key.push_str(&format!("_skew{s}"));
            }
            if let Some(x) = translate_x {
                parts.push(format!("translateX({x})"));
                key.push_str(&format!("_x{x}"));
            }
            if let Some(y) = translate_y {
                parts.push(format!("translateY({y})"));
                key.push_str(&format!("_y{y}"));
            }
            if let Some(s) = scale {
                parts.push(format!("scale({s})"));
                key.push_str(&format!("_scale{s}"));
            }
            let body = if parts.is_empty() {
                "transform: none;".to_string()
            } else {
                format!("transform: {};", parts.join(" "))
            };
            let transition = transition_class(&desc.timing, &["transform"], styles);
            CompiledStyle::Transform { target: styles.resolve(&key, &body), transition }
        }
    }
}

/// Transitions only the properties the effect changes. Each property ends
/// with its own end event, and a job completes on the first one.
fn transition_class(timing: &Timing, properties: &[&str], styles: &dyn StyleEngine) -> String {
    let entries: Vec<String> = properties.iter().map(|p| format!("{p} {timing}")).collect();
    let body = format!("transition: {};", entries.join(", "));
    styles.resolve(&format!("_{}_{timing}", properties.join("_")), &body)
}
