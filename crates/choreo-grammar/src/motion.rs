//! Motion grammar: the keyword/parameter pairs inside an effect.
//!
//! ```text
//! enter left move 120px over 0.5s after 100ms scale up 20
//! transform move top 40px twist left 10
//! ```

use std::fmt;

use crate::error::Diagnostic;
use crate::lexer::{Lexer, Spanned};

// ── Side ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub fn parse(word: &str) -> Option<Self> {
        match word {
            "left" => Some(Side::Left),
            "right" => Some(Side::Right),
            "top" => Some(Side::Top),
            "bottom" => Some(Side::Bottom),
            _ => None,
        }
    }

    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }

    /// Left and top point toward negative coordinates.
    #[inline]
    pub fn is_negative(self) -> bool {
        matches!(self, Side::Left | Side::Top)
    }
}

// ── Length ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Px,
    Percent,
    Em,
    Rem,
    Vw,
    Vh,
}

impl Unit {
    fn suffix(self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Percent => "%",
            Unit::Em => "em",
            Unit::Rem => "rem",
            Unit::Vw => "vw",
            Unit::Vh => "vh",
        }
    }
}

/// A CSS length. Bare numbers are pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f32,
    pub unit: Unit,
}

impl Length {
    pub const fn new(value: f32, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn parse(word: &str) -> Option<Self> {
        let (num, suffix) = split_number(word)?;
        let unit = match suffix {
            "" | "px" => Unit::Px,
            "%" => Unit::Percent,
            "em" => Unit::Em,
            "rem" => Unit::Rem,
            "vw" => Unit::Vw,
            "vh" => Unit::Vh,
            _ => return None,
        };
        Some(Self { value: num, unit })
    }

    pub fn negated(self) -> Self {
        Self { value: -self.value, ..self }
    }

    pub fn is_zero(self) -> bool {
        self.value == 0.0
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `-0` would give distinct class keys for the same rule.
        let v = if self.value == 0.0 { 0.0 } else { self.value };
        write!(f, "{}{}", v, self.unit.suffix())
    }
}

// ── Seconds / Degrees ─────────────────────────────────────────────────────

/// A non-negative duration. Accepts `0.5s`, `500ms` or bare seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seconds(pub f32);

impl Seconds {
    pub fn parse(word: &str) -> Option<Self> {
        let (num, suffix) = split_number(word)?;
        let secs = match suffix {
            "" | "s" => num,
            "ms" => num / 1000.0,
            _ => return None,
        };
        (secs >= 0.0).then_some(Seconds(secs))
    }
}

impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// An angle in degrees. Accepts `10deg` or bare degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Degrees(pub f32);

impl Degrees {
    pub fn parse(word: &str) -> Option<Self> {
        let (num, suffix) = split_number(word)?;
        matches!(suffix, "" | "deg").then_some(Degrees(num))
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = if self.0 == 0.0 { 0.0 } else { self.0 };
        write!(f, "{}deg", v)
    }
}

// ── Easing ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Easing {
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
}

impl Easing {
    pub fn parse(word: &str) -> Option<Self> {
        match word {
            "linear" => Some(Easing::Linear),
            "ease" => Some(Easing::Ease),
            "ease-in" => Some(Easing::EaseIn),
            "ease-out" => Some(Easing::EaseOut),
            "ease-in-out" => Some(Easing::EaseInOut),
            _ => None,
        }
    }

    pub fn css(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::Ease => "ease",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
            Easing::EaseInOut => "ease-in-out",
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css())
    }
}

// ── Scale / Twist / Move ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDirection {
    Up,
    Down,
}

/// `scale [up|down] <power>`; `power` is a percentage (`20` or `20%`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub direction: Option<ScaleDirection>,
    pub power: f32,
}

/// `twist left|right <angle>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Twist {
    pub side: Side,
    pub angle: Degrees,
}

/// `move <distance>` or `move <side> [distance]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Move {
    pub side: Option<Side>,
    pub distance: Option<Length>,
}

// ── MotionAttrs ───────────────────────────────────────────────────────────

/// Everything the motion grammar recognized, unnormalized. Defaults are
/// applied later by the compiler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotionAttrs {
    /// `enter <side>`
    pub enter: Option<Side>,
    /// Every `move`, in order.
    pub moves: Vec<Move>,
    /// `over <duration>`
    pub duration: Option<Seconds>,
    /// `after|wait <duration>`
    pub delay: Option<Seconds>,
    /// `ease <timing-function>`
    pub easing: Option<Easing>,
    pub scale: Option<Scale>,
    pub twist: Option<Twist>,
}

impl MotionAttrs {
    /// The last `move` distance, whatever its side.
    pub fn distance(&self) -> Option<Length> {
        self.moves.iter().rev().find_map(|m| m.distance)
    }

    /// The last side named by a `move`.
    pub fn move_side(&self) -> Option<Side> {
        self.moves.iter().rev().find_map(|m| m.side)
    }
}

/// Parse a motion description, ignoring anything unrecognized.
pub fn parse_motion(src: &str) -> MotionAttrs {
    parse_motion_with_diagnostics(src).0
}

/// Like [`parse_motion`] but also reports what was skipped.
pub fn parse_motion_with_diagnostics(src: &str) -> (MotionAttrs, Vec<Diagnostic>) {
    let words = Lexer::new(src).words();
    let mut p = MotionParser { words: &words, pos: 0, attrs: MotionAttrs::default(), diagnostics: Vec::new() };
    p.run();
    (p.attrs, p.diagnostics)
}

// ── MotionParser ──────────────────────────────────────────────────────────

struct MotionParser<'w, 's> {
    words: &'w [Spanned<'s>],
    pos: usize,
    attrs: MotionAttrs,
    diagnostics: Vec<Diagnostic>,
}

impl<'w, 's> MotionParser<'w, 's> {
    fn peek(&self) -> Option<&'s str> {
        self.words.get(self.pos).and_then(Spanned::word)
    }

    fn advance(&mut self) -> Option<&'s str> {
        let w = self.peek()?;
        self.pos += 1;
        Some(w)
    }

    /// Consume the next word if `f` accepts it.
    fn param<T>(&mut self, f: impl FnOnce(&str) -> Option<T>) -> Option<T> {
        let v = f(self.peek()?)?;
        self.pos += 1;
        Some(v)
    }

    fn skip(&mut self, offset: usize, token: &str, msg: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(offset, token, msg));
    }

    fn offset(&self) -> usize {
        self.words.get(self.pos).map_or(0, |t| t.offset)
    }

    fn run(&mut self) {
        while let Some(word) = self.peek() {
            let at = self.offset();
            let first = self.pos == 0;
            self.advance();
            match word {
                // Without a side `enter` is just the effect keyword.
                "enter" => self.attrs.enter = self.param(Side::parse).or(self.attrs.enter),
                "transform" | "animate" if first => {}
                "after" | "wait" => match self.param(Seconds::parse) {
                    Some(d) => self.attrs.delay = Some(d),
                    None => self.skip(at, word, "expected a duration"),
                },
                "over" => match self.param(Seconds::parse) {
                    Some(d) => self.attrs.duration = Some(d),
                    None => self.skip(at, word, "expected a duration"),
                },
                "ease" | "easing" => match self.param(Easing::parse) {
                    Some(e) => self.attrs.easing = Some(e),
                    None => self.skip(at, word, "expected a timing function"),
                },
                "move" => self.parse_move(at),
                "scale" => self.parse_scale(at),
                "twist" => self.parse_twist(at),
                other => self.skip(at, other, "unknown motion keyword"),
            }
        }
    }

    fn parse_move(&mut self, at: usize) {
        let side = self.param(Side::parse);
        let distance = self.param(Length::parse);
        if side.is_none() && distance.is_none() {
            self.skip(at, "move", "expected a side or a distance");
            return;
        }
        self.attrs.moves.push(Move { side, distance });
    }

    fn parse_scale(&mut self, at: usize) {
        let direction = self.param(|w| match w {
            "up" => Some(ScaleDirection::Up),
            "down" => Some(ScaleDirection::Down),
            _ => None,
        });
        match self.param(parse_power) {
            Some(power) => self.attrs.scale = Some(Scale { direction, power }),
            None => self.skip(at, "scale", "expected a power"),
        }
    }

    fn parse_twist(&mut self, at: usize) {
        let side = self.param(|w| Side::parse(w).filter(|s| !s.is_vertical()));
        let Some(side) = side else {
            self.skip(at, "twist", "expected `left` or `right`");
            return;
        };
        match self.param(Degrees::parse) {
            Some(angle) => self.attrs.twist = Some(Twist { side, angle }),
            None => self.skip(at, "twist", "expected an angle"),
        }
    }
}

fn parse_power(word: &str) -> Option<f32> {
    let (num, suffix) = split_number(word)?;
    matches!(suffix, "" | "%").then_some(num)
}

/// Split `"-12.5px"` into `(-12.5, "px")`.
fn split_number(word: &str) -> Option<(f32, &str)> {
    let end = word
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map_or(word.len(), |(i, _)| i);
    let num: f32 = word[..end].parse().ok()?;
    num.is_finite().then_some((num, &word[end..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── values ────────────────────────────────────────────────────────────

    #[test]
    fn length_units() {
        assert_eq!(Length::parse("120px"), Some(Length::new(120.0, Unit::Px)));
        assert_eq!(Length::parse("40"), Some(Length::new(40.0, Unit::Px)));
        assert_eq!(Length::parse("50%"), Some(Length::new(50.0, Unit::Percent)));
        assert_eq!(Length::parse("-2.5em"), Some(Length::new(-2.5, Unit::Em)));
        assert_eq!(Length::parse("10parsecs"), None);
        assert_eq!(Length::parse("right"), None);
    }

    #[test]
    fn length_display_normalizes_negative_zero() {
        assert_eq!(Length::new(-0.0, Unit::Px).to_string(), "0px");
        assert_eq!(Length::new(100.0, Unit::Percent).negated().to_string(), "-100%");
    }

    #[test]
    fn seconds_forms() {
        assert_eq!(Seconds::parse("0.5s"), Some(Seconds(0.5)));
        assert_eq!(Seconds::parse("250ms"), Some(Seconds(0.25)));
        assert_eq!(Seconds::parse("2"), Some(Seconds(2.0)));
        assert_eq!(Seconds::parse("-1s"), None);
        assert_eq!(Seconds(0.7).to_string(), "0.7s");
    }

    // ── enter ─────────────────────────────────────────────────────────────

    #[test]
    fn enter_full_sentence() {
        let m = parse_motion("enter top move 30px over 0.4s after 100ms scale up 20");
        assert_eq!(m.enter, Some(Side::Top));
        assert_eq!(m.distance(), Some(Length::new(30.0, Unit::Px)));
        assert_eq!(m.duration, Some(Seconds(0.4)));
        assert_eq!(m.delay, Some(Seconds(0.1)));
        assert_eq!(m.scale, Some(Scale { direction: Some(ScaleDirection::Up), power: 20.0 }));
    }

    #[test]
    fn enter_without_side_is_keyword_only() {
        let m = parse_motion("enter move right over 0.5s");
        assert_eq!(m.enter, None);
        assert_eq!(m.move_side(), Some(Side::Right));
        assert_eq!(m.distance(), None);
        assert_eq!(m.duration, Some(Seconds(0.5)));
    }

    #[test]
    fn wait_is_an_alias_for_after() {
        assert_eq!(parse_motion("enter wait 1s").delay, Some(Seconds(1.0)));
    }

    #[test]
    fn scale_without_direction() {
        let m = parse_motion("enter scale 15%");
        assert_eq!(m.scale, Some(Scale { direction: None, power: 15.0 }));
    }

    // ── transform ─────────────────────────────────────────────────────────

    #[test]
    fn transform_moves_and_twist() {
        let m = parse_motion("transform move left 20px move bottom 1em twist right 12deg");
        assert_eq!(m.moves.len(), 2);
        assert_eq!(m.moves[0], Move { side: Some(Side::Left), distance: Some(Length::new(20.0, Unit::Px)) });
        assert_eq!(m.moves[1].side, Some(Side::Bottom));
        assert_eq!(m.twist, Some(Twist { side: Side::Right, angle: Degrees(12.0) }));
    }

    #[test]
    fn easing_keyword() {
        assert_eq!(parse_motion("transform ease linear").easing, Some(Easing::Linear));
    }

    // ── tolerance ─────────────────────────────────────────────────────────

    #[test]
    fn unknown_tokens_are_skipped_and_reported() {
        let (m, diags) = parse_motion_with_diagnostics("enter left wobble over fast 2s");
        assert_eq!(m.enter, Some(Side::Left));
        assert_eq!(m.duration, None);
        let skipped: Vec<&str> = diags.iter().map(|d| d.token.as_str()).collect();
        assert_eq!(skipped, vec!["wobble", "over", "fast", "2s"]);
        assert_eq!(diags[0].offset, 11);
    }

    #[test]
    fn twist_needs_horizontal_side() {
        let (m, diags) = parse_motion_with_diagnostics("transform twist top 10");
        assert_eq!(m.twist, None);
        assert!(!diags.is_empty());
    }

    #[test]
    fn empty_source_is_default() {
        assert_eq!(parse_motion(""), MotionAttrs::default());
    }
}
