use std::fmt;

/// Reserved trigger name meaning "run without waiting for a host event".
pub const AUTOSTART: &str = "active";

/// Name of the state an element enters first.
pub const DEFAULT_STATE: &str = "default";

// ── On ────────────────────────────────────────────────────────────────────

/// What fires an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum On {
    /// Run on the next animation frame after the state is entered.
    Autostart,
    /// Run when the host dispatches the named event on the element.
    Event(String),
}

impl On {
    /// Parse a trigger name.
    ///
    /// `active` (or nothing at all) is the autostart marker; the short forms
    /// `enter` / `leave` expand to `mouseenter` / `mouseleave`.
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "" | AUTOSTART => On::Autostart,
            "enter" => On::Event("mouseenter".to_string()),
            "leave" => On::Event("mouseleave".to_string()),
            other => On::Event(other.to_string()),
        }
    }

    #[inline]
    pub fn is_autostart(&self) -> bool {
        matches!(self, On::Autostart)
    }

    /// The host event name, `None` for autostart.
    pub fn event_name(&self) -> Option<&str> {
        match self {
            On::Autostart => None,
            On::Event(name) => Some(name),
        }
    }
}

impl fmt::Display for On {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            On::Autostart => f.write_str(AUTOSTART),
            On::Event(name) => f.write_str(name),
        }
    }
}

// ── EffectKind ────────────────────────────────────────────────────────────

/// The three kinds of visual effect a job can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Transition from an offset, transparent start into rest position.
    Enter,
    /// Transition to a persistent target transform.
    Transform,
    /// Named keyframe animation.
    Animate,
}

impl EffectKind {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "enter" => Some(EffectKind::Enter),
            "transform" => Some(EffectKind::Transform),
            "animate" => Some(EffectKind::Animate),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            EffectKind::Enter => "enter",
            EffectKind::Transform => "transform",
            EffectKind::Animate => "animate",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// ── Effect ────────────────────────────────────────────────────────────────

/// One effect invocation: its kind plus the words describing it.
///
/// `source` always starts with the kind keyword (`"enter left move 50px"`,
/// `"animate bounce"`), which is also how the motion grammar sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub kind: EffectKind,
    pub source: String,
}

impl Effect {
    /// Build the effect for one step of a space-delimited sequence.
    pub fn step(kind: EffectKind, step: &str) -> Self {
        Self { kind, source: format!("{} {}", kind.keyword(), step.trim()) }
    }

    /// Keyframe name for `animate` effects (the word after the keyword).
    pub fn keyframe(&self) -> Option<&str> {
        self.source.split_whitespace().nth(1)
    }
}

/// Parse one action token. The first word selects the kind; anything else
/// yields `None`.
pub fn parse_effect(token: &str) -> Option<Effect> {
    let token = token.trim();
    let kind = EffectKind::from_keyword(token.split_whitespace().next()?)?;
    Some(Effect { kind, source: token.to_string() })
}

// ── EventDescriptor ───────────────────────────────────────────────────────

/// How an event's `action` string is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEncoding {
    /// `:`-delimited effects, all enqueued on every firing.
    MultiAction,
    /// Space-delimited steps of one effect kind, one step per firing.
    Sequence(EffectKind),
}

/// A binding of a trigger to an action, optional hooks and a next state.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDescriptor {
    pub on: On,
    /// Raw action string; `None` when the event only transitions.
    pub action: Option<String>,
    pub encoding: ActionEncoding,
    /// Hook name called before the action.
    pub before: Option<String>,
    /// Hook name called after the action completes.
    pub after: Option<String>,
    /// Target state once the action completes.
    pub goto: Option<String>,
    /// Advisory loop marker; carried but not interpreted.
    pub loop_marker: Option<String>,
}

impl EventDescriptor {
    pub fn new(on: On) -> Self {
        Self {
            on,
            action: None,
            encoding: ActionEncoding::MultiAction,
            before: None,
            after: None,
            goto: None,
            loop_marker: None,
        }
    }

    /// An event running `steps` (space-delimited) one per firing.
    pub fn sequence(on: On, kind: EffectKind, steps: impl Into<String>) -> Self {
        let steps = steps.into();
        Self {
            action: (!steps.trim().is_empty()).then_some(steps),
            encoding: ActionEncoding::Sequence(kind),
            ..Self::new(on)
        }
    }

    pub fn with_before(mut self, hook: impl AsRef<str>) -> Self {
        self.before = hook_name(hook.as_ref());
        self
    }

    pub fn with_after(mut self, hook: impl AsRef<str>) -> Self {
        self.after = hook_name(hook.as_ref());
        self
    }

    pub fn with_goto(mut self, state: impl AsRef<str>) -> Self {
        self.goto = non_empty(state.as_ref());
        self
    }

    /// Append one effect clause to a multi-action string.
    pub fn push_action(&mut self, clause: &str) {
        let clause = clause.trim();
        if clause.is_empty() {
            return;
        }
        let action = self.action.get_or_insert_with(String::new);
        action.push(':');
        action.push_str(clause);
    }

    /// Non-empty `:`-delimited action tokens.
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.action
            .as_deref()
            .unwrap_or("")
            .split(':')
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }

    /// Space-delimited sequence steps.
    pub fn steps(&self) -> Vec<&str> {
        self.action.as_deref().unwrap_or("").split_whitespace().collect()
    }

    /// `true` when the event has something to run.
    pub fn has_action(&self) -> bool {
        self.action.as_deref().is_some_and(|a| !a.trim().is_empty())
    }
}

/// Hook attributes are written as calls (`done()`); only the name matters.
fn hook_name(raw: &str) -> Option<String> {
    non_empty(raw.trim().trim_end_matches("()"))
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

// ── Trigger ───────────────────────────────────────────────────────────────

/// `"<selector> <event>"`: elements matching `selector` switch the owning
/// element into a state when they receive `event`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub selector: String,
    pub on: On,
}

impl Trigger {
    /// Parse a trigger string. Both parts are required.
    pub fn parse(src: &str) -> Option<Self> {
        let mut words = src.split_whitespace();
        let selector = words.next()?.to_string();
        let on = On::parse(words.next()?);
        Some(Self { selector, on })
    }
}

// ── StateDescriptor ───────────────────────────────────────────────────────

/// A named state and the events bound while the element is in it.
#[derive(Debug, Clone, PartialEq)]
pub struct StateDescriptor {
    pub name: String,
    pub events: Vec<EventDescriptor>,
    /// Only consulted once, when the element is first bound.
    pub trigger: Option<Trigger>,
}

impl StateDescriptor {
    pub fn new(name: impl Into<String>, events: Vec<EventDescriptor>) -> Self {
        Self { name: name.into(), events, trigger: None }
    }

    pub fn with_trigger(mut self, trigger: Option<Trigger>) -> Self {
        self.trigger = trigger;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── On ────────────────────────────────────────────────────────────────

    #[test]
    fn on_active_and_empty_are_autostart() {
        assert_eq!(On::parse("active"), On::Autostart);
        assert_eq!(On::parse("  "), On::Autostart);
    }

    #[test]
    fn on_aliases_pointer_events() {
        assert_eq!(On::parse("enter"), On::Event("mouseenter".into()));
        assert_eq!(On::parse("leave"), On::Event("mouseleave".into()));
        assert_eq!(On::parse("click").event_name(), Some("click"));
    }

    // ── EventDescriptor ───────────────────────────────────────────────────

    #[test]
    fn push_action_builds_colon_list() {
        let mut e = EventDescriptor::new(On::Autostart);
        e.push_action("enter left");
        e.push_action("  ");
        e.push_action("animate bounce");
        assert_eq!(e.action.as_deref(), Some(":enter left:animate bounce"));
        assert_eq!(e.actions().collect::<Vec<_>>(), vec!["enter left", "animate bounce"]);
    }

    #[test]
    fn hooks_drop_call_parens() {
        let e = EventDescriptor::new(On::Autostart).with_before("ready()").with_after(" ");
        assert_eq!(e.before.as_deref(), Some("ready"));
        assert_eq!(e.after, None);
    }

    #[test]
    fn empty_goto_is_none() {
        assert_eq!(EventDescriptor::new(On::Autostart).with_goto("").goto, None);
    }

    #[test]
    fn sequence_splits_steps() {
        let e = EventDescriptor::sequence(On::parse("click"), EffectKind::Animate, "bounce  shake flash");
        assert_eq!(e.encoding, ActionEncoding::Sequence(EffectKind::Animate));
        assert_eq!(e.steps(), vec!["bounce", "shake", "flash"]);
    }

    // ── Effect / Trigger ──────────────────────────────────────────────────

    #[test]
    fn parse_effect_by_keyword() {
        let fx = parse_effect(" animate tada ").unwrap();
        assert_eq!(fx.kind, EffectKind::Animate);
        assert_eq!(fx.keyframe(), Some("tada"));
        assert!(parse_effect("wiggle 3").is_none());
        assert!(parse_effect("").is_none());
    }

    #[test]
    fn trigger_needs_selector_and_event() {
        let t = Trigger::parse("#menu click").unwrap();
        assert_eq!(t.selector, "#menu");
        assert_eq!(t.on, On::Event("click".into()));
        assert!(Trigger::parse("#menu").is_none());
    }
}
