//! Style classes: cached rule bodies keyed by a deterministic class name.

use std::cell::RefCell;
use std::collections::HashMap;

/// Get-or-create capability for style classes.
///
/// `resolve` returns the class identifier for `key` and makes sure a rule
/// with `body` backs it. The rule is injected at most once per key.
pub trait StyleEngine {
    fn resolve(&self, key: &str, body: &str) -> String;
}

type Sink = Box<dyn Fn(&str, &str)>;

/// Append-only [`StyleEngine`]. Rules are never evicted.
///
/// An optional sink receives each `(class, body)` the first time it is
/// injected, which is how a real host would append to its stylesheet.
#[derive(Default)]
pub struct StyleCache {
    rules: RefCell<HashMap<String, String>>,
    order: RefCell<Vec<String>>,
    sink: Option<Sink>,
}

impl StyleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(sink: impl Fn(&str, &str) + 'static) -> Self {
        Self { sink: Some(Box::new(sink)), ..Self::default() }
    }

    /// Number of injected rules.
    pub fn len(&self) -> usize {
        self.order.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Body backing `class`, if injected.
    pub fn rule(&self, class: &str) -> Option<String> {
        self.rules.borrow().get(class).cloned()
    }

    /// Injected class names in injection order.
    pub fn classes(&self) -> Vec<String> {
        self.order.borrow().clone()
    }

    /// All rules rendered as CSS, in injection order.
    pub fn stylesheet(&self) -> String {
        let rules = self.rules.borrow();
        self.order
            .borrow()
            .iter()
            .filter_map(|class| rules.get(class).map(|body| format!(".{class} {{ {body} }}\n")))
            .collect()
    }
}

impl StyleEngine for StyleCache {
    fn resolve(&self, key: &str, body: &str) -> String {
        let class = class_key(key);
        {
            let rules = self.rules.borrow();
            if let Some(existing) = rules.get(&class) {
                if existing != body {
                    log::warn!("style class {class:?} already bound to a different rule; keeping the first");
                }
                return class;
            }
        }

        self.rules.borrow_mut().insert(class.clone(), body.to_string());
        self.order.borrow_mut().push(class.clone());
        log::debug!("injected style class {class}");
        if let Some(sink) = &self.sink {
            sink(&class, body);
        }
        class
    }
}

/// Map an arbitrary key onto class-name-safe characters.
///
/// `-` becomes `m`, `.` becomes `_`, `%` becomes `pct` and anything else
/// outside `[A-Za-z0-9_]` becomes `_`.
pub fn class_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '-' => out.push('m'),
            '%' => out.push_str("pct"),
            c if c.is_ascii_alphanumeric() || c == '_' => out.push(c),
            _ => out.push('_'),
        }
    }
    out
}
