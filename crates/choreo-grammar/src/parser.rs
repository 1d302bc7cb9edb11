use crate::ast::{EffectKind, EventDescriptor, On, StateDescriptor, Trigger};
use crate::error::Diagnostic;
use crate::lexer::{Lexer, Spanned, Token};

/// Words that open a clause in the keyword form.
fn is_clause_keyword(word: &str) -> bool {
    matches!(word, "on" | "go" | "loop") || EffectKind::from_keyword(word).is_some()
}

// ── Parser ────────────────────────────────────────────────────────────────

/// Builds the event list for one state description.
///
/// Two surface forms are accepted:
///
/// ```text
/// :on click :enter left move 40px :go shown     (clause-delimited)
/// on click enter left move 40px go shown        (keyword)
/// ```
///
/// Everything before the first `on` belongs to an autostart event. When no
/// `on active` clause is present, that autostart event is always emitted
/// first, even if empty.
pub struct Parser<'s> {
    src: &'s str,
    tokens: Vec<Spanned<'s>>,
    pos: usize,
    head: Option<EventDescriptor>,
    explicit_autostart: bool,
    current: Option<EventDescriptor>,
    events: Vec<EventDescriptor>,
    diagnostics: Vec<Diagnostic>,
}

impl<'s> Parser<'s> {
    pub fn new(src: &'s str) -> Self {
        let tokens = Lexer::new(src).tokenize();
        let explicit_autostart = tokens
            .windows(2)
            .any(|w| w[0].word() == Some("on") && w[1].word().map(On::parse) == Some(On::Autostart));
        Self {
            src,
            tokens,
            pos: 0,
            head: Some(EventDescriptor::new(On::Autostart)),
            explicit_autostart,
            current: None,
            events: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn peek(&self) -> Token<'s> {
        self.tokens.get(self.pos).map_or(Token::Eof, |t| t.token)
    }

    fn advance(&mut self) -> Spanned<'s> {
        let tok = self.tokens.get(self.pos).copied().unwrap_or(Spanned { token: Token::Eof, offset: self.src.len() });
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn skip(&mut self, tok: &Spanned<'s>, msg: impl Into<String>) {
        let text = &self.src[tok.offset..tok.end()];
        self.diagnostics.push(Diagnostic::new(tok.offset, text, msg));
    }

    /// The event clauses currently apply to.
    fn target(&mut self) -> &mut EventDescriptor {
        match self.current {
            Some(ref mut e) => e,
            None => self.head.get_or_insert_with(|| EventDescriptor::new(On::Autostart)),
        }
    }

    /// Source text spanning `words`, internal spacing preserved.
    fn span(&self, words: &[Spanned<'s>]) -> &'s str {
        match (words.first(), words.last()) {
            (Some(first), Some(last)) => &self.src[first.offset..last.end()],
            _ => "",
        }
    }

    // ── Document ──────────────────────────────────────────────────────────

    pub fn parse(mut self) -> (Vec<EventDescriptor>, Vec<Diagnostic>) {
        if self.tokens.iter().any(|t| t.token == Token::Colon) {
            self.parse_clauses();
        } else {
            self.parse_keywords();
        }
        if let Some(head) = self.head.take() {
            self.emit_head(head);
        }
        self.events.extend(self.current.take());
        (self.events, self.diagnostics)
    }

    /// The synthesized autostart event is kept unless an explicit `on active`
    /// exists and nothing was written before the first `on`.
    fn emit_head(&mut self, head: EventDescriptor) {
        let written = head.has_action() || head.goto.is_some() || head.loop_marker.is_some();
        if !self.explicit_autostart || written {
            self.events.push(head);
        }
    }

    fn open_event(&mut self, on: On) {
        if let Some(done) = self.current.take() {
            self.events.push(done);
        } else if let Some(head) = self.head.take() {
            self.emit_head(head);
        }
        self.current = Some(EventDescriptor::new(on));
    }

    // ── Clause-delimited form ─────────────────────────────────────────────

    fn parse_clauses(&mut self) {
        loop {
            let mut clause = Vec::new();
            while let Token::Word(_) = self.peek() {
                clause.push(self.advance());
            }
            if !clause.is_empty() {
                self.clause(&clause);
            }
            match self.advance().token {
                Token::Colon => continue,
                _ => break,
            }
        }
    }

    fn clause(&mut self, words: &[Spanned<'s>]) {
        let Some(keyword) = words[0].word() else { return };
        let rest = self.span(&words[1..]);
        // The event name itself may be a keyword (`on enter`).
        let body = if keyword == "on" { words.get(2..).unwrap_or(&[]) } else { &words[1..] };
        if let Some(inner) = body.iter().find(|w| w.word().is_some_and(is_clause_keyword)).copied() {
            self.skip(&inner, "keyword inside a `:` clause is read as part of that clause");
        }
        match keyword {
            "on" if rest.is_empty() => {
                let first = words[0];
                self.skip(&first, "`on` without an event name");
            }
            "on" => self.open_event(On::parse(rest)),
            "go" => self.target().goto = non_empty(rest),
            "loop" => self.target().loop_marker = Some(rest.to_string()),
            kw if EffectKind::from_keyword(kw).is_some() => {
                let text = self.span(words);
                self.target().push_action(text);
            }
            _ => {
                let first = words[0];
                self.skip(&first, "unrecognized clause");
            }
        }
    }

    // ── Keyword form ──────────────────────────────────────────────────────

    fn parse_keywords(&mut self) {
        loop {
            let tok = self.advance();
            let Some(word) = tok.word() else { break };
            match word {
                "on" => match self.next_word() {
                    Some(name) => self.open_event(On::parse(name)),
                    None => self.skip(&tok, "`on` without an event name"),
                },
                "go" => match self.next_word() {
                    Some(target) => self.target().goto = Some(target.to_string()),
                    None => self.skip(&tok, "`go` without a target state"),
                },
                "loop" => {
                    let marker = match self.peek() {
                        Token::Word(w) if !is_clause_keyword(w) => self.next_word(),
                        _ => None,
                    };
                    self.target().loop_marker = Some(marker.unwrap_or("").to_string());
                }
                kw if EffectKind::from_keyword(kw).is_some() => {
                    let mut words = vec![tok];
                    while let Token::Word(w) = self.peek() {
                        if is_clause_keyword(w) {
                            break;
                        }
                        words.push(self.advance());
                    }
                    let text = self.span(&words);
                    self.target().push_action(text);
                }
                _ => self.skip(&tok, "unrecognized keyword"),
            }
        }
    }

    fn next_word(&mut self) -> Option<&'s str> {
        match self.peek() {
            Token::Word(w) => {
                self.advance();
                Some(w)
            }
            _ => None,
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

// ── Public parse entry points ─────────────────────────────────────────────

/// Parse a state description into its events. Never fails; anything
/// unrecognized is dropped.
///
/// A single `:` anywhere selects the clause-delimited form for the whole
/// input, so keywords written inside a clause belong to that clause. Those
/// are reported by [`parse_state_with_diagnostics`].
pub fn parse_state(src: &str) -> Vec<EventDescriptor> {
    Parser::new(src).parse().0
}

/// Like [`parse_state`] but also reports what was skipped.
pub fn parse_state_with_diagnostics(src: &str) -> (Vec<EventDescriptor>, Vec<Diagnostic>) {
    Parser::new(src).parse()
}

/// Parse a full state: name, optional `"<selector> <event>"` trigger and
/// description.
pub fn parse_state_descriptor(name: &str, trigger: Option<&str>, src: &str) -> StateDescriptor {
    StateDescriptor::new(name, parse_state(src)).with_trigger(trigger.and_then(Trigger::parse))
}
