// ── Token ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'s> {
    /// A run of non-whitespace, non-`:` characters.
    Word(&'s str),
    /// Clause delimiter.
    Colon,
    // Sentinel
    Eof,
}

/// A token plus the byte offset where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spanned<'s> {
    pub token: Token<'s>,
    pub offset: usize,
}

impl<'s> Spanned<'s> {
    /// The word text, or `None` for punctuation and the sentinel.
    pub fn word(&self) -> Option<&'s str> {
        match self.token {
            Token::Word(w) => Some(w),
            _ => None,
        }
    }

    /// Byte offset just past the end of this token.
    pub fn end(&self) -> usize {
        match self.token {
            Token::Word(w) => self.offset + w.len(),
            Token::Colon => self.offset + 1,
            Token::Eof => self.offset,
        }
    }
}

// ── Lexer ─────────────────────────────────────────────────────────────────

/// Splits a description into words and `:` delimiters.
///
/// Lexing cannot fail: every character is whitespace, a colon, or part of a
/// word.
pub struct Lexer<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(src: &'s str) -> Self {
        Self { src, pos: 0 }
    }

    pub fn tokenize(mut self) -> Vec<Spanned<'s>> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let eof = tok.token == Token::Eof;
            tokens.push(tok);
            if eof {
                break;
            }
        }
        tokens
    }

    /// Words only, colons dropped. Used by the motion grammar.
    pub fn words(self) -> Vec<Spanned<'s>> {
        self.tokenize().into_iter().filter(|t| t.word().is_some()).collect()
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.src[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn next_token(&mut self) -> Spanned<'s> {
        self.skip_whitespace();
        let offset = self.pos;

        let token = match self.peek() {
            None => Token::Eof,
            Some(':') => {
                self.advance();
                Token::Colon
            }
            Some(_) => self.lex_word(),
        };
        Spanned { token, offset }
    }

    fn lex_word(&mut self) -> Token<'s> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if !c.is_whitespace() && c != ':') {
            self.advance();
        }
        Token::Word(&self.src[start..self.pos])
    }
}
