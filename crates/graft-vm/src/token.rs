//! Tokens and the pull-based token stream the parser reads from.

use serde::Serialize;

use graft_core::{EOF, TokenType};

/// Channel the parser reads. Tokens on any other channel are hidden.
pub const DEFAULT_CHANNEL: u32 = 0;

/// Text of the synthesized end-of-input token.
pub const EOF_TEXT: &str = "<EOF>";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub ttype: TokenType,
    pub text: String,
    /// 1-based.
    pub line: u32,
    /// 0-based, in characters.
    pub column: u32,
    /// Position among the tokens the parser has seen, hidden ones excluded.
    pub index: usize,
    pub channel: u32,
}

impl Token {
    pub fn new(ttype: TokenType, text: impl Into<String>) -> Self {
        Self {
            ttype,
            text: text.into(),
            line: 1,
            column: 0,
            index: 0,
            channel: DEFAULT_CHANNEL,
        }
    }

    pub fn eof(line: u32, column: u32) -> Self {
        Self::new(EOF, EOF_TEXT).at(line, column)
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn on_channel(mut self, channel: u32) -> Self {
        self.channel = channel;
        self
    }

    pub fn is_eof(&self) -> bool {
        self.ttype == EOF
    }

    /// Quoted text with whitespace escaped, as shown in syntax errors: `'z'`.
    pub fn error_display(&self) -> String {
        format!("'{}'", escape_whitespace(&self.text))
    }

    /// Position just past this token, for placing a synthesized EOF.
    fn end_position(&self) -> (u32, u32) {
        let mut line = self.line;
        let mut column = self.column;
        for c in self.text.chars() {
            if c == '\n' {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
        }
        (line, column)
    }
}

/// Escape `\n`, `\r` and `\t` so token text stays on one line.
pub fn escape_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// A finite, pull-based sequence of tokens.
///
/// Any iterator of tokens is a source. A source may end with an explicit
/// EOF token; if it does not, one is synthesized.
pub trait TokenSource {
    fn next_token(&mut self) -> Option<Token>;
}

impl<I: Iterator<Item = Token>> TokenSource for I {
    fn next_token(&mut self) -> Option<Token> {
        self.next()
    }
}

/// Lookahead buffer over a [`TokenSource`].
///
/// Tokens are pulled only as far as lookahead requires. Hidden-channel tokens
/// are dropped on the way in. Once EOF has been buffered every lookahead past
/// it yields EOF again, and consuming EOF does not advance.
pub struct TokenBuffer<'s> {
    source: Box<dyn TokenSource + 's>,
    tokens: Vec<Token>,
    pos: usize,
    /// Position after the last token pulled from the source, hidden ones included.
    end: (u32, u32),
}

impl<'s> TokenBuffer<'s> {
    pub fn new(source: impl TokenSource + 's) -> Self {
        Self {
            source: Box::new(source),
            tokens: Vec::new(),
            pos: 0,
            end: (1, 0),
        }
    }

    fn has_eof(&self) -> bool {
        self.tokens.last().is_some_and(Token::is_eof)
    }

    /// Make sure absolute index `i` is buffered, or EOF has been reached.
    fn fill(&mut self, i: usize) {
        while self.tokens.len() <= i && !self.has_eof() {
            let index = self.tokens.len();
            let token = match self.source.next_token() {
                Some(token) => token,
                None => Token::eof(self.end.0, self.end.1),
            };
            if !token.is_eof() {
                self.end = token.end_position();
                if token.channel != DEFAULT_CHANNEL {
                    continue;
                }
            }
            self.tokens.push(Token { index, ..token });
        }
    }

    /// Token at absolute index `i`, clamped to EOF.
    pub fn lt_at(&mut self, i: usize) -> &Token {
        self.fill(i);
        let last = self.tokens.len() - 1;
        &self.tokens[i.min(last)]
    }

    pub fn la_at(&mut self, i: usize) -> TokenType {
        self.lt_at(i).ttype
    }

    /// `k`-th token of lookahead, 1-based.
    pub fn lt(&mut self, k: usize) -> &Token {
        debug_assert!(k >= 1, "lookahead is 1-based");
        self.lt_at(self.pos + k - 1)
    }

    pub fn la(&mut self, k: usize) -> TokenType {
        self.lt(k).ttype
    }

    /// Index of the current token, which equals the number consumed so far.
    pub fn index(&self) -> usize {
        self.pos
    }

    /// Return the current token and advance past it, unless it is EOF.
    pub fn consume(&mut self) -> Token {
        let token = self.lt(1).clone();
        if !token.is_eof() {
            self.pos += 1;
        }
        token
    }

    /// Concatenated text of the tokens in `start..=stop`.
    pub fn text_between(&mut self, start: usize, stop: usize) -> String {
        let mut out = String::new();
        for i in start..=stop {
            let token = self.lt_at(i);
            if token.is_eof() {
                break;
            }
            out.push_str(&token.text);
        }
        out
    }
}

impl std::fmt::Debug for TokenBuffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBuffer")
            .field("buffered", &self.tokens.len())
            .field("pos", &self.pos)
            .finish()
    }
}
