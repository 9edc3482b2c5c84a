use crate::syntax;

/// One recognized or literal unit of a line, post-syntax-detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub occurs: u32,
    /// Produced by prefix/suffix factoring; never re-factored.
    pub subword: bool,
    /// Canonical placeholder for a recognized syntax class.
    pub special: bool,
}

impl Token {
    pub fn new(text: String) -> Self {
        Token {
            text,
            occurs: 1,
            subword: false,
            special: false,
        }
    }

    /// Rewrite this token to a canonical placeholder.
    pub fn make_special(&mut self, placeholder: &str) {
        self.text.clear();
        self.text.push_str(placeholder);
        self.special = true;
    }
}

/// The recognizer set must never decompose one token into more parts than
/// this; exceeding it is a programmer error.
pub const PENDING_CAPACITY: usize = 8;

/// LIFO buffer of tokens already produced by a recognizer but not yet
/// consumed by tokenization. Drained before reading further raw input.
#[derive(Debug, Default)]
pub struct PendingStack {
    items: Vec<Token>,
}

impl PendingStack {
    pub fn push(&mut self, token: Token) {
        if self.items.len() >= PENDING_CAPACITY {
            panic!("pending token stack overflow (capacity {PENDING_CAPACITY})");
        }
        self.items.push(token);
    }

    pub fn pop(&mut self) -> Option<Token> {
        self.items.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Turns one preprocessed line into a sequence of tokens, applying the
/// single-token recognizers as it goes.
pub struct TokenSource<'a> {
    rest: &'a str,
    pending: PendingStack,
}

impl<'a> TokenSource<'a> {
    pub fn new(line: &'a str) -> Self {
        TokenSource {
            rest: line,
            pending: PendingStack::default(),
        }
    }

    /// Next token, or `None` once only whitespace remains.
    pub fn next_token(&mut self) -> Option<Token> {
        if let Some(token) = self.pending.pop() {
            return Some(token);
        }
        let s = self.rest.trim_start();
        if s.is_empty() {
            self.rest = s;
            return None;
        }
        let end = s.find(char::is_whitespace).unwrap_or(s.len());
        let (raw, rest) = s.split_at(end);
        self.rest = rest;
        let mut token = Token::new(raw.to_string());
        if !raw.starts_with(syntax::PLACEHOLDER_MARK) {
            syntax::detect(&mut token, Some(&mut self.pending));
        }
        Some(token)
    }
}
