//! Character-level tokenizer for address fields.
//!
//! Splits a field into `operator` and `text` tokens. Only one delimiter pair
//! is tracked at a time: while a `"`, `(`, `<` or `:` span is open, every
//! character other than its closer is literal text. So `"a <b>"` yields a
//! single text token `a <b>` between two quote operators.

use tracing::trace;

/// Classification of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// One of `"`, `(`, `)`, `<`, `>`, `,`, `:`, `;`.
    Operator,
    /// Accumulated literal characters, trimmed.
    Text,
}

/// A classified fragment of an address field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
}

impl Token {
    pub fn operator(chr: char) -> Self {
        Self {
            kind: TokenKind::Operator,
            value: chr.to_string(),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Text,
            value: value.into(),
        }
    }

    /// True if this is an operator token holding exactly `chr`.
    pub fn is_operator(&self, chr: char) -> bool {
        self.kind == TokenKind::Operator && self.value.chars().eq([chr])
    }
}

/// Opening operators and the closer each one waits for.
///
/// `,` and `;` stand alone. Groups are ended by semicolons; outside a group a
/// semicolon is treated like a comma, since some mail clients have long
/// accepted it as a list separator.
const OPERATORS: [(char, Option<char>); 6] = [
    ('"', Some('"')),
    ('(', Some(')')),
    ('<', Some('>')),
    (',', None),
    (':', Some(';')),
    (';', None),
];

/// Look up an opening operator. `None` if `chr` is not one;
/// `Some(closer)` otherwise, where `closer` is `None` for standalone operators.
fn operator_closer(chr: char) -> Option<Option<char>> {
    OPERATORS
        .iter()
        .find(|(op, _)| *op == chr)
        .map(|(_, closer)| *closer)
}

/// Tokenizer state threaded through the fold over input characters.
#[derive(Debug, Default)]
struct TokenizerState {
    tokens: Vec<Token>,
    /// The last token in `tokens` is a text node still accepting characters.
    text_open: bool,
    /// Closer of the currently open span.
    expecting: Option<char>,
    /// A backslash was seen and not yet consumed.
    escaped: bool,
}

impl TokenizerState {
    fn check_char(mut self, chr: char) -> Self {
        let closer = operator_closer(chr);

        if self.escaped && (closer.is_some() || chr == '\\') {
            // Escaped operator or backslash: drop the escape and fall through
            // to literal handling below.
            self.escaped = false;
        } else if self.expecting == Some(chr) {
            self.push_operator(chr);
            self.expecting = None;
            return self;
        } else if self.expecting.is_none() {
            if let Some(closer) = closer {
                self.push_operator(chr);
                self.expecting = closer;
                return self;
            }
        }

        if !self.escaped && chr == '\\' {
            self.escaped = true;
            return self;
        }

        if !self.text_open {
            self.tokens.push(Token::text(String::new()));
            self.text_open = true;
        }
        if let Some(node) = self.tokens.last_mut() {
            // A backslash before an ordinary character is kept verbatim.
            if self.escaped {
                node.value.push('\\');
            }
            node.value.push(chr);
        }
        self.escaped = false;
        self
    }

    fn push_operator(&mut self, chr: char) {
        self.tokens.push(Token::operator(chr));
        self.text_open = false;
        self.escaped = false;
    }
}

/// Trim whitespace and byte order marks from both ends.
pub(crate) fn trim_field(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Tokenize an address field.
///
/// Token values are trimmed and tokens that end up empty are dropped.
pub fn tokenize(input: &str) -> Vec<Token> {
    let state = input
        .chars()
        .fold(TokenizerState::default(), TokenizerState::check_char);

    let tokens: Vec<Token> = state
        .tokens
        .into_iter()
        .filter_map(|mut token| {
            let trimmed = trim_field(&token.value);
            if trimmed.is_empty() {
                return None;
            }
            if trimmed.len() != token.value.len() {
                token.value = trimmed.to_string();
            }
            Some(token)
        })
        .collect();

    trace!(input_len = input.len(), tokens = tokens.len(), "Tokenized address field");
    tokens
}
