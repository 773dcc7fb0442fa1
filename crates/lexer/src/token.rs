use std::fmt;

pub use cli_common::Slice;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Select,
    From,
    Where,
    And,
    Or,
    Not,
    As,
    Identifier,
    Number,
    String,
    Comma,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Multiply,
    ParenOpen,
    ParenClose,
    Semicolon,
    EOF,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Select => "SELECT",
            TokenKind::From => "FROM",
            TokenKind::Where => "WHERE",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::As => "AS",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Comma => "COMMA",
            TokenKind::Equal => "EQUAL",
            TokenKind::NotEqual => "NOT_EQUAL",
            TokenKind::LessThan => "LT",
            TokenKind::LessThanOrEqual => "LT_EQUAL",
            TokenKind::GreaterThan => "GT",
            TokenKind::GreaterThanOrEqual => "GT_EQUAL",
            TokenKind::Multiply => "MULT",
            TokenKind::ParenOpen => "L_PAREN",
            TokenKind::ParenClose => "R_PAREN",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::EOF => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Look up a keyword by its exact upper-case spelling.
pub fn keyword(s: &str) -> Option<TokenKind> {
    match s {
        "SELECT" => Some(TokenKind::Select),
        "FROM" => Some(TokenKind::From),
        "WHERE" => Some(TokenKind::Where),
        "AND" => Some(TokenKind::And),
        "OR" => Some(TokenKind::Or),
        "NOT" => Some(TokenKind::Not),
        "AS" => Some(TokenKind::As),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// The lexeme as written. String literals keep their quotes; an
    /// unterminated one gains a closing quote that is not in the source.
    pub text: String,
    /// Always lies within the source, so it can be shorter than `text`.
    pub span: Slice,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, start: usize) -> Self {
        let text = text.into();
        let span = Slice::new(start, start + text.len());

        Token { kind, text, span }
    }

    pub fn eof(position: usize) -> Self {
        Token::new(TokenKind::EOF, "", position)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({}, {}){}", self.kind, self.text, self.span)
    }
}
