use core::fmt;

use thiserror::Error;

/// Byte span of a lexeme in the source, end exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Slice {
    pub start: usize,
    pub end: usize,
}

impl Slice {
    pub fn new(start: usize, end: usize) -> Slice {
        Slice { start, end }
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.start, self.end)
    }
}

#[derive(Clone, PartialEq, Debug, Error)]
pub enum LexError {
    #[error("Unidentified character '{character}' at position {position}.")]
    UnexpectedCharacter { character: char, position: usize },
    #[error("Letter in number token at position {position}.")]
    LetterInNumber { position: usize },
}

impl LexError {
    pub fn position(&self) -> usize {
        match self {
            LexError::UnexpectedCharacter { position, .. } => *position,
            LexError::LetterInNumber { position } => *position,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Error)]
#[error("{kind} (Position {span})")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub span: Slice,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, span: Slice) -> Self {
        SyntaxError { kind, span }
    }
}

/// Token kinds are carried by name so this crate stays independent of the lexer.
#[derive(Clone, PartialEq, Debug)]
pub enum SyntaxErrorKind {
    UnexpectedToken { expected: String, found: String },
    UnrecognizedOperand { found: String },
    UnrecognizedCondition { found: String },
    ExpectedComparisonOperator { found: String },
    ExpectedStatement { found: String },
    MaximumRecursionDepthReached,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxErrorKind::UnexpectedToken { expected, found } => {
                write!(f, "Invalid syntax. Expected {expected}, received {found}.")?
            }
            SyntaxErrorKind::UnrecognizedOperand { found } => {
                write!(f, "Unrecognized operand. Expected one of NUMBER, IDENTIFIER or STRING, received {found}.")?
            }
            SyntaxErrorKind::UnrecognizedCondition { found } => {
                write!(f, "Unrecognized condition starting with {found}.")?
            }
            SyntaxErrorKind::ExpectedComparisonOperator { found } => {
                write!(f, "Comparison operator not found. Received {found}.")?
            }
            SyntaxErrorKind::ExpectedStatement { found } => {
                write!(f, "Invalid statement. Expected SELECT, received {found}.")?
            }
            SyntaxErrorKind::MaximumRecursionDepthReached => {
                write!(f, "Maximum recursion depth reached.")?
            }
        }

        Ok(())
    }
}

/// Any failure raised while turning source text into a statement.
#[derive(Clone, PartialEq, Debug, Error)]
pub enum ParseError {
    #[error("Lexer Error: {0}")]
    Lex(#[from] LexError),
    #[error("Syntax Error: {0}")]
    Syntax(#[from] SyntaxError),
}

impl ParseError {
    pub fn position(&self) -> usize {
        match self {
            ParseError::Lex(e) => e.position(),
            ParseError::Syntax(e) => e.span.start,
        }
    }
}
