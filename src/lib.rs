//! Parse a restricted SQL `SELECT` statement into a typed syntax tree and
//! render it back to text.
//!
//! ```
//! let statement = selectql::parse("SELECT a, b AS c FROM t WHERE a > 1;").unwrap();
//!
//! assert_eq!(statement.table.value, "t");
//! assert_eq!(statement.to_string(), "SELECT a, b AS c FROM t WHERE a > 1");
//! ```

pub use cli_common::{LexError, ParseError, Slice, SyntaxError, SyntaxErrorKind};
pub use lexer::{
    token::{Token, TokenKind},
    Lexer,
};
pub use parser::{ast, consts::DEFAULT_MAX_DEPTH, Parser};

/// Parse exactly one `SELECT ... ;` statement.
pub fn parse(source: &str) -> Result<ast::Statement, ParseError> {
    Parser::new(Lexer::new(source))?.parse()
}

/// Lex the whole source, including the terminating `EOF` token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    Lexer::new(source).lex()
}
