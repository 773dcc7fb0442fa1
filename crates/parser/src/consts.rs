/// Command name recorded on every parsed statement.
pub const SELECT_COMMAND: &str = "SELECT";

/// Nesting limit for parenthesized and negated expressions.
pub const DEFAULT_MAX_DEPTH: usize = 128;
