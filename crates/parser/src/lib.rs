use ast::*;
use cli_common::{ParseError, SyntaxError, SyntaxErrorKind};
use consts::{DEFAULT_MAX_DEPTH, SELECT_COMMAND};
use lexer::{
    token::{Token, TokenKind},
    Lexer,
};
use recursion::RecursionGuard;

pub mod ast;
pub mod consts;
mod recursion;

/// Recursive descent parser over a single `SELECT` statement.
///
/// Tokens are pulled from the lexer one at a time with a single token of
/// lookahead. The first grammar violation aborts the parse; a parser that
/// returned an error must not be reused.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    curr: Token,
    recursion: RecursionGuard,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Result<Parser<'a>, ParseError> {
        Parser::with_max_depth(lexer, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(
        mut lexer: Lexer<'a>,
        max_depth: usize,
    ) -> Result<Parser<'a>, ParseError> {
        let curr = lexer.next_token()?;

        Ok(Parser {
            lexer,
            curr,
            recursion: RecursionGuard::new(max_depth),
        })
    }

    pub fn parse(&mut self) -> Result<Statement, ParseError> {
        self.statement()
    }

    // statement := SELECT projection FROM identifier [ WHERE expression ] SEMICOLON EOF
    fn statement(&mut self) -> Result<Statement, ParseError> {
        if !self.peek_is(TokenKind::Select) {
            return Err(self.error(SyntaxErrorKind::ExpectedStatement {
                found: self.curr.kind.to_string(),
            }));
        }

        let token = self.eat(TokenKind::Select)?;
        log::debug!("Parsing statement starting at {}", token.span);

        let projection = self.projection()?;
        self.eat(TokenKind::From)?;
        let table = self.identifier()?;

        let condition = match self.peek_is(TokenKind::Where) {
            true => {
                self.eat(TokenKind::Where)?;
                Some(self.expression()?)
            }
            false => None,
        };

        self.eat(TokenKind::Semicolon)?;
        self.expect(TokenKind::EOF)?;

        let statement = Statement {
            token,
            name: String::from(SELECT_COMMAND),
            projection,
            table,
            condition,
        };

        log::debug!("Parsed statement: {statement}");

        Ok(statement)
    }

    // projection := MULT | column (COMMA column)*
    fn projection(&mut self) -> Result<Projection, ParseError> {
        if self.peek_is(TokenKind::Multiply) {
            let token = self.eat(TokenKind::Multiply)?;
            return Ok(Projection::Wildcard(Column::wildcard(token)));
        }

        let mut columns = vec![self.column()?];

        while self.peek_is(TokenKind::Comma) {
            self.eat(TokenKind::Comma)?;
            columns.push(self.column()?);
        }

        Ok(Projection::Columns(columns))
    }

    // column := identifier [ AS identifier ]
    fn column(&mut self) -> Result<Column, ParseError> {
        let name = self.identifier()?;

        let alias = match self.peek_is(TokenKind::As) {
            true => {
                self.eat(TokenKind::As)?;
                Some(self.identifier()?)
            }
            false => None,
        };

        Ok(Column::new(name, alias))
    }

    fn identifier(&mut self) -> Result<Identifier, ParseError> {
        let token = self.eat(TokenKind::Identifier)?;
        Ok(Identifier::new(token))
    }

    // expression := andCondition (OR andCondition)*
    fn expression(&mut self) -> Result<Condition, ParseError> {
        let _depth = self
            .recursion
            .try_descend()
            .map_err(|kind| self.error(kind))?;

        let mut node = self.and_condition()?;

        while let Some(op) = self.boolean_operator(BooleanOperator::Or) {
            let token = self.eat(self.curr.kind)?;
            let right = self.and_condition()?;

            node = Condition::Boolean(BooleanCondition {
                token,
                op,
                left: Box::new(node),
                right: Box::new(right),
            });
        }

        Ok(node)
    }

    // andCondition := condition (AND condition)*
    fn and_condition(&mut self) -> Result<Condition, ParseError> {
        let mut node = self.condition()?;

        while let Some(op) = self.boolean_operator(BooleanOperator::And) {
            let token = self.eat(self.curr.kind)?;
            let right = self.condition()?;

            node = Condition::Boolean(BooleanCondition {
                token,
                op,
                left: Box::new(node),
                right: Box::new(right),
            });
        }

        Ok(node)
    }

    // condition := comparison | L_PAREN expression R_PAREN | NOT expression
    fn condition(&mut self) -> Result<Condition, ParseError> {
        match self.curr.kind {
            TokenKind::Identifier | TokenKind::Number | TokenKind::String => {
                Ok(Condition::Comparison(self.comparison()?))
            }
            TokenKind::ParenOpen => {
                self.eat(TokenKind::ParenOpen)?;
                let node = self.expression()?;
                self.eat(TokenKind::ParenClose)?;

                Ok(node)
            }
            TokenKind::Not => {
                let token = self.eat(TokenKind::Not)?;
                let expr = self.expression()?;

                Ok(Condition::Not(Negation {
                    token,
                    expr: Box::new(expr),
                }))
            }
            found => Err(self.error(SyntaxErrorKind::UnrecognizedCondition {
                found: found.to_string(),
            })),
        }
    }

    // comparison := operand compareOp operand
    fn comparison(&mut self) -> Result<Comparison, ParseError> {
        let left = self.operand()?;

        let op = match ComparisonOperator::from_kind(self.curr.kind) {
            Some(op) => op,
            None => {
                return Err(self.error(SyntaxErrorKind::ExpectedComparisonOperator {
                    found: self.curr.to_string(),
                }))
            }
        };
        let token = self.eat(self.curr.kind)?;

        let right = self.operand()?;

        Ok(Comparison {
            token,
            op,
            left,
            right,
        })
    }

    // operand := NUMBER | IDENTIFIER | STRING
    fn operand(&mut self) -> Result<Operand, ParseError> {
        let value = match self.curr.kind {
            TokenKind::Number => {
                OperandValue::Number(NumberLiteral::new(self.eat(TokenKind::Number)?))
            }
            TokenKind::Identifier => {
                OperandValue::Identifier(Identifier::new(self.eat(TokenKind::Identifier)?))
            }
            TokenKind::String => {
                OperandValue::String(StringLiteral::new(self.eat(TokenKind::String)?))
            }
            found => {
                return Err(self.error(SyntaxErrorKind::UnrecognizedOperand {
                    found: found.to_string(),
                }))
            }
        };

        Ok(Operand::new(value))
    }

    // The current token's operator, if it is the one this precedence level folds
    fn boolean_operator(&self, wanted: BooleanOperator) -> Option<BooleanOperator> {
        BooleanOperator::from_kind(self.curr.kind).filter(|op| *op == wanted)
    }

    // Consume and return the current token if it is of the expected kind
    fn eat(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        self.expect(kind)?;

        let next = self.lexer.next_token()?;
        let token = std::mem::replace(&mut self.curr, next);
        log::trace!("Consumed {token}");

        Ok(token)
    }

    // Throw an error if the current token is not expected
    fn expect(&self, kind: TokenKind) -> Result<(), ParseError> {
        match self.peek_is(kind) {
            true => Ok(()),
            false => Err(self.error(SyntaxErrorKind::UnexpectedToken {
                expected: kind.to_string(),
                found: self.curr.kind.to_string(),
            })),
        }
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.curr.kind == kind
    }

    fn error(&self, kind: SyntaxErrorKind) -> ParseError {
        SyntaxError::new(kind, self.curr.span).into()
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use cli_common::{LexError, Slice};
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> Result<Statement, ParseError> {
        Parser::new(Lexer::new(src))?.parse()
    }

    fn outline(src: &str) -> String {
        parse(src).unwrap().condition.unwrap().outline()
    }

    fn syntax_kind(src: &str) -> SyntaxErrorKind {
        match parse(src) {
            Err(ParseError::Syntax(e)) => e.kind,
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_select_statement() {
        let statement = parse("SELECT a FROM t;").unwrap();

        assert_eq!(statement.name, "SELECT");
        assert_eq!(statement.table.value, "t");
        assert_eq!(statement.columns().len(), 1);
        assert_eq!(statement.condition, None);
        assert_eq!(statement.to_string(), "SELECT a FROM t");
    }

    #[test]
    fn test_column_list_with_aliases() {
        let statement = parse("SELECT a, b AS c, d AS e FROM t;").unwrap();
        let rendered: Vec<String> = statement.columns().iter().map(|c| c.to_string()).collect();

        assert_eq!(rendered, vec!["a", "b AS c", "d AS e"]);
        assert_eq!(statement.columns()[1].alias.as_ref().unwrap().value, "c");
    }

    #[test]
    fn test_wildcard_projection() {
        let statement = parse("SELECT * FROM t;").unwrap();

        assert!(statement.is_wildcard());
        assert_eq!(statement.columns().len(), 1);
        assert_eq!(statement.columns()[0].to_string(), "*");
        assert_eq!(statement.columns()[0].token.kind, TokenKind::Multiply);
    }

    #[test]
    fn test_wildcard_rejects_alias_and_comma() {
        assert_eq!(
            syntax_kind("SELECT * AS x FROM t;"),
            SyntaxErrorKind::UnexpectedToken {
                expected: String::from("FROM"),
                found: String::from("AS")
            }
        );
        assert_eq!(
            syntax_kind("SELECT *, a FROM t;"),
            SyntaxErrorKind::UnexpectedToken {
                expected: String::from("FROM"),
                found: String::from("COMMA")
            }
        );
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        assert_eq!(
            outline("SELECT x FROM t WHERE a=1 OR b=2 AND c=3;"),
            "OR(Compare(a = 1), AND(Compare(b = 2), Compare(c = 3)))"
        );
    }

    #[test]
    fn test_chained_and_left_associates() {
        assert_eq!(
            outline("SELECT x FROM t WHERE a=1 AND b=2 AND c=3;"),
            "AND(AND(Compare(a = 1), Compare(b = 2)), Compare(c = 3))"
        );
    }

    #[test]
    fn test_chained_or_left_associates() {
        assert_eq!(
            outline("SELECT x FROM t WHERE a=1 OR b=2 OR c=3;"),
            "OR(OR(Compare(a = 1), Compare(b = 2)), Compare(c = 3))"
        );
    }

    #[test]
    fn test_redundant_parens_are_dropped() {
        let statement = parse("SELECT x FROM t WHERE (a=1);").unwrap();

        assert_eq!(statement.condition.unwrap().to_string(), "a = 1");
    }

    #[test]
    fn test_parens_override_precedence() {
        assert_eq!(
            outline("SELECT x FROM t WHERE (a=1 OR b=2) AND c=3;"),
            "AND(OR(Compare(a = 1), Compare(b = 2)), Compare(c = 3))"
        );
    }

    #[test]
    fn test_not_consumes_whole_expression() {
        assert_eq!(
            outline("SELECT x FROM t WHERE NOT a=1 AND b=2;"),
            "NOT(AND(Compare(a = 1), Compare(b = 2)))"
        );
        assert_eq!(
            outline("SELECT x FROM t WHERE NOT a=1 OR b=2;"),
            "NOT(OR(Compare(a = 1), Compare(b = 2)))"
        );
    }

    #[test]
    fn test_parenthesized_not() {
        let statement = parse("SELECT x FROM t WHERE (NOT a=1) AND b=2;").unwrap();
        let condition = statement.condition.unwrap();

        assert_eq!(
            condition.outline(),
            "AND(NOT(Compare(a = 1)), Compare(b = 2))"
        );
        assert_eq!(condition.to_string(), "(NOT a = 1) AND b = 2");
    }

    #[test]
    fn test_all_comparison_operators() {
        let statement =
            parse("SELECT x FROM t WHERE a=1 AND b!=2 AND c<3 AND d<=4 AND e>5 AND f>=6;").unwrap();

        assert_eq!(
            statement.condition.unwrap().to_string(),
            "a = 1 AND b != 2 AND c < 3 AND d <= 4 AND e > 5 AND f >= 6"
        );
    }

    #[test]
    fn test_operand_kinds() {
        let statement = parse("SELECT x FROM t WHERE 5 = \"five\";").unwrap();

        match statement.condition.unwrap() {
            Condition::Comparison(c) => {
                assert!(matches!(c.left.value, OperandValue::Number(ref n) if n.value == "5"));
                assert!(matches!(c.right.value, OperandValue::String(ref s) if s.value == "five"));
                assert_eq!(c.op, ComparisonOperator::Equal);
                assert_eq!(c.token.span, Slice::new(24, 25));
            }
            other => panic!("expected a comparison, got {other:?}"),
        }
    }

    #[test]
    fn test_boolean_node_records_operator_token() {
        let statement = parse("SELECT x FROM t WHERE a=1 OR b=2;").unwrap();

        match statement.condition.unwrap() {
            Condition::Boolean(b) => {
                assert_eq!(b.op, BooleanOperator::Or);
                assert_eq!(b.token.kind, TokenKind::Or);
                assert_eq!(b.token.span, Slice::new(26, 28));
            }
            other => panic!("expected a boolean condition, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_from() {
        let err = parse("SELECT x t;").unwrap_err();

        assert_eq!(
            err,
            ParseError::Syntax(SyntaxError::new(
                SyntaxErrorKind::UnexpectedToken {
                    expected: String::from("FROM"),
                    found: String::from("IDENTIFIER")
                },
                Slice::new(9, 10)
            ))
        );
    }

    #[test]
    fn test_missing_statement() {
        assert_eq!(
            syntax_kind(";"),
            SyntaxErrorKind::ExpectedStatement {
                found: String::from("SEMICOLON")
            }
        );
        assert_eq!(
            syntax_kind(""),
            SyntaxErrorKind::ExpectedStatement {
                found: String::from("EOF")
            }
        );
    }

    #[test]
    fn test_missing_semicolon() {
        assert_eq!(
            syntax_kind("SELECT x FROM t"),
            SyntaxErrorKind::UnexpectedToken {
                expected: String::from("SEMICOLON"),
                found: String::from("EOF")
            }
        );
    }

    #[test]
    fn test_trailing_input_after_statement() {
        assert_eq!(
            syntax_kind("SELECT x FROM t; SELECT y FROM u;"),
            SyntaxErrorKind::UnexpectedToken {
                expected: String::from("EOF"),
                found: String::from("SELECT")
            }
        );
    }

    #[test]
    fn test_unrecognized_operand() {
        assert_eq!(
            syntax_kind("SELECT x FROM t WHERE a = ,;"),
            SyntaxErrorKind::UnrecognizedOperand {
                found: String::from("COMMA")
            }
        );
    }

    #[test]
    fn test_unrecognized_condition() {
        assert_eq!(
            syntax_kind("SELECT x FROM t WHERE = 1;"),
            SyntaxErrorKind::UnrecognizedCondition {
                found: String::from("EQUAL")
            }
        );
    }

    #[test]
    fn test_missing_comparison_operator() {
        assert!(matches!(
            syntax_kind("SELECT x FROM t WHERE a b;"),
            SyntaxErrorKind::ExpectedComparisonOperator { .. }
        ));
    }

    #[test]
    fn test_unclosed_paren() {
        assert_eq!(
            syntax_kind("SELECT x FROM t WHERE (a = 1;"),
            SyntaxErrorKind::UnexpectedToken {
                expected: String::from("R_PAREN"),
                found: String::from("SEMICOLON")
            }
        );
    }

    #[test]
    fn test_lex_error_surfaces_before_parsing() {
        assert_eq!(
            parse("SELECT 1a FROM t;").unwrap_err(),
            ParseError::Lex(LexError::LetterInNumber { position: 8 })
        );
    }

    #[test]
    fn test_lex_error_in_first_token() {
        assert!(matches!(
            Parser::new(Lexer::new("!x")),
            Err(ParseError::Lex(LexError::UnexpectedCharacter { .. }))
        ));
    }

    #[test]
    fn test_max_depth() {
        let shallow = Parser::with_max_depth(Lexer::new("SELECT x FROM t WHERE (a=1);"), 2)
            .unwrap()
            .parse();
        assert!(shallow.is_ok());

        let deep = Parser::with_max_depth(Lexer::new("SELECT x FROM t WHERE ((a=1));"), 2)
            .unwrap()
            .parse();
        assert!(matches!(
            deep,
            Err(ParseError::Syntax(SyntaxError {
                kind: SyntaxErrorKind::MaximumRecursionDepthReached,
                ..
            }))
        ));
    }

    #[test]
    fn test_long_and_chain_parses_renders_and_drops() {
        let n = 100_000;
        let src = format!("SELECT x FROM t WHERE {}a=1;", "a=1 AND ".repeat(n));

        let statement = parse(&src).unwrap();
        assert_eq!(
            statement.to_string(),
            format!("SELECT x FROM t WHERE {}a = 1", "a = 1 AND ".repeat(n))
        );

        let outline = statement.condition.as_ref().unwrap().outline();
        assert!(outline.starts_with("AND(AND("));
        assert!(outline.ends_with(", Compare(a = 1))"));

        drop(statement);
    }

    #[test]
    fn test_long_or_chain_compares_and_drops() {
        let src = format!("SELECT x FROM t WHERE {}a=1;", "a=1 AND b=2 OR ".repeat(100_000));

        let first = parse(&src).unwrap();
        let second = parse(&src).unwrap();
        assert!(first.condition == second.condition);

        let rendered = first.condition.as_ref().unwrap().to_string();
        assert!(rendered.starts_with("a = 1 AND b = 2 OR a = 1 AND b = 2 OR"));

        drop(first);
        drop(second);
    }

    #[test]
    fn test_chain_inside_parens_keeps_shape() {
        assert_eq!(
            outline("SELECT x FROM t WHERE (a=1 OR b=2 OR c=3) AND d=4 AND NOT e=5;"),
            "AND(AND(OR(OR(Compare(a = 1), Compare(b = 2)), Compare(c = 3)), Compare(d = 4)), \
             NOT(Compare(e = 5)))"
        );
    }

    #[test]
    fn test_deep_nesting_fails_cleanly() {
        let src = format!(
            "SELECT x FROM t WHERE {}a=1{};",
            "(".repeat(10_000),
            ")".repeat(10_000)
        );

        assert_eq!(
            syntax_kind(&src),
            SyntaxErrorKind::MaximumRecursionDepthReached
        );
    }

    #[test]
    fn test_demo_query() {
        let src = "
SELECT
  productId,
  productType AS type,
  sellerName AS seller
FROM connections
WHERE
  saleCount > 1000 AND (totalViews > 10000 OR reviewCount > 100)
;
";
        let statement = parse(src).unwrap();

        assert_eq!(statement.table.value, "connections");
        assert_eq!(
            statement.outline(),
            "SELECT([productId, productType AS type, sellerName AS seller], connections, \
             AND(Compare(saleCount > 1000), OR(Compare(totalViews > 10000), Compare(reviewCount > 100))))"
        );
        assert_eq!(
            statement.to_string(),
            "SELECT productId, productType AS type, sellerName AS seller FROM connections \
             WHERE saleCount > 1000 AND (totalViews > 10000 OR reviewCount > 100)"
        );
    }
}
