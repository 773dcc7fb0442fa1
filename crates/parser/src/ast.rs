use std::fmt;

use lexer::token::{Token, TokenKind};

/// Common surface of every tree node: the token that triggered its
/// construction, and its textual rendering.
pub trait Node: fmt::Display {
    fn token(&self) -> &Token;

    fn render(&self) -> String {
        self.to_string()
    }
}

#[derive(PartialEq, Debug)]
pub struct Statement {
    pub token: Token,
    pub name: String,
    pub projection: Projection,
    pub table: Identifier,
    pub condition: Option<Condition>,
}

impl Statement {
    pub fn columns(&self) -> &[Column] {
        match &self.projection {
            Projection::Wildcard(column) => std::slice::from_ref(column),
            Projection::Columns(columns) => columns,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self.projection, Projection::Wildcard(_))
    }

    /// Token-free structural summary. Two statements with equal outlines have
    /// the same shape regardless of spacing or redundant parentheses.
    pub fn outline(&self) -> String {
        let columns = self
            .columns()
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<String>>()
            .join(", ");

        match &self.condition {
            Some(c) => format!(
                "{}([{}], {}, {})",
                self.name,
                columns,
                self.table,
                c.outline()
            ),
            None => format!("{}([{}], {})", self.name, columns, self.table),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} FROM {}", self.name, self.projection, self.table)?;

        match &self.condition {
            Some(c) => write!(f, " WHERE {}", c),
            None => Ok(()),
        }
    }
}

impl Node for Statement {
    fn token(&self) -> &Token {
        &self.token
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum Projection {
    /// `*`, held as a single synthetic column.
    Wildcard(Column),
    Columns(Vec<Column>),
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Wildcard(column) => write!(f, "{column}"),
            Projection::Columns(columns) => {
                let joined = columns
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<String>>()
                    .join(", ");

                f.write_str(&joined)
            }
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct Column {
    pub token: Token,
    pub name: Identifier,
    pub alias: Option<Identifier>,
}

impl Column {
    pub fn new(name: Identifier, alias: Option<Identifier>) -> Self {
        Column {
            token: name.token.clone(),
            name,
            alias,
        }
    }

    pub fn wildcard(token: Token) -> Self {
        Column::new(Identifier::new(token), None)
    }

    /// The name this column is exposed under.
    pub fn output_name(&self) -> &str {
        match &self.alias {
            Some(alias) => &alias.value,
            None => &self.name.value,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;

        match &self.alias {
            Some(alias) => write!(f, " AS {}", alias),
            None => Ok(()),
        }
    }
}

impl Node for Column {
    fn token(&self) -> &Token {
        &self.token
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct Identifier {
    pub token: Token,
    pub value: String,
}

impl Identifier {
    pub fn new(token: Token) -> Self {
        let value = token.text.clone();
        Identifier { token, value }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl Node for Identifier {
    fn token(&self) -> &Token {
        &self.token
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct NumberLiteral {
    pub token: Token,
    pub value: String,
}

impl NumberLiteral {
    pub fn new(token: Token) -> Self {
        let value = token.text.clone();
        NumberLiteral { token, value }
    }
}

impl fmt::Display for NumberLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl Node for NumberLiteral {
    fn token(&self) -> &Token {
        &self.token
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct StringLiteral {
    pub token: Token,
    /// The literal without its enclosing quotes.
    pub value: String,
}

impl StringLiteral {
    pub fn new(token: Token) -> Self {
        let value = token
            .text
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(&token.text)
            .to_string();

        StringLiteral { token, value }
    }
}

impl fmt::Display for StringLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        f.write_str(&self.value)?;
        f.write_str("\"")
    }
}

impl Node for StringLiteral {
    fn token(&self) -> &Token {
        &self.token
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum OperandValue {
    Number(NumberLiteral),
    Identifier(Identifier),
    String(StringLiteral),
}

impl fmt::Display for OperandValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandValue::Number(n) => write!(f, "{n}"),
            OperandValue::Identifier(i) => write!(f, "{i}"),
            OperandValue::String(s) => write!(f, "{s}"),
        }
    }
}

/// One side of a comparison.
#[derive(PartialEq, Debug, Clone)]
pub struct Operand {
    pub token: Token,
    pub value: OperandValue,
}

impl Operand {
    pub fn new(value: OperandValue) -> Self {
        let token = match &value {
            OperandValue::Number(n) => n.token.clone(),
            OperandValue::Identifier(i) => i.token.clone(),
            OperandValue::String(s) => s.token.clone(),
        };

        Operand { token, value }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl Node for Operand {
    fn token(&self) -> &Token {
        &self.token
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl ComparisonOperator {
    pub fn from_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Equal => Some(ComparisonOperator::Equal),
            TokenKind::NotEqual => Some(ComparisonOperator::NotEqual),
            TokenKind::LessThan => Some(ComparisonOperator::LessThan),
            TokenKind::LessThanOrEqual => Some(ComparisonOperator::LessThanOrEqual),
            TokenKind::GreaterThan => Some(ComparisonOperator::GreaterThan),
            TokenKind::GreaterThanOrEqual => Some(ComparisonOperator::GreaterThanOrEqual),
            _ => None,
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOperator::Equal => f.write_str("="),
            ComparisonOperator::NotEqual => f.write_str("!="),
            ComparisonOperator::LessThan => f.write_str("<"),
            ComparisonOperator::LessThanOrEqual => f.write_str("<="),
            ComparisonOperator::GreaterThan => f.write_str(">"),
            ComparisonOperator::GreaterThanOrEqual => f.write_str(">="),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct Comparison {
    pub token: Token,
    pub op: ComparisonOperator,
    pub left: Operand,
    pub right: Operand,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.token.text, self.right)
    }
}

impl Node for Comparison {
    fn token(&self) -> &Token {
        &self.token
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum BooleanOperator {
    And,
    Or,
}

impl BooleanOperator {
    pub fn from_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::And => Some(BooleanOperator::And),
            TokenKind::Or => Some(BooleanOperator::Or),
            _ => None,
        }
    }

    /// Higher binds tighter.
    fn precedence(&self) -> u8 {
        match self {
            BooleanOperator::Or => 1,
            BooleanOperator::And => 2,
        }
    }
}

impl fmt::Display for BooleanOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BooleanOperator::And => f.write_str("AND"),
            BooleanOperator::Or => f.write_str("OR"),
        }
    }
}

#[derive(PartialEq, Debug)]
pub struct BooleanCondition {
    pub token: Token,
    pub op: BooleanOperator,
    pub left: Box<Condition>,
    pub right: Box<Condition>,
}

impl BooleanCondition {
    /// Parentheses the renderer must add so the text re-parses to this tree.
    fn needs_parens(&self, child: &Condition, is_right: bool) -> bool {
        match child {
            Condition::Comparison(_) => false,
            // NOT swallows everything after it, so it is always fenced in.
            Condition::Not(_) => true,
            Condition::Boolean(b) => {
                let (child_prec, prec) = (b.op.precedence(), self.op.precedence());
                child_prec < prec || (is_right && child_prec == prec)
            }
        }
    }

    fn fmt_child(
        &self,
        f: &mut fmt::Formatter<'_>,
        child: &Condition,
        is_right: bool,
    ) -> fmt::Result {
        match self.needs_parens(child, is_right) {
            true => write!(f, "({child})"),
            false => write!(f, "{child}"),
        }
    }
}

impl fmt::Display for BooleanCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Chains fold to the left, so walk the left spine instead of recursing.
        let mut spine = vec![self];
        let mut parent = self;
        let mut leftmost: &Condition = &self.left;

        while let Condition::Boolean(b) = leftmost {
            if parent.needs_parens(leftmost, false) {
                break;
            }

            spine.push(b);
            parent = b;
            leftmost = &b.left;
        }

        parent.fmt_child(f, leftmost, false)?;

        for node in spine.iter().rev() {
            write!(f, " {} ", node.token.text)?;
            node.fmt_child(f, &node.right, true)?;
        }

        Ok(())
    }
}

impl Drop for BooleanCondition {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach(&mut self.left, &mut pending);
        detach(&mut self.right, &mut pending);

        while let Some(mut node) = pending.pop() {
            match &mut node {
                Condition::Boolean(b) => {
                    detach(&mut b.left, &mut pending);
                    detach(&mut b.right, &mut pending);
                }
                Condition::Not(n) => detach(&mut n.expr, &mut pending),
                Condition::Comparison(_) => {}
            }
        }
    }
}

/// Move a nested subtree onto `pending`, leaving an empty leaf behind, so
/// dropping a long chain never recurses.
fn detach(slot: &mut Box<Condition>, pending: &mut Vec<Condition>) {
    if matches!(**slot, Condition::Comparison(_)) {
        return;
    }

    pending.push(std::mem::replace(&mut **slot, Condition::empty()));
}

impl Node for BooleanCondition {
    fn token(&self) -> &Token {
        &self.token
    }
}

/// `NOT <expression>`. The negated expression extends as far as an
/// unparenthesized expression would, so `NOT a = 1 AND b = 2` negates the
/// whole conjunction.
#[derive(PartialEq, Debug)]
pub struct Negation {
    pub token: Token,
    pub expr: Box<Condition>,
}

impl fmt::Display for Negation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.token.text, self.expr)
    }
}

impl Node for Negation {
    fn token(&self) -> &Token {
        &self.token
    }
}

/// Derived `Debug` recurses per level; use [`Condition::outline`] for
/// arbitrarily long chains.
#[derive(Debug)]
pub enum Condition {
    Comparison(Comparison),
    Boolean(BooleanCondition),
    Not(Negation),
}

impl Condition {
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(&mut out);
        out
    }

    fn write_outline(&self, out: &mut String) {
        let mut spine = Vec::new();
        let mut node = self;

        while let Condition::Boolean(b) = node {
            spine.push(b);
            node = &b.left;
        }

        for b in &spine {
            out.push_str(&format!("{}(", b.op));
        }

        match node {
            Condition::Comparison(c) => out.push_str(&format!("Compare({c})")),
            Condition::Not(n) => {
                out.push_str("NOT(");
                n.expr.write_outline(out);
                out.push(')');
            }
            Condition::Boolean(_) => {}
        }

        for b in spine.iter().rev() {
            out.push_str(", ");
            b.right.write_outline(out);
            out.push(')');
        }
    }

    /// Leaf with no content, used as a placeholder while tearing down a tree.
    fn empty() -> Condition {
        let token = Token::new(TokenKind::EOF, String::new(), 0);
        let operand = Operand::new(OperandValue::Identifier(Identifier::new(token.clone())));

        Condition::Comparison(Comparison {
            token,
            op: ComparisonOperator::Equal,
            left: operand.clone(),
            right: operand,
        })
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        let mut pairs: Vec<(&Condition, &Condition)> = vec![(self, other)];

        while let Some(pair) = pairs.pop() {
            match pair {
                (Condition::Comparison(a), Condition::Comparison(b)) => {
                    if a != b {
                        return false;
                    }
                }
                (Condition::Boolean(a), Condition::Boolean(b)) => {
                    if a.token != b.token || a.op != b.op {
                        return false;
                    }
                    pairs.push((&*a.left, &*b.left));
                    pairs.push((&*a.right, &*b.right));
                }
                (Condition::Not(a), Condition::Not(b)) => {
                    if a.token != b.token {
                        return false;
                    }
                    pairs.push((&*a.expr, &*b.expr));
                }
                _ => return false,
            }
        }

        true
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Comparison(c) => write!(f, "{c}"),
            Condition::Boolean(b) => write!(f, "{b}"),
            Condition::Not(n) => write!(f, "{n}"),
        }
    }
}

impl Node for Condition {
    fn token(&self) -> &Token {
        match self {
            Condition::Comparison(c) => &c.token,
            Condition::Boolean(b) => &b.token,
            Condition::Not(n) => &n.token,
        }
    }
}
