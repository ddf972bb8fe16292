//! Sandboxed bind-expression evaluator
//!
//! EXPRESSION binds carry a small source string evaluated against the
//! instance's `{flowProps, masterProps}` scope. Instead of a general
//! evaluator this is a restricted interpreter over a fixed grammar:
//! literals, identifiers, dotted member access, indexing, unary `!`/`-`,
//! arithmetic, comparisons, `&&`/`||`, and the ternary operator. Values are
//! `serde_json::Value`; missing members resolve to `null` rather than
//! erroring, matching lookup semantics elsewhere in the runtime.

use logos::Logos;
use serde_json::{Number, Value};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ExprError {
    #[error("unrecognized token at byte {0}")]
    Lex(usize),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected token: {0}")]
    UnexpectedToken(String),

    #[error("cannot apply {op} to {operand}")]
    TypeMismatch { op: &'static str, operand: String },
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum Token {
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    #[regex(r"'([^'\\]|\\.)*'", |lex| unescape(lex.slice()))]
    Str(String),

    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[token(".")]
    Dot,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    #[token("!=")]
    NotEq,
    #[token("!")]
    Bang,
    #[token("==")]
    EqEq,
    #[token("<=")]
    Lte,
    #[token("<")]
    Lt,
    #[token(">=")]
    Gte,
    #[token(">")]
    Gt,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
}

fn unescape(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Literal(Value),
    Ident(String),
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinOp {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    NotEq,
    And,
    Or,
}

impl BinOp {
    /// Binding power, higher binds tighter.
    fn precedence(self) -> u8 {
        match self {
            BinOp::Mul | BinOp::Div | BinOp::Rem => 6,
            BinOp::Add | BinOp::Sub => 5,
            BinOp::Lt | BinOp::Lte | BinOp::Gt | BinOp::Gte => 4,
            BinOp::Eq | BinOp::NotEq => 3,
            BinOp::And => 2,
            BinOp::Or => 1,
        }
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<Token, ExprError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(ExprError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ExprError> {
        let token = self.next()?;
        if &token == expected {
            Ok(())
        } else {
            Err(ExprError::UnexpectedToken(format!("{:?}", token)))
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, ExprError> {
        let condition = self.parse_binary(0)?;

        if matches!(self.peek(), Some(Token::Question)) {
            self.next()?;
            let then_branch = self.parse_expr()?;
            self.expect(&Token::Colon)?;
            let else_branch = self.parse_expr()?;
            return Ok(Expr::Ternary(
                Box::new(condition),
                Box::new(then_branch),
                Box::new(else_branch),
            ));
        }

        Ok(condition)
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, ExprError> {
        let mut left = self.parse_unary()?;

        while let Some(op) = self.peek_binop() {
            if op.precedence() < min_precedence {
                break;
            }
            self.next()?;
            let right = self.parse_binary(op.precedence() + 1)?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    fn peek_binop(&self) -> Option<BinOp> {
        Some(match self.peek()? {
            Token::Star => BinOp::Mul,
            Token::Slash => BinOp::Div,
            Token::Percent => BinOp::Rem,
            Token::Plus => BinOp::Add,
            Token::Minus => BinOp::Sub,
            Token::Lt => BinOp::Lt,
            Token::Lte => BinOp::Lte,
            Token::Gt => BinOp::Gt,
            Token::Gte => BinOp::Gte,
            Token::EqEq => BinOp::Eq,
            Token::NotEq => BinOp::NotEq,
            Token::AndAnd => BinOp::And,
            Token::OrOr => BinOp::Or,
            _ => return None,
        })
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        match self.peek() {
            Some(Token::Bang) => {
                self.next()?;
                Ok(Expr::Unary(UnaryOp::Not, Box::new(self.parse_unary()?)))
            }
            Some(Token::Minus) => {
                self.next()?;
                Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.parse_unary()?)))
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.next()?;
                    match self.next()? {
                        Token::Ident(name) => expr = Expr::Member(Box::new(expr), name),
                        other => {
                            return Err(ExprError::UnexpectedToken(format!("{:?}", other)))
                        }
                    }
                }
                Some(Token::LBracket) => {
                    self.next()?;
                    let index = self.parse_expr()?;
                    self.expect(&Token::RBracket)?;
                    expr = Expr::Index(Box::new(expr), Box::new(index));
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        match self.next()? {
            Token::Number(n) => Ok(Expr::Literal(number(n))),
            Token::Str(s) => Ok(Expr::Literal(Value::String(s))),
            Token::True => Ok(Expr::Literal(Value::Bool(true))),
            Token::False => Ok(Expr::Literal(Value::Bool(false))),
            Token::Null => Ok(Expr::Literal(Value::Null)),
            Token::Ident(name) => Ok(Expr::Ident(name)),
            Token::LParen => {
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            other => Err(ExprError::UnexpectedToken(format!("{:?}", other))),
        }
    }
}

fn number(n: f64) -> Value {
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    value.as_f64()
}

/// Evaluates an expression source string against a scope object.
pub fn evaluate(source: &str, scope: &Value) -> Result<Value, ExprError> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(source).spanned() {
        match result {
            Ok(token) => tokens.push(token),
            Err(_) => return Err(ExprError::Lex(span.start)),
        }
    }

    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(ExprError::UnexpectedToken(format!(
            "{:?}",
            parser.tokens[parser.pos]
        )));
    }

    eval(&expr, scope)
}

fn eval(expr: &Expr, scope: &Value) -> Result<Value, ExprError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Ident(name) => Ok(scope.get(name).cloned().unwrap_or(Value::Null)),
        Expr::Member(base, name) => {
            let base = eval(base, scope)?;
            Ok(base.get(name).cloned().unwrap_or(Value::Null))
        }
        Expr::Index(base, index) => {
            let base = eval(base, scope)?;
            let index = eval(index, scope)?;
            Ok(match &index {
                Value::Number(n) => n
                    .as_u64()
                    .and_then(|i| base.get(i as usize))
                    .cloned()
                    .unwrap_or(Value::Null),
                Value::String(key) => base.get(key.as_str()).cloned().unwrap_or(Value::Null),
                _ => Value::Null,
            })
        }
        Expr::Unary(op, operand) => {
            let value = eval(operand, scope)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!truthy(&value))),
                UnaryOp::Neg => match as_number(&value) {
                    Some(n) => Ok(number(-n)),
                    None => Err(ExprError::TypeMismatch {
                        op: "-",
                        operand: value.to_string(),
                    }),
                },
            }
        }
        Expr::Binary(op, lhs, rhs) => eval_binary(*op, lhs, rhs, scope),
        Expr::Ternary(condition, then_branch, else_branch) => {
            if truthy(&eval(condition, scope)?) {
                eval(then_branch, scope)
            } else {
                eval(else_branch, scope)
            }
        }
    }
}

fn eval_binary(op: BinOp, lhs: &Expr, rhs: &Expr, scope: &Value) -> Result<Value, ExprError> {
    // short-circuit forms first
    match op {
        BinOp::And => {
            let left = eval(lhs, scope)?;
            return if truthy(&left) { eval(rhs, scope) } else { Ok(left) };
        }
        BinOp::Or => {
            let left = eval(lhs, scope)?;
            return if truthy(&left) { Ok(left) } else { eval(rhs, scope) };
        }
        _ => {}
    }

    let left = eval(lhs, scope)?;
    let right = eval(rhs, scope)?;

    match op {
        BinOp::Add => {
            // string concatenation when either side is a string
            if left.is_string() || right.is_string() {
                return Ok(Value::String(format!(
                    "{}{}",
                    stringify(&left),
                    stringify(&right)
                )));
            }
            numeric_op(op, &left, &right, |a, b| a + b)
        }
        BinOp::Sub => numeric_op(op, &left, &right, |a, b| a - b),
        BinOp::Mul => numeric_op(op, &left, &right, |a, b| a * b),
        BinOp::Div => numeric_op(op, &left, &right, |a, b| a / b),
        BinOp::Rem => numeric_op(op, &left, &right, |a, b| a % b),
        BinOp::Eq => Ok(Value::Bool(left == right)),
        BinOp::NotEq => Ok(Value::Bool(left != right)),
        BinOp::Lt | BinOp::Lte | BinOp::Gt | BinOp::Gte => compare(op, &left, &right),
        BinOp::And | BinOp::Or => unreachable!("handled above"),
    }
}

fn numeric_op(
    op: BinOp,
    left: &Value,
    right: &Value,
    apply: impl Fn(f64, f64) -> f64,
) -> Result<Value, ExprError> {
    match (as_number(left), as_number(right)) {
        (Some(a), Some(b)) => Ok(number(apply(a, b))),
        _ => Err(ExprError::TypeMismatch {
            op: op_name(op),
            operand: format!("{} and {}", left, right),
        }),
    }
}

fn compare(op: BinOp, left: &Value, right: &Value) -> Result<Value, ExprError> {
    let ordering = match (left, right) {
        (Value::String(a), Value::String(b)) => a.partial_cmp(b),
        _ => match (as_number(left), as_number(right)) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    };

    let Some(ordering) = ordering else {
        return Err(ExprError::TypeMismatch {
            op: op_name(op),
            operand: format!("{} and {}", left, right),
        });
    };

    Ok(Value::Bool(match op {
        BinOp::Lt => ordering.is_lt(),
        BinOp::Lte => ordering.is_le(),
        BinOp::Gt => ordering.is_gt(),
        BinOp::Gte => ordering.is_ge(),
        _ => unreachable!(),
    }))
}

fn op_name(op: BinOp) -> &'static str {
    match op {
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Rem => "%",
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Lt => "<",
        BinOp::Lte => "<=",
        BinOp::Gt => ">",
        BinOp::Gte => ">=",
        BinOp::Eq => "==",
        BinOp::NotEq => "!=",
        BinOp::And => "&&",
        BinOp::Or => "||",
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
