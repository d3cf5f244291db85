//! Tokenizer and recursive-descent parser for checker expressions.

use crate::error::CheckerError;

/// Maximum nesting of a checker expression.
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    LooseEq,
    LooseNe,
    StrictEq,
    StrictNe,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Compiled checker expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    Bool(bool),
    Null,
    Undefined,
    Ident(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare(CompareOp, Box<Expr>, Box<Expr>),
    Length(Box<Expr>),
    Index(Box<Expr>, Box<Expr>),
    Includes(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Identifiers referenced anywhere in the expression, in source order.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            match expr {
                Expr::Ident(name) => names.push(name.as_str()),
                Expr::Not(inner) | Expr::Length(inner) => stack.push(inner),
                Expr::And(a, b)
                | Expr::Or(a, b)
                | Expr::Compare(_, a, b)
                | Expr::Index(a, b)
                | Expr::Includes(a, b) => {
                    stack.push(b);
                    stack.push(a);
                }
                _ => {}
            }
        }
        names
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Number(f64),
    Str(String),
    Ident(String),
    Op(&'static str),
    End,
}

const OPERATORS: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "<", ">", "!", "(", ")", "[", "]", ".",
];

struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn next(&mut self) -> Result<(Tok, usize), CheckerError> {
        let rest = &self.src[self.pos..];
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
        let start = self.pos;
        let Some(c) = trimmed.chars().next() else {
            return Ok((Tok::End, start));
        };

        if c.is_ascii_digit() || (c == '.' && trimmed[1..].starts_with(|d: char| d.is_ascii_digit())) {
            let len = trimmed
                .find(|d: char| !(d.is_ascii_digit() || d == '.'))
                .unwrap_or(trimmed.len());
            let text = &trimmed[..len];
            let value = text
                .parse::<f64>()
                .map_err(|_| CheckerError::syntax(start, format!("invalid number '{text}'")))?;
            self.pos += len;
            return Ok((Tok::Number(value), start));
        }
        if c == '_' || c == '$' || c.is_ascii_alphabetic() {
            let len = trimmed
                .find(|d: char| !(d == '_' || d == '$' || d.is_ascii_alphanumeric()))
                .unwrap_or(trimmed.len());
            self.pos += len;
            return Ok((Tok::Ident(trimmed[..len].to_string()), start));
        }
        if c == '"' || c == '\'' {
            return self.string(c, start);
        }
        match OPERATORS.iter().find(|op| trimmed.starts_with(**op)) {
            Some(op) => {
                self.pos += op.len();
                Ok((Tok::Op(*op), start))
            }
            None => Err(CheckerError::syntax(start, format!("unexpected character '{c}'"))),
        }
    }

    fn string(&mut self, quote: char, start: usize) -> Result<(Tok, usize), CheckerError> {
        let mut value = String::new();
        let mut chars = self.src[start + 1..].char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                c if c == quote => {
                    self.pos = start + 1 + i + 1;
                    return Ok((Tok::Str(value), start));
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, '0')) => value.push('\0'),
                    Some((_, other)) => value.push(other),
                    None => break,
                },
                '\n' => break,
                c => value.push(c),
            }
        }
        Err(CheckerError::syntax(start, "unterminated string"))
    }
}

/// Parse a checker expression. Identifiers are not resolved here.
pub fn parse(src: &str) -> Result<Expr, CheckerError> {
    let mut tokenizer = Tokenizer { src, pos: 0 };
    let (cur, cur_pos) = tokenizer.next()?;
    let mut parser = Parser {
        tokenizer,
        cur,
        cur_pos,
        depth: 0,
    };
    if parser.cur == Tok::End {
        return Err(CheckerError::syntax(0, "empty expression"));
    }
    let expr = parser.parse_or()?;
    if parser.cur != Tok::End {
        return Err(parser.unexpected());
    }
    Ok(expr)
}

struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    cur: Tok,
    cur_pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn advance(&mut self) -> Result<Tok, CheckerError> {
        let (next, pos) = self.tokenizer.next()?;
        self.cur_pos = pos;
        Ok(std::mem::replace(&mut self.cur, next))
    }

    fn eat(&mut self, op: &str) -> Result<bool, CheckerError> {
        if matches!(self.cur, Tok::Op(current) if current == op) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, op: &str) -> Result<(), CheckerError> {
        if self.eat(op)? {
            Ok(())
        } else {
            Err(CheckerError::syntax(self.cur_pos, format!("expected '{op}'")))
        }
    }

    fn unexpected(&self) -> CheckerError {
        let found = match &self.cur {
            Tok::Number(n) => n.to_string(),
            Tok::Str(s) => format!("{s:?}"),
            Tok::Ident(name) => name.clone(),
            Tok::Op(op) => (*op).to_string(),
            Tok::End => return CheckerError::syntax(self.cur_pos, "unexpected end of expression"),
        };
        CheckerError::syntax(self.cur_pos, format!("unexpected token '{found}'"))
    }

    fn enter(&mut self) -> Result<(), CheckerError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CheckerError::DepthExceeded(MAX_DEPTH));
        }
        Ok(())
    }

    fn parse_or(&mut self) -> Result<Expr, CheckerError> {
        let mut left = self.parse_and()?;
        let mut levels = 0;
        while self.eat("||")? {
            self.enter()?;
            levels += 1;
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        self.depth -= levels;
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, CheckerError> {
        let mut left = self.parse_equality()?;
        let mut levels = 0;
        while self.eat("&&")? {
            self.enter()?;
            levels += 1;
            let right = self.parse_equality()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        self.depth -= levels;
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, CheckerError> {
        self.parse_comparison(
            &[
                ("===", CompareOp::StrictEq),
                ("!==", CompareOp::StrictNe),
                ("==", CompareOp::LooseEq),
                ("!=", CompareOp::LooseNe),
            ],
            Self::parse_relational,
        )
    }

    fn parse_relational(&mut self) -> Result<Expr, CheckerError> {
        self.parse_comparison(
            &[
                ("<=", CompareOp::Le),
                (">=", CompareOp::Ge),
                ("<", CompareOp::Lt),
                (">", CompareOp::Gt),
            ],
            Self::parse_unary,
        )
    }

    fn parse_comparison(
        &mut self,
        ops: &[(&str, CompareOp)],
        operand: fn(&mut Self) -> Result<Expr, CheckerError>,
    ) -> Result<Expr, CheckerError> {
        let mut left = operand(self)?;
        let mut levels = 0;
        'chain: loop {
            for (text, op) in ops {
                if self.eat(text)? {
                    self.enter()?;
                    levels += 1;
                    let right = operand(self)?;
                    left = Expr::Compare(*op, Box::new(left), Box::new(right));
                    continue 'chain;
                }
            }
            break;
        }
        self.depth -= levels;
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, CheckerError> {
        if self.eat("!")? {
            self.enter()?;
            let inner = self.parse_unary()?;
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, CheckerError> {
        let mut expr = self.parse_primary()?;
        let mut levels = 0;
        loop {
            if self.eat(".")? {
                self.enter()?;
                levels += 1;
                let pos = self.cur_pos;
                match self.advance()? {
                    Tok::Ident(name) if name == "length" => {
                        expr = Expr::Length(Box::new(expr));
                    }
                    Tok::Ident(name) if name == "includes" => {
                        self.expect("(")?;
                        let needle = self.parse_nested()?;
                        self.expect(")")?;
                        expr = Expr::Includes(Box::new(expr), Box::new(needle));
                    }
                    Tok::Ident(name) => {
                        return Err(CheckerError::syntax(
                            pos,
                            format!("property '{name}' is not supported"),
                        ))
                    }
                    _ => return Err(CheckerError::syntax(pos, "expected a property name")),
                }
            } else if self.eat("[")? {
                self.enter()?;
                levels += 1;
                let index = self.parse_nested()?;
                self.expect("]")?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else {
                break;
            }
        }
        self.depth -= levels;
        Ok(expr)
    }

    fn parse_nested(&mut self) -> Result<Expr, CheckerError> {
        self.enter()?;
        let expr = self.parse_or()?;
        self.depth -= 1;
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, CheckerError> {
        let expr = match &self.cur {
            Tok::Number(n) => Expr::Number(*n),
            Tok::Str(s) => Expr::Str(s.clone()),
            Tok::Ident(name) => match name.as_str() {
                "true" => Expr::Bool(true),
                "false" => Expr::Bool(false),
                "null" => Expr::Null,
                "undefined" => Expr::Undefined,
                _ => Expr::Ident(name.clone()),
            },
            Tok::Op("(") => {
                self.advance()?;
                let inner = self.parse_nested()?;
                self.expect(")")?;
                return Ok(inner);
            }
            _ => return Err(self.unexpected()),
        };
        self.advance()?;
        Ok(expr)
    }
}
