// src/parser.rs

use crate::ast::{BinOp, Node};
use crate::error::{ParseError, ParseErrorKind};
use crate::functions::{BinaryFunc, UnaryFunc, CONSTANTS};

/// Words that introduce a `Derivative` node.
const DERIVATIVE_WORDS: &[&str] = &["deriv", "d"];

// --- The Parser ---
pub struct Parser {
    input: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        Parser {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn current_char(&self) -> Option<char> { self.input.get(self.pos).copied() }

    fn advance(&mut self) {
        if let Some(c) = self.current_char() {
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
            self.pos += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        loop {
            while let Some(c) = self.current_char() {
                if c.is_whitespace() {
                    self.advance();
                } else {
                    break;
                }
            }

            // Comments run to the end of the line.
            if self.current_char() == Some('#') {
                while let Some(c) = self.current_char() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError { kind, line: self.line, col: self.col }
    }

    /// Consumes `expected` after optional whitespace.
    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.current_char() {
            Some(c) if c == expected => {
                self.advance();
                Ok(())
            }
            Some(c) => Err(self.error(ParseErrorKind::UnexpectedChar(c))),
            None => Err(self.error(ParseErrorKind::UnexpectedEnd)),
        }
    }

    /// Consumes the next non-blank char if it is one of `ops`.
    fn eat_any(&mut self, ops: &[char]) -> Option<char> {
        self.skip_whitespace();
        match self.current_char() {
            Some(c) if ops.contains(&c) => {
                self.advance();
                Some(c)
            }
            _ => None,
        }
    }

    pub fn parse(&mut self) -> Result<Node, ParseError> {
        let node = self.parse_expr()?;
        self.skip_whitespace();
        if let Some(c) = self.current_char() {
            Err(self.error(ParseErrorKind::UnexpectedChar(c)))
        } else {
            Ok(node)
        }
    }

    // expr := term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<Node, ParseError> {
        let mut node = self.parse_term()?;
        while let Some(c) = self.eat_any(&['+', '-']) {
            let rhs = self.parse_term()?;
            node = Node::binary(binop(c), node, rhs);
        }
        Ok(node)
    }

    // term := unary (('*' | '/') unary)*
    fn parse_term(&mut self) -> Result<Node, ParseError> {
        let mut node = self.parse_unary()?;
        while let Some(c) = self.eat_any(&['*', '/']) {
            let rhs = self.parse_unary()?;
            node = Node::binary(binop(c), node, rhs);
        }
        Ok(node)
    }

    // unary := '-' unary | power
    // A minus applied straight to a literal yields a negative literal, so
    // `log(-5)` is caught by validation. `-2^2` is still `-(2^2)`.
    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        if self.eat_any(&['-']).is_some() {
            return Ok(match self.parse_unary()? {
                Node::Number(value) => Node::number(-value),
                operand => Node::negate(operand),
            });
        }
        self.parse_power()
    }

    // power := primary ('^' unary)?, so `2^3^2` is `2^(3^2)` and `2^-1` works.
    fn parse_power(&mut self) -> Result<Node, ParseError> {
        let base = self.parse_primary()?;
        if self.eat_any(&['^']).is_some() {
            let exponent = self.parse_unary()?;
            return Ok(Node::binary(BinOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        self.skip_whitespace();
        match self.current_char() {
            Some('(') => {
                self.advance();
                let node = self.parse_expr()?;
                self.expect(')')?;
                Ok(node)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.parse_number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.parse_word(),
            Some(c) => Err(self.error(ParseErrorKind::UnexpectedChar(c))),
            None => Err(self.error(ParseErrorKind::UnexpectedEnd)),
        }
    }

    fn parse_word(&mut self) -> Result<Node, ParseError> {
        let start_line = self.line;
        let start_col = self.col;
        let name = self.parse_identifier_string();

        if name == "x" {
            return Ok(Node::var());
        }
        if let Some(value) = CONSTANTS.get(name.as_str()) {
            return Ok(Node::number(*value));
        }

        let is_call = {
            self.skip_whitespace();
            self.current_char() == Some('(')
        };

        if let Some(func) = UnaryFunc::from_name(&name) {
            let arg = self.parse_call_args(1)?.remove(0);
            return Ok(Node::function1(func, arg));
        }
        if let Some(func) = BinaryFunc::from_name(&name) {
            let mut args = self.parse_call_args(2)?;
            let b = args.remove(1);
            let a = args.remove(0);
            return Ok(Node::function2(func, a, b));
        }
        if is_call && DERIVATIVE_WORDS.contains(&name.as_str()) {
            let arg = self.parse_call_args(1)?.remove(0);
            return Ok(Node::derivative(name, arg));
        }
        if is_call {
            return Err(ParseError {
                kind: ParseErrorKind::InvalidSyntax(format!(
                    "'{}' is not a function; user definitions are referenced without arguments",
                    name
                )),
                line: start_line,
                col: start_col,
            });
        }
        Ok(Node::identifier(name))
    }

    /// Parses `( expr {, expr} )` with exactly `arity` arguments.
    fn parse_call_args(&mut self, arity: usize) -> Result<Vec<Node>, ParseError> {
        self.expect('(')?;
        let mut args = vec![self.parse_expr()?];
        while self.eat_any(&[',']).is_some() {
            args.push(self.parse_expr()?);
        }
        self.expect(')')?;
        if args.len() != arity {
            return Err(self.error(ParseErrorKind::InvalidSyntax(format!(
                "expected {} argument(s), found {}",
                arity,
                args.len()
            ))));
        }
        Ok(args)
    }

    fn parse_number(&mut self) -> Result<Node, ParseError> {
        let start_line = self.line;
        let start_col = self.col;
        let mut s = String::new();

        // Digits before decimal
        while let Some(c) = self.current_char() {
            if c.is_ascii_digit() {
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }

        // Decimal part
        if self.current_char() == Some('.') {
            s.push('.');
            self.advance();
            while let Some(c) = self.current_char() {
                if c.is_ascii_digit() {
                    s.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        // Scientific notation, only when digits follow so `2*e` stays a constant.
        if let Some(c) = self.current_char() {
            if (c == 'e' || c == 'E') && self.exponent_follows() {
                s.push(c);
                self.advance();
                if let Some(sign_c) = self.current_char() {
                    if sign_c == '+' || sign_c == '-' {
                        s.push(sign_c);
                        self.advance();
                    }
                }
                while let Some(c_exp) = self.current_char() {
                    if c_exp.is_ascii_digit() {
                        s.push(c_exp);
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
        }

        s.parse::<f64>()
            .map(Node::number)
            .map_err(|_| ParseError {
                kind: ParseErrorKind::InvalidNumber(s),
                line: start_line,
                col: start_col,
            })
    }

    fn exponent_follows(&self) -> bool {
        match self.input.get(self.pos + 1) {
            Some(c) if c.is_ascii_digit() => true,
            Some('+') | Some('-') => self.input.get(self.pos + 2).is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    fn parse_identifier_string(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.current_char() {
            if c.is_alphanumeric() || c == '_' {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        name
    }
}

fn binop(c: char) -> BinOp {
    // Callers only pass operator chars they just matched.
    BinOp::from_symbol(c).unwrap_or(BinOp::Add)
}

// Convenience function for parsing
pub fn parse(input: &str) -> Result<Node, ParseError> {
    Parser::new(input).parse()
}
