//! Statement parser.
//!
//! ```text
//! statement := IDENT '=' expr | expr
//! expr      := primary ('.' IDENT call_args?)*
//! primary   := NUMBER | STRING | COLOUR | IDENT call_args? | '(' expr ')'
//! call_args := '(' (expr (',' expr)*)? ')'
//! ```
//!
//! `x.f(a)` is sugar for `f(x, a)`, and `x.f` for `f(x)`.

use std::fmt;

use crate::error::{MipaError, Result};
use crate::types::Colour;

use super::lexer::{Lexer, Token};
use super::span::{Location, Spanned};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f32),
    Str(String),
    Colour(Colour),
    Var(String),
    Call { name: String, args: Vec<Expr> },
}

impl Expr {
    fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.into(),
            args,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Str(s) => write!(f, "{:?}", s),
            Expr::Colour(c) => write!(f, "{}", c),
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assign { name: String, value: Expr },
    Expr(Expr),
}

/// Lazily parses statements, resynchronising at the next separator after
/// an error so later statements still run.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Spanned<Token>>,
    /// The last consumed token ended a statement.
    after_boundary: bool,
    done: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lexer: Lexer::new(source),
            peeked: None,
            after_boundary: false,
            done: false,
        }
    }

    fn peek(&mut self) -> Result<&Spanned<Token>> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => match self.lexer.next_token() {
                Ok(token) => token,
                Err(e) => {
                    self.after_boundary = false;
                    return Err(e);
                }
            },
        };
        Ok(self.peeked.insert(token))
    }

    fn bump(&mut self) -> Result<Spanned<Token>> {
        let token = match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.lexer.next_token(),
        };
        self.after_boundary = false;
        if let Ok(t) = &token {
            match t.value {
                Token::Separator => self.after_boundary = true,
                Token::Eof => {
                    self.after_boundary = true;
                    self.done = true;
                }
                _ => {}
            }
        }
        token
    }

    fn unexpected(token: &Spanned<Token>, wanted: &str) -> MipaError {
        MipaError::Parse {
            message: format!("{}: expected {}, found {}", token.at, wanted, token.value),
            help: None,
        }
    }

    fn expect(&mut self, wanted: Token) -> Result<()> {
        let token = self.bump()?;
        if token.value == wanted {
            Ok(())
        } else {
            Err(Self::unexpected(&token, &wanted.to_string()))
        }
    }

    fn statement(&mut self) -> Result<Spanned<Statement>> {
        let at = self.peek()?.at;
        let expr = self.expr()?;

        let assign = self.peek()?.value == Token::Assign;
        let statement = match expr {
            Expr::Var(name) if assign => {
                self.bump()?;
                let value = self.expr()?;
                Statement::Assign { name, value }
            }
            expr => Statement::Expr(expr),
        };

        let end = self.bump()?;
        match end.value {
            Token::Separator | Token::Eof => Ok(Spanned::new(statement, at)),
            _ => Err(Self::unexpected(&end, "end of statement")),
        }
    }

    fn expr(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;
        while self.peek()?.value == Token::Dot {
            self.bump()?;
            let name = self.ident()?;
            let mut args = vec![expr];
            if self.peek()?.value == Token::LParen {
                args.extend(self.call_args()?);
            }
            expr = Expr::call(name, args);
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr> {
        let token = self.bump()?;
        match token.value {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Str(s) => Ok(Expr::Str(s)),
            Token::Colour(c) => Ok(Expr::Colour(c)),
            Token::Ident(name) => {
                if self.peek()?.value == Token::LParen {
                    Ok(Expr::call(name, self.call_args()?))
                } else {
                    Ok(Expr::Var(name))
                }
            }
            Token::LParen => {
                let inner = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            _ => Err(Self::unexpected(&token, "an expression")),
        }
    }

    fn ident(&mut self) -> Result<String> {
        let token = self.bump()?;
        match token.value {
            Token::Ident(name) => Ok(name),
            _ => Err(Self::unexpected(&token, "a name")),
        }
    }

    /// Newlines inside the parentheses are ignored.
    fn call_args(&mut self) -> Result<Vec<Expr>> {
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        loop {
            self.skip_separators()?;
            if self.peek()?.value == Token::RParen {
                self.bump()?;
                return Ok(args);
            }
            if !args.is_empty() {
                self.expect(Token::Comma)?;
                self.skip_separators()?;
            }
            args.push(self.expr()?);
        }
    }

    fn skip_separators(&mut self) -> Result<()> {
        while self.peek()?.value == Token::Separator {
            self.bump()?;
        }
        Ok(())
    }

    /// Drop everything up to and including the next separator, unless the
    /// failing token already was one.
    fn recover(&mut self) {
        while !self.after_boundary {
            let _ = self.bump();
        }
    }
}

impl Iterator for Parser<'_> {
    type Item = Result<Spanned<Statement>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.skip_separators().and_then(|_| self.peek().map(|t| t.value == Token::Eof)) {
            Ok(true) => {
                self.done = true;
                return None;
            }
            Ok(false) => {}
            Err(e) => {
                self.recover();
                return Some(Err(e));
            }
        }
        let result = self.statement();
        if result.is_err() {
            self.recover();
        }
        Some(result)
    }
}

/// Parse a whole script, failing on the first error.
pub fn parse_script(source: &str) -> Result<Vec<Spanned<Statement>>> {
    Parser::new(source).collect()
}
