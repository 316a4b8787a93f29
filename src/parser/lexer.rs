//! Tokenizer for mipa scripts.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::error::{MipaError, Result};
use crate::types::Colour;

use super::span::{Location, Spanned};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Number(f32),
    Str(String),
    Colour(Colour),
    LParen,
    RParen,
    Comma,
    Dot,
    Assign,
    /// Newline or `;`.
    Separator,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "`{}`", name),
            Token::Number(n) => write!(f, "number {}", n),
            Token::Str(s) => write!(f, "string {:?}", s),
            Token::Colour(c) => write!(f, "colour {}", c),
            Token::LParen => write!(f, "`(`"),
            Token::RParen => write!(f, "`)`"),
            Token::Comma => write!(f, "`,`"),
            Token::Dot => write!(f, "`.`"),
            Token::Assign => write!(f, "`=`"),
            Token::Separator => write!(f, "end of statement"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    loc: Location,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            loc: Location::start(),
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.loc.advance(c);
        Some(c)
    }

    fn take_while(&mut self, mut pred: impl FnMut(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(&c) = self.chars.peek() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }

    fn error(&self, at: Location, message: impl fmt::Display) -> MipaError {
        MipaError::Parse {
            message: format!("{}: {}", at, message),
            help: None,
        }
    }

    /// Next token. Every error consumes at least one character.
    pub fn next_token(&mut self) -> Result<Spanned<Token>> {
        self.take_while(|c| c != '\n' && c.is_whitespace());
        let at = self.loc;

        let Some(c) = self.bump() else {
            return Ok(Spanned::new(Token::Eof, at));
        };

        let token = match c {
            '\n' | ';' => Token::Separator,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            '.' => Token::Dot,
            '=' => Token::Assign,
            '"' => Token::Str(self.string(at)?),
            '#' => match self.chars.peek() {
                Some(&next) if !next.is_whitespace() => {
                    let digits = self.take_while(|c| c.is_ascii_alphanumeric());
                    let colour = Colour::from_hex(&digits)
                        .map_err(|_| self.error(at, format!("invalid colour literal #{}", digits)))?;
                    Token::Colour(colour)
                }
                _ => {
                    self.take_while(|c| c != '\n');
                    return self.next_token();
                }
            },
            '-' if self.chars.peek().is_some_and(|c| c.is_ascii_digit()) => {
                Token::Number(-self.number(at, String::new())?)
            }
            c if c.is_ascii_digit() => Token::Number(self.number(at, c.to_string())?),
            c if c.is_alphabetic() || c == '_' => {
                let rest = self.take_while(|c| c.is_alphanumeric() || c == '_');
                Token::Ident(format!("{}{}", c, rest))
            }
            other => return Err(self.error(at, format!("unexpected character {:?}", other))),
        };
        Ok(Spanned::new(token, at))
    }

    fn number(&mut self, at: Location, mut text: String) -> Result<f32> {
        text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        let mut rest = self.chars.clone();
        if rest.next() == Some('.') && rest.next().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }
        text.parse()
            .map_err(|_| self.error(at, format!("invalid number {}", text)))
    }

    fn string(&mut self, at: Location) -> Result<String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error(at, "unterminated string")),
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c) => out.push(c),
                    None => return Err(self.error(at, "unterminated string")),
                },
                Some(c) => out.push(c),
            }
        }
    }
}

/// Tokenize a whole source, stopping at the first error.
pub fn tokenize(source: &str) -> Result<Vec<Spanned<Token>>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.value == Token::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}
