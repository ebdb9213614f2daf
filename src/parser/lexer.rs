use crate::error::{Error, Result};
use crate::origins::LineRef;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Comma,
    Dot,
    Minus,
    Str(String),
    Int(i64),
    Bool(bool),
    Ident(String),
    Eof,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            TokenKind::LBrace => "'{'".into(),
            TokenKind::RBrace => "'}'".into(),
            TokenKind::LBracket => "'['".into(),
            TokenKind::RBracket => "']'".into(),
            TokenKind::Colon => "':'".into(),
            TokenKind::Comma => "','".into(),
            TokenKind::Dot => "'.'".into(),
            TokenKind::Minus => "'-'".into(),
            TokenKind::Str(s) => format!("string {s:?}"),
            TokenKind::Int(n) => format!("number {n}"),
            TokenKind::Bool(b) => format!("boolean {b}"),
            TokenKind::Ident(name) => format!("identifier '{name}'"),
            TokenKind::Eof => "end of input".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

/// Splits the configuration literal into tokens, dropping whitespace and
/// `#` comments.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { chars: source.chars().peekable(), line: 1 }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::Syntax { line: LineRef::at(self.line), message: message.into() }
    }

    fn skip_trivia(&mut self) {
        while let Some(&c) = self.chars.peek() {
            match c {
                '\n' => {
                    self.line += 1;
                    self.chars.next();
                }
                '#' => {
                    while self.chars.next_if(|&c| c != '\n').is_some() {}
                }
                c if c.is_whitespace() => {
                    self.chars.next();
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia();
        let line = self.line;
        let Some(c) = self.chars.next() else {
            return Ok(Token { kind: TokenKind::Eof, line });
        };

        let kind = match c {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ':' => TokenKind::Colon,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '-' => TokenKind::Minus,
            '"' | '\'' => TokenKind::Str(self.string(c)?),
            c if c.is_ascii_digit() => self.number(c)?,
            c if c.is_alphabetic() || c == '_' => self.word(c),
            other => return Err(self.error(format!("unexpected character {other:?}"))),
        };
        Ok(Token { kind, line })
    }

    fn string(&mut self, quote: char) -> Result<String> {
        let start = self.line;
        let mut out = String::new();
        loop {
            match self.chars.next() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('\n') => self.line += 1,
                    Some(other) => out.push(other),
                    None => break,
                },
                Some('\n') => break,
                Some(c) => out.push(c),
                None => break,
            }
        }
        Err(Error::Syntax {
            line: LineRef::at(start),
            message: "unterminated string".into(),
        })
    }

    fn number(&mut self, first: char) -> Result<TokenKind> {
        let mut digits = String::from(first);
        while let Some(c) = self.chars.next_if(char::is_ascii_digit) {
            digits.push(c);
        }
        if self.chars.peek().is_some_and(|c| c.is_alphabetic() || *c == '_') {
            return Err(self.error(format!("malformed number starting with '{digits}'")));
        }
        digits
            .parse::<i64>()
            .map(TokenKind::Int)
            .map_err(|e| self.error(format!("number '{digits}' out of range: {e}")))
    }

    fn word(&mut self, first: char) -> TokenKind {
        let mut word = String::from(first);
        while let Some(c) = self.chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
            word.push(c);
        }
        match word.as_str() {
            "true" | "True" => TokenKind::Bool(true),
            "false" | "False" => TokenKind::Bool(false),
            _ => TokenKind::Ident(word),
        }
    }
}
