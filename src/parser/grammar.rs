use super::ast::{Entry, Node, NodeKind};
use super::lexer::{Token, TokenKind};
use crate::constants::MAX_NESTING_DEPTH;
use crate::error::{Error, Result};
use crate::origins::LineRef;
use crate::value::Scalar;

/// Recursive-descent parser over the token stream.
///
/// ```text
/// value     := mapping | sequence | constant | '-' value | reference
/// mapping   := '{' (key ':' value (',' key ':' value)* ','?)? '}'
/// sequence  := '[' (value (',' value)* ','?)? ']'
/// key       := IDENT | STRING      (non-empty, no '.')
/// reference := IDENT ('.' (IDENT | INT))*
/// ```
///
/// Values nest at most `max_depth` deep; deeper input is a syntax error.
pub struct Grammar {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl Grammar {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_max_depth(tokens, MAX_NESTING_DEPTH)
    }

    pub fn with_max_depth(tokens: Vec<Token>, max_depth: usize) -> Self {
        Self { tokens, pos: 0, depth: 0, max_depth }
    }

    /// Parses exactly one value followed by end of input.
    pub fn parse_document(mut self) -> Result<Node> {
        let node = self.value()?;
        let trailing = self.peek();
        if trailing.kind != TokenKind::Eof {
            return Err(syntax(
                trailing.line,
                format!("unexpected {} after the top-level value", trailing.kind.describe()),
            ));
        }
        Ok(node)
    }

    fn peek(&self) -> &Token {
        // The lexer always terminates the stream with Eof.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> Result<Token> {
        let token = self.advance();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(syntax(
                token.line,
                format!("expected {} {context}, found {}", kind.describe(), token.kind.describe()),
            ))
        }
    }

    fn value(&mut self) -> Result<Node> {
        let token = self.advance();
        let line = token.line;
        if self.depth >= self.max_depth {
            return Err(syntax(
                line,
                format!("values nest deeper than {} levels", self.max_depth),
            ));
        }
        self.depth += 1;
        let node = self.value_at(token);
        self.depth -= 1;
        node
    }

    fn value_at(&mut self, token: Token) -> Result<Node> {
        let line = token.line;
        match token.kind {
            TokenKind::LBrace => self.mapping(line),
            TokenKind::LBracket => self.sequence(line),
            TokenKind::Str(s) => Ok(Node::new(NodeKind::Constant(Scalar::Str(s)), line)),
            TokenKind::Int(n) => Ok(Node::new(NodeKind::Constant(Scalar::Int(n)), line)),
            TokenKind::Bool(b) => Ok(Node::new(NodeKind::Constant(Scalar::Bool(b)), line)),
            TokenKind::Minus => {
                let operand = self.value()?;
                Ok(Node::new(NodeKind::Negate(Box::new(operand)), line))
            }
            TokenKind::Ident(first) => self.reference(first, line),
            other => Err(syntax(line, format!("expected a value, found {}", other.describe()))),
        }
    }

    fn mapping(&mut self, line: usize) -> Result<Node> {
        let mut entries = Vec::new();
        loop {
            if self.eat(&TokenKind::RBrace) {
                break;
            }
            let key_token = self.advance();
            let key = match key_token.kind {
                TokenKind::Ident(name) | TokenKind::Str(name) => name,
                other => {
                    return Err(syntax(
                        key_token.line,
                        format!("mapping keys must be identifiers, found {}", other.describe()),
                    ))
                }
            };
            if key.is_empty() || key.contains('.') {
                return Err(syntax(
                    key_token.line,
                    format!("mapping key '{key}' must be non-empty and must not contain '.'"),
                ));
            }
            self.expect(TokenKind::Colon, &format!("after key '{key}'"))?;
            let value = self.value()?;
            entries.push(Entry { key, key_line: key_token.line, value });

            if !self.eat(&TokenKind::Comma) {
                self.expect(TokenKind::RBrace, "to close mapping")?;
                break;
            }
        }
        Ok(Node::new(NodeKind::Mapping(entries), line))
    }

    fn sequence(&mut self, line: usize) -> Result<Node> {
        let mut items = Vec::new();
        loop {
            if self.eat(&TokenKind::RBracket) {
                break;
            }
            items.push(self.value()?);
            if !self.eat(&TokenKind::Comma) {
                self.expect(TokenKind::RBracket, "to close sequence")?;
                break;
            }
        }
        Ok(Node::new(NodeKind::Sequence(items), line))
    }

    fn reference(&mut self, first: String, line: usize) -> Result<Node> {
        let mut segments = vec![first];
        while self.eat(&TokenKind::Dot) {
            let token = self.advance();
            match token.kind {
                TokenKind::Ident(name) => segments.push(name),
                TokenKind::Int(index) => segments.push(index.to_string()),
                other => {
                    return Err(syntax(
                        token.line,
                        format!("expected a name after '.', found {}", other.describe()),
                    ))
                }
            }
        }
        Ok(Node::new(NodeKind::Reference(segments), line))
    }
}

fn syntax(line: usize, message: String) -> Error {
    Error::Syntax { line: LineRef::at(line), message }
}
