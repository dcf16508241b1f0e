// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Parser for type expressions.
//!
//! Accepts the text produced by `Display` for types:
//!
//! ```text
//! Integer
//! Pcore::IteratorType
//! Iterator[Optional[String]]
//! Object[{name => 'Point', parent => Shape, attributes => {'x' => Integer, 'y' => {type => Integer, value => 0}}}]
//! ```

use core::iter::Peekable;
use core::str::CharIndices;

use crate::decl::{AttributeDecl, ObjectDecl, TypeExpr, ValueExpr};
use crate::loader::{resolve_expr, Resolver};
use crate::types::Type;
use crate::{TypeError, Value};

/// Parses a type expression without resolving its names.
pub fn parse_type_expr(text: &str) -> Result<TypeExpr, TypeError> {
    let mut parser = Parser::new(text)?;
    let expr = parser.parse_type()?;
    if parser.tok.0 != TokenKind::Eof {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(expr)
}

/// Parses a type expression and resolves its names with `resolver`.
pub fn parse_type(text: &str, resolver: &dyn Resolver) -> Result<Type, TypeError> {
    resolve_expr(&parse_type_expr(text)?, resolver)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Symbol,
    String,
    Number,
    Ident,
    Eof,
}

#[derive(Debug, Clone)]
struct Token(TokenKind, usize, String);

struct Lexer<'source> {
    text: &'source str,
    iter: Peekable<CharIndices<'source>>,
}

impl<'source> Lexer<'source> {
    fn new(text: &'source str) -> Self {
        Lexer {
            text,
            iter: text.char_indices().peekable(),
        }
    }

    fn peek(&mut self) -> (usize, char) {
        match self.iter.peek() {
            Some((offset, ch)) => (*offset, *ch),
            None => (self.text.len(), '\x00'),
        }
    }

    fn peekahead(&self, n: usize) -> (usize, char) {
        let mut iter = self.iter.clone().skip(n);
        iter.next().unwrap_or((self.text.len(), '\x00'))
    }

    fn skip_ws(&mut self) {
        while self.peek().1.is_whitespace() {
            self.iter.next();
        }
    }

    fn read_ident(&mut self) -> Token {
        let start = self.peek().0;
        loop {
            let ch = self.peek().1;
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.iter.next();
            } else if ch == ':'
                && self.peekahead(1).1 == ':'
                && self.peekahead(2).1.is_ascii_alphabetic()
            {
                self.iter.next();
                self.iter.next();
            } else {
                break;
            }
        }
        let end = self.peek().0;
        Token(TokenKind::Ident, start, self.text[start..end].to_string())
    }

    fn read_digits(&mut self) {
        while self.peek().1.is_ascii_digit() {
            self.iter.next();
        }
    }

    fn read_number(&mut self) -> Token {
        let start = self.peek().0;
        if self.peek().1 == '-' {
            self.iter.next();
        }
        self.read_digits();

        // A fraction needs at least one digit after the dot.
        if self.peek().1 == '.' && self.peekahead(1).1.is_ascii_digit() {
            self.iter.next();
            self.read_digits();
        }

        if matches!(self.peek().1, 'e' | 'E') {
            self.iter.next();
            if matches!(self.peek().1, '+' | '-') {
                self.iter.next();
            }
            self.read_digits();
        }

        let end = self.peek().0;
        Token(TokenKind::Number, start, self.text[start..end].to_string())
    }

    fn read_string(&mut self) -> Result<Token, TypeError> {
        let (start, quote) = self.peek();
        self.iter.next();
        let mut s = String::new();
        loop {
            let (offset, ch) = self.peek();
            self.iter.next();
            match ch {
                '\x00' if offset == self.text.len() => {
                    return Err(TypeError::parse(start, "unterminated string"))
                }
                '\\' => {
                    let (offset, ch) = self.peek();
                    self.iter.next();
                    match ch {
                        '\\' | '\'' | '"' => s.push(ch),
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        _ => return Err(TypeError::parse(offset, "invalid escape sequence")),
                    }
                }
                ch if ch == quote => break,
                ch => s.push(ch),
            }
        }
        Ok(Token(TokenKind::String, start, s))
    }

    fn next_token(&mut self) -> Result<Token, TypeError> {
        self.skip_ws();
        let (start, chr) = self.peek();
        match chr {
            '\x00' if start == self.text.len() => Ok(Token(TokenKind::Eof, start, String::new())),
            '-' if self.peekahead(1).1.is_ascii_digit() => Ok(self.read_number()),
            '0'..='9' => Ok(self.read_number()),
            '[' | ']' | '{' | '}' | ',' => {
                self.iter.next();
                Ok(Token(TokenKind::Symbol, start, chr.to_string()))
            }
            '=' if self.peekahead(1).1 == '>' => {
                self.iter.next();
                self.iter.next();
                Ok(Token(TokenKind::Symbol, start, "=>".to_string()))
            }
            '\'' | '"' => self.read_string(),
            _ if chr.is_ascii_alphabetic() || chr == '_' => Ok(self.read_ident()),
            _ => Err(TypeError::parse(start, format!("invalid character '{chr}'"))),
        }
    }
}

struct Parser<'source> {
    lexer: Lexer<'source>,
    tok: Token,
}

impl<'source> Parser<'source> {
    fn new(text: &'source str) -> Result<Self, TypeError> {
        let mut lexer = Lexer::new(text);
        let tok = lexer.next_token()?;
        Ok(Parser { lexer, tok })
    }

    fn error(&self, message: &str) -> TypeError {
        TypeError::parse(self.tok.1, message)
    }

    fn next_token(&mut self) -> Result<(), TypeError> {
        self.tok = self.lexer.next_token()?;
        Ok(())
    }

    fn is_symbol(&self, text: &str) -> bool {
        self.tok.0 == TokenKind::Symbol && self.tok.2 == text
    }

    fn expect(&mut self, text: &str, context: &str) -> Result<(), TypeError> {
        if self.is_symbol(text) {
            self.next_token()
        } else {
            Err(self.error(&format!("expecting `{text}` {context}")))
        }
    }

    /// Consumes a `,` unless the list ends with `close`. Trailing commas are allowed.
    fn list_separator(&mut self, close: &str, context: &str) -> Result<(), TypeError> {
        if self.is_symbol(",") {
            self.next_token()
        } else if self.is_symbol(close) {
            Ok(())
        } else {
            Err(self.error(&format!("expecting `,` or `{close}` {context}")))
        }
    }

    fn parse_type(&mut self) -> Result<TypeExpr, TypeError> {
        if self.tok.0 != TokenKind::Ident {
            return Err(self.error("expecting a type name"));
        }
        let name = self.tok.2.clone();
        self.next_token()?;
        if !self.is_symbol("[") {
            return Ok(TypeExpr::named(&name));
        }
        self.next_token()?;

        if name == "Object" && self.is_symbol("{") {
            let decl = self.parse_object_hash()?;
            self.expect("]", "after object type hash")?;
            return Ok(TypeExpr::Object(Box::new(decl)));
        }

        let mut params = vec![];
        while !self.is_symbol("]") {
            params.push(self.parse_type()?);
            self.list_separator("]", "in type parameters")?;
        }
        self.next_token()?;
        Ok(TypeExpr::parameterized(&name, params))
    }

    fn parse_key(&mut self) -> Result<String, TypeError> {
        match self.tok.0 {
            TokenKind::Ident | TokenKind::String => {
                let key = self.tok.2.clone();
                self.next_token()?;
                self.expect("=>", "after hash key")?;
                Ok(key)
            }
            _ => Err(self.error("expecting a hash key")),
        }
    }

    fn parse_object_hash(&mut self) -> Result<ObjectDecl, TypeError> {
        self.expect("{", "to open object type hash")?;
        let mut decl = ObjectDecl::new();
        while !self.is_symbol("}") {
            let key_pos = self.tok.1;
            match self.parse_key()?.as_str() {
                "name" => {
                    if self.tok.0 != TokenKind::String {
                        return Err(self.error("expecting a quoted type name"));
                    }
                    decl.name = Some(self.tok.2.as_str().into());
                    self.next_token()?;
                }
                "parent" => decl.parent = Some(self.parse_type()?),
                "attributes" => {
                    self.expect("{", "to open attributes hash")?;
                    while !self.is_symbol("}") {
                        let name = self.parse_key()?;
                        let attr = self.parse_attribute()?;
                        decl.attributes.insert(name.into(), attr);
                        self.list_separator("}", "in attributes hash")?;
                    }
                    self.next_token()?;
                }
                key => {
                    return Err(TypeError::parse(
                        key_pos,
                        format!("unknown object type key '{key}'"),
                    ))
                }
            }
            self.list_separator("}", "in object type hash")?;
        }
        self.next_token()?;
        Ok(decl)
    }

    fn parse_attribute(&mut self) -> Result<AttributeDecl, TypeError> {
        if !self.is_symbol("{") {
            return Ok(AttributeDecl::new(self.parse_type()?));
        }
        self.next_token()?;
        let mut typ = None;
        let mut value = None;
        while !self.is_symbol("}") {
            let key_pos = self.tok.1;
            match self.parse_key()?.as_str() {
                "type" => typ = Some(self.parse_type()?),
                "value" => value = Some(self.parse_value()?),
                key => {
                    return Err(TypeError::parse(
                        key_pos,
                        format!("unknown attribute key '{key}'"),
                    ))
                }
            }
            self.list_separator("}", "in attribute hash")?;
        }
        self.next_token()?;
        match typ {
            Some(typ) => Ok(AttributeDecl { typ, value }),
            None => Err(self.error("attribute hash without `type`")),
        }
    }

    fn parse_value(&mut self) -> Result<ValueExpr, TypeError> {
        let text = self.tok.2.clone();
        let literal = match (self.tok.0, text.as_str()) {
            (TokenKind::Ident, "undef") => Value::Undef,
            (TokenKind::Ident, "true") => Value::Bool(true),
            (TokenKind::Ident, "false") => Value::Bool(false),
            (TokenKind::Ident, _) => return Ok(ValueExpr::Type(self.parse_type()?)),
            (TokenKind::String, s) => Value::from(s),
            (TokenKind::Number, n) => self.read_number(n)?,
            (TokenKind::Symbol, "[") => return self.parse_array(),
            _ => return Err(self.error("expecting a value")),
        };
        self.next_token()?;
        Ok(ValueExpr::Literal(literal))
    }

    fn parse_array(&mut self) -> Result<ValueExpr, TypeError> {
        self.next_token()?;
        let mut elements = vec![];
        while !self.is_symbol("]") {
            match self.parse_value()? {
                ValueExpr::Literal(v) => elements.push(v),
                ValueExpr::Type(_) => return Err(self.error("types are not allowed in arrays")),
            }
            self.list_separator("]", "in array")?;
        }
        self.next_token()?;
        Ok(ValueExpr::Literal(Value::from(elements)))
    }

    fn read_number(&self, text: &str) -> Result<Value, TypeError> {
        if let Ok(i) = text.parse::<i64>() {
            return Ok(Value::Integer(i));
        }
        match text.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Value::Float(f)),
            Ok(_) => Err(self.error("number out of range")),
            Err(_) => Err(self.error("could not parse number")),
        }
    }
}
