/// Macro-expanding recursive descent parser for hastack
///
/// Builds the immutable operation tree out of the token stream. `define`
/// blocks are substituted at parse time: the body is parsed once and every
/// later occurrence of the macro name resolves to the same shared node, so
/// downstream passes see only expanded code.
use crate::ast::{Node, NodeKind};
use crate::parser::lexer::{Location, Token, TokenKind};
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{location} PARSE ERROR: {message}")]
pub struct ParseError {
    pub message: String,
    pub location: Location,
}

/// Macro definitions visible to the parser. Owned by the caller so an
/// interactive session can carry definitions across input lines.
pub type MacroTable = HashMap<String, Rc<Node>>;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    macros: MacroTable,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_macros(tokens, MacroTable::new())
    }

    /// Parse with a pre-populated macro table.
    pub fn with_macros(tokens: Vec<Token>, macros: MacroTable) -> Self {
        Parser {
            tokens,
            current: 0,
            macros,
        }
    }

    /// Hand the macro table back, with any definitions this parse added.
    pub fn into_macros(self) -> MacroTable {
        self.macros
    }

    /// Parse the whole token stream as one expression.
    pub fn parse(&mut self) -> Result<Rc<Node>, ParseError> {
        let expr = self.parse_expr()?;
        if let Some(token) = self.peek() {
            return Err(ParseError {
                message: format!("Unexpected '{}'", token.value),
                location: token.location.clone(),
            });
        }
        Ok(expr)
    }

    fn parse_expr(&mut self) -> Result<Rc<Node>, ParseError> {
        let location = match self.peek() {
            Some(token) => token.location.clone(),
            None => Location::new("", 0, 0),
        };
        let mut nodes = Vec::new();
        while let Some(node) = self.parse_atom()? {
            nodes.push(node);
        }
        Ok(Rc::new(Node::new(NodeKind::Expr(nodes), location)))
    }

    /// Parse one operation, or return `None` at a closing delimiter, at
    /// `end`, or when the tokens run out.
    fn parse_atom(&mut self) -> Result<Option<Rc<Node>>, ParseError> {
        let Some(first) = self.peek().cloned() else {
            return Ok(None);
        };
        let location = first.location.clone();

        match first.kind {
            TokenKind::Int => {
                let value = first.value.parse::<i64>().map_err(|_| ParseError {
                    message: format!("Invalid integer: {}", first.value),
                    location: location.clone(),
                })?;
                self.advance();
                Ok(Some(Rc::new(Node::new(NodeKind::PushInt(value), location))))
            }

            TokenKind::Char => {
                self.advance();
                // The lexer only produces single-character values here.
                let c = first.value.chars().next().ok_or_else(|| ParseError {
                    message: "Empty character literal".to_string(),
                    location: location.clone(),
                })?;
                Ok(Some(Rc::new(Node::new(NodeKind::PushChar(c), location))))
            }

            TokenKind::OpenQuote => {
                self.advance();
                let body = self.parse_expr()?;
                if !self.consume_kind(TokenKind::CloseQuote) {
                    return Err(ParseError {
                        message: "Unterminated quote definition".to_string(),
                        location,
                    });
                }
                Ok(Some(Rc::new(Node::new(NodeKind::PushQuote(body), location))))
            }

            TokenKind::OpenBracket => {
                self.advance();
                let body = self.parse_expr()?;
                if !self.consume_kind(TokenKind::CloseBracket) {
                    return Err(ParseError {
                        message: "Unterminated list definition".to_string(),
                        location,
                    });
                }
                Ok(Some(Rc::new(Node::new(NodeKind::PushList(body), location))))
            }

            TokenKind::CloseQuote | TokenKind::CloseBracket => Ok(None),

            TokenKind::Word => self.parse_word(&first),
        }
    }

    fn parse_word(&mut self, token: &Token) -> Result<Option<Rc<Node>>, ParseError> {
        let location = token.location.clone();

        let kind = match token.value.as_str() {
            "True" => Some(NodeKind::PushBool(true)),
            "False" => Some(NodeKind::PushBool(false)),
            "+" => Some(NodeKind::Add),
            "-" => Some(NodeKind::Sub),
            "*" => Some(NodeKind::Mul),
            "/" => Some(NodeKind::Div),
            "<:" => Some(NodeKind::Cons),
            "<" => Some(NodeKind::Lt),
            ">" => Some(NodeKind::Gt),
            "<=" => Some(NodeKind::Lte),
            ">=" => Some(NodeKind::Gte),
            "=" => Some(NodeKind::Eq),
            "not" => Some(NodeKind::Not),
            "~" => Some(NodeKind::Eval),
            "print" => Some(NodeKind::Print),
            "type?" => Some(NodeKind::PrintType),
            "if" => Some(NodeKind::If),
            "while" => Some(NodeKind::While),
            "." => Some(NodeKind::Dup),
            _ => None,
        };
        if let Some(kind) = kind {
            self.advance();
            return Ok(Some(Rc::new(Node::new(kind, location))));
        }

        match token.value.as_str() {
            "define" => {
                self.advance();
                let name = match self.peek() {
                    Some(t) if t.kind == TokenKind::Word => t.value.clone(),
                    _ => {
                        return Err(ParseError {
                            message: "Expected a name after 'define'".to_string(),
                            location,
                        });
                    }
                };
                self.advance();
                let body = self.parse_expr()?;
                if !self.consume_word("end") {
                    return Err(ParseError {
                        message: "Unterminated macro declaration".to_string(),
                        location,
                    });
                }
                self.macros.insert(name, body);
                Ok(Some(Rc::new(Node::new(NodeKind::Noop, location))))
            }

            // Terminates the expression; `define` consumes it above.
            "end" => Ok(None),

            name => {
                if let Some(body) = self.macros.get(name) {
                    let body = body.clone();
                    self.advance();
                    Ok(Some(body))
                } else {
                    Err(ParseError {
                        message: format!("Unknown word: '{}'", name),
                        location,
                    })
                }
            }
        }
    }

    // Helper methods

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    fn advance(&mut self) {
        if self.current < self.tokens.len() {
            self.current += 1;
        }
    }

    fn consume_kind(&mut self, kind: TokenKind) -> bool {
        match self.peek() {
            Some(token) if token.kind == kind => {
                self.advance();
                true
            }
            _ => false,
        }
    }

    fn consume_word(&mut self, value: &str) -> bool {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Word && token.value == value => {
                self.advance();
                true
            }
            _ => false,
        }
    }
}
