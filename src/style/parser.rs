//! Recursive descent stylesheet parser.
//!
//! Produces [`StyleSheet`]s whose declarations remember the line they came
//! from. Unknown properties and unparsable values are skipped with a warning;
//! structural errors abort the sheet.

use super::property::{self, StylePropertyId, StyleValue, BOX_SHORTHANDS};
use super::tokenizer::{tokenize, Spanned, Token};
use crate::object::StateFlags;

/// Errors from stylesheet parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleParseError {
    #[error("{file}:{line}: invalid character")]
    Lex { file: String, line: u32 },
    #[error("{file}:{line}: {message}")]
    Unexpected {
        file: String,
        line: u32,
        message: String,
    },
    #[error("{file}: unexpected end of input: {message}")]
    UnexpectedEof { file: String, message: String },
}

/// How two compounds in a selector relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// A compound selector: `type#id.class:state`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    /// `None` is the universal selector.
    pub node_name: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub states: StateFlags,
}

/// A full selector. The first compound's combinator is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub parts: Vec<(Combinator, Compound)>,
}

impl Selector {
    /// `(ids, classes + states, types)`.
    pub fn specificity(&self) -> (u32, u32, u32) {
        self.parts.iter().fold((0, 0, 0), |(a, b, c), (_, part)| {
            (
                a + part.id.is_some() as u32,
                b + part.classes.len() as u32 + part.states.names().len() as u32,
                c + part.node_name.is_some() as u32,
            )
        })
    }
}

/// One property assignment with its origin line.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: StylePropertyId,
    pub value: StyleValue,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
}

/// A parsed stylesheet.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    pub name: String,
    pub rules: Vec<Rule>,
}

/// Parse `input`, naming it `name` in source locations.
pub fn parse_stylesheet(name: &str, input: &str) -> Result<StyleSheet, StyleParseError> {
    let tokens = tokenize(input).map_err(|line| StyleParseError::Lex {
        file: name.to_owned(),
        line,
    })?;
    let mut parser = Parser {
        file: name,
        tokens,
        pos: 0,
    };
    let mut rules = Vec::new();
    while !parser.at_end() {
        rules.push(parser.rule()?);
    }
    Ok(StyleSheet {
        name: name.to_owned(),
        rules,
    })
}

struct Parser<'a> {
    file: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser<'_> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self, context: &str) -> Result<Spanned, StyleParseError> {
        let token = self.tokens.get(self.pos).cloned().ok_or_else(|| {
            StyleParseError::UnexpectedEof {
                file: self.file.to_owned(),
                message: context.to_owned(),
            }
        })?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: Token, context: &str) -> Result<Spanned, StyleParseError> {
        let token = self.next(context)?;
        if token.token != expected {
            return Err(self.unexpected(&token, context));
        }
        Ok(token)
    }

    fn unexpected(&self, token: &Spanned, context: &str) -> StyleParseError {
        StyleParseError::Unexpected {
            file: self.file.to_owned(),
            line: token.line,
            message: format!("unexpected '{}' {context}", token.text),
        }
    }

    /// Whether the token at `pos` directly follows the previous one.
    fn adjacent(&self) -> bool {
        match (self.pos.checked_sub(1).and_then(|p| self.tokens.get(p)), self.peek()) {
            (Some(prev), Some(next)) => prev.end == next.start,
            _ => false,
        }
    }

    fn rule(&mut self) -> Result<Rule, StyleParseError> {
        let mut selectors = vec![self.selector()?];
        loop {
            let token = self.next("in selector list")?;
            match token.token {
                Token::Comma => selectors.push(self.selector()?),
                Token::BraceOpen => break,
                _ => return Err(self.unexpected(&token, "in selector list")),
            }
        }

        let mut declarations = Vec::new();
        loop {
            let token = self.next("in declaration block")?;
            match token.token {
                Token::BraceClose => break,
                Token::Semicolon => continue,
                Token::Ident => self.declaration(&token, &mut declarations)?,
                _ => return Err(self.unexpected(&token, "in declaration block")),
            }
        }
        Ok(Rule {
            selectors,
            declarations,
        })
    }

    fn selector(&mut self) -> Result<Selector, StyleParseError> {
        let mut parts = vec![(Combinator::Descendant, self.compound()?)];
        loop {
            match self.peek().map(|t| t.token) {
                Some(Token::Comma) | Some(Token::BraceOpen) | None => break,
                Some(Token::GreaterThan) => {
                    self.pos += 1;
                    parts.push((Combinator::Child, self.compound()?));
                }
                Some(_) => parts.push((Combinator::Descendant, self.compound()?)),
            }
        }
        Ok(Selector { parts })
    }

    fn compound(&mut self) -> Result<Compound, StyleParseError> {
        let mut compound = Compound::default();
        let mut first = true;
        while let Some(token) = self.peek().cloned() {
            if !first && !self.adjacent() {
                break;
            }
            match token.token {
                Token::Ident if first => {
                    compound.node_name = Some(token.text.clone());
                    self.pos += 1;
                }
                Token::Star if first => self.pos += 1,
                Token::Hash => {
                    compound.id = Some(token.text[1..].to_owned());
                    self.pos += 1;
                }
                Token::Dot => {
                    self.pos += 1;
                    let name = self.expect(Token::Ident, "after '.'")?;
                    compound.classes.push(name.text);
                }
                Token::Colon => {
                    self.pos += 1;
                    let name = self.expect(Token::Ident, "after ':'")?;
                    let state = StateFlags::from_name(&name.text)
                        .ok_or_else(|| self.unexpected(&name, "as pseudo-class"))?;
                    compound.states = compound.states | state;
                }
                _ if first => return Err(self.unexpected(&token, "in selector")),
                _ => break,
            }
            first = false;
        }
        Ok(compound)
    }

    fn declaration(
        &mut self,
        name: &Spanned,
        out: &mut Vec<Declaration>,
    ) -> Result<(), StyleParseError> {
        self.expect(Token::Colon, "after property name")?;
        let mut values = Vec::new();
        while let Some(token) = self.peek() {
            if matches!(token.token, Token::Semicolon | Token::BraceClose) {
                break;
            }
            values.push(token.text.clone());
            self.pos += 1;
        }
        let line = name.line;

        if let Some((_, sides)) = BOX_SHORTHANDS.iter().find(|(n, _)| *n == name.text) {
            let expanded: Option<[&String; 4]> = match values.as_slice() {
                [a] => Some([a, a, a, a]),
                [v, h] => Some([v, h, v, h]),
                [t, h, b] => Some([t, h, b, h]),
                [t, r, b, l] => Some([t, r, b, l]),
                _ => None,
            };
            let Some(expanded) = expanded else {
                tracing::warn!(file = self.file, line, "{}: expected 1-4 values", name.text);
                return Ok(());
            };
            for (side, text) in sides.iter().zip(expanded) {
                self.push_declaration(side, text, line, out);
            }
            return Ok(());
        }

        self.push_declaration(&name.text, &values.join(" "), line, out);
        Ok(())
    }

    fn push_declaration(&self, name: &str, text: &str, line: u32, out: &mut Vec<Declaration>) {
        let Some(id) = property::lookup(name) else {
            tracing::warn!(file = self.file, line, "unknown property {name}");
            return;
        };
        match StyleValue::parse(property::info(id).kind, text) {
            Some(value) => out.push(Declaration {
                property: id,
                value,
                line,
            }),
            None => tracing::warn!(file = self.file, line, "invalid value for {name}: {text}"),
        }
    }
}
