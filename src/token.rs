//! XML token stream produced by the encoder.
//!
//! Tokens are an intermediate representation: the encoder only builds them,
//! escaping and serialization happen at the writer boundary
//! ([`TokenSequence::write_to`]).

use crate::error::EncodeError;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// An XML attribute on an open tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name, including any prefix (e.g. `xmlns:xsi`)
    pub name: String,
    /// Unescaped attribute value
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One atomic unit of XML structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Start tag with its attributes, in output order
    Open {
        name: String,
        attributes: Vec<Attribute>,
    },
    /// End tag
    Close { name: String },
    /// Character data, unescaped
    Text { content: String },
}

impl Token {
    /// Start tag without attributes.
    pub fn open(name: impl Into<String>) -> Self {
        Self::Open {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Start tag with attributes.
    pub fn open_with(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self::Open {
            name: name.into(),
            attributes,
        }
    }

    pub fn close(name: impl Into<String>) -> Self {
        Self::Close { name: name.into() }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Tag name for `Open`/`Close`, `None` for text.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Open { name, .. } | Self::Close { name } => Some(name),
            Self::Text { .. } => None,
        }
    }

    /// Character data for `Text`, `None` for tags.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { content } => Some(content),
            _ => None,
        }
    }

    /// Attributes of an `Open` token (empty for other tokens).
    pub fn attributes(&self) -> &[Attribute] {
        match self {
            Self::Open { attributes, .. } => attributes,
            _ => &[],
        }
    }
}

/// Ordered, append-only run of tokens produced by one encode call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSequence {
    tokens: Vec<Token>,
}

impl TokenSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token.
    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_inner(self) -> Vec<Token> {
        self.tokens
    }

    /// Character data of every `Text` token, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(Token::as_text)
    }

    /// Check that every `Open` has a matching `Close` with proper nesting.
    pub fn is_balanced(&self) -> bool {
        let mut stack: Vec<&str> = Vec::new();
        for token in &self.tokens {
            match token {
                Token::Open { name, .. } => stack.push(name),
                Token::Close { name } => {
                    if stack.pop() != Some(name.as_str()) {
                        return false;
                    }
                }
                Token::Text { .. } => {}
            }
        }
        stack.is_empty()
    }

    /// Hand every token to an XML writer, then flush its sink.
    ///
    /// Character data and attribute values are escaped here. Writing stops at
    /// the first failure; anything already written stays written.
    pub fn write_to<W: Write>(self, writer: &mut Writer<W>) -> Result<(), EncodeError> {
        for token in self.tokens {
            match token {
                Token::Open { name, attributes } => {
                    let mut start = BytesStart::new(name);
                    for attr in &attributes {
                        start.push_attribute((attr.name.as_str(), attr.value.as_str()));
                    }
                    writer.write_event(Event::Start(start))?;
                }
                Token::Close { name } => {
                    writer.write_event(Event::End(BytesEnd::new(name)))?;
                }
                Token::Text { content } => {
                    writer.write_event(Event::Text(BytesText::new(&content)))?;
                }
            }
        }

        writer.get_mut().flush()?;
        Ok(())
    }
}

impl IntoIterator for TokenSequence {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

impl<'a> IntoIterator for &'a TokenSequence {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
