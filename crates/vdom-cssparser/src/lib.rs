//! # vdom CSS Parser
//!
//! Selector grammar parser for the vdom engine.
//!
//! Parses the selector subset used for querying trees into a list of
//! alternative chains. Each chain keeps its compounds right to left, which is
//! the order the matcher walks them in.
//!
//! Supported: `tag`, `*`, `#id`, `.class`, `[attr]`, `[attr=v]`, `[attr^=v]`,
//! `[attr$=v]`, `[attr*=v]`, `[attr~=v]`, `[attr|=v]` (optionally with an `i`
//! flag), `:not(...)`, `:first-child`, `:last-child`, `:nth-child(...)`, comma
//! groups and the descendant, `>`, `+` and `~` combinators.

use smallvec::SmallVec;
use thiserror::Error;

/// Errors that can occur while parsing a selector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("Unexpected end of selector")]
    UnexpectedEof,

    #[error("Unexpected character {ch:?} at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("Invalid attribute selector: {0}")]
    InvalidAttribute(String),

    #[error("Unsupported pseudo-class: {0}")]
    UnsupportedPseudoClass(String),

    #[error("Invalid nth-child argument: {0}")]
    InvalidNth(String),

    #[error("Combinator without a selector on its right")]
    DanglingCombinator,
}

pub type Result<T> = std::result::Result<T, SelectorError>;

/// Relation between a compound and the compound to its right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: any ancestor.
    Descendant,
    /// `>`: the parent element.
    Child,
    /// `+`: the previous element sibling.
    Adjacent,
    /// `~`: any previous element sibling.
    Sibling,
}

/// Attribute test operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOperator {
    /// `[attr]`
    Exists,
    /// `[attr=v]`
    Equals,
    /// `[attr^=v]`
    Prefix,
    /// `[attr$=v]`
    Suffix,
    /// `[attr*=v]`
    Substring,
    /// `[attr~=v]`, whitespace separated token
    Includes,
    /// `[attr|=v]`, exact or followed by `-`
    DashMatch,
}

/// An attribute test. `#id` and `.class` are parsed into these too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    pub operator: AttrOperator,
    pub value: String,
    pub case_insensitive: bool,
}

/// `An+B` position pattern, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthPattern {
    pub a: i32,
    pub b: i32,
}

impl NthPattern {
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Parse `odd`, `even`, `3`, `2n+1`, `-n+3` and friends.
    pub fn parse(input: &str) -> Result<Self> {
        let compact: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        let invalid = || SelectorError::InvalidNth(input.trim().to_string());

        match compact.as_str() {
            "" => Err(invalid()),
            "odd" => Ok(Self::new(2, 1)),
            "even" => Ok(Self::new(2, 0)),
            _ => match compact.split_once('n') {
                Some((a_str, b_str)) => {
                    let a = match a_str {
                        "" | "+" => 1,
                        "-" => -1,
                        _ => a_str.parse().map_err(|_| invalid())?,
                    };
                    let b = if b_str.is_empty() {
                        0
                    } else if b_str.starts_with(['+', '-']) {
                        b_str.parse().map_err(|_| invalid())?
                    } else {
                        return Err(invalid());
                    };
                    Ok(Self::new(a, b))
                }
                None => compact.parse().map(|b| Self::new(0, b)).map_err(|_| invalid()),
            },
        }
    }

    /// Whether the 1-based `position` is selected.
    ///
    /// Works in `i64`, so extreme `a`/`b` values cannot overflow.
    pub fn matches(&self, position: usize) -> bool {
        let Ok(position) = i64::try_from(position) else {
            return false;
        };
        let (a, b) = (i64::from(self.a), i64::from(self.b));
        let Some(diff) = position.checked_sub(b) else {
            return false;
        };
        if a == 0 {
            return diff == 0;
        }
        diff % a == 0 && diff / a >= 0
    }
}

/// Supported pseudo-classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    /// True when none of the inner compounds match.
    Not(Vec<Compound>),
    FirstChild,
    LastChild,
    NthChild(NthPattern),
}

/// One simple selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    /// Lower-cased tag name.
    Tag(String),
    Universal,
    Attribute(AttributeSelector),
    Pseudo(PseudoClass),
}

/// Simple selectors that must all match the same element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    pub components: SmallVec<[Component; 4]>,
}

/// One alternative of a selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// The rightmost compound, tested against the candidate.
    pub subject: Compound,
    /// The remaining compounds from right to left, each with the combinator
    /// that links it to its right-hand neighbour.
    pub ancestors: Vec<(Combinator, Compound)>,
}

/// Comma separated alternatives. Empty when the input was blank.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorList {
    pub selectors: SmallVec<[Selector; 1]>,
}

impl SelectorList {
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

/// Parse a selector list.
pub fn parse_selector_list(input: &str) -> Result<SelectorList> {
    let mut parser = SelectorParser::new(input);
    let list = parser.parse_list()?;
    parser.skip_whitespace();
    match parser.current() {
        None => Ok(list),
        Some(ch) => Err(SelectorError::UnexpectedChar {
            ch,
            pos: parser.pos,
        }),
    }
}

struct SelectorParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> SelectorParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn current(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn consume_char(&mut self, ch: char) -> bool {
        if self.current() == Some(ch) {
            self.pos += ch.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect_char(&mut self, ch: char) -> Result<()> {
        match self.current() {
            Some(c) if c == ch => {
                self.pos += c.len_utf8();
                Ok(())
            }
            Some(c) => Err(self.unexpected(c)),
            None => Err(SelectorError::UnexpectedEof),
        }
    }

    fn unexpected(&self, ch: char) -> SelectorError {
        SelectorError::UnexpectedChar { ch, pos: self.pos }
    }

    /// Returns whether any whitespace was skipped.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.current().map_or(false, char::is_whitespace) {
            self.advance();
        }
        self.pos > start
    }

    fn parse_list(&mut self) -> Result<SelectorList> {
        let mut list = SelectorList::default();
        self.skip_whitespace();
        if self.current().is_none() {
            return Ok(list);
        }
        loop {
            list.selectors.push(self.parse_selector()?);
            self.skip_whitespace();
            if !self.consume_char(',') {
                break;
            }
            self.skip_whitespace();
        }
        Ok(list)
    }

    fn parse_selector(&mut self) -> Result<Selector> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.current() {
                None | Some(',') | Some(')') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::Adjacent,
                Some('~') => Combinator::Sibling,
                Some(_) if had_whitespace => Combinator::Descendant,
                Some(c) => return Err(self.unexpected(c)),
            };
            if combinator != Combinator::Descendant {
                self.advance();
                self.skip_whitespace();
                if matches!(self.current(), None | Some(',') | Some(')')) {
                    return Err(SelectorError::DanglingCombinator);
                }
            }
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        let mut compounds = compounds.into_iter().rev();
        let subject = compounds.next().unwrap_or_default();
        let ancestors = combinators.into_iter().rev().zip(compounds).collect();
        Ok(Selector { subject, ancestors })
    }

    fn parse_compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::default();

        if self.consume_char('*') {
            compound.components.push(Component::Universal);
        } else if self.current().map_or(false, is_ident_char) {
            let name = self.parse_ident()?;
            compound.components.push(Component::Tag(name.to_ascii_lowercase()));
        }

        loop {
            match self.current() {
                Some('#') => {
                    self.advance();
                    let id = self.parse_ident()?;
                    compound.components.push(Component::Attribute(AttributeSelector {
                        name: "id".to_string(),
                        operator: AttrOperator::Equals,
                        value: id,
                        case_insensitive: false,
                    }));
                }
                Some('.') => {
                    self.advance();
                    let class = self.parse_ident()?;
                    compound.components.push(Component::Attribute(AttributeSelector {
                        name: "class".to_string(),
                        operator: AttrOperator::Includes,
                        value: class,
                        case_insensitive: false,
                    }));
                }
                Some('[') => {
                    self.advance();
                    let attr = self.parse_attribute()?;
                    compound.components.push(Component::Attribute(attr));
                }
                Some(':') => {
                    self.advance();
                    let pseudo = self.parse_pseudo()?;
                    compound.components.push(Component::Pseudo(pseudo));
                }
                _ => break,
            }
        }

        if compound.components.is_empty() {
            return match self.current() {
                Some(c) => Err(self.unexpected(c)),
                None => Err(SelectorError::UnexpectedEof),
            };
        }
        Ok(compound)
    }

    fn parse_ident(&mut self) -> Result<String> {
        let mut ident = String::new();
        while let Some(c) = self.current() {
            if c == '\\' {
                self.advance();
                match self.advance() {
                    Some(escaped) => ident.push(escaped),
                    None => return Err(SelectorError::UnexpectedEof),
                }
            } else if is_ident_char(c) {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if ident.is_empty() {
            return match self.current() {
                Some(c) => Err(self.unexpected(c)),
                None => Err(SelectorError::UnexpectedEof),
            };
        }
        Ok(ident)
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector> {
        self.skip_whitespace();
        let name = self.parse_ident().map_err(|_| {
            SelectorError::InvalidAttribute(format!("missing name at offset {}", self.pos))
        })?;
        self.skip_whitespace();

        let operator = match (self.current(), self.peek(1)) {
            (Some(']'), _) => {
                self.advance();
                return Ok(AttributeSelector {
                    name,
                    operator: AttrOperator::Exists,
                    value: String::new(),
                    case_insensitive: false,
                });
            }
            (Some('='), _) => AttrOperator::Equals,
            (Some('^'), Some('=')) => AttrOperator::Prefix,
            (Some('$'), Some('=')) => AttrOperator::Suffix,
            (Some('*'), Some('=')) => AttrOperator::Substring,
            (Some('~'), Some('=')) => AttrOperator::Includes,
            (Some('|'), Some('=')) => AttrOperator::DashMatch,
            (Some(c), _) => {
                return Err(SelectorError::InvalidAttribute(format!(
                    "unknown operator {c:?} in [{name}]"
                )))
            }
            (None, _) => return Err(SelectorError::UnexpectedEof),
        };
        if operator != AttrOperator::Equals {
            self.advance();
        }
        self.advance();
        self.skip_whitespace();

        let value = match self.current() {
            Some(quote @ ('"' | '\'')) => {
                self.advance();
                self.parse_string(quote)?
            }
            Some(_) => self.parse_ident()?,
            None => return Err(SelectorError::UnexpectedEof),
        };

        self.skip_whitespace();
        let mut case_insensitive = false;
        match self.current() {
            Some('i') | Some('I') => {
                self.advance();
                case_insensitive = true;
                self.skip_whitespace();
            }
            Some('s') | Some('S') => {
                self.advance();
                self.skip_whitespace();
            }
            _ => {}
        }
        self.expect_char(']')?;

        Ok(AttributeSelector {
            name,
            operator,
            value,
            case_insensitive,
        })
    }

    fn parse_string(&mut self, quote: char) -> Result<String> {
        let mut value = String::new();
        loop {
            match self.advance() {
                None => return Err(SelectorError::UnexpectedEof),
                Some(c) if c == quote => return Ok(value),
                Some('\\') => match self.advance() {
                    Some(escaped) => value.push(escaped),
                    None => return Err(SelectorError::UnexpectedEof),
                },
                Some(c) => value.push(c),
            }
        }
    }

    fn parse_pseudo(&mut self) -> Result<PseudoClass> {
        if self.current() == Some(':') {
            self.advance();
            let name = self.parse_ident()?;
            return Err(SelectorError::UnsupportedPseudoClass(format!("::{name}")));
        }
        let name = self.parse_ident()?.to_ascii_lowercase();
        match name.as_str() {
            "first-child" => Ok(PseudoClass::FirstChild),
            "last-child" => Ok(PseudoClass::LastChild),
            "nth-child" => {
                self.expect_char('(')?;
                let start = self.pos;
                while !matches!(self.current(), Some(')') | None) {
                    self.advance();
                }
                let argument = &self.input[start..self.pos];
                self.expect_char(')')?;
                Ok(PseudoClass::NthChild(NthPattern::parse(argument)?))
            }
            "not" => {
                self.expect_char('(')?;
                let mut inner = Vec::new();
                loop {
                    self.skip_whitespace();
                    inner.push(self.parse_compound()?);
                    self.skip_whitespace();
                    match self.current() {
                        Some(',') => {
                            self.advance();
                        }
                        Some(')') => {
                            self.advance();
                            break;
                        }
                        Some(c) => return Err(self.unexpected(c)),
                        None => return Err(SelectorError::UnexpectedEof),
                    }
                }
                Ok(PseudoClass::Not(inner))
            }
            _ => Err(SelectorError::UnsupportedPseudoClass(name)),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '\\' || !c.is_ascii()
}
