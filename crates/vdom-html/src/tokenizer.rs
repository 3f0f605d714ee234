//! Markup tokenizer.
//!
//! A single-pass scanner that recognizes comments, start tags, end tags and
//! character runs at the front of the remaining input. Anything that does not
//! match a tag pattern is reported as characters, so every input byte ends up
//! in exactly one event and the scanner never fails.

use crate::Scanner;

/// Tags whose content is taken verbatim up to the matching end tag.
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Attribute value as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// `name=value`, `name="value"` or `name='value'`.
    Text(String),
    /// A bare `name` with no value.
    Present,
}

impl AttrValue {
    /// The string form; a bare attribute reads as the empty string.
    pub fn as_str(&self) -> &str {
        match self {
            AttrValue::Text(s) => s,
            AttrValue::Present => "",
        }
    }
}

/// Attributes in source order. A repeated name keeps its first position and
/// takes the last value.
pub type Attributes = Vec<(String, AttrValue)>;

/// Token types emitted by [`tokenize`].
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `<!-- ... -->`
    Comment(String),
    /// Start tag (e.g., `<div>` or `<img />`)
    StartTag {
        name: String,
        attrs: Attributes,
        self_closing: bool,
    },
    /// End tag (e.g., `</div>`)
    EndTag { name: String },
    /// A run of text content
    Characters(String),
}

/// Tokenizer options.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenizerOptions {
    /// Drop character runs that consist of whitespace only.
    pub ignore_whitespace_text: bool,
}

/// Markup tokenizer.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    options: TokenizerOptions,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_options(input, TokenizerOptions::default())
    }

    pub fn with_options(input: &'a str, options: TokenizerOptions) -> Self {
        Self {
            input,
            pos: 0,
            options,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Run the tokenizer to the end of input, reporting events to `scanner`.
    pub fn run<S: Scanner + ?Sized>(mut self, scanner: &mut S) {
        while self.pos < self.input.len() {
            let rest = self.rest();
            let consumed = if rest.starts_with("<!--") {
                self.scan_comment(scanner)
            } else if rest.starts_with("</") {
                self.scan_end_tag(scanner)
            } else if rest.starts_with('<') {
                self.scan_start_tag(scanner)
            } else {
                false
            };

            if !consumed {
                self.scan_characters(scanner);
            }
        }
    }

    fn scan_comment<S: Scanner + ?Sized>(&mut self, scanner: &mut S) -> bool {
        let rest = self.rest();
        let Some(end) = rest[2..].find("-->").map(|i| i + 2) else {
            tracing::trace!(pos = self.pos, "unterminated comment, treating as text");
            return false;
        };
        let text = if end >= 4 { &rest[4..end] } else { "" };
        scanner.comment(text);
        self.pos += end + 3;
        true
    }

    fn scan_end_tag<S: Scanner + ?Sized>(&mut self, scanner: &mut S) -> bool {
        let rest = self.rest();
        let name_end = take_while(rest, 2, |c| c != '>' && !c.is_whitespace());
        if name_end == 2 {
            tracing::trace!(pos = self.pos, "end tag without name, treating as text");
            return false;
        }
        let Some(gt) = rest[name_end..].find('>').map(|i| i + name_end) else {
            tracing::trace!(pos = self.pos, "unterminated end tag, treating as text");
            return false;
        };
        scanner.end_element(&rest[2..name_end]);
        self.pos += gt + 1;
        true
    }

    fn scan_start_tag<S: Scanner + ?Sized>(&mut self, scanner: &mut S) -> bool {
        let rest = self.rest();
        let Some(tag) = match_start_tag(rest) else {
            tracing::trace!(pos = self.pos, "no start tag pattern, treating as text");
            return false;
        };

        let self_closing = tag.raw[..tag.raw.len() - 1].trim_end().ends_with('/');
        let mut attr_input = tag.attrs;
        if self_closing {
            attr_input = strip_self_close_slash(attr_input);
        }
        let attrs = parse_attributes(attr_input);
        scanner.start_element(tag.name, attrs, self_closing, tag.raw);
        self.pos += tag.raw.len();

        let lower = tag.name.to_ascii_lowercase();
        if RAW_TEXT_ELEMENTS.contains(&lower.as_str()) {
            self.scan_raw_text(&lower, scanner);
        }
        true
    }

    fn scan_raw_text<S: Scanner + ?Sized>(&mut self, tag: &str, scanner: &mut S) {
        let rest = self.rest();
        let needle = format!("</{tag}");
        let end = find_ignore_ascii_case(rest, &needle).unwrap_or(rest.len());
        if end > 0 {
            scanner.characters(&rest[..end]);
        }
        self.pos += end;
    }

    fn scan_characters<S: Scanner + ?Sized>(&mut self, scanner: &mut S) {
        let rest = self.rest();
        // A '<' at the front failed every tag pattern, so it belongs to this run.
        let end = match rest.find('<') {
            Some(0) => rest[1..].find('<').map(|i| i + 1).unwrap_or(rest.len()),
            Some(i) => i,
            None => rest.len(),
        };
        let text = &rest[..end];
        if !self.options.ignore_whitespace_text || !text.trim().is_empty() {
            scanner.characters(text);
        }
        self.pos += end;
    }
}

struct StartTagMatch<'a> {
    name: &'a str,
    attrs: &'a str,
    raw: &'a str,
}

/// Match `<name (ws attr(=value)?)* ws* /? ws* >` at the front of `rest`.
fn match_start_tag(rest: &str) -> Option<StartTagMatch<'_>> {
    let name_end = take_while(rest, 1, |c| c != '>' && c != '/' && !c.is_whitespace());
    if name_end == 1 {
        return None;
    }

    let mut cur = name_end;
    loop {
        let name_start = skip_whitespace(rest, cur);
        if name_start == cur {
            break;
        }
        let name_stop = take_while(rest, name_start, |c| c != '=' && c != '>' && !c.is_whitespace());
        if name_stop == name_start {
            break;
        }
        cur = name_stop;

        let eq = skip_whitespace(rest, name_stop);
        if rest[eq..].starts_with('=') {
            let value_start = skip_whitespace(rest, eq + 1);
            if let Some(value_end) = match_tag_value(rest, value_start) {
                cur = value_end;
            }
        }
    }

    let attrs_end = cur;
    let mut tail = skip_whitespace(rest, cur);
    if rest[tail..].starts_with('/') {
        tail = skip_whitespace(rest, tail + 1);
    }
    if !rest[tail..].starts_with('>') {
        return None;
    }

    Some(StartTagMatch {
        name: &rest[1..name_end],
        attrs: &rest[name_end..attrs_end],
        raw: &rest[..=tail],
    })
}

/// A quoted value only counts when the tag can go on after it; otherwise the
/// quote is part of an unquoted value.
fn match_tag_value(s: &str, start: usize) -> Option<usize> {
    let first = s[start..].chars().next()?;
    if first == '"' || first == '\'' {
        if let Some(close) = s[start + 1..].find(first) {
            let end = start + 1 + close + 1;
            if can_follow_value(s, end) {
                return Some(end);
            }
        }
    }
    let end = take_while(s, start, |c| c != '>' && !c.is_whitespace());
    (end > start).then_some(end)
}

fn can_follow_value(s: &str, pos: usize) -> bool {
    match s[pos..].chars().next() {
        None | Some('>') => true,
        Some('/') => s[skip_whitespace(s, pos + 1)..].starts_with('>'),
        Some(c) => c.is_whitespace(),
    }
}

fn strip_self_close_slash(attrs: &str) -> &str {
    let trimmed = attrs.trim_end();
    match trimmed.strip_suffix('/') {
        Some(before) => before.trim_end(),
        None => attrs,
    }
}

/// Parse a raw attribute block such as ` href="/a" hidden data-x=1`.
pub fn parse_attributes(input: &str) -> Attributes {
    let mut attrs = Attributes::new();
    if is_simple_attribute_block(input) {
        for token in input.split_whitespace() {
            let token = token.trim_start_matches('=');
            if token.is_empty() {
                continue;
            }
            match token.split_once('=') {
                Some((name, value)) if !value.is_empty() => {
                    set_attribute(&mut attrs, name, AttrValue::Text(value.to_string()))
                }
                Some((name, _)) => set_attribute(&mut attrs, name, AttrValue::Present),
                None => set_attribute(&mut attrs, token, AttrValue::Present),
            }
        }
        return attrs;
    }

    let mut pos = 0;
    while pos < input.len() {
        let start = take_while(input, pos, |c| c == '=' || c.is_whitespace());
        if start >= input.len() {
            break;
        }
        let name_end = take_while(input, start, |c| c != '=' && !c.is_whitespace());
        let name = &input[start..name_end];
        let mut value = AttrValue::Present;
        pos = name_end;

        let eq = skip_whitespace(input, name_end);
        if input[eq..].starts_with('=') {
            let value_start = skip_whitespace(input, eq + 1);
            if let Some((text, end)) = attribute_value(input, value_start) {
                value = AttrValue::Text(text.to_string());
                pos = end;
            }
        }
        set_attribute(&mut attrs, name, value);
    }
    attrs
}

/// No quotes and no whitespace around `=`: plain `name[=value]` words.
fn is_simple_attribute_block(input: &str) -> bool {
    if input.contains(['"', '\'']) {
        return false;
    }
    let mut prev_ws = false;
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '=' && (prev_ws || chars.peek().map_or(false, |n| n.is_whitespace())) {
            return false;
        }
        prev_ws = c.is_whitespace();
    }
    true
}

fn attribute_value(s: &str, start: usize) -> Option<(&str, usize)> {
    let first = s[start..].chars().next()?;
    if first == '"' || first == '\'' {
        if let Some(close) = s[start + 1..].find(first) {
            let inner_end = start + 1 + close;
            return Some((&s[start + 1..inner_end], inner_end + 1));
        }
    }
    let end = take_while(s, start, |c| c != '>' && !c.is_whitespace());
    (end > start).then(|| (&s[start..end], end))
}

fn set_attribute(attrs: &mut Attributes, name: &str, value: AttrValue) {
    match attrs.iter_mut().find(|(n, _)| n == name) {
        Some(slot) => slot.1 = value,
        None => attrs.push((name.to_string(), value)),
    }
}

fn take_while(s: &str, from: usize, pred: impl Fn(char) -> bool) -> usize {
    s[from..]
        .char_indices()
        .find(|&(_, c)| !pred(c))
        .map_or(s.len(), |(i, _)| from + i)
}

fn skip_whitespace(s: &str, from: usize) -> usize {
    take_while(s, from, char::is_whitespace)
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let pat = needle.as_bytes();
    if pat.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - pat.len()).find(|&i| hay[i..i + pat.len()].eq_ignore_ascii_case(pat))
}

struct TokenCollector {
    tokens: Vec<Token>,
}

impl Scanner for TokenCollector {
    fn comment(&mut self, text: &str) {
        self.tokens.push(Token::Comment(text.to_string()));
    }

    fn start_element(&mut self, name: &str, attrs: Attributes, self_closing: bool, _raw: &str) {
        self.tokens.push(Token::StartTag {
            name: name.to_string(),
            attrs,
            self_closing,
        });
    }

    fn end_element(&mut self, name: &str) {
        self.tokens.push(Token::EndTag {
            name: name.to_string(),
        });
    }

    fn characters(&mut self, text: &str) {
        self.tokens.push(Token::Characters(text.to_string()));
    }
}

/// Tokenize `input` into a token list.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut collector = TokenCollector { tokens: Vec::new() };
    Tokenizer::new(input).run(&mut collector);
    collector.tokens
}
