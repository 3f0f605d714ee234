//! # vdom HTML
//!
//! Markup tokenizer, entity coding and the markup encoder.
//!
//! The tokenizer reports structural events to a [`Scanner`]; the DOM crate
//! implements one to build its tree. Tokenizing never fails: input that does
//! not match a tag pattern is reported as text.

pub mod entities;
pub mod markup;
pub mod tokenizer;

pub use entities::{escape, unescape};
pub use markup::{element_frame, markup, Child, Dialect, ElementFrame, Value, VOID_ELEMENTS};
pub use tokenizer::{tokenize, AttrValue, Attributes, Token, Tokenizer, TokenizerOptions};

/// Receiver of tokenizer events.
pub trait Scanner {
    /// Called for `<!-- ... -->` with the text between the markers.
    fn comment(&mut self, _text: &str) {}

    /// Called for a start tag. `raw` is the complete matched tag text.
    fn start_element(&mut self, name: &str, attrs: Attributes, self_closing: bool, raw: &str);

    /// Called for an end tag.
    fn end_element(&mut self, name: &str);

    /// Called for a run of character data (not yet entity-decoded).
    fn characters(&mut self, text: &str);
}

/// Tokenize `html` and report every event to `scanner`.
pub fn scan<S: Scanner + ?Sized>(html: &str, scanner: &mut S) {
    Tokenizer::new(html).run(scanner);
}

/// Tokenize `html` with options and report every event to `scanner`.
pub fn scan_with<S: Scanner + ?Sized>(html: &str, options: TokenizerOptions, scanner: &mut S) {
    Tokenizer::with_options(html, options).run(scanner);
}
