//! Token types consumed by the compiler

use bytecode_system::Constant;
use core_types::{JsError, SourcePosition};

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Run of whitespace, possibly containing newlines
    Whitespace,
    /// `// ...` or `/* ... */`
    Comment,
    /// Quoted string literal
    String,
    /// Template literal without interpolation: `` `...` ``
    StringTemplate,
    /// Template head up to the first interpolation: `` `...${ ``
    StringTemplateBegin,
    /// Template text between two interpolations: `` }...${ ``
    StringTemplateMid,
    /// Template tail after the last interpolation: `` }...` ``
    StringTemplateEnd,
    /// Numeric literal
    Number,
    /// Regular expression literal
    RegExp,
    /// Identifier or keyword
    Ident,
    /// Punctuator
    Other,
    /// Request for more input from an interactive source; carries no text
    MoreRequest,
    /// Explicit end of input
    End,
}

/// A token with its raw text, decoded value and 1-based position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Token classification
    pub token_type: TokenType,
    /// Raw source text, including quotes and template delimiters
    pub text: String,
    /// Decoded literal value for strings, templates, numbers and regexes
    pub value: Option<Constant>,
    /// Line of the first character (1-based)
    pub line: u32,
    /// Column of the first character (1-based)
    pub column: u32,
    /// Character offset of the first character
    pub offset: usize,
}

impl Token {
    /// Create a token without a decoded value
    pub fn new(token_type: TokenType, text: impl Into<String>, position: SourcePosition) -> Self {
        Token {
            token_type,
            text: text.into(),
            value: None,
            line: position.line,
            column: position.column,
            offset: position.offset,
        }
    }

    /// Attach a decoded value
    pub fn with_value(mut self, value: Constant) -> Self {
        self.value = Some(value);
        self
    }

    /// Position of the first character
    pub fn position(&self) -> SourcePosition {
        SourcePosition::new(self.line, self.column, self.offset)
    }

    /// True for whitespace, comments and continuation requests
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.token_type,
            TokenType::Whitespace | TokenType::Comment | TokenType::MoreRequest
        )
    }

    /// True if the token text spans a line break
    pub fn has_newline(&self) -> bool {
        self.text.contains(['\n', '\r', '\u{2028}', '\u{2029}'])
    }

    /// True for a punctuator with exactly this text
    pub fn is_punct(&self, text: &str) -> bool {
        self.token_type == TokenType::Other && self.text == text
    }

    /// True for an identifier with exactly this text
    pub fn is_ident(&self, text: &str) -> bool {
        self.token_type == TokenType::Ident && self.text == text
    }

    /// Decoded string value (string literals and template parts)
    pub fn string_value(&self) -> String {
        match &self.value {
            Some(Constant::String(s)) => s.clone(),
            _ => String::new(),
        }
    }
}

/// A pull-based token stream.
///
/// Any iterator of `Result<Token, JsError>` is a token source; the end of
/// the iterator (or a [`TokenType::End`] token) ends the input.
pub trait TokenSource: Iterator<Item = Result<Token, JsError>> {}

impl<I: Iterator<Item = Result<Token, JsError>>> TokenSource for I {}
