//! Tokenizer - turns source text into a stream of [`Token`]s
//!
//! Whitespace and comments are kept as tokens so the compiler can see
//! statement-terminating newlines. Template literals are split into
//! begin/mid/end pieces around each interpolation, and `/` is read as a
//! regular expression or a division depending on the previous significant
//! token.

use bytecode_system::Constant;
use core_types::{JsError, JsRegExp, SourcePosition};

use crate::error::syntax_error;
use crate::token::{Token, TokenType};

/// Punctuators ordered so that the longest match wins
const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "**", "<<", ">>", "{", "}", "(", ")", "[", "]", ";", ",", "<", ">", "+", "-",
    "*", "/", "%", "&", "|", "^", "!", "~", "?", ":", "=", ".", "@", "#",
];

/// Keywords after which a `/` starts a regular expression
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
    "typeof", "void", "delete", "in", "instanceof", "new", "else", "return", "case",
];

/// Tokenizer over UTF-8 source text.
///
/// The lexer is an iterator; it stops after the first error.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Vec<char>,
    position: usize,
    byte_position: usize,
    line: u32,
    column: u32,
    regex_allowed: bool,
    /// Brace depth recorded at each open `${`
    template_depths: Vec<usize>,
    brace_depth: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            position: 0,
            byte_position: 0,
            line: 1,
            column: 1,
            regex_allowed: true,
            template_depths: Vec::new(),
            brace_depth: 0,
            finished: false,
        }
    }

    /// Tokenize the whole source
    pub fn tokenize(source: &str) -> Result<Vec<Token>, JsError> {
        Lexer::new(source).collect()
    }

    fn scan_token(&mut self) -> Result<Token, JsError> {
        let start = self.current_position();
        let start_byte = self.byte_position;
        let ch = self.peek();

        if is_whitespace(ch) {
            while !self.is_at_end() && is_whitespace(self.peek()) {
                self.advance();
            }
            return Ok(self.make(TokenType::Whitespace, start, start_byte));
        }

        if ch == '/' && self.peek_next() == Some('/') {
            while !self.is_at_end() && !is_line_terminator(self.peek()) {
                self.advance();
            }
            return Ok(self.make(TokenType::Comment, start, start_byte));
        }

        if ch == '/' && self.peek_next() == Some('*') {
            self.advance();
            self.advance();
            loop {
                if self.is_at_end() {
                    return Err(syntax_error("Unterminated comment", start));
                }
                if self.advance() == '*' && self.match_char('/') {
                    break;
                }
            }
            return Ok(self.make(TokenType::Comment, start, start_byte));
        }

        let token = if ch == '"' || ch == '\'' {
            self.scan_string(ch, start, start_byte)?
        } else if ch == '`' {
            self.advance();
            self.scan_template(true, start, start_byte)?
        } else if ch == '}' && self.template_depths.last() == Some(&self.brace_depth) {
            self.template_depths.pop();
            self.advance();
            self.scan_template(false, start, start_byte)?
        } else if ch.is_ascii_digit() || (ch == '.' && self.peek_next().is_some_and(|c| c.is_ascii_digit())) {
            self.scan_number(start, start_byte)?
        } else if is_id_start(ch) {
            while !self.is_at_end() && is_id_continue(self.peek()) {
                self.advance();
            }
            self.make(TokenType::Ident, start, start_byte)
        } else if ch == '/' && self.regex_allowed {
            self.scan_regexp(start, start_byte)?
        } else {
            self.scan_punctuator(start, start_byte)?
        };

        self.regex_allowed = regex_may_follow(&token);
        Ok(token)
    }

    fn make(&self, token_type: TokenType, start: SourcePosition, start_byte: usize) -> Token {
        Token::new(token_type, &self.source[start_byte..self.byte_position], start)
    }

    fn scan_punctuator(&mut self, start: SourcePosition, start_byte: usize) -> Result<Token, JsError> {
        let rest = &self.source[self.byte_position..];
        let matched = PUNCTUATORS
            .iter()
            .find(|p| rest.starts_with(**p))
            .copied()
            .ok_or_else(|| syntax_error("Invalid or unexpected token", start))?;

        // `a?.5:b` is a ternary, not optional chaining
        let matched = if matched == "?." && rest[2..].starts_with(|c: char| c.is_ascii_digit()) {
            "?"
        } else {
            matched
        };

        for _ in 0..matched.len() {
            self.advance();
        }
        match matched {
            "{" => self.brace_depth += 1,
            "}" => self.brace_depth = self.brace_depth.saturating_sub(1),
            _ => {}
        }
        Ok(self.make(TokenType::Other, start, start_byte))
    }

    fn scan_string(&mut self, quote: char, start: SourcePosition, start_byte: usize) -> Result<Token, JsError> {
        self.advance(); // Opening quote
        let mut value = String::new();

        loop {
            if self.is_at_end() || is_line_terminator(self.peek()) {
                return Err(syntax_error("Unterminated string", start));
            }
            let ch = self.advance();
            if ch == quote {
                break;
            }
            if ch == '\\' {
                self.scan_escape(&mut value, start)?;
            } else {
                value.push(ch);
            }
        }

        Ok(self
            .make(TokenType::String, start, start_byte)
            .with_value(Constant::String(value)))
    }

    /// Scan template text after a backtick (`opening`) or after the `}`
    /// closing an interpolation, up to the closing backtick or the next `${`.
    fn scan_template(&mut self, opening: bool, start: SourcePosition, start_byte: usize) -> Result<Token, JsError> {
        let mut value = String::new();

        let interpolates = loop {
            if self.is_at_end() {
                return Err(syntax_error("Unterminated template literal", start));
            }
            let ch = self.advance();
            match ch {
                '`' => break false,
                '$' if self.peek() == '{' => {
                    self.advance();
                    break true;
                }
                '\\' => self.scan_escape(&mut value, start)?,
                '\r' => {
                    // CRLF and lone CR both read as LF
                    self.match_char('\n');
                    value.push('\n');
                }
                _ => value.push(ch),
            }
        };

        if interpolates {
            self.template_depths.push(self.brace_depth);
        }
        let token_type = match (opening, interpolates) {
            (true, false) => TokenType::StringTemplate,
            (true, true) => TokenType::StringTemplateBegin,
            (false, true) => TokenType::StringTemplateMid,
            (false, false) => TokenType::StringTemplateEnd,
        };
        Ok(self
            .make(token_type, start, start_byte)
            .with_value(Constant::String(value)))
    }

    /// Decode one escape sequence; the backslash is already consumed.
    fn scan_escape(&mut self, value: &mut String, start: SourcePosition) -> Result<(), JsError> {
        if self.is_at_end() {
            return Err(syntax_error("Unterminated string", start));
        }
        let escaped = self.advance();
        match escaped {
            'n' => value.push('\n'),
            't' => value.push('\t'),
            'r' => value.push('\r'),
            'b' => value.push('\u{0008}'),
            'f' => value.push('\u{000C}'),
            'v' => value.push('\u{000B}'),
            '0' if !self.peek().is_ascii_digit() => value.push('\0'),
            'x' => {
                let code = self.scan_hex_digits(2, start)?;
                value.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
            }
            'u' => {
                let code = self.scan_unicode_escape(start)?;
                if (0xD800..0xDC00).contains(&code) && self.peek() == '\\' && self.peek_next() == Some('u') {
                    let saved = (self.position, self.byte_position, self.column);
                    self.advance();
                    self.advance();
                    let low = self.scan_unicode_escape(start)?;
                    if (0xDC00..0xE000).contains(&low) {
                        let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                        value.push(char::from_u32(combined).unwrap_or('\u{FFFD}'));
                        return Ok(());
                    }
                    (self.position, self.byte_position, self.column) = saved;
                }
                value.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
            }
            // Line continuation
            '\r' => {
                self.match_char('\n');
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            _ => value.push(escaped),
        }
        Ok(())
    }

    fn scan_unicode_escape(&mut self, start: SourcePosition) -> Result<u32, JsError> {
        if !self.match_char('{') {
            return self.scan_hex_digits(4, start);
        }
        let mut code: u32 = 0;
        let mut digits = 0;
        while !self.is_at_end() && self.peek() != '}' {
            let digit = self
                .advance()
                .to_digit(16)
                .ok_or_else(|| syntax_error("Invalid Unicode escape sequence", start))?;
            code = code.saturating_mul(16).saturating_add(digit);
            digits += 1;
        }
        if !self.match_char('}') || digits == 0 || code > 0x10FFFF {
            return Err(syntax_error("Invalid Unicode escape sequence", start));
        }
        Ok(code)
    }

    fn scan_hex_digits(&mut self, count: usize, start: SourcePosition) -> Result<u32, JsError> {
        let mut code = 0;
        for _ in 0..count {
            let digit = if self.is_at_end() { None } else { self.advance().to_digit(16) };
            match digit {
                Some(d) => code = code * 16 + d,
                None => return Err(syntax_error("Invalid hexadecimal escape sequence", start)),
            }
        }
        Ok(code)
    }

    fn scan_number(&mut self, start: SourcePosition, start_byte: usize) -> Result<Token, JsError> {
        let radix = if self.peek() == '0' {
            match self.peek_next() {
                Some('x' | 'X') => 16,
                Some('o' | 'O') => 8,
                Some('b' | 'B') => 2,
                _ => 10,
            }
        } else {
            10
        };

        let value = if radix != 10 {
            self.advance();
            self.advance();
            let digits = self.scan_digits(radix, start)?;
            if digits.is_empty() {
                return Err(syntax_error("Invalid or unexpected token", start));
            }
            digits
                .chars()
                .filter_map(|c| c.to_digit(radix))
                .fold(0.0, |acc, d| acc * radix as f64 + d as f64)
        } else {
            let mut literal = self.scan_digits(10, start)?;
            if literal.is_empty() {
                literal.push('0');
            }
            if self.match_char('.') {
                let fraction = self.scan_digits(10, start)?;
                literal.push('.');
                literal.push_str(if fraction.is_empty() { "0" } else { &fraction });
            }
            if matches!(self.peek(), 'e' | 'E') {
                let sign = self.peek_next();
                let has_digits = match sign {
                    Some('+' | '-') => self.chars.get(self.position + 2).is_some_and(|c| c.is_ascii_digit()),
                    Some(c) => c.is_ascii_digit(),
                    None => false,
                };
                if !has_digits {
                    return Err(syntax_error("Invalid or unexpected token", start));
                }
                self.advance();
                literal.push('e');
                if matches!(self.peek(), '+' | '-') {
                    literal.push(self.advance());
                }
                literal.push_str(&self.scan_digits(10, start)?);
            }
            literal
                .parse::<f64>()
                .map_err(|_| syntax_error("Invalid number", start))?
        };

        if self.peek() == 'n' {
            return Err(syntax_error("BigInt literals are not supported", start));
        }
        if !self.is_at_end() && (is_id_start(self.peek()) || self.peek().is_ascii_digit()) {
            return Err(syntax_error("Invalid or unexpected token", start));
        }

        Ok(self
            .make(TokenType::Number, start, start_byte)
            .with_value(Constant::Number(value)))
    }

    /// Digits in `radix` with `_` separators removed
    fn scan_digits(&mut self, radix: u32, start: SourcePosition) -> Result<String, JsError> {
        let mut digits = String::new();
        while !self.is_at_end() {
            let ch = self.peek();
            if ch.is_digit(radix) {
                digits.push(self.advance());
            } else if ch == '_' {
                let next_is_digit = self.peek_next().is_some_and(|c| c.is_digit(radix));
                if digits.is_empty() || !next_is_digit {
                    return Err(syntax_error("Numeric separators are not allowed here", start));
                }
                self.advance();
            } else {
                break;
            }
        }
        Ok(digits)
    }

    fn scan_regexp(&mut self, start: SourcePosition, start_byte: usize) -> Result<Token, JsError> {
        self.advance(); // Opening '/'
        let mut pattern = String::new();
        let mut in_class = false;

        loop {
            if self.is_at_end() || is_line_terminator(self.peek()) {
                return Err(syntax_error("Unterminated regular expression", start));
            }
            let ch = self.advance();
            match ch {
                '\\' => {
                    pattern.push(ch);
                    if self.is_at_end() || is_line_terminator(self.peek()) {
                        return Err(syntax_error("Unterminated regular expression", start));
                    }
                    pattern.push(self.advance());
                }
                '[' => {
                    in_class = true;
                    pattern.push(ch);
                }
                ']' => {
                    in_class = false;
                    pattern.push(ch);
                }
                '/' if !in_class => break,
                _ => pattern.push(ch),
            }
        }

        let mut flags = String::new();
        while !self.is_at_end() && is_id_continue(self.peek()) {
            flags.push(self.advance());
        }

        JsRegExp::new(&pattern, &flags).map_err(|e| {
            syntax_error(
                format!("Invalid regular expression: /{}/{}: {}", pattern, flags, e.message),
                start,
            )
        })?;

        Ok(self
            .make(TokenType::RegExp, start, start_byte)
            .with_value(Constant::RegExp { pattern, flags }))
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.chars.len()
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.position]
        }
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.position + 1).copied()
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.position];
        self.position += 1;
        self.byte_position += ch.len_utf8();
        let crlf = ch == '\r' && self.peek() == '\n';
        if is_line_terminator(ch) && !crlf {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        ch
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.chars[self.position] != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    fn current_position(&self) -> SourcePosition {
        SourcePosition::new(self.line, self.column, self.position)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, JsError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.is_at_end() {
            return None;
        }
        let result = self.scan_token();
        if result.is_err() {
            self.finished = true;
        }
        Some(result)
    }
}

fn regex_may_follow(token: &Token) -> bool {
    match token.token_type {
        TokenType::Ident => REGEX_PREFIX_KEYWORDS.contains(&token.text.as_str()),
        TokenType::Other => !matches!(token.text.as_str(), ")" | "]" | "}" | "++" | "--"),
        TokenType::StringTemplateBegin | TokenType::StringTemplateMid => true,
        _ => false,
    }
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn is_whitespace(c: char) -> bool {
    is_line_terminator(c) || c.is_whitespace() || c == '\u{FEFF}'
}

fn is_id_start(c: char) -> bool {
    c.is_alphabetic() || c == '$' || c == '_'
}

fn is_id_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '$' || c == '_' || c == '\u{200C}' || c == '\u{200D}'
}
