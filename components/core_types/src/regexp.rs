//! Regular expression values backed by the `regex` crate.

use regex::{Regex, RegexBuilder};

use crate::JsError;

/// A compiled regular expression literal.
#[derive(Debug, Clone)]
pub struct JsRegExp {
    source: String,
    flags: String,
    regex: Regex,
}

impl JsRegExp {
    /// Compiles a pattern with the given flags.
    ///
    /// Supported flags are `g`, `i`, `m`, `s`, `u` and `y`; `g`, `u` and `y`
    /// are recorded but do not change matching.
    pub fn new(source: &str, flags: &str) -> Result<Self, JsError> {
        let mut builder = RegexBuilder::new(source);
        for flag in flags.chars() {
            match flag {
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'g' | 'u' | 'y' => {}
                other => {
                    return Err(JsError::new(
                        crate::ErrorKind::SyntaxError,
                        format!("Invalid regular expression flags '{}'", other),
                    ))
                }
            }
        }
        let regex = builder.build().map_err(|e| {
            JsError::new(
                crate::ErrorKind::SyntaxError,
                format!("Invalid regular expression: /{}/: {}", source, e),
            )
        })?;
        Ok(JsRegExp {
            source: source.to_string(),
            flags: flags.to_string(),
            regex,
        })
    }

    /// Pattern text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Flag letters.
    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// Returns true if the pattern matches anywhere in `text`.
    pub fn test(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}
