//! Token types for the lunet tokenizer

use super::region::Region;

/// Reserved words of the Lua language. They lex as identifier-shaped text but
/// are re-tagged as [`TokenKind::Punctuation`] so that keyword dispatch and
/// symbol dispatch share one mechanism.
pub const RESERVED_KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "if", "in", "local",
    "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

/// Check if a word is a reserved keyword
#[must_use]
pub fn is_reserved(word: &str) -> bool {
    RESERVED_KEYWORDS.contains(&word)
}

/// Check if a string is usable as a bare identifier in emitted source:
/// identifier-shaped and not a reserved word.
#[must_use]
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first == '_' || first.is_ascii_alphabetic()) {
        return false;
    }
    if !chars.all(|c| c == '_' || c.is_ascii_alphanumeric()) {
        return false;
    }
    !is_reserved(s)
}

/// The kind of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A non-reserved name
    Identifier,
    /// A string literal; the token text holds the decoded value
    QuotedString,
    /// A numeric literal, kept as raw text until the parser needs its value
    Number,
    /// A symbol or reserved word
    Punctuation,
    /// End of input
    EndOfFile,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::QuotedString => "string",
            TokenKind::Number => "number",
            TokenKind::Punctuation => "punctuation",
            TokenKind::EndOfFile => "end of input",
        };
        write!(f, "{name}")
    }
}

/// A token with its kind, text, and source region
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token text. For quoted strings this is the decoded value, for
    /// everything else the raw lexeme.
    pub text: String,
    /// The region in the source code
    pub region: Region,
}

impl Token {
    /// Create a new token
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, region: Region) -> Self {
        Self {
            kind,
            text: text.into(),
            region,
        }
    }

    /// Create an end-of-input token
    #[must_use]
    pub fn end_of_file(region: Region) -> Self {
        Self::new(TokenKind::EndOfFile, "", region)
    }

    /// Check for a specific punctuation token (symbol or reserved word)
    #[must_use]
    pub fn is_punctuation(&self, text: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == text
    }

    /// Check for a specific identifier token
    #[must_use]
    pub fn is_identifier(&self, text: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text == text
    }

    /// Check for the end-of-input token
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EndOfFile
    }

    /// Human-readable description for error messages
    #[must_use]
    pub fn describe(&self) -> String {
        if self.is_eof() {
            self.kind.to_string()
        } else {
            format!("{} `{}`", self.kind, self.text)
        }
    }
}
