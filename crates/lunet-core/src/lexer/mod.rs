//! Tokenizer for Lua source text
//!
//! Produces a stream of coarse tokens: identifiers, quoted strings (with
//! escape sequences already decoded), numbers (kept as raw text), punctuation
//! and a terminal end-of-input token. Reserved words are lexed as identifiers
//! and re-tagged as punctuation, so keyword and symbol dispatch in the parser
//! share one text-based mechanism. Whitespace and comments (line and long
//! bracket form) never surface as tokens.

mod region;
mod token;

pub use region::{LineIndex, Location, Region};
pub use token::{is_reserved, is_valid_identifier, Token, TokenKind, RESERVED_KEYWORDS};

use logos::{FilterResult, Logos};
use thiserror::Error;

/// Tokenizer error types
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
pub enum LexErrorKind {
    #[default]
    #[error("unrecognized character")]
    UnexpectedChar,
    #[error("unterminated quoted string")]
    UnterminatedString,
    #[error("unterminated long comment")]
    UnterminatedLongComment,
    #[error("unknown escape sequence: \\{0}")]
    InvalidEscape(char),
}

/// A tokenizer error with location information
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at {region}")]
pub struct TokenizeError {
    pub kind: LexErrorKind,
    pub region: Region,
}

/// Raw lexemes as matched by logos, before keyword re-tagging and region
/// resolution. Comments and whitespace are consumed here and never escape.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Name,

    // A second fractional dot is consumed greedily, producing a single
    // malformed token that the parser rejects; `1..2` is not a concat.
    #[regex(r"[0-9]+(\.[0-9]*)?(\.[0-9]*)?")]
    #[regex(r"0x[0-9a-fA-F]*")]
    Number,

    #[token("\"", lex_quoted)]
    #[token("'", lex_quoted)]
    Quoted(String),

    #[token("--", lex_comment)]
    Comment,

    #[token("...")]
    #[token("..")]
    #[token("==")]
    #[token("~=")]
    #[token("<=")]
    #[token(">=")]
    #[token("#")]
    #[token("%")]
    #[token("(")]
    #[token(")")]
    #[token("*")]
    #[token("+")]
    #[token(",")]
    #[token("-")]
    #[token(".")]
    #[token("/")]
    #[token(":")]
    #[token(";")]
    #[token("<")]
    #[token("=")]
    #[token(">")]
    #[token("[")]
    #[token("]")]
    #[token("^")]
    #[token("{")]
    #[token("}")]
    #[token("~")]
    Symbol,
}

/// Decode a quoted string starting after its opening quote. Handles the
/// single-character escapes and decimal escapes of up to three digits.
fn lex_quoted(lex: &mut logos::Lexer<RawToken>) -> Result<String, LexErrorKind> {
    let quote = lex.slice().as_bytes()[0];
    let rest = lex.remainder();
    let bytes = rest.as_bytes();
    let mut value = String::new();
    let mut i = 0;

    loop {
        let Some(&b) = bytes.get(i) else {
            return Err(LexErrorKind::UnterminatedString);
        };

        if b == quote {
            lex.bump(i + 1);
            return Ok(value);
        }

        if b == b'\\' {
            i += 1;
            let Some(esc) = rest[i..].chars().next() else {
                return Err(LexErrorKind::UnterminatedString);
            };
            let decoded = match esc {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                'a' => '\x07',
                'b' => '\x08',
                'f' => '\x0c',
                'v' => '\x0b',
                '\\' => '\\',
                '"' => '"',
                '\'' => '\'',
                '0'..='9' => {
                    let mut code = 0u32;
                    let mut digits = 0;
                    while digits < 3 {
                        match bytes.get(i) {
                            Some(&d @ b'0'..=b'9') => {
                                code = code * 10 + u32::from(d - b'0');
                                i += 1;
                                digits += 1;
                            }
                            _ => break,
                        }
                    }
                    i -= 1;
                    char::from_u32(code).ok_or(LexErrorKind::InvalidEscape(esc))?
                }
                _ => return Err(LexErrorKind::InvalidEscape(esc)),
            };
            value.push(decoded);
            i += 1;
            continue;
        }

        let Some(c) = rest[i..].chars().next() else {
            return Err(LexErrorKind::UnterminatedString);
        };
        value.push(c);
        i += c.len_utf8();
    }
}

/// Skip a comment starting after `--`. Long bracket comments (`--[=*[`) run
/// until a closer with a matching equals count; anything else runs to the end
/// of the line. An unterminated long comment is a fatal error.
fn lex_comment(lex: &mut logos::Lexer<RawToken>) -> FilterResult<(), LexErrorKind> {
    let rest = lex.remainder();
    let bytes = rest.as_bytes();

    if bytes.first() == Some(&b'[') {
        let mut i = 1;
        let mut eq_count = 0;
        while bytes.get(i) == Some(&b'=') {
            eq_count += 1;
            i += 1;
        }
        if bytes.get(i) == Some(&b'[') {
            i += 1;
            loop {
                match bytes.get(i) {
                    None => return FilterResult::Error(LexErrorKind::UnterminatedLongComment),
                    Some(&b']') => {
                        let mut j = i + 1;
                        let mut close_eq = 0;
                        while bytes.get(j) == Some(&b'=') {
                            close_eq += 1;
                            j += 1;
                        }
                        if close_eq == eq_count && bytes.get(j) == Some(&b']') {
                            lex.bump(j + 1);
                            return FilterResult::Skip;
                        }
                        i += 1;
                    }
                    Some(_) => i += 1,
                }
            }
        }
    }

    let line_end = rest.find('\n').unwrap_or(rest.len());
    lex.bump(line_end);
    FilterResult::Skip
}

/// Streaming tokenizer with a single token of lookahead.
///
/// `next_token` drains the peek cache if one is buffered; `peek_token` fills
/// it without advancing. The terminal token repeats indefinitely once the
/// input is exhausted.
pub struct Tokenizer<'src> {
    lexer: logos::Lexer<'src, RawToken>,
    line_index: LineIndex,
    peeked: Option<Token>,
}

impl<'src> Tokenizer<'src> {
    /// Create a tokenizer over the given source text
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: RawToken::lexer(source),
            line_index: LineIndex::new(source),
            peeked: None,
        }
    }

    /// Consume and return the next token
    pub fn next_token(&mut self) -> Result<Token, TokenizeError> {
        if let Some(token) = self.peeked.take() {
            return Ok(token);
        }
        self.lex_token()
    }

    /// Return the next token without consuming it. Idempotent until the next
    /// call to `next_token`.
    pub fn peek_token(&mut self) -> Result<Token, TokenizeError> {
        if let Some(token) = &self.peeked {
            return Ok(token.clone());
        }
        let token = self.lex_token()?;
        self.peeked = Some(token.clone());
        Ok(token)
    }

    /// Region of the most recently lexed token
    #[must_use]
    pub fn position(&self) -> Region {
        self.line_index.region(self.lexer.span())
    }

    fn lex_token(&mut self) -> Result<Token, TokenizeError> {
        loop {
            let Some(raw) = self.lexer.next() else {
                let end = self.lexer.source().len();
                return Ok(Token::end_of_file(self.line_index.region(end..end)));
            };
            let region = self.line_index.region(self.lexer.span());
            let raw = raw.map_err(|kind| TokenizeError { kind, region })?;

            let token = match raw {
                RawToken::Name => {
                    let text = self.lexer.slice();
                    let kind = if is_reserved(text) {
                        TokenKind::Punctuation
                    } else {
                        TokenKind::Identifier
                    };
                    Token::new(kind, text, region)
                }
                RawToken::Number => Token::new(TokenKind::Number, self.lexer.slice(), region),
                RawToken::Quoted(value) => Token::new(TokenKind::QuotedString, value, region),
                RawToken::Symbol => Token::new(TokenKind::Punctuation, self.lexer.slice(), region),
                RawToken::Comment => continue,
            };
            return Ok(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(source: &str) -> Vec<Token> {
        let mut tokenizer = Tokenizer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = tokenizer.next_token().unwrap();
            let done = token.is_eof();
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    fn lex_texts(source: &str) -> Vec<(TokenKind, String)> {
        lex_all(source)
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn keywords_are_punctuation() {
        assert_eq!(
            lex_texts("local abc"),
            vec![
                (TokenKind::Punctuation, "local".into()),
                (TokenKind::Identifier, "abc".into()),
                (TokenKind::EndOfFile, String::new()),
            ]
        );
    }

    #[test]
    fn greedy_punctuation() {
        assert_eq!(
            lex_texts("== <= >= ... .. ~= ."),
            vec![
                (TokenKind::Punctuation, "==".into()),
                (TokenKind::Punctuation, "<=".into()),
                (TokenKind::Punctuation, ">=".into()),
                (TokenKind::Punctuation, "...".into()),
                (TokenKind::Punctuation, "..".into()),
                (TokenKind::Punctuation, "~=".into()),
                (TokenKind::Punctuation, ".".into()),
                (TokenKind::EndOfFile, String::new()),
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            lex_texts("1 1.5 0xFF"),
            vec![
                (TokenKind::Number, "1".into()),
                (TokenKind::Number, "1.5".into()),
                (TokenKind::Number, "0xFF".into()),
                (TokenKind::EndOfFile, String::new()),
            ]
        );
    }

    #[test]
    fn double_dot_is_one_malformed_number() {
        // Matching the reference scanner: a digit start consumes up to two
        // fractional dots, so `1..2` is a single (bad) number token.
        let tokens = lex_texts("1..2");
        assert_eq!(tokens[0], (TokenKind::Number, "1..2".into()));
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            lex_texts(r#""a\n\t\065\"b" 'c'"#),
            vec![
                (TokenKind::QuotedString, "a\n\tA\"b".into()),
                (TokenKind::QuotedString, "c".into()),
                (TokenKind::EndOfFile, String::new()),
            ]
        );
    }

    #[test]
    fn decimal_escape_is_greedy() {
        // Up to three digits are taken
        assert_eq!(
            lex_texts(r#""\0651""#),
            vec![
                (TokenKind::QuotedString, "A1".into()),
                (TokenKind::EndOfFile, String::new()),
            ]
        );
    }

    #[test]
    fn unterminated_string() {
        let mut tokenizer = Tokenizer::new("\"abc");
        let err = tokenizer.next_token().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!(err.region.start, Location::new(1, 1));
    }

    #[test]
    fn unknown_escape() {
        let mut tokenizer = Tokenizer::new(r#""\z""#);
        let err = tokenizer.next_token().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::InvalidEscape('z'));
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            lex_texts("a -- comment\nb --[[ multi\nline ]] c --[==[ x ]=] ]==] d"),
            vec![
                (TokenKind::Identifier, "a".into()),
                (TokenKind::Identifier, "b".into()),
                (TokenKind::Identifier, "c".into()),
                (TokenKind::Identifier, "d".into()),
                (TokenKind::EndOfFile, String::new()),
            ]
        );
    }

    #[test]
    fn unterminated_long_comment() {
        let mut tokenizer = Tokenizer::new("--[[ never closed");
        let err = tokenizer.next_token().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedLongComment);
    }

    #[test]
    fn line_comment_at_eof() {
        let mut tokenizer = Tokenizer::new("a -- trailing");
        assert!(tokenizer.next_token().unwrap().is_identifier("a"));
        assert!(tokenizer.next_token().unwrap().is_eof());
    }

    #[test]
    fn peek_is_idempotent() {
        let mut tokenizer = Tokenizer::new("a b");
        assert!(tokenizer.peek_token().unwrap().is_identifier("a"));
        assert!(tokenizer.peek_token().unwrap().is_identifier("a"));
        assert!(tokenizer.next_token().unwrap().is_identifier("a"));
        assert!(tokenizer.next_token().unwrap().is_identifier("b"));
        assert!(tokenizer.peek_token().unwrap().is_eof());
        assert!(tokenizer.next_token().unwrap().is_eof());
    }

    #[test]
    fn token_regions() {
        let mut tokenizer = Tokenizer::new("ab\n cd");
        let a = tokenizer.next_token().unwrap();
        assert_eq!(a.region.start, Location::new(1, 1));
        assert_eq!(a.region.end_offset, 2);
        let c = tokenizer.next_token().unwrap();
        assert_eq!(c.region.start, Location::new(2, 2));
        assert_eq!(c.region.start_offset, 4);
    }
}
