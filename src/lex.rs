use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
#[error("Encountered invalid operator")]
pub struct InvalidOperatorError {
    #[source_code]
    src: NamedSource<String>,

    #[label("this character")]
    bad_bit: SourceSpan,

    pub token: char,
}

impl InvalidOperatorError {
    pub fn offset(&self) -> usize {
        self.bad_bit.offset()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Percent,
    LeftParen,
    RightParen,
}

impl TokenKind {
    pub fn is_number(self) -> bool {
        matches!(self, TokenKind::Number(_))
    }

    pub fn is_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Caret
                | TokenKind::Percent
        )
    }
}

pub struct Lexer<'de> {
    whole: &'de str,
    rest: &'de str,
    byte: usize,
}

impl<'de> Lexer<'de> {
    pub fn new(input: &'de str) -> Self {
        Lexer {
            whole: input,
            rest: input,
            byte: 0,
        }
    }

    fn number(&mut self, cur: &'de str, offset: usize) -> Token {
        let literal = &cur[..number_len(cur)];

        // the first byte is already consumed by the caller
        let extra_bytes = literal.len() - 1;
        self.byte += extra_bytes;
        self.rest = &self.rest[extra_bytes..];

        let Ok(value) = literal.parse() else {
            unreachable!("scanned an unparsable numeric literal {literal:?}")
        };
        Token {
            kind: TokenKind::Number(value),
            offset,
        }
    }
}

// strtod-style scan: optional sign, digits, optional fraction, optional
// exponent. The exponent only counts when at least one digit follows it,
// so `5e` stays a one-byte literal and the cursor resumes at the `e`.
fn number_len(cur: &str) -> usize {
    let bytes = cur.as_bytes();
    let mut len = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        len += 1;
    }
    while bytes.get(len).is_some_and(u8::is_ascii_digit) {
        len += 1;
    }
    if bytes.get(len) == Some(&b'.') {
        len += 1;
        while bytes.get(len).is_some_and(u8::is_ascii_digit) {
            len += 1;
        }
    }
    if matches!(bytes.get(len), Some(b'e' | b'E')) {
        let mut exponent = len + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        if bytes.get(exponent).is_some_and(u8::is_ascii_digit) {
            len = exponent + 1;
            while bytes.get(len).is_some_and(u8::is_ascii_digit) {
                len += 1;
            }
        }
    }
    len
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, InvalidOperatorError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut chars = self.rest.chars();
            let c = chars.next()?;
            let cur = self.rest;
            let offset = self.byte;
            self.rest = chars.as_str();
            self.byte += c.len_utf8();

            let kind = match c {
                ' ' | '\t' | '\n' => continue, // Skip whitespace
                '0'..='9' => return Some(Ok(self.number(cur, offset))),
                '+' | '-' if self.rest.as_bytes().first().is_some_and(u8::is_ascii_digit) => {
                    // a sign directly against a digit folds into the literal
                    return Some(Ok(self.number(cur, offset)));
                }
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '*' => TokenKind::Star,
                '/' => TokenKind::Slash,
                '^' => TokenKind::Caret,
                '%' => TokenKind::Percent,
                '(' => TokenKind::LeftParen,
                ')' => TokenKind::RightParen,
                token => {
                    return Some(Err(InvalidOperatorError {
                        src: NamedSource::new("<expression>", self.whole.to_string()),
                        bad_bit: SourceSpan::from(offset..offset + token.len_utf8()),
                        token,
                    }));
                }
            };
            return Some(Ok(Token { kind, offset }));
        }
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, InvalidOperatorError> {
    Lexer::new(input).collect()
}
