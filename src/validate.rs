use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::lex::{Token, TokenKind};

#[derive(Error, Debug, Diagnostic)]
#[error("{kind}")]
pub struct GrammarError {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    bad_token: SourceSpan,

    #[help]
    advice: Option<String>,

    pub kind: GrammarErrorKind,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarErrorKind {
    #[error("Encountered invalid parenthesis placement")]
    ParenPlacement,
    #[error("Encountered invalid number placement before opening parenthesis")]
    NumberBeforeParen,
    #[error("Encountered invalid number placement after closing parenthesis")]
    NumberAfterParen,
    #[error("Encountered unopened closing parenthesis")]
    UnopenedParen,
    #[error("Encountered unclosed opening parenthesis")]
    UnclosedParen,
    #[error("Encountered invalid operator placement")]
    OperatorPlacement,
    #[error("Encountered invalid number placement")]
    NumberPlacement,
}

impl GrammarErrorKind {
    fn advice(self) -> Option<&'static str> {
        match self {
            GrammarErrorKind::NumberPlacement => {
                Some("Remember to separate numbers and operators with whitespace")
            }
            _ => None,
        }
    }
}

impl GrammarError {
    fn new(input: &str, offset: usize, kind: GrammarErrorKind) -> Self {
        GrammarError {
            src: NamedSource::new("<expression>", input.to_string()),
            bad_token: SourceSpan::from(offset..offset + 1),
            advice: kind.advice().map(str::to_string),
            kind,
        }
    }

    pub fn offset(&self) -> usize {
        self.bad_token.offset()
    }
}

// Single forward pass over the token sequence. Everything the evaluator
// takes for granted about token adjacency is established here; the first
// violation aborts the pass.
pub fn validate(input: &str, tokens: &[Token]) -> Result<(), GrammarError> {
    let error = |offset, kind| Err(GrammarError::new(input, offset, kind));

    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        // a blank argument lexes to nothing; nothing to reject
        return Ok(());
    };
    if first.kind == TokenKind::RightParen {
        return error(first.offset, GrammarErrorKind::ParenPlacement);
    }
    if last.kind == TokenKind::LeftParen {
        return error(last.offset, GrammarErrorKind::ParenPlacement);
    }

    let mut open_parens = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        let prev = i.checked_sub(1).map(|i| &tokens[i]);
        let next = tokens.get(i + 1);

        match token.kind {
            TokenKind::LeftParen => {
                if let Some(prev) = prev.filter(|prev| prev.kind.is_number()) {
                    return error(prev.offset, GrammarErrorKind::NumberBeforeParen);
                }
                open_parens.push(token.offset);
            }
            TokenKind::RightParen => {
                if let Some(next) = next.filter(|next| next.kind.is_number()) {
                    return error(next.offset, GrammarErrorKind::NumberAfterParen);
                }
                if open_parens.pop().is_none() {
                    return error(token.offset, GrammarErrorKind::UnopenedParen);
                }
            }
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Caret
            | TokenKind::Percent => {
                let Some(prev) = prev else {
                    return error(token.offset, GrammarErrorKind::OperatorPlacement);
                };
                if prev.kind.is_operator() {
                    return error(prev.offset, GrammarErrorKind::OperatorPlacement);
                }
                let Some(next) = next else {
                    return error(token.offset, GrammarErrorKind::OperatorPlacement);
                };
                if !next.kind.is_number() && next.kind != TokenKind::LeftParen {
                    return error(next.offset, GrammarErrorKind::OperatorPlacement);
                }
            }
            TokenKind::Number(_) => {
                if prev.is_some_and(|prev| prev.kind.is_number())
                    || next.is_some_and(|next| next.kind.is_number())
                {
                    return error(token.offset, GrammarErrorKind::NumberPlacement);
                }
            }
        }
    }

    if let Some(&offset) = open_parens.last() {
        return error(offset, GrammarErrorKind::UnclosedParen);
    }

    Ok(())
}
