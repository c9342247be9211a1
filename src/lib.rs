use miette::Diagnostic;
use thiserror::Error;

pub mod eval;
pub mod lex;
pub mod validate;

pub use eval::{Evaluator, format_number};
pub use lex::{Lexer, Token, TokenKind};
pub use validate::validate;

#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] lex::InvalidOperatorError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Grammar(#[from] validate::GrammarError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Math(#[from] eval::MathError),
}

impl Error {
    pub fn offset(&self) -> usize {
        match self {
            Error::Lex(error) => error.offset(),
            Error::Grammar(error) => error.offset(),
            Error::Math(error) => error.offset(),
        }
    }
}

pub fn calculate(input: &str) -> Result<f64, Error> {
    let tokens = lex::tokenize(input)?;
    validate::validate(input, &tokens)?;
    let result = Evaluator::new(input, &tokens).evaluate()?;
    Ok(result)
}
