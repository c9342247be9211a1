use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::lex::{Token, TokenKind};

#[derive(Error, Debug, Diagnostic)]
#[error("{kind}")]
pub struct MathError {
    #[source_code]
    src: NamedSource<String>,

    #[label("this operator")]
    bad_op: SourceSpan,

    pub kind: MathErrorKind,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathErrorKind {
    #[error("Division by zero error")]
    DivisionByZero,
    #[error("Modulo by zero error")]
    ModuloByZero,
}

impl MathError {
    fn new(input: &str, offset: usize, kind: MathErrorKind) -> Self {
        MathError {
            src: NamedSource::new("<expression>", input.to_string()),
            bad_op: SourceSpan::from(offset..offset + 1),
            kind,
        }
    }

    pub fn offset(&self) -> usize {
        self.bad_op.offset()
    }
}

pub struct Evaluator<'de> {
    whole: &'de str,
    tokens: &'de [Token],
    cursor: usize,
}

impl<'de> Evaluator<'de> {
    pub fn new(input: &'de str, tokens: &'de [Token]) -> Self {
        Evaluator {
            whole: input,
            tokens,
            cursor: 0,
        }
    }

    pub fn evaluate(mut self) -> Result<f64, MathError> {
        self.eval_group()
    }

    // One level of strictly left-to-right chaining: no precedence, every
    // operator folds into the left accumulator as soon as its right operand
    // is known. Returns at the end of the tokens or at the `)` closing the
    // current group, leaving the cursor on the `)` for the caller.
    fn eval_group(&mut self) -> Result<f64, MathError> {
        let mut left = 0.0;
        if let Some(value) = self.operand()? {
            left = value;
        }

        while let Some(&Token { kind, offset }) = self.tokens.get(self.cursor) {
            if kind == TokenKind::RightParen {
                break;
            }
            self.cursor += 1;

            let right = self.operand()?.unwrap_or(0.0);

            left = match kind {
                TokenKind::Plus => left + right,
                TokenKind::Minus => left - right,
                TokenKind::Star => left * right,
                TokenKind::Slash => {
                    if right == 0.0 {
                        return Err(MathError::new(
                            self.whole,
                            offset,
                            MathErrorKind::DivisionByZero,
                        ));
                    }
                    left / right
                }
                TokenKind::Caret => left.powf(right),
                TokenKind::Percent => {
                    if right == 0.0 {
                        return Err(MathError::new(
                            self.whole,
                            offset,
                            MathErrorKind::ModuloByZero,
                        ));
                    }
                    left % right
                }
                _ => left,
            };
        }

        Ok(left)
    }

    // Consumes a number or a parenthesized group. `None` means the cursor
    // sits on an operator; the caller folds it against a zero accumulator,
    // which is what makes `( - 5)` come out as `-5`.
    fn operand(&mut self) -> Result<Option<f64>, MathError> {
        match self.tokens.get(self.cursor).map(|token| token.kind) {
            Some(TokenKind::LeftParen) => {
                self.cursor += 1;
                let value = self.eval_group()?;
                self.cursor += 1; // the matching `)`
                Ok(Some(value))
            }
            Some(TokenKind::Number(value)) => {
                self.cursor += 1;
                Ok(Some(value))
            }
            _ => Ok(None),
        }
    }
}

const PRECISION: usize = 15;

// %.15g equivalent: 15 significant digits, fixed notation while the decimal
// exponent fits, scientific otherwise, trailing fractional zeros trimmed.
// Exact zero always prints as plain `0`, negative zero included.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    let sci = format!("{value:.prec$e}", prec = PRECISION - 1);
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return sci; // inf and nan carry no exponent
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return sci;
    };

    if (-4..PRECISION as i32).contains(&exponent) {
        let decimals = (PRECISION as i32 - 1 - exponent) as usize;
        let fixed = format!("{value:.decimals$}");
        if fixed.contains('.') {
            fixed.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            fixed
        }
    } else {
        let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
        format!("{mantissa}e{exponent:+03}")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lex::tokenize;

    fn eval(input: &str) -> Result<f64, MathError> {
        let tokens = tokenize(input).unwrap();
        Evaluator::new(input, &tokens).evaluate()
    }

    fn eval_ok(input: &str) -> f64 {
        eval(input).unwrap()
    }

    #[test]
    fn chains_strictly_left_to_right() {
        assert_eq!(eval_ok("2 + 3 * 4"), 20.0);
        assert_eq!(eval_ok("2 ^ 3 ^ 2"), 64.0);
        assert_eq!(eval_ok("10 - 2 - 3"), 5.0);
    }

    #[test]
    fn parentheses_group_before_combining() {
        assert_eq!(eval_ok("2 + (3 * 4)"), 14.0);
        assert_eq!(eval_ok("2 * (3 + (4 - 1))"), 12.0);
        assert_eq!(eval_ok("((2))"), 2.0);
    }

    #[test]
    fn operator_semantics() {
        assert_eq!(eval_ok("5 - 3"), 2.0);
        assert_eq!(eval_ok("10 / 4"), 2.5);
        assert_eq!(eval_ok("10 % 3"), 1.0);
        assert_eq!(eval_ok("-7 % 3"), -1.0);
        assert_eq!(eval_ok("2 ^ -1"), 0.5);
        assert_eq!(eval_ok("2 ^ 0.5"), 2f64.powf(0.5));
    }

    #[test]
    fn signed_literal_inside_parens() {
        assert_eq!(eval_ok("(-5)"), -5.0);
    }

    #[test]
    fn group_starting_at_an_operator_folds_against_zero() {
        // no lexical sign to fold here; the group has no left operand
        assert_eq!(eval_ok("( - 5)"), -5.0);
    }

    #[test]
    fn division_by_zero() {
        let error = eval("5 / 0").unwrap_err();

        assert_eq!(error.kind, MathErrorKind::DivisionByZero);
        assert_eq!(error.offset(), 2);
    }

    #[test]
    fn modulo_by_zero_in_a_nested_group() {
        let error = eval("1 + (3 % (2 - 2))").unwrap_err();

        assert_eq!(error.kind, MathErrorKind::ModuloByZero);
        assert_eq!(error.offset(), 7);
    }

    #[test]
    fn negative_divisors_are_not_zero() {
        assert_eq!(eval_ok("5 / -2"), -2.5);
    }

    #[test]
    fn zero_is_canonicalized() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn fifteen_significant_digits() {
        assert_eq!(format_number(10.0 / 3.0), "3.33333333333333");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
    }

    #[test]
    fn trailing_zeros_are_trimmed() {
        assert_eq!(format_number(20.0), "20");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-0.5), "-0.5");
    }

    #[test]
    fn notation_switches_with_the_exponent() {
        assert_eq!(format_number(1e14), "100000000000000");
        assert_eq!(format_number(1e15), "1e+15");
        assert_eq!(format_number(0.0001), "0.0001");
        assert_eq!(format_number(1e-5), "1e-05");
    }

    #[test]
    fn printed_result_round_trips_to_the_printed_precision() {
        let value = 10.0 / 3.0;
        let reparsed: f64 = format_number(value).parse().unwrap();

        assert!((reparsed - value).abs() < 1e-14);
    }
}
