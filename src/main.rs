use std::process::ExitCode;

use calc::format_number;
use clap::Parser;
use miette::Diagnostic;

/// Strictly left-to-right command-line calculator.
///
/// Evaluates one expression with `+ - * / ^ %` and parentheses; there is no
/// operator precedence, parentheses are the only way to group.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Expression to evaluate, wrapped in quotes, e.g. "(5 + -4.25) / 2"
    #[arg(allow_hyphen_values = true)]
    expression: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let expression = match args.expression.as_slice() {
        [] => {
            print_manual();
            return ExitCode::SUCCESS;
        }
        [expression] => expression.as_str(),
        rest => {
            eprintln!(
                "Expected no argument for the manual or a single argument for a calculation, got {}",
                rest.len()
            );
            eprintln!("Tip: Wrap your calculation in double quotes");
            return ExitCode::FAILURE;
        }
    };

    if expression.is_empty() {
        eprintln!("Received an empty argument");
        print_manual();
        return ExitCode::FAILURE;
    }

    match calc::calculate(expression) {
        Ok(result) => {
            println!("{}", format_number(result));
            ExitCode::SUCCESS
        }
        Err(error) => {
            report(expression, &error);
            ExitCode::FAILURE
        }
    }
}

// Message line, optional advisory, then the input with a caret under the
// offending byte.
fn report(expression: &str, error: &calc::Error) {
    eprintln!("{error}");
    if let Some(advice) = error.help() {
        eprintln!("NOTE: {advice}");
    }
    eprintln!("{expression}");
    eprintln!("{caret:>width$}", caret = '^', width = error.offset() + 1);
}

fn print_manual() {
    eprintln!("Usage:\n\tcalc \"[expression]\"");
    eprintln!("Example:\n\tcalc \"(5 + -4.25) / (-2 - ((3.4 ^ 3) * 0.1)) % 2\"");
    eprintln!("Operators:");
    eprintln!("\t- Addition:       +");
    eprintln!("\t- Subtraction:    -");
    eprintln!("\t- Multiplication: *");
    eprintln!("\t- Division:       /");
    eprintln!("\t- Exponentiation: ^");
    eprintln!("\t- Modulus:        %");
}
