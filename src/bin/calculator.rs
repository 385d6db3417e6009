//! Week 10: a logged four-function calculator.
//!
//! Reads two integers and an operator per round, logs every input problem
//! instead of crashing on it, and quits when the user types `q`.

use std::error::Error;
use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::{info, warn};

use deskwork::logging;

const PROMPT_LEFT: &str = "left operand (or q to quit) > ";
const PROMPT_RIGHT: &str = "right operand > ";
const PROMPT_OPERATOR: &str = "operator (+ - * /) > ";

#[derive(Debug, Error, PartialEq, Eq)]
enum CalcError {
    #[error("not a whole number: {0:?}")]
    NotANumber(String),

    #[error("unknown operator: {0:?}")]
    UnknownOperator(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("overflow computing {0} {1} {2}")]
    Overflow(i64, char, i64),
}

/// One round's input, or a quit request.
#[derive(Debug, PartialEq, Eq)]
enum Round {
    Compute { left: i64, operator: char, right: i64 },
    Quit,
}

fn parse_operand(raw: &str) -> Result<i64, CalcError> {
    let trimmed = raw.trim();
    trimmed
        .parse()
        .map_err(|_| CalcError::NotANumber(trimmed.to_string()))
}

fn parse_operator(raw: &str) -> Result<char, CalcError> {
    match raw.trim() {
        "+" => Ok('+'),
        "-" => Ok('-'),
        "*" => Ok('*'),
        "/" => Ok('/'),
        other => Err(CalcError::UnknownOperator(other.to_string())),
    }
}

/// Apply the operator. Overflow and zero division are errors, not panics.
fn compute(left: i64, operator: char, right: i64) -> Result<i64, CalcError> {
    let result = match operator {
        '+' => left.checked_add(right),
        '-' => left.checked_sub(right),
        '*' => left.checked_mul(right),
        '/' => {
            if right == 0 {
                return Err(CalcError::DivisionByZero);
            }
            left.checked_div(right)
        }
        other => return Err(CalcError::UnknownOperator(other.to_string())),
    };
    result.ok_or(CalcError::Overflow(left, operator, right))
}

fn read_line<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    prompt: &str,
) -> io::Result<Option<String>> {
    write!(writer, "{prompt}")?;
    writer.flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None); // EOF quits like `q` does
    }
    Ok(Some(line.trim().to_string()))
}

/// Read one round. Bad input is reported and the question repeated.
fn read_round<R: BufRead, W: Write>(reader: &mut R, writer: &mut W) -> io::Result<Round> {
    let left = loop {
        let Some(raw) = read_line(reader, writer, PROMPT_LEFT)? else {
            return Ok(Round::Quit);
        };
        if raw == "q" {
            return Ok(Round::Quit);
        }
        match parse_operand(&raw) {
            Ok(value) => break value,
            Err(e) => {
                warn!("left operand rejected: {e}");
                writeln!(writer, "{e}")?;
            }
        }
    };

    let operator = loop {
        let Some(raw) = read_line(reader, writer, PROMPT_OPERATOR)? else {
            return Ok(Round::Quit);
        };
        match parse_operator(&raw) {
            Ok(op) => break op,
            Err(e) => {
                warn!("operator rejected: {e}");
                writeln!(writer, "{e}")?;
            }
        }
    };

    let right = loop {
        let Some(raw) = read_line(reader, writer, PROMPT_RIGHT)? else {
            return Ok(Round::Quit);
        };
        match parse_operand(&raw) {
            Ok(value) => break value,
            Err(e) => {
                warn!("right operand rejected: {e}");
                writeln!(writer, "{e}")?;
            }
        }
    };

    Ok(Round::Compute { left, operator, right })
}

/// The REPL. Returns the number of successful calculations.
fn run_calculator<R: BufRead, W: Write>(reader: &mut R, writer: &mut W) -> io::Result<usize> {
    let mut answered = 0;
    loop {
        match read_round(reader, writer)? {
            Round::Quit => {
                info!("calculator session ended after {answered} calculations");
                writeln!(writer, "Bye.")?;
                return Ok(answered);
            }
            Round::Compute { left, operator, right } => match compute(left, operator, right) {
                Ok(result) => {
                    info!("{left} {operator} {right} = {result}");
                    writeln!(writer, "{left} {operator} {right} = {result}")?;
                    answered += 1;
                }
                Err(e) => {
                    warn!("calculation rejected: {e}");
                    writeln!(writer, "{e}")?;
                }
            },
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::setup();

    println!("Four-function calculator. Type q to quit.");
    let stdin = io::stdin();
    let answered = run_calculator(&mut stdin.lock(), &mut io::stdout())?;
    println!("Calculations done: {answered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_session(input: &str) -> (usize, String) {
        let mut reader = input.as_bytes();
        let mut output = Vec::new();
        let answered = run_calculator(&mut reader, &mut output).unwrap();
        (answered, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_compute_basic_operations() {
        assert_eq!(compute(6, '+', 2).unwrap(), 8);
        assert_eq!(compute(6, '-', 2).unwrap(), 4);
        assert_eq!(compute(6, '*', 2).unwrap(), 12);
        assert_eq!(compute(6, '/', 2).unwrap(), 3);
    }

    #[test]
    fn test_division_by_zero_is_error() {
        assert_eq!(compute(1, '/', 0).unwrap_err(), CalcError::DivisionByZero);
    }

    #[test]
    fn test_overflow_is_error() {
        assert!(matches!(
            compute(i64::MAX, '+', 1).unwrap_err(),
            CalcError::Overflow(_, '+', _)
        ));
    }

    #[test]
    fn test_session_computes_and_quits() {
        let (answered, output) = run_session("6\n*\n7\nq\n");
        assert_eq!(answered, 1);
        assert!(output.contains("6 * 7 = 42"));
        assert!(output.contains("Bye."));
    }

    #[test]
    fn test_bad_operand_is_reprompted() {
        let (answered, output) = run_session("abc\n5\n+\n2\nq\n");
        assert_eq!(answered, 1);
        assert!(output.contains("not a whole number"));
        assert!(output.contains("5 + 2 = 7"));
    }

    #[test]
    fn test_bad_operator_is_reprompted() {
        let (answered, output) = run_session("5\n%\n+\n2\nq\n");
        assert_eq!(answered, 1);
        assert!(output.contains("unknown operator"));
        assert!(output.contains("5 + 2 = 7"));
    }

    #[test]
    fn test_division_by_zero_keeps_session_alive() {
        let (answered, output) = run_session("8\n/\n0\n8\n/\n2\nq\n");
        assert_eq!(answered, 1);
        assert!(output.contains("division by zero"));
        assert!(output.contains("8 / 2 = 4"));
    }

    #[test]
    fn test_eof_quits_cleanly() {
        let (answered, _) = run_session("");
        assert_eq!(answered, 0);
    }
}
