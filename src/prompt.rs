//! Validated console input helpers.
//!
//! Each helper re-prompts until it gets an acceptable answer, mirroring the
//! input loops the interactive exercises rely on. The workers are generic
//! over reader/writer so tests can drive them with byte buffers; the
//! `*_stdin` wrappers are what the binaries call.

use std::io::{self, BufRead, Write};

/// Prompt until a non-empty line arrives.
pub fn input_str<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    prompt: &str,
) -> io::Result<String> {
    loop {
        write!(writer, "{prompt}")?;
        writer.flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed",
            ));
        }
        let answer = line.trim();
        if !answer.is_empty() {
            return Ok(answer.to_string());
        }
        writeln!(writer, "Please enter a value.")?;
    }
}

/// Prompt until a line parses as an integer.
pub fn input_int<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    prompt: &str,
) -> io::Result<i64> {
    loop {
        let answer = input_str(reader, writer, prompt)?;
        match answer.parse() {
            Ok(value) => return Ok(value),
            Err(_) => writeln!(writer, "'{answer}' is not a number.")?,
        }
    }
}

/// Numbered menu: prints the choices, accepts a choice number or the exact
/// choice text, and re-prompts otherwise.
pub fn input_menu<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    prompt: &str,
    choices: &[&str],
) -> io::Result<String> {
    debug_assert!(!choices.is_empty(), "menu needs at least one choice");

    loop {
        writeln!(writer, "{prompt}")?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(writer, "{}. {}", i + 1, choice)?;
        }

        let answer = input_str(reader, writer, "> ")?;
        if let Ok(number) = answer.parse::<usize>() {
            if (1..=choices.len()).contains(&number) {
                return Ok(choices[number - 1].to_string());
            }
        }
        if let Some(choice) = choices.iter().find(|c| **c == answer) {
            return Ok(choice.to_string());
        }
        writeln!(writer, "'{answer}' is not one of the choices.")?;
    }
}

pub fn input_str_stdin(prompt: &str) -> io::Result<String> {
    input_str(&mut io::stdin().lock(), &mut io::stdout(), prompt)
}

pub fn input_int_stdin(prompt: &str) -> io::Result<i64> {
    input_int(&mut io::stdin().lock(), &mut io::stdout(), prompt)
}

pub fn input_menu_stdin(prompt: &str, choices: &[&str]) -> io::Result<String> {
    input_menu(&mut io::stdin().lock(), &mut io::stdout(), prompt, choices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_str(input: &str) -> (io::Result<String>, String) {
        let mut reader = input.as_bytes();
        let mut output = Vec::new();
        let result = input_str(&mut reader, &mut output, "name: ");
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_input_str_takes_first_answer() {
        let (result, _) = run_str("Taro\n");
        assert_eq!(result.unwrap(), "Taro");
    }

    #[test]
    fn test_input_str_skips_blank_lines() {
        let (result, output) = run_str("\n   \nTaro\n");
        assert_eq!(result.unwrap(), "Taro");
        assert_eq!(output.matches("Please enter a value.").count(), 2);
    }

    #[test]
    fn test_input_str_eof_is_error() {
        let (result, _) = run_str("");
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_input_int_reprompts_until_number() {
        let mut reader = "seven\n7\n".as_bytes();
        let mut output = Vec::new();
        let value = input_int(&mut reader, &mut output, "count: ").unwrap();

        assert_eq!(value, 7);
        assert!(String::from_utf8(output).unwrap().contains("'seven' is not a number."));
    }

    #[test]
    fn test_menu_accepts_number() {
        let mut reader = "2\n".as_bytes();
        let mut output = Vec::new();
        let pick = input_menu(&mut reader, &mut output, "mode:", &["Sequential", "Threaded"]).unwrap();

        assert_eq!(pick, "Threaded");
        assert!(String::from_utf8(output).unwrap().contains("1. Sequential"));
    }

    #[test]
    fn test_menu_accepts_exact_text() {
        let mut reader = "Sequential\n".as_bytes();
        let mut output = Vec::new();
        let pick = input_menu(&mut reader, &mut output, "mode:", &["Sequential", "Threaded"]).unwrap();
        assert_eq!(pick, "Sequential");
    }

    #[test]
    fn test_menu_rejects_out_of_range() {
        let mut reader = "9\n1\n".as_bytes();
        let mut output = Vec::new();
        let pick = input_menu(&mut reader, &mut output, "mode:", &["A", "B"]).unwrap();

        assert_eq!(pick, "A");
        assert!(String::from_utf8(output).unwrap().contains("'9' is not one of the choices."));
    }
}
