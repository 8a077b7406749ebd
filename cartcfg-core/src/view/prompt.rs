//! src/view/prompt.rs
//! ============================================================================
//! # Numbered Line Prompt
//!
//! Line-oriented fallback for terminals without cursor addressing: the list
//! is printed with numbers and the operator types one. Optional single-key
//! answers cancel or save instead of picking a number.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::error::AppError;

/// What the operator answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Number(usize),
    Save,
    Cancel,
}

/// Accepted answers for one prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceSpec {
    pub first: usize,
    pub last: usize,

    /// Answer that cancels. Without one, an empty answer cancels.
    pub cancel: Option<char>,

    pub save: Option<char>,
}

impl ChoiceSpec {
    #[must_use]
    pub const fn range(first: usize, last: usize) -> Self {
        Self {
            first,
            last,
            cancel: None,
            save: None,
        }
    }

    #[must_use]
    pub const fn with_cancel(mut self, key: char) -> Self {
        self.cancel = Some(key);
        self
    }

    #[must_use]
    pub const fn with_save(mut self, key: char) -> Self {
        self.save = Some(key);
        self
    }
}

/// Interpret one input line. `None` means the answer was not acceptable.
#[must_use]
pub fn parse_choice(line: &str, spec: &ChoiceSpec) -> Option<Choice> {
    let answer = line.trim_start_matches([' ', '\n', '\r']);
    let first = answer.chars().next();

    let matches_key = |key: Option<char>| match (key, first) {
        (Some(key), Some(c)) => key.eq_ignore_ascii_case(&c),
        _ => false,
    };

    if matches_key(spec.save) {
        return Some(Choice::Save);
    }

    if spec.cancel.is_some() {
        if matches_key(spec.cancel) {
            return Some(Choice::Cancel);
        }
    } else if answer.trim().is_empty() {
        return Some(Choice::Cancel);
    }

    answer
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| (spec.first..=spec.last).contains(n))
        .map(Choice::Number)
}

/// Ask until an acceptable answer arrives. End of input cancels.
pub fn prompt_number<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    prompt: &str,
    spec: &ChoiceSpec,
) -> Result<Choice, AppError> {
    let mut line = String::new();

    loop {
        write!(writer, "{prompt}")?;
        writer.flush()?;

        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(Choice::Cancel);
        }

        if let Some(choice) = parse_choice(&line, spec) {
            debug!(
                marker = "PROMPT_CHOICE",
                operation_type = "input_handling",
                "{choice:?}"
            );
            return Ok(choice);
        }

        writeln!(
            writer,
            "Invalid input! Please enter a number between {} and {}.",
            spec.first, spec.last
        )?;
    }
}

/// Print the list numbered from 1, one name per line.
pub fn print_numbered<'a, W: Write>(
    writer: &mut W,
    names: impl IntoIterator<Item = &'a [u8]>,
) -> Result<(), AppError> {
    for (position, name) in (1..).zip(names) {
        writeln!(writer, "{position:>3}. {}", String::from_utf8_lossy(name))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_numbers_in_range() {
        let spec = ChoiceSpec::range(1, 5);
        assert_eq!(parse_choice("3\n", &spec), Some(Choice::Number(3)));
        assert_eq!(parse_choice("  5", &spec), Some(Choice::Number(5)));
        assert_eq!(parse_choice("6\n", &spec), None);
        assert_eq!(parse_choice("0\n", &spec), None);
        assert_eq!(parse_choice("x\n", &spec), None);
    }

    #[test]
    fn test_empty_answer_cancels_without_cancel_key() {
        let spec = ChoiceSpec::range(1, 5);
        assert_eq!(parse_choice("\n", &spec), Some(Choice::Cancel));
        assert_eq!(parse_choice("   ", &spec), Some(Choice::Cancel));
    }

    #[test]
    fn test_cancel_and_save_keys() {
        let spec = ChoiceSpec::range(1, 9).with_cancel('e').with_save('S');
        assert_eq!(parse_choice("E\n", &spec), Some(Choice::Cancel));
        assert_eq!(parse_choice("s\n", &spec), Some(Choice::Save));
        // With a cancel key configured, an empty answer is just invalid.
        assert_eq!(parse_choice("\n", &spec), None);
    }

    #[test]
    fn test_prompt_retries_until_valid() {
        let mut input = Cursor::new("12\nabc\n2\n");
        let mut output = Vec::new();
        let choice =
            prompt_number(&mut input, &mut output, "Pick: ", &ChoiceSpec::range(1, 3)).unwrap();

        assert_eq!(choice, Choice::Number(2));
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.matches("Pick: ").count(), 3);
        assert_eq!(
            text.matches("Invalid input! Please enter a number between 1 and 3.")
                .count(),
            2
        );
    }

    #[test]
    fn test_prompt_eof_cancels() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        let choice =
            prompt_number(&mut input, &mut output, "Pick: ", &ChoiceSpec::range(1, 3)).unwrap();
        assert_eq!(choice, Choice::Cancel);
    }

    #[test]
    fn test_print_numbered() {
        let mut output = Vec::new();
        print_numbered(&mut output, [&b"A"[..], b"B\x84"]).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "  1. A\n  2. B\u{FFFD}\n"
        );
    }
}
