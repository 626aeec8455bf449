/// Input validation for user-supplied queries

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Input too long: max {max} characters, got {actual}")]
    InputTooLong { max: usize, actual: usize },

    #[error("Invalid characters detected")]
    InvalidCharacters,

    #[error("Empty input not allowed")]
    EmptyInput,
}

/// Validate a free-text query before it leaves the process.
///
/// Whitespace-only input counts as empty. Length is measured in characters,
/// not bytes, so multi-byte scripts get the same budget as ASCII.
pub fn validate_input(input: &str, max_length: usize) -> Result<(), ValidationError> {
    if input.trim().is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    let actual = input.chars().count();
    if actual > max_length {
        return Err(ValidationError::InputTooLong {
            max: max_length,
            actual,
        });
    }

    // Control characters other than newline, tab and carriage return
    if input
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\t' && c != '\r')
    {
        return Err(ValidationError::InvalidCharacters);
    }

    Ok(())
}
