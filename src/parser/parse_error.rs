use std::fmt::Display;

/// A failure to turn query text into a tree, with the offending slice of
/// the input. Positions are character offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl ParseError {
    pub fn new(message: &str, text: &str, start: usize, end: usize) -> Self {
        Self {
            message: message.to_string(),
            text: text.to_string(),
            start,
            end,
        }
    }

    pub fn err<T>(self) -> Result<T, ParseError> {
        Err(self)
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ParseError: {}\n  at [{}:{}] -> '{}'",
            self.message, self.start, self.end, self.text
        )
    }
}

impl std::error::Error for ParseError {}
