/*!
Error report for the binary: the message of a failed command followed by the
chain of snafu sources that led to it.
*/

use std::{error::Error as StdError, fmt::Display};

/// Messages of an error and its sources, outermost first.
///
/// A cause whose message repeats the one right above it is dropped, so
/// wrappers that forward their source's message are printed once.
pub struct Report {
    messages: Vec<String>,
}

impl Report {
    pub fn new(error: &(dyn StdError + 'static)) -> Self {
        let mut messages: Vec<String> = Vec::new();
        for e in std::iter::successors(Some(error), |&e| e.source()) {
            let message = e.to_string();
            if messages.last() != Some(&message) {
                messages.push(message);
            }
        }

        Report { messages }
    }

    /// Top-level message.
    pub fn message(&self) -> &str {
        self.messages.first().map_or("", String::as_str)
    }

    pub fn causes(&self) -> &[String] {
        self.messages.get(1..).unwrap_or(&[])
    }
}

// `main` returning `Err` prints this.
impl std::fmt::Debug for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.message())?;

        if !self.causes().is_empty() {
            writeln!(f, "\nCaused by:")?;
            for (i, cause) in self.causes().iter().enumerate() {
                writeln!(f, "  {}: {}", i, cause)?;
            }
        }

        Ok(())
    }
}

/// Single line, causes joined with `: `.
impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.messages.join(": "))
    }
}

impl<E: Into<Box<dyn StdError>>> From<E> for Report {
    fn from(e: E) -> Self {
        let boxed: Box<dyn StdError> = e.into();
        Report::new(boxed.as_ref())
    }
}
