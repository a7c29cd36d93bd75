use std::fmt::Display;

/// Prefixed stdout printer. Built once at startup and passed to whatever
/// reports progress to the user.
#[derive(Debug, Clone)]
pub struct Console {
    prefix: String,
}

impl Console {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn line(&self, message: impl Display) {
        println!("{} {message}", self.prefix);
    }

    pub fn blank(&self) {
        println!("{}", self.prefix);
    }

    pub fn error(&self, message: impl Display) {
        println!("{} error: {message}", self.prefix);
    }
}
