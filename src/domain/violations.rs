use serde::Serialize;
use std::fmt;

/// Human-readable reasons why an allocation request was rejected.
///
/// Messages keep the order in which they were first reported. Adding a message that is already
/// present is a no-op, so merging the violations of independent strategies gives the same set
/// regardless of the order the strategies were validated in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Violations {
    messages: Vec<String>,
}

impl Violations {
    pub fn new() -> Self {
        Self { messages: Vec::new() }
    }

    pub fn of(message: impl Into<String>) -> Self {
        let mut violations = Self::new();
        violations.add_violation(message);
        violations
    }

    pub fn add_violation(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !self.messages.contains(&message) {
            self.messages.push(message);
        }
    }

    /// Adds every message of `other` that is not yet present.
    pub fn add_all(&mut self, other: Violations) {
        for message in other.messages {
            self.add_violation(message);
        }
    }

    pub fn has_violations(&self) -> bool {
        !self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn contains(&self, message: &str) -> bool {
        self.messages.iter().any(|m| m == message)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.messages.iter()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.messages.join("; "))
    }
}

impl FromIterator<String> for Violations {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut violations = Violations::new();
        for message in iter {
            violations.add_violation(message);
        }
        violations
    }
}
