use crate::core::Severity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    /// Report line, e.g. `Warning: Pod: web-1  Ready: False`.
    pub fn line(&self) -> String {
        format!("{}: {}", self.severity.label(), self.message)
    }
}
