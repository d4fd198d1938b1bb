use std::collections::VecDeque;

use crate::core::{Finding, Severity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub severity: Severity,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceSummary {
    pub name: String,
    pub pods: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub schema_version: String,
    pub tool_version: String,
    pub generated_at: String,
    pub status: Severity,
    pub exit_code: i32,
    pub headline: String,
    pub namespaces: Vec<NamespaceSummary>,
    pub lines: Vec<String>,
}

/// Folds findings into a running severity and a newest-first report.
#[derive(Debug, Clone)]
pub struct Aggregator {
    severity: Severity,
    lines: VecDeque<String>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            severity: Severity::Ok,
            lines: VecDeque::new(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn record(&mut self, finding: Finding) {
        self.escalate(finding.severity);
        self.lines.push_front(finding.line());
    }

    // Known quirk: this is not "max severity wins". Critical overrides any
    // state, including Unknown, while Warning and Unknown only ever replace
    // OK, so a Warning never displaces an Unknown and vice versa. Existing
    // alerting depends on these exit codes, keep the gates as they are.
    fn escalate(&mut self, incoming: Severity) {
        match incoming {
            Severity::Critical => self.severity = Severity::Critical,
            Severity::Warning | Severity::Unknown if self.severity == Severity::Ok => {
                self.severity = incoming;
            }
            _ => {}
        }
    }

    pub fn finalize(self) -> ScanResult {
        ScanResult {
            severity: self.severity,
            lines: self.lines.into_iter().collect(),
        }
    }
}
