use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Severity {
    /// Monitoring-plugin exit code. Unknown sits above Critical numerically.
    pub const fn exit_code(self) -> i32 {
        match self {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Critical => 2,
            Severity::Unknown => 3,
        }
    }

    /// Prefix used on report lines.
    pub const fn label(self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "Warning",
            Severity::Critical => "Critical",
            Severity::Unknown => "Unknown",
        }
    }

    pub const fn headline(self) -> &'static str {
        match self {
            Severity::Ok => "OK - Kubernetes pods are all OK",
            Severity::Warning => "WARNING - Kubernetes pods show warning status!",
            Severity::Critical => "CRITICAL - Kubernetes pods show critical status!",
            Severity::Unknown => "UNKNOWN - Kubernetes pods show unknown status!",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
