use serde::Serialize;

use crate::core::{Finding, Severity};

pub const DEFAULT_WARN: i64 = 5;
pub const DEFAULT_CRITICAL: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Thresholds {
    pub warn: i64,
    pub critical: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warn: DEFAULT_WARN,
            critical: DEFAULT_CRITICAL,
        }
    }
}

/// Anything other than the literal `True` is reported as a warning.
pub fn evaluate_condition(
    pod: &str,
    condition_type: &str,
    status: &str,
    verbose: bool,
) -> Option<Finding> {
    let message = format!("Pod: {pod}  {condition_type}: {status}");
    if status != "True" {
        return Some(Finding::new(Severity::Warning, message));
    }
    verbose.then(|| Finding::new(Severity::Ok, message))
}

/// Classifies a container's restart count. Both bounds are exclusive: a count
/// equal to `warn` or `critical` stays OK.
pub fn evaluate_restarts(
    pod: &str,
    container: &str,
    ready: bool,
    restart_count: u32,
    thresholds: Thresholds,
) -> Option<Finding> {
    let count = i64::from(restart_count);
    let severity = if count > thresholds.warn && count < thresholds.critical {
        Severity::Warning
    } else if count > thresholds.critical {
        Severity::Critical
    } else if count > 0 {
        Severity::Ok
    } else {
        return None;
    };

    Some(Finding::new(
        severity,
        format!("Pod: {pod}   Container: {container}    Ready: {ready}   Restarts: {restart_count}"),
    ))
}
