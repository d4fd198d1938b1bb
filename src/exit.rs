use std::fmt;

use crate::core::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok,
    Warning,
    Critical,
    Unknown,
    InvalidConfig,
}

impl ExitCode {
    pub const fn as_i32(self) -> i32 {
        match self {
            ExitCode::Ok => 0,
            ExitCode::Warning => 1,
            ExitCode::Critical => 2,
            ExitCode::Unknown => 3,
            ExitCode::InvalidConfig => 4,
        }
    }

    pub const fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::Ok => ExitCode::Ok,
            Severity::Warning => ExitCode::Warning,
            Severity::Critical => ExitCode::Critical,
            Severity::Unknown => ExitCode::Unknown,
        }
    }
}

#[derive(Debug)]
pub struct ExitError {
    pub code: ExitCode,
    pub err: anyhow::Error,
}

impl ExitError {
    pub fn new(code: ExitCode, err: anyhow::Error) -> Self {
        Self { code, err }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.err.fmt(f)
    }
}

impl std::error::Error for ExitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.err.as_ref())
    }
}

pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(exit) = err.downcast_ref::<ExitError>() {
        return exit.code.as_i32();
    }
    ExitCode::Unknown.as_i32()
}

/// True when the scan was aborted because the cluster could not be read.
pub fn is_connection_failure(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ExitError>()
        .is_some_and(|exit| exit.code == ExitCode::Unknown)
}

pub fn invalid_config(message: impl Into<String>) -> anyhow::Error {
    ExitError::new(ExitCode::InvalidConfig, anyhow::anyhow!(message.into())).into()
}

pub fn invalid_config_err(err: anyhow::Error) -> anyhow::Error {
    ExitError::new(ExitCode::InvalidConfig, err).into()
}

pub fn connection(message: impl Into<String>) -> anyhow::Error {
    ExitError::new(ExitCode::Unknown, anyhow::anyhow!(message.into())).into()
}

pub fn connection_err(err: anyhow::Error) -> anyhow::Error {
    ExitError::new(ExitCode::Unknown, err).into()
}
