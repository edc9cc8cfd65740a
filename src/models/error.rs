//! Engine errors and validation reports.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Whether a violation blocks generation or is only a warning.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Blocking,
    Advisory,
}

/// One validation finding. `field` names the configuration field it is about (camelCase, as on the wire).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub severity: Severity,
    pub field: String,
    pub message: String,
}

/// Ordered validation findings. Generation is blocked while any blocking violation is present.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A report holding a single blocking violation.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut report = Self::new();
        report.error(field, message);
        report
    }

    pub fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation {
            severity: Severity::Blocking,
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn warn(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation {
            severity: Severity::Advisory,
            field: field.into(),
            message: message.into(),
        });
    }

    /// Append another report's findings, prefixing each message (e.g. `"Stage 2: "`).
    pub fn extend_prefixed(&mut self, other: ValidationReport, prefix: &str) {
        self.violations
            .extend(other.violations.into_iter().map(|v| Violation {
                message: format!("{}{}", prefix, v.message),
                ..v
            }));
    }

    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Blocking)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Advisory)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// Convert into `Err(Configuration)` when any blocking violation is present.
    pub fn into_result(self) -> Result<ValidationReport, EngineError> {
        if self.has_errors() {
            Err(EngineError::Configuration(self))
        } else {
            Ok(self)
        }
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = self.errors().map(|v| v.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// Failure of a call to the external bracket service.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum RemoteError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("bracket service unavailable: {0}")]
    Unavailable(String),
    #[error("bracket service rejected the request: {0}")]
    Rejected(String),
}

/// Errors that can occur during bracket operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum EngineError {
    /// The configuration has blocking validation violations.
    #[error("Invalid configuration: {0}")]
    Configuration(ValidationReport),
    /// The mutation would break a structural invariant (duplicate slot, unknown round, ...).
    #[error("Structural conflict: {0}")]
    StructuralConflict(String),
    /// The bracket or stage is not in a state that allows this action.
    #[error("State conflict: {0}")]
    StateConflict(String),
    /// The external bracket service failed; local state was left unchanged.
    #[error("Remote operation failed: {0}")]
    Remote(#[from] RemoteError),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl EngineError {
    /// Shorthand for a configuration error with one blocking violation.
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Configuration(ValidationReport::single(field, message))
    }
}
