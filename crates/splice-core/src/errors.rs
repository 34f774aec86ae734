//! Structured error types shared across splice crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`SpliceError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (bounds, indices, alphabets, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for splice.
///
/// Only caller misuse lands here. An unsatisfiable synthesis request is a normal
/// outcome and is reported as `Ok(None)` / `Ok(false)` by the solver and containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum SpliceError {
    /// Structurally invalid synthesis requests (bad bounds, alphabet violations, ...).
    #[error("synthesis error: {0}")]
    Synth(ErrorInfo),
    /// Container usage errors such as out-of-range positions.
    #[error("container error: {0}")]
    Container(ErrorInfo),
    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl SpliceError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            SpliceError::Synth(info)
            | SpliceError::Container(info)
            | SpliceError::Config(info)
            | SpliceError::Serde(info) => info,
        }
    }

    /// Shorthand for the error raised when a position does not exist in a container.
    pub fn index_out_of_range(container: &str, index: usize, len: usize) -> Self {
        SpliceError::Container(
            ErrorInfo::new("index-out-of-range", "position is outside the container")
                .with_context("container", container)
                .with_context("index", index.to_string())
                .with_context("len", len.to_string()),
        )
    }
}
