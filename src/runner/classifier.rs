// file: src/runner/classifier.rs
// version: 1.0.0
// guid: 05d45f13-04f2-452e-99e3-c8b6ca009a11

//! Turning a finished command into an operator-facing outcome
//!
//! Exit codes alone are not trustworthy for the tools we wrap: timeshift, for
//! example, exits 0 after rolling back an incomplete snapshot. Marker rules
//! look for known text in the captured output and override the exit code.
//! The markers track the wording of the wrapped tools and may need updating
//! when those tools change.

use super::{CommandResult, StreamKind};
use std::borrow::Cow;
use std::fmt;

/// Final verdict on an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Success,
    /// Nominally succeeded but the operator must see a warning
    Degraded,
    Failed,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "success",
            OutcomeKind::Degraded => "degraded",
            OutcomeKind::Failed => "failed",
        }
    }
}

/// Outcome a marker rule can force
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerSeverity {
    Degraded,
    Failed,
}

impl From<MarkerSeverity> for OutcomeKind {
    fn from(severity: MarkerSeverity) -> Self {
        match severity {
            MarkerSeverity::Degraded => OutcomeKind::Degraded,
            MarkerSeverity::Failed => OutcomeKind::Failed,
        }
    }
}

/// Text that, when found in one stream, decides the outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerRule {
    pub stream: StreamKind,
    pub marker: Cow<'static, str>,
    pub severity: MarkerSeverity,
    pub message: Cow<'static, str>,
}

impl MarkerRule {
    pub fn new(
        stream: StreamKind,
        marker: impl Into<Cow<'static, str>>,
        severity: MarkerSeverity,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            stream,
            marker: marker.into(),
            severity,
            message: message.into(),
        }
    }

    pub fn failed_on_stderr(
        marker: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(StreamKind::Stderr, marker, MarkerSeverity::Failed, message)
    }

    pub fn failed_on_stdout(
        marker: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(StreamKind::Stdout, marker, MarkerSeverity::Failed, message)
    }

    pub fn degraded_on(
        stream: StreamKind,
        marker: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(stream, marker, MarkerSeverity::Degraded, message)
    }

    pub fn matches(&self, result: &CommandResult) -> bool {
        result.text(self.stream).contains(&*self.marker)
    }
}

/// Verdict plus the message shown to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    kind: OutcomeKind,
    message: String,
}

impl Outcome {
    pub fn new(kind: OutcomeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Success, message)
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Degraded, message)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Failed, message)
    }

    pub fn kind(&self) -> OutcomeKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_success(&self) -> bool {
        self.kind == OutcomeKind::Success
    }

    pub fn is_degraded(&self) -> bool {
        self.kind == OutcomeKind::Degraded
    }

    pub fn is_failed(&self) -> bool {
        self.kind == OutcomeKind::Failed
    }

    /// Success or Degraded
    pub fn completed(&self) -> bool {
        !self.is_failed()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)
    }
}

/// Classify a finished command against `rules`; the first matching rule wins
pub fn classify(result: &CommandResult, rules: &[MarkerRule]) -> Outcome {
    if let Some(rule) = rules.iter().find(|rule| rule.matches(result)) {
        return Outcome::new(rule.severity.into(), rule.message.to_string());
    }

    if result.success() {
        return Outcome::success("command completed successfully");
    }

    let stderr = result.stderr_text();
    let detail = match stderr.trim() {
        "" => "no error output".to_string(),
        text => text.to_string(),
    };

    if result.is_runner_failure() {
        Outcome::failed(format!("command could not be run: {}", detail))
    } else {
        Outcome::failed(format!(
            "command exited with code {}: {}",
            result.exit_code(),
            detail
        ))
    }
}
