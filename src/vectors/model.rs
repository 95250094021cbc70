//! Canonical unified vector schema plus the two raw source formats.

use crate::spec::{Context, Payload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading vector input files.
#[derive(Debug, Error)]
pub enum VectorError {
    #[error("failed to read vector file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse vector file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where a scenario came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "hand-authored")]
    HandAuthored,
    #[serde(rename = "model-checker")]
    ModelChecker,
}

/// A (state, context) pair observed at one point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: String,
    pub context: Context,
}

/// One input/expected-output pair. Each step stands alone; the runner
/// rebuilds a machine from `before` rather than chaining steps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestStep {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
    pub before: Snapshot,
    pub after: Snapshot,
}

/// A labeled sequence of steps from one source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub source: Source,
    pub steps: Vec<TestStep>,
}

/// Per-source scenario counts in a unified file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCounts {
    #[serde(rename = "handAuthored")]
    pub hand_authored: usize,
    #[serde(rename = "modelChecker")]
    pub model_checker: usize,
}

/// The canonical oracle format consumed by the conformance runner.
///
/// A build artifact: regenerated whenever the spec or raw vectors change,
/// read-only afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnifiedVectorFile {
    pub component: String,
    pub generated: DateTime<Utc>,
    pub sources: SourceCounts,
    pub scenarios: Vec<Scenario>,
}

impl UnifiedVectorFile {
    /// Parse a unified vector file from JSON text.
    pub fn from_json(json: &str) -> Result<Self, VectorError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a unified vector file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, VectorError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Pretty-printed JSON, as written to the build artifact.
    pub fn to_json(&self) -> Result<String, VectorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Total steps across every scenario.
    pub fn step_count(&self) -> usize {
        self.scenarios.iter().map(|s| s.steps.len()).sum()
    }
}

/// One hand-authored given/when/then vector, as authored upstream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandVector {
    pub scenario: String,
    pub given: Snapshot,
    pub when: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
    pub then: Snapshot,
}

impl HandVector {
    /// Read a list of hand-authored vectors from disk.
    pub fn list_from_path(path: impl AsRef<Path>) -> Result<Vec<Self>, VectorError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// One full snapshot in a model-checker trace.
///
/// `_state` and `_action` are trace metadata; every other key is a
/// context field. `_action`, when the checker emits it, is the explicit
/// event label and is always preferred over delta inference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceSnapshot {
    #[serde(rename = "_state")]
    pub state: String,
    #[serde(rename = "_action", default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(flatten)]
    pub context: Context,
}

/// A model-checker execution trace: a sequence of full snapshots over
/// the spec's reachable state space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub states: Vec<TraceSnapshot>,
}

impl Trace {
    /// Read a trace file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, VectorError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
