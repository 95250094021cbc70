//! The machine interpreter: deterministic event dispatch over a loaded
//! spec.
//!
//! - [`TransitionResult`]: the outcome of one `send`
//! - [`Interpreter`]: the narrow surface (`send` / `state` / `context`)
//!   shared by the primary [`Machine`] and the compiled twin, and the seam
//!   the conformance runner is generic over
//! - [`Machine`]: the primary table-driven implementation

mod machine;

pub use machine::Machine;

use crate::spec::{Context, Event};

/// Outcome of sending one event to a machine.
///
/// `handled == false` guarantees the machine is byte-identical to its
/// pre-send snapshot: same state, untouched context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionResult {
    pub handled: bool,
    pub from_state: String,
    pub to_state: String,
}

impl TransitionResult {
    /// The inert result: event not handled, nothing changed.
    pub fn unhandled(state: &str) -> Self {
        Self {
            handled: false,
            from_state: state.to_string(),
            to_state: state.to_string(),
        }
    }
}

/// The complete public surface a machine implementation exposes.
///
/// `send` is fully synchronous: all guard evaluation and action execution
/// completes before it returns. `state` and `context` are pure reads.
pub trait Interpreter {
    /// Dispatch one event against the current (state, context) pair.
    fn send(&mut self, event: &Event) -> TransitionResult;

    /// Current state name.
    fn state(&self) -> &str;

    /// Current context snapshot.
    fn context(&self) -> &Context;

    /// JSON-serialized context, for consumers on the far side of a call
    /// boundary. Read once per comparison rather than field-by-field.
    fn context_json(&self) -> serde_json::Value {
        serde_json::to_value(self.context()).unwrap_or(serde_json::Value::Null)
    }
}
