//! Load-time errors for machine specs.

use thiserror::Error;

/// Errors raised while reading or resolving a spec file.
///
/// A structurally invalid spec is a build-time configuration defect and
/// fails fast here; nothing in this enum is reachable from `send`.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to read spec file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse spec file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("spec has an empty id")]
    MissingId,

    #[error("spec '{spec}' uses schema version {found}, supported version is {supported}")]
    UnsupportedSchemaVersion {
        spec: String,
        found: u32,
        supported: u32,
    },

    #[error("initial state '{state}' is not defined in spec '{spec}'")]
    UnknownInitialState { spec: String, state: String },

    #[error("transition '{state}' --{event}--> targets undefined state '{target}'")]
    UnknownTargetState {
        state: String,
        event: String,
        target: String,
    },

    #[error("transition '{state}' --{event}--> references undeclared guard '{guard}'")]
    UndeclaredGuard {
        state: String,
        event: String,
        guard: String,
    },

    #[error("guard '{guard}' is declared in the spec but not registered")]
    UnregisteredGuard { guard: String },

    #[error("transition '{state}' --{event}--> references undeclared action '{action}'")]
    UndeclaredAction {
        state: String,
        event: String,
        action: String,
    },

    #[error("action '{action}' is declared in the spec but not registered")]
    UnregisteredAction { action: String },
}
