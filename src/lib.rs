//! Lockstep: a declarative state machine core for interactive UI
//! primitives
//!
//! Every interactive control (checkbox, switch, slider, tabs, select,
//! dialog, ...) is driven by the same mechanism: a JSON machine spec
//! executed by an interpreter, cross-validated against a second,
//! independently built interpreter so the two can never silently
//! diverge.
//!
//! # Core Concepts
//!
//! - **Spec**: an immutable, loaded-once machine description with named
//!   guards and actions resolved from a function registry
//! - **Machine**: deterministic, fully synchronous event dispatch over
//!   one (state, context) pair
//! - **Vectors**: hand-authored scenarios and model-checker traces,
//!   unified into one canonical oracle format
//! - **Conformance**: the unified vectors replayed against both
//!   interpreter implementations, diffing their outputs field by field
//!
//! # Example
//!
//! ```rust
//! use lockstep::interp::{Interpreter, Machine};
//! use lockstep::spec::{Event, MachineSpec, Registry, SpecFile};
//! use std::sync::Arc;
//!
//! let file = SpecFile::from_json(r#"{
//!     "id": "checkbox",
//!     "machine": {
//!         "id": "checkbox",
//!         "initial": "unchecked",
//!         "states": {
//!             "unchecked": { "on": {
//!                 "TOGGLE": { "target": "checked", "actions": ["check"], "guard": "canInteract" }
//!             }},
//!             "checked": { "on": {
//!                 "TOGGLE": { "target": "unchecked", "actions": ["uncheck"], "guard": "canInteract" }
//!             }}
//!         }
//!     },
//!     "context": { "checked": false, "disabled": false },
//!     "guards": { "canInteract": { "description": "control accepts input" } },
//!     "actions": { "check": {}, "uncheck": {} }
//! }"#).unwrap();
//!
//! let registry = Registry::new()
//!     .guard("canInteract", |ctx, _| !ctx.bool_field("disabled"))
//!     .action("check", |ctx, _| ctx.set("checked", true))
//!     .action("uncheck", |ctx, _| ctx.set("checked", false));
//!
//! let spec = Arc::new(MachineSpec::resolve(&file, &registry).unwrap());
//! let mut machine = Machine::new(spec, None, None);
//!
//! let result = machine.send(&Event::new("TOGGLE"));
//! assert!(result.handled);
//! assert_eq!(machine.state(), "checked");
//! ```

pub mod conformance;
pub mod interp;
pub mod spec;
pub mod twin;
pub mod vectors;

// Re-export commonly used types
pub use conformance::{run, ConformanceReport, FieldDiff, Mismatch};
pub use interp::{Interpreter, Machine, TransitionResult};
pub use spec::{Context, Event, FieldValue, MachineSpec, Payload, Registry, SpecError, SpecFile};
pub use twin::{CompiledMachine, CompiledSpec};
pub use vectors::{
    unify, unify_at, HandVector, Scenario, Source, TestStep, Trace, UnifiedVectorFile,
    AMBIGUOUS_EVENT,
};
