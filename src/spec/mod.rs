//! Spec representation: the immutable, loaded-once description of one
//! component's machine.
//!
//! - Wire types for the JSON spec file shared by both interpreters
//! - [`Registry`]: named guard/action function tables resolved at load time
//! - [`MachineSpec`]: the validated, resolved description machines run on
//!
//! Everything here is read-only after [`MachineSpec::resolve`]; runtime
//! state lives in the machine instances, never in the spec.

mod error;
mod load;
mod model;
mod registry;

pub use error::SpecError;
pub use load::{
    ActionDecl, GuardDecl, MachineBlock, MachineSpec, SpecFile, StateDef, TransitionDef,
    TransitionSpec, SCHEMA_VERSION,
};
pub use model::{Context, Event, FieldValue, Payload};
pub use registry::{ActionFn, GuardFn, Registry};
