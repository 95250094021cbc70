//! Primary table-driven machine implementation.

use super::{Interpreter, TransitionResult};
use crate::spec::{Context, Event, MachineSpec};
use std::sync::Arc;

/// One live machine instance: a current state name and an exclusively
/// owned context, executing against a shared read-only spec.
///
/// Instances are built fresh per widget lifetime or per test step and
/// never shared; there is no global registry to resolve machines from.
///
/// # Example
///
/// ```rust
/// use lockstep::interp::{Interpreter, Machine};
/// use lockstep::spec::{Event, MachineSpec, Registry, SpecFile};
/// use std::sync::Arc;
///
/// let file = SpecFile::from_json(r#"{
///     "id": "switch",
///     "machine": {
///         "id": "switch",
///         "initial": "off",
///         "states": {
///             "off": { "on": { "TOGGLE": { "target": "on", "actions": ["turnOn"] } } },
///             "on":  { "on": { "TOGGLE": { "target": "off", "actions": ["turnOff"] } } }
///         }
///     },
///     "context": { "checked": false },
///     "actions": { "turnOn": {}, "turnOff": {} }
/// }"#).unwrap();
///
/// let registry = Registry::new()
///     .action("turnOn", |ctx, _| ctx.set("checked", true))
///     .action("turnOff", |ctx, _| ctx.set("checked", false));
/// let spec = Arc::new(MachineSpec::resolve(&file, &registry).unwrap());
///
/// let mut machine = Machine::new(Arc::clone(&spec), None, None);
/// let result = machine.send(&Event::new("TOGGLE"));
///
/// assert!(result.handled);
/// assert_eq!(machine.state(), "on");
/// assert!(machine.context().bool_field("checked"));
/// ```
pub struct Machine {
    spec: Arc<MachineSpec>,
    state: String,
    context: Context,
}

impl Machine {
    /// Construct a machine from a resolved spec.
    ///
    /// State starts at `state_override` when given, otherwise the spec's
    /// initial state. Context starts as a deep copy of the spec defaults
    /// with `context_override` fields merged over them. Construction
    /// never fails for a resolved spec.
    pub fn new(
        spec: Arc<MachineSpec>,
        state_override: Option<&str>,
        context_override: Option<&Context>,
    ) -> Self {
        let state = state_override
            .map(str::to_string)
            .unwrap_or_else(|| spec.initial.clone());

        let mut context = spec.context.clone();
        if let Some(overlay) = context_override {
            context.merge(overlay);
        }

        Self {
            spec,
            state,
            context,
        }
    }
}

impl Interpreter for Machine {
    fn send(&mut self, event: &Event) -> TransitionResult {
        let spec = Arc::clone(&self.spec);

        let Some(transition) = spec.transition(&self.state, &event.name) else {
            return TransitionResult::unhandled(&self.state);
        };

        // Guards see the untouched context; a failing (or unresolvable)
        // guard leaves the machine fully inert. Unresolvable fails closed.
        if let Some(guard_name) = &transition.guard {
            let passed = spec
                .guard_fn(guard_name)
                .map(|guard| guard(&self.context, event))
                .unwrap_or(false);
            if !passed {
                return TransitionResult::unhandled(&self.state);
            }
        }

        // Actions run in declared order over the live context, so later
        // actions observe earlier actions' writes.
        for action_name in &transition.actions {
            if let Some(action) = spec.action_fn(action_name) {
                action(&mut self.context, event);
            }
        }

        let from_state = std::mem::replace(&mut self.state, transition.target.clone());
        TransitionResult {
            handled: true,
            from_state,
            to_state: self.state.clone(),
        }
    }

    fn state(&self) -> &str {
        &self.state
    }

    fn context(&self) -> &Context {
        &self.context
    }
}
