//! The compiled twin: a second, independently implemented interpreter.
//!
//! Consumes the identical spec file format as the primary machine but
//! executes over dense index tables built at compile time: state and
//! event names are interned to integers, transitions live in a
//! state-by-event table, and guard/action names are resolved to slot
//! indices. It exposes only the narrow [`Interpreter`] surface.
//!
//! The point of the twin is not performance; it is that two runtimes
//! which share nothing but the spec format can be driven by the same
//! conformance vectors. Agreement between them is proved by the runner,
//! never assumed.

use crate::interp::{Interpreter, TransitionResult};
use crate::spec::{ActionFn, Context, Event, GuardFn, Registry, SpecError, SpecFile};
use crate::spec::{TransitionSpec, SCHEMA_VERSION};
use std::collections::HashMap;
use std::sync::Arc;

struct CompiledTransition {
    target: usize,
    guard: Option<usize>,
    actions: Vec<usize>,
}

/// A spec compiled to dense index tables, shared read-only by instances.
pub struct CompiledSpec {
    pub id: String,
    initial: usize,
    state_names: Vec<String>,
    state_ids: HashMap<String, usize>,
    event_ids: HashMap<String, usize>,
    /// `table[state][event]` is the transition for that pair, if any.
    table: Vec<Vec<Option<CompiledTransition>>>,
    guards: Vec<GuardFn>,
    actions: Vec<ActionFn>,
    defaults: Context,
}

impl std::fmt::Debug for CompiledSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSpec")
            .field("id", &self.id)
            .field("initial", &self.initial)
            .field("state_names", &self.state_names)
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl CompiledSpec {
    /// Compile a spec file, resolving names against the registry.
    ///
    /// Performs its own closure validation; it deliberately does not
    /// reuse the primary loader so that a schema defect cannot hide
    /// behind shared code.
    pub fn compile(file: &SpecFile, registry: &Registry) -> Result<Self, SpecError> {
        if file.id.is_empty() {
            return Err(SpecError::MissingId);
        }
        if file.schema_version != SCHEMA_VERSION {
            return Err(SpecError::UnsupportedSchemaVersion {
                spec: file.id.clone(),
                found: file.schema_version,
                supported: SCHEMA_VERSION,
            });
        }

        // Intern states first so targets can be checked by lookup alone.
        let state_names: Vec<String> = file.machine.states.keys().cloned().collect();
        let state_ids: HashMap<String, usize> = state_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        let initial = *state_ids.get(&file.machine.initial).ok_or_else(|| {
            SpecError::UnknownInitialState {
                spec: file.id.clone(),
                state: file.machine.initial.clone(),
            }
        })?;

        let mut event_ids: HashMap<String, usize> = HashMap::new();
        for state in file.machine.states.values() {
            for event in state.on.keys() {
                let next = event_ids.len();
                event_ids.entry(event.clone()).or_insert(next);
            }
        }

        // Intern guards/actions declared by the file.
        let guard_names: Vec<String> = file.guards.keys().cloned().collect();
        let mut guards = Vec::with_capacity(guard_names.len());
        for name in &guard_names {
            guards.push(registry.guard_fn(name).ok_or_else(|| {
                SpecError::UnregisteredGuard {
                    guard: name.clone(),
                }
            })?);
        }
        let guard_ids: HashMap<&str, usize> = guard_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let action_names: Vec<String> = file.actions.keys().cloned().collect();
        let mut actions = Vec::with_capacity(action_names.len());
        for name in &action_names {
            actions.push(registry.action_fn(name).ok_or_else(|| {
                SpecError::UnregisteredAction {
                    action: name.clone(),
                }
            })?);
        }
        let action_ids: HashMap<&str, usize> = action_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut table: Vec<Vec<Option<CompiledTransition>>> = Vec::new();
        for state_name in &state_names {
            let mut row: Vec<Option<CompiledTransition>> = Vec::new();
            row.resize_with(event_ids.len(), || None);

            for (event_name, spec) in &file.machine.states[state_name].on {
                let (target_name, action_list, guard_name): (&String, &[String], Option<&String>) =
                    match spec {
                        TransitionSpec::Target(target) => (target, &[], None),
                        TransitionSpec::Full {
                            target,
                            actions,
                            guard,
                        } => (target, actions, guard.as_ref()),
                    };

                let target = *state_ids.get(target_name).ok_or_else(|| {
                    SpecError::UnknownTargetState {
                        state: state_name.clone(),
                        event: event_name.clone(),
                        target: target_name.clone(),
                    }
                })?;

                let guard = match guard_name {
                    Some(name) => Some(*guard_ids.get(name.as_str()).ok_or_else(|| {
                        SpecError::UndeclaredGuard {
                            state: state_name.clone(),
                            event: event_name.clone(),
                            guard: name.clone(),
                        }
                    })?),
                    None => None,
                };

                let mut action_slots = Vec::with_capacity(action_list.len());
                for name in action_list {
                    action_slots.push(*action_ids.get(name.as_str()).ok_or_else(|| {
                        SpecError::UndeclaredAction {
                            state: state_name.clone(),
                            event: event_name.clone(),
                            action: name.clone(),
                        }
                    })?);
                }

                row[event_ids[event_name]] = Some(CompiledTransition {
                    target,
                    guard,
                    actions: action_slots,
                });
            }
            table.push(row);
        }

        Ok(Self {
            id: file.id.clone(),
            initial,
            state_names,
            state_ids,
            event_ids,
            table,
            guards,
            actions,
            defaults: file.context.clone().into_iter().collect(),
        })
    }
}

/// Machine instance over a compiled spec.
///
/// A state override naming a state outside the compiled table is kept as
/// an opaque name with no transitions, mirroring the primary machine's
/// behavior of treating every event as unhandled there.
pub struct CompiledMachine {
    spec: Arc<CompiledSpec>,
    current: Option<usize>,
    current_name: String,
    context: Context,
}

impl CompiledMachine {
    /// Construct an instance; never fails for a compiled spec.
    pub fn new(
        spec: Arc<CompiledSpec>,
        state_override: Option<&str>,
        context_override: Option<&Context>,
    ) -> Self {
        let (current, current_name) = match state_override {
            Some(name) => (spec.state_ids.get(name).copied(), name.to_string()),
            None => (
                Some(spec.initial),
                spec.state_names[spec.initial].clone(),
            ),
        };

        let mut context = spec.defaults.clone();
        if let Some(overlay) = context_override {
            context.merge(overlay);
        }

        Self {
            spec,
            current,
            current_name,
            context,
        }
    }
}

impl Interpreter for CompiledMachine {
    fn send(&mut self, event: &Event) -> TransitionResult {
        let spec = Arc::clone(&self.spec);

        let slot = self
            .current
            .zip(spec.event_ids.get(&event.name).copied())
            .and_then(|(state, event_id)| spec.table[state][event_id].as_ref());

        let Some(transition) = slot else {
            return TransitionResult::unhandled(&self.current_name);
        };

        if let Some(guard_id) = transition.guard {
            if !(spec.guards[guard_id])(&self.context, event) {
                return TransitionResult::unhandled(&self.current_name);
            }
        }

        for &action_id in &transition.actions {
            (spec.actions[action_id])(&mut self.context, event);
        }

        let from_state = std::mem::replace(
            &mut self.current_name,
            spec.state_names[transition.target].clone(),
        );
        self.current = Some(transition.target);

        TransitionResult {
            handled: true,
            from_state,
            to_state: self.current_name.clone(),
        }
    }

    fn state(&self) -> &str {
        &self.current_name
    }

    fn context(&self) -> &Context {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn switch_file() -> SpecFile {
        SpecFile::from_json(
            r#"{
            "id": "switch",
            "machine": {
                "id": "switch",
                "initial": "off",
                "states": {
                    "off": { "on": { "TOGGLE": { "target": "on", "actions": ["turnOn"], "guard": "canInteract" } } },
                    "on":  { "on": { "TOGGLE": { "target": "off", "actions": ["turnOff"], "guard": "canInteract" } } }
                }
            },
            "context": { "checked": false, "disabled": false },
            "guards": { "canInteract": {} },
            "actions": { "turnOn": {}, "turnOff": {} }
        }"#,
        )
        .unwrap()
    }

    fn switch_registry() -> Registry {
        Registry::new()
            .guard("canInteract", |ctx, _| !ctx.bool_field("disabled"))
            .action("turnOn", |ctx, _| ctx.set("checked", true))
            .action("turnOff", |ctx, _| ctx.set("checked", false))
    }

    fn compiled_switch() -> Arc<CompiledSpec> {
        Arc::new(CompiledSpec::compile(&switch_file(), &switch_registry()).unwrap())
    }

    #[test]
    fn compiled_machine_transitions() {
        let mut machine = CompiledMachine::new(compiled_switch(), None, None);

        let result = machine.send(&Event::new("TOGGLE"));

        assert!(result.handled);
        assert_eq!(result.from_state, "off");
        assert_eq!(result.to_state, "on");
        assert!(machine.context().bool_field("checked"));
    }

    #[test]
    fn unknown_event_is_inert() {
        let mut machine = CompiledMachine::new(compiled_switch(), None, None);
        let snapshot = machine.context_json();

        let result = machine.send(&Event::new("NO_SUCH_EVENT"));

        assert!(!result.handled);
        assert_eq!(machine.state(), "off");
        assert_eq!(machine.context_json(), snapshot);
    }

    #[test]
    fn guard_blocks_without_side_effects() {
        let mut disabled = Context::new();
        disabled.set("disabled", true);
        let mut machine = CompiledMachine::new(compiled_switch(), None, Some(&disabled));

        let result = machine.send(&Event::new("TOGGLE"));

        assert!(!result.handled);
        assert!(!machine.context().bool_field("checked"));
    }

    #[test]
    fn unknown_state_override_handles_nothing() {
        let mut machine = CompiledMachine::new(compiled_switch(), Some("limbo"), None);

        let result = machine.send(&Event::new("TOGGLE"));

        assert!(!result.handled);
        assert_eq!(machine.state(), "limbo");
    }

    #[test]
    fn compile_rejects_unknown_target() {
        let file = SpecFile::from_json(
            r#"{
            "id": "m",
            "machine": {
                "id": "m",
                "initial": "a",
                "states": { "a": { "on": { "GO": "nowhere" } } }
            }
        }"#,
        )
        .unwrap();

        let err = CompiledSpec::compile(&file, &Registry::new()).unwrap_err();
        assert!(matches!(err, SpecError::UnknownTargetState { .. }));
    }

    #[test]
    fn compile_rejects_unregistered_guard() {
        let registry = Registry::new()
            .action("turnOn", |ctx, _| ctx.set("checked", true))
            .action("turnOff", |ctx, _| ctx.set("checked", false));

        let err = CompiledSpec::compile(&switch_file(), &registry).unwrap_err();
        assert!(matches!(err, SpecError::UnregisteredGuard { .. }));
    }
}
