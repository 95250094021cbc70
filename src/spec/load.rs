//! Spec file parsing and load-time resolution.
//!
//! A spec file is the wire contract between the authoring toolchain and
//! every interpreter implementation. Loading validates that the spec is
//! internally closed (every target state, guard name, and action name it
//! references actually exists) and resolves guard/action names against a
//! [`Registry`] exactly once. The resolved [`MachineSpec`] is immutable.

use super::error::SpecError;
use super::model::{Context, FieldValue};
use super::registry::{ActionFn, GuardFn, Registry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Schema version this runtime understands. Bumped in lockstep with the
/// compiled twin whenever the wire format changes.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Wire form of a spec file: `{ id, machine, context, guards, actions }`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpecFile {
    pub id: String,

    #[serde(rename = "schemaVersion", default = "default_schema_version")]
    pub schema_version: u32,

    pub machine: MachineBlock,

    /// Default context fields; the closed shape every instance starts from.
    #[serde(default)]
    pub context: BTreeMap<String, FieldValue>,

    /// Guard declarations: name -> metadata. Behavior comes from the registry.
    #[serde(default)]
    pub guards: BTreeMap<String, GuardDecl>,

    /// Action declarations: name -> metadata. Behavior comes from the registry.
    #[serde(default)]
    pub actions: BTreeMap<String, ActionDecl>,
}

/// The `machine` block of a spec file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MachineBlock {
    pub id: String,
    pub initial: String,
    pub states: BTreeMap<String, StateDef>,
}

/// One state's transition table: event name -> transition.
///
/// A state with no entry for an event does not handle that event.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StateDef {
    #[serde(default)]
    pub on: BTreeMap<String, TransitionSpec>,
}

/// Wire form of a transition: either just a target state name, or the
/// full `{ target, actions, guard }` form.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransitionSpec {
    Target(String),
    Full {
        target: String,
        #[serde(default)]
        actions: Vec<String>,
        #[serde(default)]
        guard: Option<String>,
    },
}

/// Guard declaration metadata.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GuardDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Action declaration metadata.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ActionDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SpecFile {
    /// Parse a spec file from JSON text.
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a spec file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SpecError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// A fully resolved transition.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionDef {
    pub target: String,
    pub actions: Vec<String>,
    pub guard: Option<String>,
}

impl From<&TransitionSpec> for TransitionDef {
    fn from(spec: &TransitionSpec) -> Self {
        match spec {
            TransitionSpec::Target(target) => Self {
                target: target.clone(),
                actions: Vec::new(),
                guard: None,
            },
            TransitionSpec::Full {
                target,
                actions,
                guard,
            } => Self {
                target: target.clone(),
                actions: actions.clone(),
                guard: guard.clone(),
            },
        }
    }
}

/// A loaded, validated, immutable machine description.
///
/// Produced once by [`MachineSpec::resolve`] and shared read-only by every
/// machine instance built from it.
///
/// # Example
///
/// ```rust
/// use lockstep::spec::{MachineSpec, Registry, SpecFile};
///
/// let file = SpecFile::from_json(r#"{
///     "id": "toggle",
///     "machine": {
///         "id": "toggle",
///         "initial": "off",
///         "states": {
///             "off": { "on": { "TOGGLE": { "target": "on", "actions": ["flip"] } } },
///             "on":  { "on": { "TOGGLE": { "target": "off", "actions": ["flip"] } } }
///         }
///     },
///     "context": { "pressed": false },
///     "actions": { "flip": {} }
/// }"#).unwrap();
///
/// let registry = Registry::new().action("flip", |ctx, _| ctx.toggle("pressed"));
/// let spec = MachineSpec::resolve(&file, &registry).unwrap();
/// assert_eq!(spec.initial, "off");
/// ```
pub struct MachineSpec {
    pub id: String,
    pub initial: String,
    pub context: Context,
    states: BTreeMap<String, BTreeMap<String, TransitionDef>>,
    guards: BTreeMap<String, GuardFn>,
    actions: BTreeMap<String, ActionFn>,
}

impl std::fmt::Debug for MachineSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MachineSpec")
            .field("id", &self.id)
            .field("initial", &self.initial)
            .field("context", &self.context)
            .field("states", &self.states.keys().collect::<Vec<_>>())
            .field("guards", &self.guards.keys().collect::<Vec<_>>())
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl MachineSpec {
    /// Validate a spec file and resolve its guard/action names against a
    /// registry. Fails fast on any structural defect.
    pub fn resolve(file: &SpecFile, registry: &Registry) -> Result<Self, SpecError> {
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
        if !file.machine.states.contains_key(&file.machine.initial) {
            return Err(SpecError::UnknownInitialState {
                spec: file.id.clone(),
                state: file.machine.initial.clone(),
            });
        }

        let mut states: BTreeMap<String, BTreeMap<String, TransitionDef>> = BTreeMap::new();
        for (state_name, state_def) in &file.machine.states {
            let mut table = BTreeMap::new();
            for (event_name, transition_spec) in &state_def.on {
                let transition = TransitionDef::from(transition_spec);

                if !file.machine.states.contains_key(&transition.target) {
                    return Err(SpecError::UnknownTargetState {
                        state: state_name.clone(),
                        event: event_name.clone(),
                        target: transition.target.clone(),
                    });
                }
                if let Some(guard) = &transition.guard {
                    if !file.guards.contains_key(guard) {
                        return Err(SpecError::UndeclaredGuard {
                            state: state_name.clone(),
                            event: event_name.clone(),
                            guard: guard.clone(),
                        });
                    }
                }
                for action in &transition.actions {
                    if !file.actions.contains_key(action) {
                        return Err(SpecError::UndeclaredAction {
                            state: state_name.clone(),
                            event: event_name.clone(),
                            action: action.clone(),
                        });
                    }
                }

                table.insert(event_name.clone(), transition);
            }
            states.insert(state_name.clone(), table);
        }

        let mut guards = BTreeMap::new();
        for name in file.guards.keys() {
            let f = registry
                .guard_fn(name)
                .ok_or_else(|| SpecError::UnregisteredGuard {
                    guard: name.clone(),
                })?;
            guards.insert(name.clone(), f);
        }

        let mut actions = BTreeMap::new();
        for name in file.actions.keys() {
            let f = registry
                .action_fn(name)
                .ok_or_else(|| SpecError::UnregisteredAction {
                    action: name.clone(),
                })?;
            actions.insert(name.clone(), f);
        }

        Ok(Self {
            id: file.id.clone(),
            initial: file.machine.initial.clone(),
            context: file.context.clone().into_iter().collect(),
            states,
            guards,
            actions,
        })
    }

    /// Look up the transition for an event in a state, if any.
    pub fn transition(&self, state: &str, event: &str) -> Option<&TransitionDef> {
        self.states.get(state)?.get(event)
    }

    /// Resolved guard function, if the name exists.
    pub fn guard_fn(&self, name: &str) -> Option<&GuardFn> {
        self.guards.get(name)
    }

    /// Resolved action function, if the name exists.
    pub fn action_fn(&self, name: &str) -> Option<&ActionFn> {
        self.actions.get(name)
    }

    /// State names in deterministic order.
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }
}
