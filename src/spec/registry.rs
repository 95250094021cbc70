//! Named guard and action function tables.
//!
//! Spec files reference guards and actions by name only. The executable
//! behavior lives here: a registry built in code that maps each name to a
//! pure function, resolved once at load time. There is no expression
//! evaluation anywhere in the runtime.

use super::model::{Context, Event};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Pure predicate gating whether a transition is taken.
pub type GuardFn = Arc<dyn Fn(&Context, &Event) -> bool + Send + Sync>;

/// Named context mutation executed when a transition is taken.
pub type ActionFn = Arc<dyn Fn(&mut Context, &Event) + Send + Sync>;

/// Registry of named guards and actions for one component family.
///
/// Built fluently by the embedding application, then handed to spec
/// loading so every name in the spec file can be resolved up front.
///
/// # Example
///
/// ```rust
/// use lockstep::spec::Registry;
///
/// let registry = Registry::new()
///     .guard("canInteract", |ctx, _| !ctx.bool_field("disabled"))
///     .action("toggleChecked", |ctx, _| ctx.toggle("checked"));
///
/// assert!(registry.has_guard("canInteract"));
/// assert!(registry.has_action("toggleChecked"));
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    guards: BTreeMap<String, GuardFn>,
    actions: BTreeMap<String, ActionFn>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a guard under a name. Re-registering replaces the previous
    /// function.
    pub fn guard<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Context, &Event) -> bool + Send + Sync + 'static,
    {
        self.guards.insert(name.into(), Arc::new(f));
        self
    }

    /// Register an action under a name.
    pub fn action<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Context, &Event) + Send + Sync + 'static,
    {
        self.actions.insert(name.into(), Arc::new(f));
        self
    }

    pub fn has_guard(&self, name: &str) -> bool {
        self.guards.contains_key(name)
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Look up a guard function.
    pub fn guard_fn(&self, name: &str) -> Option<GuardFn> {
        self.guards.get(name).cloned()
    }

    /// Look up an action function.
    pub fn action_fn(&self, name: &str) -> Option<ActionFn> {
        self.actions.get(name).cloned()
    }
}
