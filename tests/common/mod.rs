//! Shared fixtures: component registries and spec/vector loading.

use lockstep::spec::{MachineSpec, Registry, SpecFile};
use lockstep::twin::CompiledSpec;
use lockstep::vectors::{HandVector, Trace};
use std::path::PathBuf;
use std::sync::Arc;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Guards and actions for the checkbox machine spec.
pub fn checkbox_registry() -> Registry {
    Registry::new()
        .guard("canInteract", |ctx, _| !ctx.bool_field("disabled"))
        .action("setChecked", |ctx, _| ctx.set("checked", true))
        .action("clearChecked", |ctx, _| ctx.set("checked", false))
        .action("setIndeterminate", |ctx, _| ctx.set("indeterminate", true))
        .action("clearIndeterminate", |ctx, _| {
            ctx.set("indeterminate", false)
        })
}

/// Guards and actions for the select machine spec.
pub fn select_registry() -> Registry {
    Registry::new()
        .guard("canInteract", |ctx, _| !ctx.bool_field("disabled"))
        .action("setOpen", |ctx, _| ctx.set("open", true))
        .action("clearOpen", |ctx, _| ctx.set("open", false))
        .action("highlightFromPayload", |ctx, event| {
            if let Some(value) = event.payload_value("value").cloned() {
                ctx.set("highlightedValue", value);
            }
        })
        .action("selectHighlighted", |ctx, _| {
            if let Some(value) = ctx.get("highlightedValue").cloned() {
                ctx.set("selectedValue", value);
            }
        })
}

pub fn load_spec_file(component: &str) -> SpecFile {
    SpecFile::from_path(fixture_path(&format!("{component}.json")))
        .expect("fixture spec should parse")
}

pub fn resolved_spec(component: &str, registry: &Registry) -> Arc<MachineSpec> {
    Arc::new(
        MachineSpec::resolve(&load_spec_file(component), registry)
            .expect("fixture spec should resolve"),
    )
}

pub fn compiled_spec(component: &str, registry: &Registry) -> Arc<CompiledSpec> {
    Arc::new(
        CompiledSpec::compile(&load_spec_file(component), registry)
            .expect("fixture spec should compile"),
    )
}

pub fn load_hand_vectors(component: &str) -> Vec<HandVector> {
    HandVector::list_from_path(fixture_path(&format!("{component}.vectors.json")))
        .expect("fixture vectors should parse")
}

pub fn load_trace(component: &str) -> Trace {
    Trace::from_path(fixture_path(&format!("{component}.trace.json")))
        .expect("fixture trace should parse")
}
