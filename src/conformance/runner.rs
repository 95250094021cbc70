//! Replays unified vectors against an interpreter and collects every
//! divergence.

use crate::interp::Interpreter;
use crate::spec::{Context, Event, FieldValue};
use crate::vectors::{Snapshot, Source, UnifiedVectorFile};
use std::collections::BTreeSet;
use std::fmt;

/// One field that differed between expected and observed snapshots.
///
/// The state name is compared under the reserved field name `"state"`;
/// every other entry is a context field. `None` means the field was
/// absent on that side.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDiff {
    pub field: String,
    pub expected: Option<FieldValue>,
    pub actual: Option<FieldValue>,
}

/// One failed step, with enough identity to find it in the vector file.
#[derive(Clone, Debug, PartialEq)]
pub struct Mismatch {
    pub scenario: String,
    pub source: Source,
    pub step: usize,
    pub event: String,
    pub diffs: Vec<FieldDiff>,
}

/// Aggregated outcome of one conformance run against one interpreter.
#[derive(Clone, Debug, PartialEq)]
pub struct ConformanceReport {
    pub component: String,
    pub steps_run: usize,
    pub mismatches: Vec<Mismatch>,
}

impl ConformanceReport {
    /// True when every step matched exactly.
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed() {
            return write!(
                f,
                "{}: {} steps, all conformant",
                self.component, self.steps_run
            );
        }

        writeln!(
            f,
            "{}: {} of {} steps diverged",
            self.component,
            self.mismatches.len(),
            self.steps_run
        )?;
        for mismatch in &self.mismatches {
            writeln!(
                f,
                "  [{}] '{}' step {} ({}):",
                source_tag(mismatch.source),
                mismatch.scenario,
                mismatch.step,
                mismatch.event
            )?;
            for diff in &mismatch.diffs {
                writeln!(
                    f,
                    "    {}: expected {}, got {}",
                    diff.field,
                    render(&diff.expected),
                    render(&diff.actual)
                )?;
            }
        }
        Ok(())
    }
}

fn source_tag(source: Source) -> &'static str {
    match source {
        Source::HandAuthored => "hand-authored",
        Source::ModelChecker => "model-checker",
    }
}

fn render(value: &Option<FieldValue>) -> String {
    match value {
        Some(v) => serde_json::to_string(v).unwrap_or_else(|_| "<unprintable>".into()),
        None => "<absent>".into(),
    }
}

/// Replay every step of every scenario against machines produced by
/// `factory` and collect all mismatches; never fail-fast.
///
/// Each step is independent: the machine is built fresh from
/// `step.before` and receives exactly one event. The factory indirection
/// is what lets one vector corpus and one assertion logic validate both
/// the primary interpreter and the compiled twin.
pub fn run<M, F>(vectors: &UnifiedVectorFile, factory: F) -> ConformanceReport
where
    M: Interpreter,
    F: Fn(&str, &Context) -> M,
{
    let mut steps_run = 0;
    let mut mismatches = Vec::new();

    for scenario in &vectors.scenarios {
        for (index, step) in scenario.steps.iter().enumerate() {
            steps_run += 1;

            let mut machine = factory(&step.before.state, &step.before.context);
            let event = Event {
                name: step.event.clone(),
                payload: step.payload.clone(),
            };
            machine.send(&event);

            let diffs = diff_outcome(&machine, &step.after);
            if !diffs.is_empty() {
                tracing::debug!(
                    scenario = %scenario.name,
                    step = index,
                    event = %step.event,
                    fields = diffs.len(),
                    "conformance mismatch"
                );
                mismatches.push(Mismatch {
                    scenario: scenario.name.clone(),
                    source: scenario.source,
                    step: index,
                    event: step.event.clone(),
                    diffs,
                });
            }
        }
    }

    ConformanceReport {
        component: vectors.component.clone(),
        steps_run,
        mismatches,
    }
}

/// Exact field-by-field comparison of the machine's (state, context)
/// against an expected snapshot. The context is read once, not
/// field-by-field across the interpreter boundary.
fn diff_outcome<M: Interpreter>(machine: &M, expected: &Snapshot) -> Vec<FieldDiff> {
    let mut diffs = Vec::new();

    if machine.state() != expected.state {
        diffs.push(FieldDiff {
            field: "state".into(),
            expected: Some(FieldValue::String(expected.state.clone())),
            actual: Some(FieldValue::String(machine.state().to_string())),
        });
    }

    let observed = machine.context();
    let fields: BTreeSet<&String> = expected
        .context
        .iter()
        .map(|(name, _)| name)
        .chain(observed.iter().map(|(name, _)| name))
        .collect();

    for field in fields {
        let want = expected.context.get(field);
        let got = observed.get(field);
        if want != got {
            diffs.push(FieldDiff {
                field: field.clone(),
                expected: want.cloned(),
                actual: got.cloned(),
            });
        }
    }

    diffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::Machine;
    use crate::spec::{MachineSpec, Registry, SpecFile};
    use crate::vectors::{Scenario, SourceCounts, TestStep};
    use std::sync::Arc;

    fn switch_spec() -> Arc<MachineSpec> {
        let file = SpecFile::from_json(
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
        .unwrap();

        let registry = Registry::new()
            .guard("canInteract", |ctx, _| !ctx.bool_field("disabled"))
            .action("turnOn", |ctx, _| ctx.set("checked", true))
            .action("turnOff", |ctx, _| ctx.set("checked", false));

        Arc::new(MachineSpec::resolve(&file, &registry).unwrap())
    }

    fn switch_context(checked: bool, disabled: bool) -> Context {
        let mut ctx = Context::new();
        ctx.set("checked", checked);
        ctx.set("disabled", disabled);
        ctx
    }

    fn step(
        event: &str,
        before: (&str, Context),
        after: (&str, Context),
    ) -> TestStep {
        TestStep {
            event: event.to_string(),
            payload: None,
            before: Snapshot {
                state: before.0.to_string(),
                context: before.1,
            },
            after: Snapshot {
                state: after.0.to_string(),
                context: after.1,
            },
        }
    }

    fn vectors_with(steps: Vec<TestStep>) -> UnifiedVectorFile {
        UnifiedVectorFile {
            component: "switch".into(),
            generated: "2024-01-01T00:00:00Z".parse().unwrap(),
            sources: SourceCounts {
                hand_authored: 1,
                model_checker: 0,
            },
            scenarios: vec![Scenario {
                name: "switch scenario".into(),
                source: Source::HandAuthored,
                steps,
            }],
        }
    }

    #[test]
    fn conformant_vectors_pass() {
        let spec = switch_spec();
        let vectors = vectors_with(vec![
            step(
                "TOGGLE",
                ("off", switch_context(false, false)),
                ("on", switch_context(true, false)),
            ),
            step(
                "TOGGLE",
                ("off", switch_context(false, true)),
                ("off", switch_context(false, true)),
            ),
        ]);

        let report = run(&vectors, |state, ctx| {
            Machine::new(Arc::clone(&spec), Some(state), Some(ctx))
        });

        assert!(report.passed(), "{report}");
        assert_eq!(report.steps_run, 2);
    }

    #[test]
    fn every_divergent_step_is_collected() {
        let spec = switch_spec();
        // Two steps with wrong expectations, one correct in between.
        let vectors = vectors_with(vec![
            step(
                "TOGGLE",
                ("off", switch_context(false, false)),
                ("off", switch_context(false, false)),
            ),
            step(
                "TOGGLE",
                ("on", switch_context(true, false)),
                ("off", switch_context(false, false)),
            ),
            step(
                "TOGGLE",
                ("off", switch_context(false, true)),
                ("on", switch_context(true, true)),
            ),
        ]);

        let report = run(&vectors, |state, ctx| {
            Machine::new(Arc::clone(&spec), Some(state), Some(ctx))
        });

        assert!(!report.passed());
        assert_eq!(report.steps_run, 3);
        assert_eq!(report.mismatches.len(), 2);
        assert_eq!(report.mismatches[0].step, 0);
        assert_eq!(report.mismatches[1].step, 2);
    }

    #[test]
    fn diff_names_state_and_fields() {
        let spec = switch_spec();
        let vectors = vectors_with(vec![step(
            "TOGGLE",
            ("off", switch_context(false, false)),
            ("off", switch_context(false, false)),
        )]);

        let report = run(&vectors, |state, ctx| {
            Machine::new(Arc::clone(&spec), Some(state), Some(ctx))
        });

        let diffs = &report.mismatches[0].diffs;
        let fields: Vec<&str> = diffs.iter().map(|d| d.field.as_str()).collect();
        assert!(fields.contains(&"state"));
        assert!(fields.contains(&"checked"));
    }

    #[test]
    fn absent_expected_field_shows_in_diff() {
        let spec = switch_spec();
        // Expected context omits "disabled", which the machine carries.
        let mut sparse = Context::new();
        sparse.set("checked", true);

        let vectors = vectors_with(vec![step(
            "TOGGLE",
            ("off", switch_context(false, false)),
            ("on", sparse),
        )]);

        let report = run(&vectors, |state, ctx| {
            Machine::new(Arc::clone(&spec), Some(state), Some(ctx))
        });

        let diff = report.mismatches[0]
            .diffs
            .iter()
            .find(|d| d.field == "disabled")
            .unwrap();
        assert_eq!(diff.expected, None);
        assert_eq!(diff.actual, Some(FieldValue::Bool(false)));
    }

    #[test]
    fn report_display_renders_diffs() {
        let spec = switch_spec();
        let vectors = vectors_with(vec![step(
            "TOGGLE",
            ("off", switch_context(false, false)),
            ("off", switch_context(false, false)),
        )]);

        let report = run(&vectors, |state, ctx| {
            Machine::new(Arc::clone(&spec), Some(state), Some(ctx))
        });

        let rendered = report.to_string();
        assert!(rendered.contains("switch scenario"));
        assert!(rendered.contains("state: expected \"off\", got \"on\""));
    }

    #[test]
    fn empty_vector_file_passes_trivially() {
        let vectors = UnifiedVectorFile {
            component: "empty".into(),
            generated: "2024-01-01T00:00:00Z".parse().unwrap(),
            sources: SourceCounts::default(),
            scenarios: Vec::new(),
        };

        let spec = switch_spec();
        let report = run(&vectors, |state, ctx| {
            Machine::new(Arc::clone(&spec), Some(state), Some(ctx))
        });

        assert!(report.passed());
        assert_eq!(report.steps_run, 0);
    }
}
