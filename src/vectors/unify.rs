//! The unification pipeline: merge raw vector sources into the canonical
//! oracle format.

use super::infer::infer_event;
use super::model::{
    HandVector, Scenario, Snapshot, Source, SourceCounts, TestStep, Trace, UnifiedVectorFile,
};
use chrono::{DateTime, Utc};

/// Merge hand-authored vectors and a model-checker trace into one
/// unified vector file, stamped with the current time.
///
/// Either source may be absent; the corresponding count is zero and
/// unification proceeds with what is present. A component with no
/// scenarios at all produces a valid, empty file.
///
/// Ordering is deterministic: hand-authored scenarios first, in input
/// order, then trace-derived scenarios in trace order.
pub fn unify(
    component: &str,
    hand_authored: Option<&[HandVector]>,
    trace: Option<&Trace>,
) -> UnifiedVectorFile {
    unify_at(component, hand_authored, trace, Utc::now())
}

/// [`unify`] with an explicit timestamp, so output is a pure function of
/// its inputs.
pub fn unify_at(
    component: &str,
    hand_authored: Option<&[HandVector]>,
    trace: Option<&Trace>,
    generated: DateTime<Utc>,
) -> UnifiedVectorFile {
    let mut scenarios = Vec::new();

    let hand_count = hand_authored.map(<[_]>::len).unwrap_or(0);
    if let Some(vectors) = hand_authored {
        for vector in vectors {
            scenarios.push(hand_scenario(vector));
        }
    }

    let trace_scenarios = trace.map(|t| trace_scenarios(component, t)).unwrap_or_default();
    let trace_count = trace_scenarios.len();
    scenarios.extend(trace_scenarios);

    tracing::debug!(
        component,
        hand_authored = hand_count,
        model_checker = trace_count,
        "unified test vectors"
    );

    UnifiedVectorFile {
        component: component.to_string(),
        generated,
        sources: SourceCounts {
            hand_authored: hand_count,
            model_checker: trace_count,
        },
        scenarios,
    }
}

/// Each hand-authored vector is already a single-step scenario.
fn hand_scenario(vector: &HandVector) -> Scenario {
    Scenario {
        name: vector.scenario.clone(),
        source: Source::HandAuthored,
        steps: vec![TestStep {
            event: vector.when.to_uppercase(),
            payload: vector.payload.clone(),
            before: vector.given.clone(),
            after: vector.then.clone(),
        }],
    }
}

/// A trace of N snapshots becomes one scenario of N-1 steps; each
/// consecutive snapshot pair is one step. Traces shorter than two
/// snapshots carry no observable transition and produce nothing.
fn trace_scenarios(component: &str, trace: &Trace) -> Vec<Scenario> {
    if trace.states.len() < 2 {
        return Vec::new();
    }

    let mut steps = Vec::with_capacity(trace.states.len() - 1);
    for pair in trace.states.windows(2) {
        let (before, after) = (&pair[0], &pair[1]);

        // Explicit checker labels beat delta inference every time.
        let (event, payload) = match &after.action {
            Some(label) => (label.to_uppercase(), None),
            None => infer_event(before, after),
        };

        steps.push(TestStep {
            event,
            payload,
            before: Snapshot {
                state: before.state.clone(),
                context: before.context.clone(),
            },
            after: Snapshot {
                state: after.state.clone(),
                context: after.context.clone(),
            },
        });
    }

    vec![Scenario {
        name: format!("{component}-trace"),
        source: Source::ModelChecker,
        steps,
    }]
}
