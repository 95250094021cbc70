//! Event inference from model-checker snapshot deltas.
//!
//! Traces without explicit `_action` labels only show consecutive
//! (state, context) snapshots; the event between them has to be inferred
//! from what changed. This is a heuristic, not a derivation: the rules
//! below cover the single-field deltas the component family actually
//! produces, and anything they cannot name confidently becomes the
//! [`AMBIGUOUS_EVENT`] sentinel so the conformance run fails loudly
//! instead of silently passing on a wrong guess.

use super::model::TraceSnapshot;
use crate::spec::{Context, Payload};

/// Sentinel event name emitted when no inference rule applies.
///
/// No spec declares a transition for it, so a step carrying it always
/// surfaces as a visible conformance mismatch.
pub const AMBIGUOUS_EVENT: &str = "__AMBIGUOUS__";

/// Boolean-flip rules in priority order: (field, event-when-true,
/// event-when-false).
const BOOL_RULES: &[(&str, &str, &str)] = &[
    ("checked", "TOGGLE", "TOGGLE"),
    ("indeterminate", "SET_INDETERMINATE", "CLEAR_INDETERMINATE"),
    ("focused", "FOCUS", "BLUR"),
    ("pressed", "PRESS_DOWN", "PRESS_UP"),
    ("loading", "START_LOADING", "STOP_LOADING"),
    ("open", "OPEN", "CLOSE"),
];

/// Selection-field rules: (field, event, payload key carrying the new
/// value).
const SELECTION_RULES: &[(&str, &str, &str)] = &[
    ("selectedId", "SELECT", "id"),
    ("selectedValue", "SELECT", "value"),
    ("highlightedValue", "HIGHLIGHT", "value"),
    ("focusedId", "FOCUS_NEXT", "id"),
];

/// State-pair rules for deltas with no context change at all.
const STATE_RULES: &[(&str, &str, &str)] = &[
    ("idle", "focused", "FOCUS"),
    ("focused", "idle", "BLUR"),
    ("closed", "open", "OPEN"),
    ("open", "closed", "CLOSE"),
    ("open", "closing", "CLOSE"),
    ("closing", "closed", "CLOSE_COMPLETE"),
];

/// Infer the event between two consecutive trace snapshots.
///
/// Returns the event name and, for selection-style events, the payload
/// reconstructed from the observed new value.
pub(crate) fn infer_event(
    before: &TraceSnapshot,
    after: &TraceSnapshot,
) -> (String, Option<Payload>) {
    for (field, when_true, when_false) in BOOL_RULES {
        if changed(&before.context, &after.context, field) {
            let value = after.context.bool_field(field);
            let event = if value { when_true } else { when_false };
            return (event.to_string(), None);
        }
    }

    for (field, event, payload_key) in SELECTION_RULES {
        if changed(&before.context, &after.context, field) {
            let payload = after.context.get(field).cloned().map(|value| {
                let mut p = Payload::new();
                p.insert(payload_key.to_string(), value);
                p
            });
            return (event.to_string(), payload);
        }
    }

    if before.context == after.context && before.state != after.state {
        for (from, to, event) in STATE_RULES {
            if before.state == *from && after.state == *to {
                return (event.to_string(), None);
            }
        }
    }

    tracing::warn!(
        before = %before.state,
        after = %after.state,
        "no inference rule matched snapshot delta; emitting sentinel"
    );
    (AMBIGUOUS_EVENT.to_string(), None)
}

fn changed(before: &Context, after: &Context, field: &str) -> bool {
    before.get(field) != after.get(field) && after.get(field).is_some()
}
