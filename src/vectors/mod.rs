//! Vector unification: the offline pipeline that merges hand-authored
//! scenario vectors and model-checker traces into one canonical oracle
//! format per component.
//!
//! - Raw inputs: [`HandVector`] (given/when/then) and [`Trace`]
//!   (snapshot sequences, optionally event-labeled)
//! - Output: [`UnifiedVectorFile`], the only format the conformance
//!   runner consumes
//! - Event inference from snapshot deltas is heuristic; unresolvable
//!   deltas become the [`AMBIGUOUS_EVENT`] sentinel rather than a guess

mod infer;
mod model;
mod unify;

pub use infer::AMBIGUOUS_EVENT;
pub use model::{
    HandVector, Scenario, Snapshot, Source, SourceCounts, TestStep, Trace, TraceSnapshot,
    UnifiedVectorFile, VectorError,
};
pub use unify::{unify, unify_at};
