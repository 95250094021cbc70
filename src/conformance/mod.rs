//! Conformance runner: the oracle proving interpreter implementations
//! agree.
//!
//! [`run`] replays a unified vector file against machines produced by a
//! factory closure, comparing every step's observed (state, context)
//! against the expected snapshot with exact equality and collecting
//! every mismatch before returning. Running the same file through a
//! second factory bound to the compiled twin is what establishes
//! cross-runtime parity; a divergence found this way is a behavioral bug
//! in one of the engines, not a harness artifact.

mod runner;

pub use runner::{run, ConformanceReport, FieldDiff, Mismatch};
