//! Run-scoped domain types shared by the engine.
pub mod run;

pub use run::{Credential, Deadline, RateTarget, RunConfig, WorkloadKind, WorkloadSpec};
