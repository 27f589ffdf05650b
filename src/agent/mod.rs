//! Rule repair around the planning engine.

mod apply;
mod cancel;
mod events;
mod orchestrator;
mod report;
mod services;

pub use apply::apply_modifications;
pub use cancel::CancellationFlag;
pub use events::{map_violations_to_conflicts, AffectedMeal, ConflictDetail, ProgressEvent};
pub use orchestrator::{plan_with_timeout, run_repair_loop, ProgressFn, RepairRequest};
pub use report::{AgentLog, AgentLogEntry, AgentResult, AgentStats, FinalStatus};
pub use services::{ModificationSuggester, RuleValidator, ServiceError, ValidationOutcome};
