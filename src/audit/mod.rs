//! Repeated engine runs to compare realized pattern shares with their targets.

pub mod evaluation;
pub mod output;

pub use evaluation::{run_audit, AuditReport, PatternShare, RunMetrics};
pub use output::{print_audit, write_audit_csv};
