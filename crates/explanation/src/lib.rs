//! Explanation Recorder
//!
//! Ordered audit trail of one inference call, plus a bounded store that keeps
//! recent trails addressable by inference id.

mod store;
mod trail;

pub use store::{ExplanationStore, StoreConfig};
pub use trail::{ExplanationTrail, InsightBlock, RuleScore, Step, StepKind};

use thiserror::Error;

/// Explanation errors
#[derive(Debug, Error)]
pub enum ExplanationError {
    #[error("Step {attempted} recorded after {last}")]
    OutOfOrder { last: StepKind, attempted: StepKind },
    #[error("Step {0} already recorded")]
    Duplicate(StepKind),
    #[error("Explanation not found: {0}")]
    NotFound(uuid::Uuid),
    #[error("Export failed: {0}")]
    Io(#[from] std::io::Error),
}
