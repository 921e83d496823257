//! Pure scheduling logic for docmyfiles.
//!
//! Everything in this crate is deterministic and free of I/O: the
//! batch planner packs messages under a token ceiling, the throughput
//! governor decides when the submission loop must pause, and the
//! aggregation builder assembles (and bounds-checks) the final merge
//! request. The orchestrator in `dmf-cli` owns all side effects.

pub mod aggregate;
pub mod batch;
pub mod governor;

pub use aggregate::Report;
pub use batch::{Batch, BatchPlanner, PlanResult};
pub use governor::ThroughputGovernor;
