/// Monitoring engine
///
/// This module owns the full monitoring cycle:
/// - Probing endpoints with a bounded timeout
/// - Aggregating availability counters
/// - Detecting status transitions
/// - Supervising one periodic loop per target
pub mod prober;
pub mod stats;
pub mod supervisor;
pub mod transition;
pub mod types;


pub use prober::Prober;
pub use supervisor::{LoopState, MonitorSupervisor};
pub use types::{CheckOutcome, TargetStatus};
