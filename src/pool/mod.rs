//! Worker pool layer
//!
//! - [`queue`]: pre-filled work queue and the fixed-size worker pool
//! - [`logger`]: single-writer output sink shared by the workers

pub mod logger;
pub mod queue;

pub use logger::{Logger, LoggerHandle};
pub use queue::{PoolReport, WorkQueue, run, worker_count};
