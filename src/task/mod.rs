//! Recommendation tasks and their scheduling.
//!
//! - [`SelectionTask`]: evaluates recommenders and persists which are active
//! - [`TrainingTask`]: follow-on training, scheduled by a successful selection
//! - [`WorkerPoolScheduler`]: runs tasks on a bounded pool of tokio workers

mod context;
mod monitor;
mod scheduler;
pub mod selection;
mod services;
mod training;
mod traits;

pub use context::TaskContext;
pub use monitor::TaskMonitor;
pub use scheduler::{TaskEvent, WorkerPoolScheduler};
pub use selection::{CorpusLoader, SelectionOutcome, SelectionTask};
pub use services::RecommendationServices;
pub use training::{TrainingStage, TrainingTask};
pub use traits::{Task, TaskScheduler};
