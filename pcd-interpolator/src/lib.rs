pub mod cancel;
pub mod config;
pub mod error;
pub mod filter;
pub mod host;
pub mod idw;
pub mod index;
pub mod progress;
pub mod scheduler;
pub mod task;

pub use cancel::CancelFlag;
pub use config::{Attribute, ClassFilter, ReturnPolicy, RunConfig, RunConfigBuilder};
pub use error::{ConfigError, InterpolationError, RunError};
pub use host::Host;
pub use scheduler::{FileScheduler, RunSummary};
pub use task::{TaskDescriptor, TaskOutcome};
