pub mod config;
pub mod error;
pub mod logging;
pub mod runner;

pub use config::RunnerConfig;
pub use error::RunnerError;
pub use logging::{init_logging, LogFormat};
pub use runner::{QuotaChangeRunner, RunSummary};
