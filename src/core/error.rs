use thiserror::Error;

#[derive(Error, Debug)]
pub enum HotswapError {
    #[error("Instrumentation error: {0}")]
    Instrumentation(String),

    #[error("Rebuild failed: {0}")]
    RebuildFailed(String),

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Factory error: {0}")]
    Factory(String),

    #[error("Lock error: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, HotswapError>;

impl<T> From<std::sync::PoisonError<T>> for HotswapError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Lock(err.to_string())
    }
}
