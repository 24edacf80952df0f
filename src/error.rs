use thiserror::Error;

/// Errors surfaced to administrative callers of the engine
///
/// Probe failures are never errors: they fold into a `Down` outcome and
/// flow through the engine as ordinary data.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("target not found")]
    TargetNotFound,

    #[error("a target for this endpoint already exists")]
    DuplicateTarget,

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("unsupported check interval: {0}s")]
    InvalidInterval(u64),

    #[error("no settings provided to update")]
    EmptyUpdate,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
