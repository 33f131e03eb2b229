use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A cycle is already in flight; the trigger was refused rather than
    /// letting two cycles interleave on the shared index.
    #[error("a cycle is already in progress")]
    CycleInProgress,
}
