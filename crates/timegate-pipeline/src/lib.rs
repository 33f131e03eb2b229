//! Cycle orchestration: settle-all device fan-out, signature dedup,
//! persistence, forwarding, and the fixed-interval scheduler.

mod context;
mod error;
mod forward;
mod pipeline;
mod scheduler;

pub use context::PipelineContext;
pub use error::PipelineError;
pub use forward::Forwarder;
pub use pipeline::Pipeline;
pub use scheduler::run_scheduler;
