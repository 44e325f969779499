//! Sequential, fail-fast workflow pipelines.
//!
//! A [`Pipeline`] executes a named, ordered sequence of steps over a shared
//! [`StepContext`], aborting on the first failure and returning a full
//! [`PipelineReport`]. Each step receives the running context and returns the
//! fields to merge into it; later steps' fields overwrite earlier ones on key
//! collision.
//!
//! The pipeline has no awareness of rate limiting or circuit breaking. A
//! step action invokes those itself, which keeps orchestration independent of
//! fault-tolerance policy.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod context;
mod pipeline;
mod report;
mod step;

pub use context::StepContext;
pub use pipeline::{Pipeline, PipelineBuilder};
pub use report::{PipelineReport, StepReport};
pub use step::{FnStep, Step};
