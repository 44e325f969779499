//! The step trait and closure adapter.

use crate::StepContext;
use futures::future::BoxFuture;
use giotto_error::GiottoResult;
use std::future::Future;

/// One named unit of work in a pipeline.
///
/// A step receives the current context and returns the fields to merge into
/// it. Returning an error aborts the pipeline; every later step is skipped.
///
/// Implement this for reusable workflow stages, or use [`FnStep`] /
/// [`PipelineBuilder::step_fn`](crate::PipelineBuilder::step_fn) for one-off
/// closures.
#[async_trait::async_trait]
pub trait Step: Send + Sync {
    /// Name of the step, used in reports and logs.
    fn name(&self) -> &str;

    /// Runs the step over the current context.
    async fn run(&self, context: StepContext) -> GiottoResult<StepContext>;
}

/// Adapts an async closure into a [`Step`].
///
/// # Examples
///
/// ```rust,ignore
/// use giotto_pipeline::{FnStep, StepContext};
///
/// let step = FnStep::new("annotate", |context: StepContext| async move {
///     let mut out = StepContext::new();
///     out.set("annotated", true);
///     Ok(out)
/// });
/// ```
pub struct FnStep {
    name: String,
    action: Box<dyn Fn(StepContext) -> BoxFuture<'static, GiottoResult<StepContext>> + Send + Sync>,
}

impl FnStep {
    /// Wraps an async closure under the given step name.
    pub fn new<F, Fut>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn(StepContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = GiottoResult<StepContext>> + Send + 'static,
    {
        Self {
            name: name.into(),
            action: Box::new(move |context| Box::pin(action(context))),
        }
    }
}

#[async_trait::async_trait]
impl Step for FnStep {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, context: StepContext) -> GiottoResult<StepContext> {
        (self.action)(context).await
    }
}
