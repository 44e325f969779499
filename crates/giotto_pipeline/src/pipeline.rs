//! Pipeline construction and execution.

use crate::{FnStep, PipelineReport, Step, StepContext, StepReport};
use giotto_error::GiottoResult;
use std::future::Future;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// An ordered, fail-fast executor of named steps.
///
/// Built once through [`Pipeline::builder`] and immutable afterwards. Steps
/// execute strictly in declaration order; the first failure halts execution
/// and later steps never run.
///
/// # Examples
///
/// ```rust,ignore
/// use giotto_pipeline::{Pipeline, StepContext};
///
/// let pipeline = Pipeline::builder("post_content")
///     .step_fn("generate", |context| async move {
///         let mut out = StepContext::new();
///         out.set("content", "a fresco a day");
///         Ok(out)
///     })
///     .step_fn("post", |context: StepContext| async move {
///         let content = context.get_str("content").unwrap_or_default().to_string();
///         let mut out = StepContext::new();
///         out.set("post_id", publish(&content).await?);
///         Ok(out)
///     })
///     .build();
///
/// let report = pipeline.execute(StepContext::new()).await;
/// assert!(report.success());
/// ```
pub struct Pipeline {
    name: String,
    steps: Vec<Box<dyn Step>>,
}

impl Pipeline {
    /// Creates a builder for a pipeline with the given name.
    pub fn builder(name: impl Into<String>) -> PipelineBuilder {
        PipelineBuilder {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Name of the pipeline.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of declared steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the pipeline declares no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Executes every step in declaration order over `initial`.
    ///
    /// Each step receives the running context and its returned fields are
    /// merged in (later fields overwrite earlier ones). The first failing
    /// step halts execution: its error is recorded in the report and the
    /// remaining steps are omitted. An empty pipeline succeeds with the
    /// initial context unchanged.
    #[instrument(skip(self, initial), fields(pipeline = %self.name, steps = self.steps.len()))]
    pub async fn execute(&self, initial: StepContext) -> PipelineReport {
        let mut context = initial;
        let mut results = Vec::with_capacity(self.steps.len());
        let mut success = true;

        for step in &self.steps {
            debug!(step = step.name(), "executing step");
            let started = Instant::now();
            match step.run(context.clone()).await {
                Ok(output) => {
                    let duration_ms = started.elapsed().as_millis() as u64;
                    debug!(step = step.name(), duration_ms, "step succeeded");
                    context = context.merged(output);
                    results.push(StepReport::succeeded(step.name(), duration_ms));
                }
                Err(e) => {
                    let duration_ms = started.elapsed().as_millis() as u64;
                    error!(
                        step = step.name(),
                        duration_ms,
                        error = %e,
                        "step failed, aborting pipeline"
                    );
                    results.push(StepReport::failed(step.name(), duration_ms, e.to_string()));
                    success = false;
                    break;
                }
            }
        }

        info!(
            executed = results.len(),
            declared = self.steps.len(),
            success,
            "pipeline finished"
        );
        PipelineReport::new(self.name.clone(), success, results, context)
    }
}

/// Accumulates named steps for a [`Pipeline`].
///
/// Each appender returns the builder with the step added, so workflows can
/// declare their sequence in one expression.
pub struct PipelineBuilder {
    name: String,
    steps: Vec<Box<dyn Step>>,
}

impl PipelineBuilder {
    /// Appends a step.
    pub fn step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Appends an async closure as a named step.
    pub fn step_fn<F, Fut>(self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(StepContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = GiottoResult<StepContext>> + Send + 'static,
    {
        self.step(FnStep::new(name, action))
    }

    /// Finalizes the pipeline.
    pub fn build(self) -> Pipeline {
        Pipeline {
            name: self.name,
            steps: self.steps,
        }
    }
}
