//! Execution-order, fail-fast, and merge tests for the pipeline executor.

use giotto_error::{GiottoErrorKind, GiottoResult, OperationError, OperationErrorKind};
use giotto_pipeline::{Pipeline, Step, StepContext};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn step_error(message: &str) -> giotto_error::GiottoError {
    OperationError::new(OperationErrorKind::Provider(message.to_string())).into()
}

#[tokio::test]
async fn all_steps_succeed_and_fields_accumulate() {
    let pipeline = Pipeline::builder("post_content")
        .step_fn("generate", |_context| async move {
            let mut out = StepContext::new();
            out.set("content", "first draft");
            out.set("model", "fresco-1");
            Ok(out)
        })
        .step_fn("review", |context: StepContext| async move {
            assert_eq!(context.get_str("content"), Some("first draft"));
            let mut out = StepContext::new();
            out.set("content", "polished draft");
            out.set("approved", true);
            Ok(out)
        })
        .step_fn("post", |context: StepContext| async move {
            assert_eq!(context.get_str("content"), Some("polished draft"));
            let mut out = StepContext::new();
            out.set("post_id", 99);
            Ok(out)
        })
        .build();

    let mut initial = StepContext::new();
    initial.set("author", "bot");
    let report = pipeline.execute(initial).await;

    assert!(report.success());
    assert_eq!(report.results().len(), 3);
    assert!(report.results().iter().all(|r| *r.success()));

    let context = report.final_context();
    // Later steps' fields overwrite earlier ones on key collision.
    assert_eq!(context.get_str("content"), Some("polished draft"));
    assert_eq!(context.get_str("author"), Some("bot"));
    assert_eq!(context.get_str("model"), Some("fresco-1"));
    assert_eq!(context.get_as::<i64>("post_id").unwrap(), 99);
}

#[tokio::test]
async fn failing_step_halts_execution() {
    let third_ran = Arc::new(AtomicUsize::new(0));
    let third_probe = Arc::clone(&third_ran);

    let pipeline = Pipeline::builder("post_content")
        .step_fn("a", |_context| async move {
            let mut out = StepContext::new();
            out.set("from_a", 1);
            Ok(out)
        })
        .step_fn("b", |_context| async move {
            Err::<StepContext, _>(step_error("generation quota exhausted"))
        })
        .step_fn("c", move |_context| {
            let third_probe = Arc::clone(&third_probe);
            async move {
                third_probe.fetch_add(1, Ordering::SeqCst);
                Ok(StepContext::new())
            }
        })
        .build();

    let report = pipeline.execute(StepContext::new()).await;

    assert!(!report.success());
    assert_eq!(report.results().len(), 2);

    let a = &report.results()[0];
    assert_eq!(a.step_name(), "a");
    assert!(a.success());

    let b = &report.results()[1];
    assert_eq!(b.step_name(), "b");
    assert!(!b.success());
    assert!(
        b.error()
            .as_deref()
            .unwrap()
            .contains("generation quota exhausted")
    );

    // Step c never executed and is absent from the report.
    assert_eq!(third_ran.load(Ordering::SeqCst), 0);
    // Final context reflects the last successful step.
    assert_eq!(report.final_context().get_as::<i64>("from_a").unwrap(), 1);
}

#[tokio::test]
async fn into_result_surfaces_the_failing_step() {
    let pipeline = Pipeline::builder("post_content")
        .step_fn("generate", |_context| async move {
            Err::<StepContext, _>(step_error("model unavailable"))
        })
        .build();

    let err = pipeline
        .execute(StepContext::new())
        .await
        .into_result()
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        GiottoErrorKind::Pipeline(p)
            if matches!(
                &p.kind,
                giotto_error::PipelineErrorKind::StepFailed { step, .. } if step == "generate"
            )
    ));
}

#[tokio::test]
async fn empty_pipeline_succeeds_with_initial_context() {
    let pipeline = Pipeline::builder("noop").build();
    assert!(pipeline.is_empty());

    let mut initial = StepContext::new();
    initial.set("seed", 7);
    let report = pipeline.execute(initial.clone()).await;

    assert!(report.success());
    assert!(report.results().is_empty());
    assert_eq!(*report.final_context(), initial);
}

#[tokio::test]
async fn trait_steps_and_closure_steps_compose() {
    struct CountStep {
        name: String,
        counter: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Step for CountStep {
        fn name(&self) -> &str {
            &self.name
        }

        async fn run(&self, _context: StepContext) -> GiottoResult<StepContext> {
            let order = self.counter.fetch_add(1, Ordering::SeqCst);
            let mut out = StepContext::new();
            out.set(self.name.clone(), order as i64);
            Ok(out)
        }
    }

    let counter = Arc::new(AtomicUsize::new(0));
    let pipeline = Pipeline::builder("mixed")
        .step(CountStep {
            name: "first".to_string(),
            counter: Arc::clone(&counter),
        })
        .step(CountStep {
            name: "second".to_string(),
            counter: Arc::clone(&counter),
        })
        .step_fn("third", |context: StepContext| async move {
            assert_eq!(context.get_as::<i64>("first").unwrap(), 0);
            assert_eq!(context.get_as::<i64>("second").unwrap(), 1);
            Ok(StepContext::new())
        })
        .build();

    let report = pipeline.execute(StepContext::new()).await;
    assert!(report.success());
    assert_eq!(pipeline.len(), 3);
}
