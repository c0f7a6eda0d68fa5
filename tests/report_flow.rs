//! Integration tests for the report flow through the public library API
//!
//! These tests drive a [`FlowController`] the way a client view would:
//! open with options, submit each step, go back, close, and finally submit
//! the report through a [`SubmissionService`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use reportflow::flow::validation::accept_all;
use reportflow::flow::{
    submit_current_step, FlowController, FlowError, FormData, OpenOptions, StepDescriptor,
    StepOutcome, StepRegistry, StepValidators, StoreSubmissionService, SubmissionError,
    SubmissionReceipt, SubmissionService, Validator,
};
use reportflow::reports::{ReportCategory, ReportFilter, ReportStatus, ReportStore};

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn three_step_flow() -> FlowController {
    let registry = StepRegistry::new(vec![
        StepDescriptor::new("A", "first", ""),
        StepDescriptor::new("B", "second", ""),
        StepDescriptor::new("C", "third", ""),
    ]);
    let validators = StepValidators::new(vec![accept_all as Validator; 3]);
    FlowController::new(Arc::new(registry), Arc::new(validators))
}

fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let hook = count.clone();
    (count, move || {
        hook.fetch_add(1, Ordering::SeqCst);
    })
}

struct UnavailableService;

#[async_trait]
impl SubmissionService for UnavailableService {
    async fn submit(&self, _form: &FormData) -> Result<SubmissionReceipt, SubmissionError> {
        Err(SubmissionError::Unavailable("city backend offline".into()))
    }
}

// ─── Controller Scenarios ─────────────────────────────────────────────────────

#[test]
fn test_three_step_walkthrough_fires_callback_once() {
    let mut flow = three_step_flow();
    let (count, hook) = counter();

    flow.open(OpenOptions::new().on_complete(hook));
    assert_eq!(flow.current_step(), 1);

    assert_eq!(flow.advance(), StepOutcome::Advanced { step: 2 });
    flow.go_back();
    assert_eq!(flow.current_step(), 1);

    flow.advance();
    flow.advance();
    assert_eq!(flow.current_step(), 3);
    assert_eq!(flow.advance(), StepOutcome::Completed);

    assert!(!flow.is_open());
    assert_eq!(count.load(Ordering::SeqCst), 1);

    // Nothing left to complete
    assert_eq!(flow.advance(), StepOutcome::Ignored);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_close_discards_prefill_and_callback() {
    let mut flow = three_step_flow();
    let (count, hook) = counter();

    flow.open(
        OpenOptions::new()
            .prefill(FormData::new().with("category", "noise"))
            .on_complete(hook),
    );
    flow.advance();
    flow.close();

    assert!(!flow.is_open());
    assert_eq!(flow.current_step(), 0);
    assert!(flow.prefill().is_none());

    flow.open(OpenOptions::new());
    assert_eq!(flow.current_step(), 1);
    assert!(flow.form().is_empty());
    flow.advance();
    flow.advance();
    flow.advance();
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn test_report_flow_validation_keeps_step() {
    let mut flow = FlowController::report();
    flow.open(OpenOptions::new());

    let err = flow
        .submit_step(FormData::new().with("category", "volcano"))
        .unwrap_err();
    assert!(matches!(err, FlowError::Validation(_)));
    assert_eq!(flow.current_step(), 1);
    assert!(flow.last_error().is_some());

    let outcome = flow
        .submit_step(FormData::new().with("category", "pothole"))
        .unwrap();
    assert_eq!(outcome, StepOutcome::Advanced { step: 2 });
    assert!(flow.last_error().is_none());
}

// ─── Submission ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_report_submission_stores_report() {
    let store = Arc::new(ReportStore::new());
    let service = StoreSubmissionService::new(store.clone(), std::time::Duration::ZERO);
    let (count, hook) = counter();

    let flow = Mutex::new(FlowController::report());
    flow.lock().await.open(
        OpenOptions::new()
            .prefill(FormData::new().with("category", "water"))
            .on_complete(hook),
    );

    let steps = [
        FormData::new(),
        FormData::new()
            .with("title", "Burst main")
            .with("description", "Water running down the street since dawn"),
        FormData::new()
            .with("latitude", "52.37")
            .with("longitude", "4.89"),
        FormData::new().with("confirmed", true),
    ];

    let mut last = StepOutcome::Ignored;
    for edits in steps {
        last = submit_current_step(&flow, &service, edits).await.unwrap();
    }

    let StepOutcome::Submitted(receipt) = last else {
        panic!("expected a submitted outcome, got {:?}", last);
    };
    assert!(!flow.lock().await.is_open());
    assert_eq!(count.load(Ordering::SeqCst), 1);

    let report = store.get(receipt.report_id).await.unwrap();
    assert_eq!(report.category, ReportCategory::Water);
    assert_eq!(report.status, ReportStatus::Submitted);
    assert_eq!(report.location.latitude, Some(52.37));

    let water = store
        .list(&ReportFilter {
            category: Some(ReportCategory::Water),
            status: None,
        })
        .await;
    assert_eq!(water.len(), 1);
}

#[tokio::test]
async fn test_failed_submission_keeps_final_step_open() {
    let (count, hook) = counter();
    let flow = Mutex::new(FlowController::report());
    flow.lock().await.open(
        OpenOptions::new()
            .prefill(
                FormData::new()
                    .with("category", "trash")
                    .with("title", "Overflowing bin")
                    .with("description", "Bin at the park entrance is overflowing")
                    .with("address", "Park Rd 1"),
            )
            .on_complete(hook),
    );

    for _ in 0..3 {
        submit_current_step(&flow, &UnavailableService, FormData::new())
            .await
            .unwrap();
    }

    let err = submit_current_step(
        &flow,
        &UnavailableService,
        FormData::new().with("confirmed", true),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, FlowError::Submission(_)));
    assert!(err.is_recoverable());

    let flow = flow.lock().await;
    assert!(flow.is_open());
    assert_eq!(flow.current_step(), 4);
    assert!(!flow.is_submitting());
    assert!(flow
        .last_error()
        .is_some_and(|e| e.contains("city backend offline")));
    assert_eq!(count.load(Ordering::SeqCst), 0);
}
