//! API state management for the REST server.

use std::sync::Arc;

use crate::config::Config;
use crate::flow::{StoreSubmissionService, SubmissionService};
use crate::reports::ReportStore;
use crate::session::SessionRegistry;

/// Shared state for the REST API
#[derive(Clone)]
pub struct ApiState {
    /// Live sessions, each with its own report flow
    pub sessions: Arc<SessionRegistry>,
    pub reports: Arc<ReportStore>,
    /// Where completed report flows are sent
    pub submission: Arc<dyn SubmissionService>,
    pub config: Arc<Config>,
}

impl ApiState {
    /// Create new API state from config
    pub fn new(config: Config) -> Self {
        let reports = Arc::new(if config.server.seed_sample_reports {
            ReportStore::with_sample_data()
        } else {
            ReportStore::new()
        });
        let submission = Arc::new(StoreSubmissionService::new(
            reports.clone(),
            config.submission.simulated_delay(),
        ));

        Self {
            sessions: Arc::new(
                SessionRegistry::report().with_limits(config.server.session_limits()),
            ),
            reports,
            submission,
            config: Arc::new(config),
        }
    }

    /// Replace the submission service, e.g. with a test double
    pub fn with_submission(mut self, submission: Arc<dyn SubmissionService>) -> Self {
        self.submission = submission;
        self
    }
}
