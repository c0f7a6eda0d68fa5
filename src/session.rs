//! Per-session flow controllers.
//!
//! Every session owns its own [`FlowController`]; nothing is shared across
//! sessions. Actions within a session are serialised by the controller mutex.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::flow::{FlowController, FormData, OpenOptions, StepRegistry, StepValidators};

/// A client session and its report flow
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub flow: Mutex<FlowController>,
    completed: Arc<AtomicU64>,
    /// Unix millis of the last lookup
    last_active: AtomicI64,
}

impl Session {
    fn new(flow: FlowController, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            flow: Mutex::new(flow),
            completed: Arc::new(AtomicU64::new(0)),
            last_active: AtomicI64::new(now.timestamp_millis()),
        }
    }

    fn touch(&self, now: DateTime<Utc>) {
        self.last_active
            .store(now.timestamp_millis(), Ordering::SeqCst);
    }

    fn last_active_millis(&self) -> i64 {
        self.last_active.load(Ordering::SeqCst)
    }

    /// Whether the session has been idle longer than `timeout` at `now`
    pub fn is_idle(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        let idle_ms = now.timestamp_millis() - self.last_active_millis();
        idle_ms > i64::try_from(timeout.as_millis()).unwrap_or(i64::MAX)
    }

    /// Number of flows this session has completed
    pub fn completed_flows(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    /// Open the report flow; completion is counted on the session
    pub async fn open_flow(&self, prefill: Option<FormData>) {
        let completed = self.completed.clone();
        let session_id = self.id;
        let mut options = OpenOptions::new().on_complete(move || {
            completed.fetch_add(1, Ordering::SeqCst);
            info!(session = %session_id, "report flow completed");
        });
        options.prefill = prefill;
        self.flow.lock().await.open(options);
    }
}

/// Bounds on how many sessions are kept and for how long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// Sessions untouched for longer than this are evicted
    pub idle_timeout: Duration,
    /// Once reached, the least recently active session makes room
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30 * 60),
            max_sessions: 1000,
        }
    }
}

/// Registry of live sessions
#[derive(Debug)]
pub struct SessionRegistry {
    steps: Arc<StepRegistry>,
    validators: Arc<StepValidators>,
    limits: SessionLimits,
    sessions: RwLock<HashMap<Uuid, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new(steps: Arc<StepRegistry>, validators: Arc<StepValidators>) -> Self {
        Self {
            steps,
            validators,
            limits: SessionLimits::default(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Registry whose sessions run the built-in report flow
    pub fn report() -> Self {
        Self::new(
            Arc::new(StepRegistry::report()),
            Arc::new(StepValidators::report()),
        )
    }

    pub fn with_limits(mut self, limits: SessionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> SessionLimits {
        self.limits
    }

    pub fn steps(&self) -> &StepRegistry {
        &self.steps
    }

    /// Create a session, evicting idle ones and enforcing the session cap
    pub async fn create(&self) -> Arc<Session> {
        let now = Utc::now();
        let session = Arc::new(Session::new(
            FlowController::new(self.steps.clone(), self.validators.clone()),
            now,
        ));

        let mut evicted = self.evict_idle(now).await;
        let mut sessions = self.sessions.write().await;
        while !sessions.is_empty() && sessions.len() >= self.limits.max_sessions {
            let oldest = sessions
                .values()
                .min_by_key(|s| s.last_active_millis())
                .map(|s| s.id);
            let Some(id) = oldest.and_then(|id| sessions.remove(&id)) else {
                break;
            };
            evicted.push(id.id);
        }
        sessions.insert(session.id, session.clone());
        drop(sessions);

        if !evicted.is_empty() {
            info!(count = evicted.len(), "sessions evicted");
        }
        debug!(session = %session.id, "session created");
        session
    }

    /// Look up a live session and mark it active
    pub async fn get(&self, id: Uuid) -> Option<Arc<Session>> {
        let now = Utc::now();
        let session = self.sessions.read().await.get(&id).cloned()?;
        if session.is_idle(now, self.limits.idle_timeout) {
            self.remove(id).await;
            return None;
        }
        session.touch(now);
        Some(session)
    }

    /// Drop a session; any open flow is closed without completing
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(session) => {
                session.flow.lock().await.close();
                debug!(session = %id, "session removed");
                true
            }
            None => false,
        }
    }

    /// Remove sessions idle at `now`, closing their flows; returns their ids
    pub async fn evict_idle(&self, now: DateTime<Utc>) -> Vec<Uuid> {
        let expired: Vec<Arc<Session>> = {
            let mut sessions = self.sessions.write().await;
            let ids: Vec<Uuid> = sessions
                .values()
                .filter(|s| s.is_idle(now, self.limits.idle_timeout))
                .map(|s| s.id)
                .collect();
            ids.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        for session in &expired {
            session.flow.lock().await.close();
            debug!(session = %session.id, "idle session evicted");
        }
        expired.iter().map(|s| s.id).collect()
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
