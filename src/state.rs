use crate::progress;
use crate::schedule::Schedule;
use crate::storage::LocalStore;
use crate::view::ViewState;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Store and view state live behind one lock so a load or toggle runs as a single sequence.
pub struct Session {
    pub store: LocalStore,
    pub view: ViewState,
}

impl Session {
    /// Discards the current view and rebuilds it from stored completions.
    pub fn reload(&mut self, schedule: &Schedule) {
        self.view = ViewState::new(schedule);
        let summary = progress::reconcile_on_load(&self.store, &mut self.view);
        debug!(applied = summary.applied, ignored = summary.ignored, "reconciled stored progress");
    }
}

#[derive(Clone)]
pub struct AppState {
    pub schedule: Arc<Schedule>,
    pub session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn new(schedule: Schedule, store: LocalStore) -> Self {
        let mut session = Session {
            store,
            view: ViewState::default(),
        };
        session.reload(&schedule);
        Self {
            schedule: Arc::new(schedule),
            session: Arc::new(Mutex::new(session)),
        }
    }
}
