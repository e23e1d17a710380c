use crate::errors::StoreError;
use crate::models::START_DATE_KEY;
use crate::storage::{LocalStore, StoreOutcome};
use crate::view::ViewState;
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub applied: usize,
    pub ignored: usize,
}

/// Persists a toggle: completed tasks get a record, uncompleted ones lose it.
pub async fn toggle(
    store: &mut LocalStore,
    task_id: &str,
    completed: bool,
    now: DateTime<Utc>,
) -> Result<StoreOutcome, StoreError> {
    let outcome = if completed {
        store.put_completion(task_id, now).await?
    } else {
        store.delete_completion(task_id).await?
    };
    debug!(task_id, completed, ?outcome, "toggle persisted");
    Ok(outcome)
}

/// Applies stored completions onto the view. Only reads from the store.
pub fn reconcile_on_load(store: &LocalStore, view: &mut ViewState) -> Reconciliation {
    let mut summary = Reconciliation::default();
    for record in store.get_all_completions() {
        if !record.completed {
            debug!(task_id = %record.id, "ignoring stored record not marked completed");
            summary.ignored += 1;
        } else if view.set_completed(&record.id, true) {
            summary.applied += 1;
        } else {
            debug!(task_id = %record.id, "stored completion has no matching task");
            summary.ignored += 1;
        }
    }
    summary
}

/// Records the start date the first time the routine is opened. An existing
/// value is never overwritten.
pub async fn ensure_start_date(
    store: &mut LocalStore,
    now: DateTime<Utc>,
) -> Result<Option<serde_json::Value>, StoreError> {
    if let Some(setting) = store.get_setting(START_DATE_KEY) {
        return Ok(Some(setting.value));
    }

    let value = serde_json::Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true));
    match store.put_setting(START_DATE_KEY, value.clone()).await? {
        StoreOutcome::Applied => {
            info!(start_date = %value, "recorded routine start date");
            Ok(Some(value))
        }
        StoreOutcome::Skipped => Ok(None),
    }
}
