use crate::schedule::Schedule;
use std::collections::BTreeMap;

/// Transient display state of every toggle control, keyed by task id.
/// Rebuilt from storage on each page load.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    toggles: BTreeMap<String, bool>,
}

impl ViewState {
    pub fn new(schedule: &Schedule) -> Self {
        Self {
            toggles: schedule
                .tasks()
                .map(|task| (task.id.clone(), false))
                .collect(),
        }
    }

    /// Returns false when no toggle is declared for `task_id`.
    pub fn set_completed(&mut self, task_id: &str, completed: bool) -> bool {
        match self.toggles.get_mut(task_id) {
            Some(state) => {
                *state = completed;
                true
            }
            None => false,
        }
    }

    /// Flips a toggle and returns its new state.
    pub fn flip(&mut self, task_id: &str) -> Option<bool> {
        let state = self.toggles.get_mut(task_id)?;
        *state = !*state;
        Some(*state)
    }

    pub fn is_completed(&self, task_id: &str) -> bool {
        self.toggles.get(task_id).copied().unwrap_or(false)
    }

    pub fn total_tasks(&self) -> usize {
        self.toggles.len()
    }

    pub fn completed_tasks(&self) -> usize {
        self.toggles.values().filter(|completed| **completed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_view_has_every_task_uncompleted() {
        let schedule = Schedule::builtin();
        let view = ViewState::new(&schedule);
        assert_eq!(view.total_tasks(), schedule.task_count());
        assert_eq!(view.completed_tasks(), 0);
    }

    #[test]
    fn unknown_ids_are_not_tracked() {
        let mut view = ViewState::new(&Schedule::builtin());
        assert!(!view.set_completed("nope", true));
        assert_eq!(view.flip("nope"), None);
        assert_eq!(view.completed_tasks(), 0);
    }

    #[test]
    fn flip_alternates_state() {
        let mut view = ViewState::new(&Schedule::builtin());
        assert_eq!(view.flip("monday-2"), Some(true));
        assert!(view.is_completed("monday-2"));
        assert_eq!(view.flip("monday-2"), Some(false));
        assert_eq!(view.completed_tasks(), 0);
    }
}
