use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub id: String,
    pub time: String,
    pub title: String,
    #[serde(default)]
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleDay {
    pub id: String,
    pub label: String,
    pub tasks: Vec<ScheduledTask>,
}

/// The weekly plan repeated across the 90-day program. Each task carries the
/// id its toggle control is rendered with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub days: Vec<ScheduleDay>,
}

#[derive(Debug)]
pub enum ScheduleError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Empty,
    EmptyId,
    DuplicateTaskId(String),
    DuplicateDayId(String),
    Placeholder(String),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::Io(err) => write!(f, "failed to read schedule: {err}"),
            ScheduleError::Parse(err) => write!(f, "failed to parse schedule: {err}"),
            ScheduleError::Empty => write!(f, "schedule has no days"),
            ScheduleError::EmptyId => write!(f, "schedule contains an empty id"),
            ScheduleError::DuplicateTaskId(id) => write!(f, "duplicate task id '{id}'"),
            ScheduleError::DuplicateDayId(id) => write!(f, "duplicate day id '{id}'"),
            ScheduleError::Placeholder(text) => {
                write!(f, "schedule text must not contain '{{{{': '{text}'")
            }
        }
    }
}

impl std::error::Error for ScheduleError {}

impl Schedule {
    pub async fn load(path: &Path) -> Result<Self, ScheduleError> {
        let bytes = fs::read(path).await.map_err(ScheduleError::Io)?;
        let schedule: Schedule = serde_json::from_slice(&bytes).map_err(ScheduleError::Parse)?;
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.days.is_empty() {
            return Err(ScheduleError::Empty);
        }

        let mut day_ids = HashSet::new();
        let mut task_ids = HashSet::new();
        for day in &self.days {
            if day.id.trim().is_empty() {
                return Err(ScheduleError::EmptyId);
            }
            if !day_ids.insert(day.id.as_str()) {
                return Err(ScheduleError::DuplicateDayId(day.id.clone()));
            }
            reject_placeholder(&[day.id.as_str(), day.label.as_str()])?;
            for task in &day.tasks {
                reject_placeholder(&[
                    task.id.as_str(),
                    task.time.as_str(),
                    task.title.as_str(),
                    task.detail.as_str(),
                ])?;
                if task.id.trim().is_empty() {
                    return Err(ScheduleError::EmptyId);
                }
                if !task_ids.insert(task.id.as_str()) {
                    return Err(ScheduleError::DuplicateTaskId(task.id.clone()));
                }
            }
        }
        Ok(())
    }

    pub fn tasks(&self) -> impl Iterator<Item = &ScheduledTask> {
        self.days.iter().flat_map(|day| day.tasks.iter())
    }

    pub fn task_count(&self) -> usize {
        self.days.iter().map(|day| day.tasks.len()).sum()
    }

    pub fn contains_task(&self, id: &str) -> bool {
        self.tasks().any(|task| task.id == id)
    }

    /// Day tab shown first: the one matching today's weekday, else the first day.
    pub fn active_day_id(&self, today: NaiveDate) -> &str {
        let wanted = weekday_id(today.weekday());
        self.days
            .iter()
            .find(|day| day.id == wanted)
            .or_else(|| self.days.first())
            .map(|day| day.id.as_str())
            .unwrap_or_default()
    }

    pub fn builtin() -> Self {
        let weekday_plan: [(&str, &str, &str); 5] = [
            ("06:00", "Wake up and hydrate", "Half a litre of water before anything else."),
            ("06:30", "Training", "45 minutes following the day's block."),
            ("08:00", "Deep work", "Two hours on the main project, phone away."),
            ("13:00", "Balanced lunch", "Protein, vegetables and a slow carb."),
            ("21:30", "Read and wind down", "20 pages, screens off by 22:00."),
        ];

        Schedule {
            days: vec![
                plan_day("monday", "Mon", &weekday_plan),
                plan_day("tuesday", "Tue", &weekday_plan),
                plan_day("wednesday", "Wed", &weekday_plan),
                plan_day("thursday", "Thu", &weekday_plan),
                plan_day("friday", "Fri", &weekday_plan),
                plan_day(
                    "saturday",
                    "Sat",
                    &[
                        ("07:00", "Long run", "Easy pace, 60 minutes."),
                        ("10:00", "Weekly review", "Check progress and adjust next week."),
                        ("18:00", "Meal prep", "Cook for the first half of the week."),
                    ],
                ),
                plan_day(
                    "sunday",
                    "Sun",
                    &[
                        ("08:00", "Mobility session", "30 minutes of stretching."),
                        ("11:00", "Time outdoors", "A walk without headphones."),
                        ("20:00", "Plan the week", "Write down the three priorities."),
                    ],
                ),
            ],
        }
    }
}

fn reject_placeholder(fields: &[&str]) -> Result<(), ScheduleError> {
    match fields.iter().find(|field| field.contains("{{")) {
        Some(field) => Err(ScheduleError::Placeholder(field.to_string())),
        None => Ok(()),
    }
}

fn plan_day(id: &str, label: &str, tasks: &[(&str, &str, &str)]) -> ScheduleDay {
    ScheduleDay {
        id: id.to_string(),
        label: label.to_string(),
        tasks: tasks
            .iter()
            .enumerate()
            .map(|(index, (time, title, detail))| ScheduledTask {
                id: format!("{id}-{}", index + 1),
                time: time.to_string(),
                title: title.to_string(),
                detail: detail.to_string(),
            })
            .collect(),
    }
}

fn weekday_id(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}
