use serde::{Deserialize, Serialize};

use super::sanitize::sanitize;
use super::weekday::Weekday;

/// A named activity within a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub name: String,
    pub details: String,
}

impl Plan {
    pub fn new(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            details: details.into(),
        }
    }

    /// Only plans with details show up in rendered reports.
    pub fn is_visible(&self) -> bool {
        !self.details.trim().is_empty()
    }

    /// Sanitize both fields, or `None` when the name sanitizes to nothing.
    pub fn sanitized(&self) -> Option<Plan> {
        let name = sanitize(&self.name);
        if name.is_empty() {
            return None;
        }
        Some(Plan {
            name,
            details: sanitize(&self.details),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub study_time: String,
    pub goals: String,
    pub plans: Vec<Plan>,
}

impl DaySchedule {
    pub fn new(day: Weekday) -> Self {
        Self {
            study_time: day.default_study_time().to_string(),
            goals: String::new(),
            plans: Vec::new(),
        }
    }

    pub fn visible_plans(&self) -> impl Iterator<Item = &Plan> {
        self.plans.iter().filter(|p| p.is_visible())
    }

    /// Whether any report would show something for this day.
    pub fn has_content(&self) -> bool {
        !self.study_time.is_empty() || !self.goals.is_empty() || self.visible_plans().next().is_some()
    }

    /// The form this day takes once persisted: fields sanitized, nameless plans dropped.
    pub fn sanitized(&self, day: Weekday) -> DaySchedule {
        let plans: Vec<Plan> = self
            .plans
            .iter()
            .filter_map(|p| {
                let clean = p.sanitized();
                if clean.is_none() {
                    log::warn!("Skipping plan with empty name for {}: {:?}", day, p);
                }
                clean
            })
            .collect();
        DaySchedule {
            study_time: sanitize(&self.study_time),
            goals: sanitize(&self.goals),
            plans,
        }
    }
}

/// One `DaySchedule` per weekday, always all seven, in canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekSchedule {
    days: [DaySchedule; 7],
}

impl Default for WeekSchedule {
    fn default() -> Self {
        Self {
            days: Weekday::ALL.map(DaySchedule::new),
        }
    }
}

impl WeekSchedule {
    pub fn day(&self, day: Weekday) -> &DaySchedule {
        &self.days[day.index()]
    }

    pub fn day_mut(&mut self, day: Weekday) -> &mut DaySchedule {
        &mut self.days[day.index()]
    }

    /// Replace a whole day; the UI never patches individual fields.
    pub fn set_day(&mut self, day: Weekday, schedule: DaySchedule) {
        self.days[day.index()] = schedule;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &DaySchedule)> {
        Weekday::ALL.into_iter().zip(self.days.iter())
    }

    pub fn sanitized(&self) -> WeekSchedule {
        WeekSchedule {
            days: Weekday::ALL.map(|day| self.day(day).sanitized(day)),
        }
    }
}
