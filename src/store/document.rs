//! The structured schedule document, one JSON object per weekday.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::core::sanitize::sanitize;
use crate::core::{DaySchedule, Plan, WeekSchedule, Weekday};

use super::plans::{log_rejected, plans_from_value};

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("missing \"days\" list")]
    MissingDays,
}

#[derive(Serialize)]
struct DocumentOut<'a> {
    saved: String,
    days: Vec<DayOut<'a>>,
}

#[derive(Serialize)]
struct DayOut<'a> {
    day: Weekday,
    study_time: &'a str,
    goals: &'a str,
    plans: &'a [Plan],
}

pub struct DocumentWriter;

impl DocumentWriter {
    /// Serialize the sanitized form of `week`; nameless plans are dropped.
    pub fn write(week: &WeekSchedule, saved_on: NaiveDate) -> Result<String, serde_json::Error> {
        let clean = week.sanitized();
        let doc = DocumentOut {
            saved: saved_on.format("%Y-%m-%d").to_string(),
            days: clean
                .iter()
                .map(|(day, schedule)| DayOut {
                    day,
                    study_time: &schedule.study_time,
                    goals: &schedule.goals,
                    plans: &schedule.plans,
                })
                .collect(),
        };
        let mut out = serde_json::to_string_pretty(&doc)?;
        out.push('\n');
        Ok(out)
    }
}

pub struct DocumentParser;

impl DocumentParser {
    /// Parse a schedule document. Only a document that is not JSON at all, or
    /// has no `days` list, is an error; anything below that level recovers
    /// per day or per plan.
    pub fn parse(input: &str) -> Result<WeekSchedule, DocumentError> {
        let value: Value = serde_json::from_str(input)?;
        let days = value
            .get("days")
            .and_then(Value::as_array)
            .ok_or(DocumentError::MissingDays)?;

        let mut week = WeekSchedule::default();
        for day in Weekday::ALL {
            let entry = days
                .iter()
                .filter_map(Value::as_object)
                .find(|obj| obj.get("day").and_then(Value::as_str) == Some(day.as_label()));
            match entry {
                Some(obj) => week.set_day(day, Self::parse_day(day, obj)),
                None => log::warn!("No entry for {} in schedule document. Using defaults for this day.", day),
            }
        }
        Ok(week)
    }

    fn parse_day(day: Weekday, obj: &serde_json::Map<String, Value>) -> DaySchedule {
        let mut out = DaySchedule::new(day);
        if let Some(study_time) = obj.get("study_time").and_then(Value::as_str) {
            out.study_time = sanitize(study_time);
        }
        if let Some(goals) = obj.get("goals").and_then(Value::as_str) {
            out.goals = sanitize(goals);
        }
        if let Some(plans) = obj.get("plans") {
            out.plans = plans_from_value(plans, day).unwrap_or_else(|e| {
                log_rejected(&e, &plans.to_string(), day);
                Vec::new()
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    #[test]
    fn roundtrip_keeps_pipes_and_empty_study_time() {
        let mut week = WeekSchedule::default();
        week.set_day(
            Weekday::Thur,
            DaySchedule {
                study_time: String::new(),
                goals: "math | physics".to_string(),
                plans: vec![Plan::new("Work", "JJ 5-10"), Plan::new("Nap", "")],
            },
        );
        let json = DocumentWriter::write(&week, date()).unwrap();
        assert!(json.contains("\"saved\": \"2026-01-05\""));
        assert_eq!(DocumentParser::parse(&json).unwrap(), week);
    }

    #[test]
    fn writer_drops_nameless_plans() {
        let mut week = WeekSchedule::default();
        week.day_mut(Weekday::Sat).plans = vec![Plan::new("$", "x"), Plan::new(";", "y")];
        let json = DocumentWriter::write(&week, date()).unwrap();
        let parsed = DocumentParser::parse(&json).unwrap();
        assert!(parsed.day(Weekday::Sat).plans.is_empty());
    }

    #[test]
    fn broken_day_entries_recover_individually() {
        let json = r#"{
            "days": [
                {"day": "Monday", "study_time": "8:00-10:00", "goals": "g", "plans": "oops"},
                {"day": "Wed", "plans": [{"name": "Lab", "details": "2pm"}, 7]},
                "not an object"
            ]
        }"#;
        let week = DocumentParser::parse(json).unwrap();
        let monday = week.day(Weekday::Monday);
        assert_eq!(monday.study_time, "8:00-10:00");
        assert!(monday.plans.is_empty());
        let wed = week.day(Weekday::Wed);
        assert_eq!(wed.study_time, "11:00-3:00");
        assert_eq!(wed.plans, vec![Plan::new("Lab", "2pm")]);
        assert_eq!(week.day(Weekday::Fri), &DaySchedule::new(Weekday::Fri));
    }

    #[test]
    fn rejects_non_documents() {
        assert!(matches!(DocumentParser::parse("{"), Err(DocumentError::Syntax(_))));
        assert!(matches!(DocumentParser::parse("[]"), Err(DocumentError::MissingDays)));
    }
}
