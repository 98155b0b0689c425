//! Shell-style record files: one `schedule[Day]="..."` assignment per weekday.
//!
//! Each value is `study_time|goals||PLANS||<plans json>`, escaped for a
//! double-quoted shell literal. Files written before the plans list existed
//! carry seven pipe-delimited fields and no separator; those are read through
//! [`pre_json_day`].

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use crate::core::sanitize::clean_text;
use crate::core::{DaySchedule, Plan, WeekSchedule, Weekday};

use super::plans::plan_list_or_empty;

/// Separates the pipe-delimited fields from the plans JSON.
pub const PLAN_SEPARATOR: &str = "||PLANS||";

/// Matches each day's assignment, allowing backslash-escaped quotes inside.
static DAY_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    Weekday::ALL
        .iter()
        .map(|day| {
            Regex::new(&format!(
                r#"schedule\[{}\]="((?:[^"\\]|\\.)*)""#,
                regex::escape(day.as_label())
            ))
            .unwrap()
        })
        .collect()
});

/// Result of reading a record file.
#[derive(Debug, Clone)]
pub struct DecodedRecords {
    pub schedule: WeekSchedule,
    /// Days whose assignment line was found.
    pub matched: Vec<Weekday>,
}

impl DecodedRecords {
    pub fn matched_any(&self) -> bool {
        !self.matched.is_empty()
    }
}

pub struct RecordWriter;

impl RecordWriter {
    /// Write a complete record file: preamble plus one assignment per day.
    pub fn write_file(week: &WeekSchedule, saved_on: NaiveDate) -> String {
        let mut out = String::new();
        out.push_str(&format!("# Schedule data saved on {}\n", saved_on.format("%Y-%m-%d")));
        out.push_str("days=(\n");
        for day in Weekday::ALL {
            out.push_str(&format!("  \"{}\"\n", day));
        }
        out.push_str(")\n\n");
        out.push_str("declare -A schedule\n");

        for (day, schedule) in week.iter() {
            out.push_str(&Self::write_day(day, schedule));
        }
        out
    }

    /// Write a single day's assignment line, newline included.
    pub fn write_day(day: Weekday, schedule: &DaySchedule) -> String {
        let clean = schedule.sanitized(day);
        let plans_json = match serde_json::to_string(&clean.plans) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Could not serialize plans for {}: {}. Saving empty plans list.", day, e);
                "[]".to_string()
            }
        };

        format!(
            "schedule[{}]=\"{}|{}{}{}\"\n",
            day,
            shell_escape(&clean.study_time),
            shell_escape(&clean.goals),
            PLAN_SEPARATOR,
            shell_escape(&plans_json)
        )
    }
}

pub struct RecordParser;

impl RecordParser {
    /// Decode a record file. Never fails: anything unreadable falls back to
    /// defaults for the affected day or plan, with a log entry.
    pub fn parse(input: &str) -> DecodedRecords {
        let mut schedule = WeekSchedule::default();
        let mut matched = Vec::new();

        for day in Weekday::ALL {
            let Some(caps) = DAY_RES[day.index()].captures(input) else {
                log::warn!("Could not find schedule data entry for day {}. Using defaults for this day.", day);
                continue;
            };
            schedule.set_day(day, Self::parse_day(day, &caps[1]));
            matched.push(day);
        }

        if matched.is_empty() {
            log::warn!("Could not parse any valid schedule entries. Using defaults.");
        }
        DecodedRecords { schedule, matched }
    }

    /// Decode the raw (still escaped) content between a day's outer quotes.
    pub fn parse_day(day: Weekday, raw: &str) -> DaySchedule {
        let mut out = DaySchedule::new(day);
        let (legacy_part, json_part) = match raw.split_once(PLAN_SEPARATOR) {
            Some((legacy, json)) => (legacy, Some(json)),
            None => (raw, None),
        };

        let legacy = shell_unescape(legacy_part);
        let fields: Vec<&str> = legacy.split('|').collect();

        let study_time = clean_text(fields[0]);
        if !study_time.is_empty() && !study_time.contains("information") {
            out.study_time = study_time;
        }
        if let Some(goals) = fields.get(1) {
            out.goals = clean_text(goals);
        }

        match json_part {
            Some(json) => out.plans = plan_list_or_empty(&shell_unescape(json), day),
            None => {
                if let Some((goals, plans)) = pre_json_day(&fields) {
                    log::debug!("Converted legacy work/notes fields to plans for {}", day);
                    out.goals = goals;
                    out.plans = plans;
                }
            }
        }
        out
    }
}

/// Compatibility shim for the seven-field format that predates the plans list:
/// `study|dg_work|dg_hours|jj_work|jj_hours|goals|notes`.
///
/// Returns the goals and the plans synthesized from the two yes/no work entries
/// and the day note, or `None` when there are too few fields.
fn pre_json_day(fields: &[&str]) -> Option<(String, Vec<Plan>)> {
    if fields.len() < 7 {
        return None;
    }
    let goals = clean_text(fields[5]);
    let mut plans = Vec::new();
    if fields[1] == "yes" {
        plans.push(Plan::new("Dollar General", clean_text(fields[2])));
    }
    if fields[3] == "yes" {
        plans.push(Plan::new("JJ Pizza", clean_text(fields[4])));
    }
    let note = clean_text(fields[6]);
    if !note.is_empty() {
        plans.push(Plan::new("Note", note));
    }
    Some((goals, plans))
}

/// Escape for embedding inside a double-quoted shell literal.
pub fn shell_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Reverse of [`shell_escape`]. A backslash before anything other than a quote
/// or backslash is kept as-is.
pub fn shell_unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '"' || next == '\\' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn sample_week() -> WeekSchedule {
        let mut week = WeekSchedule::default();
        week.set_day(
            Weekday::Monday,
            DaySchedule {
                study_time: "9:00-1:00".to_string(),
                goals: "Chapter \"4\" review".to_string(),
                plans: vec![
                    Plan::new("Work", "Dollar General 2-8"),
                    Plan::new("Call mom", ""),
                    Plan::new("Café", "with Zoë"),
                ],
            },
        );
        week.set_day(
            Weekday::Sun,
            DaySchedule {
                study_time: "12:00-2:00".to_string(),
                goals: String::new(),
                plans: vec![Plan::new("Pray", "Mass at 10, \"early\"")],
            },
        );
        week
    }

    #[test]
    fn file_has_preamble_and_every_day() {
        let out = RecordWriter::write_file(&WeekSchedule::default(), date());
        assert!(out.starts_with("# Schedule data saved on 2026-03-02\ndays=(\n  \"Monday\"\n"));
        assert!(out.contains("declare -A schedule\n"));
        assert!(out.contains("schedule[Sun]=\"12:00-2:00|||PLANS||[]\"\n"));
        assert_eq!(out.matches("schedule[").count(), 7);
    }

    #[test]
    fn quotes_in_json_are_double_escaped() {
        let day = DaySchedule {
            study_time: String::new(),
            goals: "say \"hi\"".to_string(),
            plans: vec![Plan::new("A \"B\"", "c")],
        };
        let line = RecordWriter::write_day(Weekday::Wed, &day);
        assert_eq!(
            line,
            "schedule[Wed]=\"|say \\\"hi\\\"||PLANS||[{\\\"name\\\":\\\"A \\\\\\\"B\\\\\\\"\\\",\\\"details\\\":\\\"c\\\"}]\"\n"
        );
    }

    #[test]
    fn roundtrip_preserves_week() {
        let week = sample_week();
        let decoded = RecordParser::parse(&RecordWriter::write_file(&week, date()));
        assert_eq!(decoded.matched, Weekday::ALL.to_vec());
        assert_eq!(decoded.schedule, week.sanitized());
    }

    #[test]
    fn nameless_plans_are_not_persisted() {
        let mut week = WeekSchedule::default();
        week.day_mut(Weekday::Fri).plans = vec![Plan::new("<>", "lost"), Plan::new("Kept", "yes")];
        let decoded = RecordParser::parse(&RecordWriter::write_file(&week, date()));
        assert_eq!(decoded.schedule.day(Weekday::Fri).plans, vec![Plan::new("Kept", "yes")]);
    }

    #[test]
    fn legacy_seven_field_record() {
        let input = "schedule[Tues]=\"10:00-2:00|yes|3-9pm|yes|5-10pm|Essay draft|Bring lunch\"\n";
        let decoded = RecordParser::parse(input);
        let tues = decoded.schedule.day(Weekday::Tues);
        assert_eq!(tues.study_time, "10:00-2:00");
        assert_eq!(tues.goals, "Essay draft");
        assert_eq!(
            tues.plans,
            vec![
                Plan::new("Dollar General", "3-9pm"),
                Plan::new("JJ Pizza", "5-10pm"),
                Plan::new("Note", "Bring lunch"),
            ]
        );
        assert_eq!(decoded.matched, vec![Weekday::Tues]);
    }

    #[test]
    fn legacy_record_without_work_or_note() {
        let input = "schedule[Wed]=\"|no||maybe||Goals here|\"\n";
        let wed = RecordParser::parse(input).schedule.day(Weekday::Wed).clone();
        assert_eq!(wed.study_time, "11:00-3:00");
        assert_eq!(wed.goals, "Goals here");
        assert!(wed.plans.is_empty());
    }

    #[test]
    fn short_legacy_record_has_no_plans() {
        let wed = RecordParser::parse("schedule[Wed]=\"8:00-9:00|Read\"").schedule;
        assert_eq!(wed.day(Weekday::Wed).goals, "Read");
        assert!(wed.day(Weekday::Wed).plans.is_empty());
    }

    #[test]
    fn captured_prompt_text_falls_back_to_default_study_time() {
        let input = "schedule[Thur]=\"\u{1b}[0;33mStudy information for Thur:\u{1b}[0m|goal||PLANS||[]\"";
        let thur = RecordParser::parse(input).schedule.day(Weekday::Thur).clone();
        assert_eq!(thur.study_time, "11:00-3:00");
        assert_eq!(thur.goals, "goal");

        let input = "schedule[Thur]=\"more information needed|||PLANS||[]\"";
        let thur = RecordParser::parse(input).schedule.day(Weekday::Thur).clone();
        assert_eq!(thur.study_time, "11:00-3:00");
    }

    #[test]
    fn corrupt_json_only_affects_its_day() {
        let mut week = sample_week();
        week.day_mut(Weekday::Wed).plans = vec![Plan::new("Lab", "3pm")];
        let encoded = RecordWriter::write_file(&week, date());
        let corrupt = encoded.replace(
            "schedule[Wed]=\"11:00-3:00|||PLANS||[",
            "schedule[Wed]=\"11:00-3:00|||PLANS||[[",
        );
        assert_ne!(corrupt, encoded);

        let decoded = RecordParser::parse(&corrupt);
        assert!(decoded.schedule.day(Weekday::Wed).plans.is_empty());
        assert_eq!(decoded.schedule.day(Weekday::Wed).study_time, "11:00-3:00");
        assert_eq!(decoded.schedule.day(Weekday::Monday), week.sanitized().day(Weekday::Monday));
        assert_eq!(decoded.schedule.day(Weekday::Sun), week.sanitized().day(Weekday::Sun));
    }

    #[test]
    fn non_list_json_gives_empty_plans() {
        let input = r#"schedule[Sat]="1:00-2:00|g||PLANS||{\"name\":\"x\"}""#;
        let sat = RecordParser::parse(input).schedule.day(Weekday::Sat).clone();
        assert_eq!(sat.goals, "g");
        assert!(sat.plans.is_empty());
    }

    #[test]
    fn missing_days_use_defaults() {
        let input = "schedule[Fri]=\"7:00-8:00|Run||PLANS||[]\"\n";
        let decoded = RecordParser::parse(input);
        assert_eq!(decoded.matched, vec![Weekday::Fri]);
        assert_eq!(decoded.schedule.day(Weekday::Fri).goals, "Run");
        assert_eq!(decoded.schedule.day(Weekday::Monday), &DaySchedule::new(Weekday::Monday));
    }

    #[test]
    fn nothing_matched() {
        let decoded = RecordParser::parse("garbage\nmore garbage");
        assert!(!decoded.matched_any());
        assert_eq!(decoded.schedule, WeekSchedule::default());
    }

    #[test]
    fn unescape_reverses_escape() {
        for s in ["", "plain", "a\"b", "back\\slash\\\"mix", "trailing\\"] {
            assert_eq!(shell_unescape(&shell_escape(s)), s);
        }
        assert_eq!(shell_unescape("\\n"), "\\n");
    }
}
