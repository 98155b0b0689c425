use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use crate::core::WeekSchedule;

/// Columns between the box borders.
pub const INNER_WIDTH: usize = 71;

const GOALS_WRAP: usize = 60;
const DETAILS_WRAP: usize = 57;

static STUDY_SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+):(\d+)-(\d+):(\d+)").unwrap());

/// Week totals shown under the schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeekSummary {
    pub study_hours: f64,
    pub visible_plans: usize,
    pub days_with_goals: usize,
}

impl WeekSummary {
    pub fn compute(week: &WeekSchedule) -> Self {
        let mut summary = Self {
            study_hours: 0.0,
            visible_plans: 0,
            days_with_goals: 0,
        };
        for (_, day) in week.iter() {
            summary.study_hours += study_hours(&day.study_time);
            summary.visible_plans += day.visible_plans().count();
            if !day.goals.is_empty() {
                summary.days_with_goals += 1;
            }
        }
        summary
    }
}

/// Hours in an `H:MM-H:MM` span. An end hour below the start hour is read as
/// the afternoon (`11:00-3:00` is four hours). Anything else counts as zero.
pub fn study_hours(span: &str) -> f64 {
    let Some(caps) = STUDY_SPAN_RE.captures(span) else {
        return 0.0;
    };
    let parts: Option<Vec<u32>> = (1..=4).map(|i| caps[i].parse().ok()).collect();
    let Some(&[start_h, start_m, end_h, end_m]) = parts.as_deref() else {
        return 0.0;
    };
    let end_h = if end_h < start_h {
        match end_h.checked_add(12) {
            Some(h) => h,
            None => return 0.0,
        }
    } else {
        end_h
    };
    (f64::from(end_h) + f64::from(end_m) / 60.0) - (f64::from(start_h) + f64::from(start_m) / 60.0)
}

pub(crate) fn boxed(content: &str) -> String {
    format!("│{:<width$}│", content, width = INNER_WIDTH)
}

pub(crate) fn boxed_blank() -> String {
    boxed("")
}

pub(crate) fn boxed_center(content: &str) -> String {
    format!("│{:^width$}│", content, width = INNER_WIDTH)
}

/// A horizontal rule with an optional label set into the middle.
pub(crate) fn rule(left: char, fill: char, right: char, label: Option<&str>) -> String {
    let mut out = String::new();
    out.push(left);
    match label {
        Some(label) => {
            let label = format!(" {} ", label);
            let remaining = INNER_WIDTH.saturating_sub(label.chars().count());
            let lead = remaining / 2;
            out.extend(std::iter::repeat_n(fill, lead));
            out.push_str(&label);
            out.extend(std::iter::repeat_n(fill, remaining - lead));
        }
        None => out.extend(std::iter::repeat_n(fill, INNER_WIDTH)),
    }
    out.push(right);
    out
}

/// The double-line title block shared by the text reports.
pub(crate) fn title_block(title: &str, date: NaiveDate) -> Vec<String> {
    vec![
        rule('╔', '═', '╗', None),
        format!("║{:^width$}║", title, width = INNER_WIDTH),
        format!("║{:^width$}║", format!("{:^25}", date.format("%Y-%m-%d").to_string()), width = INNER_WIDTH),
        rule('╚', '═', '╝', None),
        String::new(),
    ]
}

pub(crate) fn wrap(text: &str, width: usize) -> Vec<String> {
    textwrap::wrap(text, width)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

/// Render the boxed plain-text week with its summary.
pub fn render_schedule(week: &WeekSchedule, date: NaiveDate) -> String {
    let mut out = title_block("WEEKLY SCHEDULE", date);

    for (day, schedule) in week.iter() {
        let label = day.as_label().to_uppercase();
        if day.index() == 0 {
            out.push(rule('┌', '─', '┐', Some(&label)));
        } else {
            out.push(rule('├', '─', '┤', Some(&label)));
        }

        if !schedule.has_content() {
            out.push(boxed_blank());
            out.push(boxed_center("No schedule set"));
            out.push(boxed_blank());
            continue;
        }

        if !schedule.study_time.is_empty() {
            out.push(boxed_blank());
            out.push(boxed("  📚 STUDY TIME"));
            out.push(boxed(&format!("     {}", schedule.study_time)));
        }

        if !schedule.goals.is_empty() {
            out.push(boxed_blank());
            out.push(boxed("  🎯 GOALS"));
            for line in wrap(&schedule.goals, GOALS_WRAP) {
                out.push(boxed(&format!("     {}", line)));
            }
        }

        let visible: Vec<_> = schedule.visible_plans().collect();
        if !visible.is_empty() {
            out.push(boxed_blank());
            out.push(boxed("  📋 PLANS & ACTIVITIES"));
            for plan in &visible {
                out.push(boxed(&format!("     • {}", plan.name)));
                for line in wrap(&plan.details, DETAILS_WRAP) {
                    out.push(boxed(&format!("       {}", line)));
                }
            }
            if visible.len() > 1 {
                out.push(boxed_blank());
            }
        }

        if schedule.goals.is_empty() && visible.is_empty() {
            out.push(boxed_blank());
        }
    }
    out.push(rule('└', '─', '┘', None));
    out.push(String::new());

    let summary = WeekSummary::compute(week);
    let heavy = "═".repeat(INNER_WIDTH);
    out.push(heavy.clone());
    out.push(format!("{:^width$}", "WEEK SUMMARY", width = INNER_WIDTH));
    out.push(heavy);
    out.push(String::new());
    out.push(format!("  📊 Total Study Hours Scheduled: {:.1} hours", summary.study_hours));
    out.push(format!("  📋 Total Plans/Activities: {}", summary.visible_plans));
    out.push(format!("  🎯 Days with Goals Set: {}/7", summary.days_with_goals));
    out.push(String::new());

    let light = "─".repeat(INNER_WIDTH);
    out.push(light.clone());
    out.push(format!("Generated on {} • Schedule Maker v6", date.format("%Y-%m-%d")));
    out.push(light);

    out.join("\n")
}
