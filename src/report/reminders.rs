use chrono::NaiveDate;

use crate::core::{Plan, WeekSchedule, Weekday};

use super::text::{boxed, boxed_blank, boxed_center, rule, title_block, wrap, INNER_WIDTH};

const GOAL_WIDTH: usize = 54;
const DETAILS_WIDTH: usize = 23;

/// Buckets for grouping plans in the reminders report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanCategory {
    Work,
    Appointment,
    Eating,
    Sleeping,
    Praying,
    Break,
    Study,
    Play,
    Youtube,
    Other,
}

impl PlanCategory {
    /// Order in which keywords are tried; the first match wins.
    const MATCH_ORDER: [PlanCategory; 9] = [
        PlanCategory::Work,
        PlanCategory::Appointment,
        PlanCategory::Eating,
        PlanCategory::Sleeping,
        PlanCategory::Praying,
        PlanCategory::Break,
        PlanCategory::Study,
        PlanCategory::Play,
        PlanCategory::Youtube,
    ];

    /// Order in which populated categories are printed.
    pub const DISPLAY_ORDER: [PlanCategory; 10] = [
        PlanCategory::Work,
        PlanCategory::Appointment,
        PlanCategory::Eating,
        PlanCategory::Youtube,
        PlanCategory::Sleeping,
        PlanCategory::Praying,
        PlanCategory::Break,
        PlanCategory::Study,
        PlanCategory::Play,
        PlanCategory::Other,
    ];

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            PlanCategory::Work => &["work", "dollar general", "jj"],
            PlanCategory::Appointment => &["appointment", "appt", "meeting"],
            PlanCategory::Eating => &["eat", "meal", "lunch", "dinner"],
            PlanCategory::Sleeping => &["sleep", "night", "bedtime", "nap", "rest"],
            PlanCategory::Praying => &["pray", "worship", "rosary", "meditation"],
            PlanCategory::Break => &["break", "relax", "chill"],
            PlanCategory::Study => &["study", "homework", "assignment", "revision", "research"],
            PlanCategory::Play => &["play", "game", "gaming", "fun", "outside"],
            PlanCategory::Youtube => &["youtube", "video", "watch"],
            PlanCategory::Other => &[],
        }
    }

    /// Case-insensitive substring match on the plan name.
    pub fn classify(name: &str) -> PlanCategory {
        let name = name.to_lowercase();
        Self::MATCH_ORDER
            .into_iter()
            .find(|category| category.keywords().iter().any(|kw| name.contains(kw)))
            .unwrap_or(PlanCategory::Other)
    }

    pub fn heading(&self) -> &'static str {
        match self {
            PlanCategory::Work => "🤯 WORK SCHEDULE",
            PlanCategory::Appointment => "📬 APPOINTMENTS",
            PlanCategory::Eating => "🍽️ EATING PLANS",
            PlanCategory::Youtube => "📺 YOUTUBE VIDEOS",
            PlanCategory::Sleeping => "😪 SLEEPING",
            PlanCategory::Praying => "🙏 PRAYING & WORSHIP",
            PlanCategory::Break => "🛌 BREAKS & RELAXATION",
            PlanCategory::Study => "📚 STUDY PLANS",
            PlanCategory::Play => "🎮 PLAY PLANS",
            PlanCategory::Other => "📌 OTHER ACTIVITIES",
        }
    }
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn placeholder() -> Vec<String> {
    vec![
        rule('┌', '─', '┐', None),
        boxed_blank(),
        boxed_center("No specific goals or plans set for this week"),
        boxed_blank(),
        boxed_center("_____"),
        boxed_center("( o.o )"),
        boxed_center("> ^ <"),
        boxed_blank(),
        rule('└', '─', '┘', None),
    ]
}

fn goals_block(goals: &[(Weekday, &str)]) -> Vec<String> {
    let mut out = vec![rule('┌', '─', '┐', Some("🎯 WEEKLY GOALS")), boxed_blank()];
    for (day, goal) in goals {
        out.push(boxed(&format!(
            "  {:<12} {:<width$}",
            day.as_label(),
            truncate(goal, GOAL_WIDTH),
            width = GOAL_WIDTH
        )));
        let rest: String = goal.chars().skip(GOAL_WIDTH).collect();
        for line in wrap(rest.trim(), GOAL_WIDTH) {
            out.push(boxed(&format!("  {:12} {:<width$}", "", line, width = GOAL_WIDTH)));
        }
        out.push(boxed_blank());
    }
    out.push(rule('└', '─', '┘', None));
    out.push(String::new());
    out
}

fn plans_block(plans: &[(Weekday, &Plan)]) -> Vec<String> {
    let mut out = vec![rule('┌', '─', '┐', Some("📋 WEEKLY PLANS")), boxed_blank()];
    for category in PlanCategory::DISPLAY_ORDER {
        let members: Vec<_> = plans
            .iter()
            .filter(|(_, plan)| PlanCategory::classify(&plan.name) == category)
            .collect();
        if members.is_empty() {
            continue;
        }
        let heading = category.heading();
        out.push(boxed(&format!("  {}", heading)));
        out.push(boxed(&format!("  {}", "─".repeat(heading.chars().count()))));
        for (day, plan) in members {
            out.push(boxed(&format!(
                "  • {:<10} {:<25} {:<width$}",
                day.as_label(),
                plan.name,
                truncate(&plan.details, DETAILS_WIDTH),
                width = DETAILS_WIDTH
            )));
        }
        out.push(boxed_blank());
    }
    out.push(rule('└', '─', '┘', None));
    out
}

fn footer() -> Vec<String> {
    let sparks = "   💡 (x-x)!   ".repeat(4);
    vec![
        String::new(),
        format!("{:═<width$}", "═══_^_══════════_^_══════════_^_══════════_^_", width = INNER_WIDTH + 2),
        format!("{:^width$}", sparks.trim_end(), width = INNER_WIDTH + 2),
        format!("{:═<width$}", "══=(_)═════════=(_)═════════=(_)═════════=(_)", width = INNER_WIDTH + 2),
    ]
}

/// Render goals per day and visible plans grouped by category.
pub fn render_reminders(week: &WeekSchedule, date: NaiveDate) -> String {
    let mut out = title_block("WEEKLY GOALS & REMINDERS", date);

    let goals: Vec<(Weekday, &str)> = week
        .iter()
        .filter(|(_, day)| !day.goals.is_empty())
        .map(|(weekday, day)| (weekday, day.goals.as_str()))
        .collect();
    let plans: Vec<(Weekday, &Plan)> = week
        .iter()
        .flat_map(|(weekday, day)| day.visible_plans().map(move |plan| (weekday, plan)))
        .collect();

    if goals.is_empty() && plans.is_empty() {
        out.extend(placeholder());
    } else {
        if !goals.is_empty() {
            out.extend(goals_block(&goals));
        }
        if !plans.is_empty() {
            out.extend(plans_block(&plans));
        }
    }
    out.extend(footer());
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DaySchedule;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 6).unwrap()
    }

    #[test]
    fn classify_follows_keyword_priority() {
        assert_eq!(PlanCategory::classify("Work shift"), PlanCategory::Work);
        assert_eq!(PlanCategory::classify("Dentist appt"), PlanCategory::Appointment);
        assert_eq!(PlanCategory::classify("Lunch with Sam"), PlanCategory::Eating);
        // "work" is tried before "eat"
        assert_eq!(PlanCategory::classify("Eat at work"), PlanCategory::Work);
        assert_eq!(PlanCategory::classify("Watch YouTube"), PlanCategory::Youtube);
        assert_eq!(PlanCategory::classify("Rosary"), PlanCategory::Praying);
        assert_eq!(PlanCategory::classify("Dollar General"), PlanCategory::Work);
        // "night" sleeping outranks "gaming" play
        assert_eq!(PlanCategory::classify("Gaming night"), PlanCategory::Sleeping);
        assert_eq!(PlanCategory::classify("Groceries"), PlanCategory::Other);
        assert_eq!(PlanCategory::classify("NAP"), PlanCategory::Sleeping);
    }

    #[test]
    fn empty_week_shows_placeholder() {
        let text = render_reminders(&WeekSchedule::default(), date());
        assert!(text.contains("No specific goals or plans set for this week"));
        assert!(!text.contains("WEEKLY GOALS ─"));
        assert!(text.contains("WEEKLY GOALS & REMINDERS"));
    }

    #[test]
    fn long_goal_is_truncated_then_wrapped() {
        let mut week = WeekSchedule::default();
        let goal = format!("{}{}", "a".repeat(54), " tail words here");
        week.day_mut(Weekday::Tues).goals = goal;
        let text = render_reminders(&week, date());
        let first = format!("│  {:<12} {} │", "Tues", "a".repeat(54));
        assert!(text.lines().any(|l| l.starts_with(first.trim_end_matches(" │"))));
        assert!(text.contains(&format!("│  {:12} tail words here", "")));
        assert!(!text.contains("No specific goals"));
    }

    #[test]
    fn categories_print_in_display_order() {
        let mut week = WeekSchedule::default();
        week.set_day(
            Weekday::Monday,
            DaySchedule {
                study_time: String::new(),
                goals: String::new(),
                plans: vec![
                    Plan::new("Board games", "8pm"),
                    Plan::new("YouTube edit", "after class"),
                    Plan::new("Shift at JJ", "5-10"),
                    Plan::new("Hidden", ""),
                ],
            },
        );
        let text = render_reminders(&week, date());
        let work = text.find("WORK SCHEDULE").unwrap();
        let youtube = text.find("YOUTUBE VIDEOS").unwrap();
        let play = text.find("PLAY PLANS").unwrap();
        assert!(work < youtube && youtube < play);
        assert!(!text.contains("Hidden"));
        assert!(!text.contains("OTHER ACTIVITIES"));
        assert!(text.contains(&format!("  • {:<10} {:<25} {:<23}", "Monday", "Shift at JJ", "5-10")));
    }

    #[test]
    fn plan_details_are_cut_to_column() {
        let mut week = WeekSchedule::default();
        week.day_mut(Weekday::Sat).plans = vec![Plan::new("Errands", "x".repeat(40))];
        let text = render_reminders(&week, date());
        assert!(text.contains(&"x".repeat(23)));
        assert!(!text.contains(&"x".repeat(24)));
    }
}
