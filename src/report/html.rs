use chrono::NaiveDate;
use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::core::{DaySchedule, WeekSchedule, Weekday};

const DAYS_PER_ROW: usize = 3;

/// Render the email document with its stylesheet inlined onto elements.
pub fn render_html(week: &WeekSchedule, notes: &str, date: NaiveDate) -> String {
    inline_css(&render_page(week, notes, date).into_string())
}

/// Move stylesheet rules into `style` attributes, keeping the `<style>` block
/// for clients that honour it. On failure the markup is returned as is.
pub fn inline_css(markup: &str) -> String {
    let inliner = css_inline::CSSInliner::options()
        .keep_style_tags(true)
        .keep_link_tags(false)
        .load_remote_stylesheets(false)
        .build();
    match inliner.inline(markup) {
        Ok(inlined) => {
            log::info!("Generated email-compatible HTML content.");
            inlined
        }
        Err(e) => {
            log::error!("Error during CSS inlining: {}", e);
            markup.to_string()
        }
    }
}

pub fn render_page(week: &WeekSchedule, notes: &str, date: NaiveDate) -> Markup {
    let date = date.format("%Y-%m-%d").to_string();
    let days: Vec<(Weekday, &DaySchedule)> = week.iter().collect();
    let rows: Vec<_> = days.chunks(DAYS_PER_ROW).collect();
    let notes = notes.trim();

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Weekly Schedule - " (date) }
                style type="text/css" { (PreEscaped(CSS)) }
            }
            body {
                table.wrapper cellpadding="0" cellspacing="0" border="0" width="100%" {
                    tr {
                        td.wrapper-cell align="center" {
                            table.container cellpadding="0" cellspacing="0" border="0" width="100%" {
                                tr {
                                    td.header {
                                        h1 { "My Weekly Schedule" }
                                        p.date { (date) }
                                    }
                                }
                                tr {
                                    td.content {
                                        table.grid cellpadding="0" cellspacing="0" border="0" width="100%" {
                                            @for (idx, row) in rows.iter().enumerate() {
                                                tr {
                                                    @for (day, schedule) in row.iter() {
                                                        (render_day(*day, schedule))
                                                    }
                                                    @for _ in row.len()..DAYS_PER_ROW {
                                                        td.day-column.filler width="33%" {}
                                                    }
                                                }
                                                @if idx + 1 < rows.len() {
                                                    tr { td.row-gap colspan="3" {} }
                                                }
                                            }
                                        }
                                        @if !notes.is_empty() {
                                            table.notes cellpadding="0" cellspacing="0" border="0" width="100%" {
                                                tr {
                                                    td.notes-cell {
                                                        h3 { "Additional Notes" }
                                                        pre { (notes) }
                                                    }
                                                }
                                            }
                                        }
                                    }
                                }
                                tr {
                                    td.footer {
                                        p { "Schedule generated on " (date) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn render_day(day: Weekday, schedule: &DaySchedule) -> Markup {
    let color = day.card_color();
    html! {
        td.day-column width="33%" valign="top" {
            table.day-table cellpadding="0" cellspacing="0" border="0" width="100%" {
                tr {
                    td.day-header style={ "background-color: " (color) ";" } {
                        h3 { (day) }
                    }
                }
                tr {
                    td.day-body {
                        @if !schedule.study_time.is_empty() {
                            (render_entry(color, "Study Time", &schedule.study_time))
                        }
                        @if !schedule.goals.is_empty() {
                            (render_entry(color, "Goals", &schedule.goals))
                        }
                        @for plan in schedule.visible_plans() {
                            (render_entry(color, &plan.name, &plan.details))
                        }
                        @if !schedule.has_content() {
                            table cellpadding="0" cellspacing="0" border="0" width="100%" {
                                tr { td.empty-cell { p.empty { "No schedule set" } } }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn render_entry(color: &str, label: &str, text: &str) -> Markup {
    html! {
        table.entry cellpadding="0" cellspacing="0" border="0" width="100%" {
            tr {
                td.entry-cell style={ "border-left: 3px solid " (color) ";" } {
                    p.entry-label { (label) }
                    p.entry-text { (text) }
                }
            }
        }
    }
}

const CSS: &str = r#"
body, table, td, a { text-size-adjust: 100%; -webkit-text-size-adjust: 100%; -ms-text-size-adjust: 100%; }
table, td { mso-table-lspace: 0pt; mso-table-rspace: 0pt; }
table { border-collapse: collapse !important; }
body { margin: 0; padding: 0; width: 100% !important; min-width: 100%; background-color: #f6f9fc; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif; }
.wrapper { background-color: #f6f9fc; }
.wrapper-cell { padding: 40px 20px; }
.container { max-width: 800px; background-color: #ffffff; border-radius: 8px; box-shadow: 0 4px 6px rgba(0, 0, 0, 0.07); }
.header { padding: 40px 30px; text-align: center; background-color: #1a365d; border-radius: 8px 8px 0 0; }
.header h1 { margin: 0; color: #ffffff; font-size: 28px; font-weight: 700; line-height: 1.2; }
.header .date { margin: 10px 0 0 0; color: #e2e8f0; font-size: 16px; }
.content { padding: 30px; }
.grid { margin-bottom: 30px; }
.day-column { padding: 0 5px 15px 5px; }
.day-table { background-color: #ffffff; border: 1px solid #e5e7eb; border-radius: 6px; overflow: hidden; }
.day-header { padding: 12px 15px; text-align: center; }
.day-header h3 { margin: 0; color: #ffffff; font-size: 18px; font-weight: 600; }
.day-body { padding: 15px; }
.entry { margin-bottom: 12px; }
.entry-cell { padding-left: 12px; }
.entry-label { margin: 0 0 4px 0; color: #374151; font-size: 14px; font-weight: 600; }
.entry-text { margin: 0; color: #6b7280; font-size: 13px; }
.empty-cell { padding: 8px 0; }
.empty { margin: 0; color: #9ca3af; font-size: 13px; font-style: italic; text-align: center; }
.row-gap { height: 10px; }
.notes { margin-top: 30px; }
.notes-cell { background-color: #f9fafb; border: 1px solid #e5e7eb; border-radius: 6px; padding: 20px; }
.notes-cell h3 { margin: 0 0 12px 0; color: #1f2937; font-size: 18px; font-weight: 600; }
.notes-cell pre { margin: 0; color: #4b5563; font-size: 14px; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif; white-space: pre-wrap; word-wrap: break-word; }
.footer { padding: 30px; text-align: center; border-top: 1px solid #e5e7eb; }
.footer p { margin: 0; color: #6b7280; font-size: 13px; }
@media screen and (max-width: 600px) {
    .container { width: 100% !important; max-width: 100% !important; }
    .day-column { width: 100% !important; display: block !important; margin-bottom: 20px !important; }
    .day-table { width: 100% !important; }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Plan;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 6).unwrap()
    }

    #[test]
    fn user_text_is_escaped() {
        let mut week = WeekSchedule::default();
        week.day_mut(Weekday::Monday).goals = "<script>alert(1)</script>".to_string();
        week.day_mut(Weekday::Fri).plans = vec![Plan::new("Tom & Jerry", "<b>late</b>")];
        let html = render_html(&week, "a < b", date());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<b>late"));
        assert!(html.contains("Tom &amp; Jerry"));
        assert!(html.contains("a &lt; b"));
    }

    #[test]
    fn every_day_gets_a_card() {
        let html = render_page(&WeekSchedule::default(), "", date()).into_string();
        for day in Weekday::ALL {
            assert!(html.contains(&format!("<h3>{}</h3>", day)));
            assert!(html.contains(day.card_color()));
        }
        // 7 days in rows of 3 leave two filler cells
        assert_eq!(html.matches("filler").count(), 2);
        assert_eq!(html.matches("row-gap\"").count(), 2);
    }

    #[test]
    fn notes_section_only_when_present() {
        let without = render_page(&WeekSchedule::default(), "  \n ", date()).into_string();
        assert!(!without.contains("Additional Notes"));
        let with = render_page(&WeekSchedule::default(), "bring id\nDIEEEEE\n", date()).into_string();
        assert!(with.contains("Additional Notes"));
        assert!(with.contains("<pre>bring id\nDIEEEEE</pre>"));
    }

    #[test]
    fn empty_days_and_hidden_plans() {
        let mut week = WeekSchedule::default();
        *week.day_mut(Weekday::Sat) = DaySchedule {
            study_time: String::new(),
            goals: String::new(),
            plans: vec![Plan::new("Invisible", " ")],
        };
        let html = render_page(&week, "", date()).into_string();
        assert_eq!(html.matches("No schedule set").count(), 1);
        assert!(!html.contains("Invisible"));
        assert!(html.contains("Weekly Schedule - 2026-04-06"));
        assert!(html.contains("Schedule generated on 2026-04-06"));
    }

    #[test]
    fn styles_are_inlined() {
        let raw = render_page(&WeekSchedule::default(), "notes", date()).into_string();
        let inlined = inline_css(&raw);
        assert!(inlined.matches("style=\"").count() > raw.matches("style=\"").count());
        assert!(inlined.contains("<style"));
        assert!(inlined.contains("#1a365d"));
    }
}
