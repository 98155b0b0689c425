use dialoguer::{Confirm, Input, Password, Select};
use std::io::BufRead;

use smaker::config::{EmailSettings, DEFAULT_SMTP_PORT};
use smaker::core::sanitize::{is_valid_email, sanitize, PASSTHROUGH_SENTINEL};
use smaker::core::{DaySchedule, Plan, WeekSchedule, Weekday};

pub type PromptResult<T> = Result<T, dialoguer::Error>;

pub fn header(title: &str) {
    let rule = "=".repeat(55);
    println!("{}\n{:^55}\n{}\n", rule, title, rule);
}

pub fn confirm(question: &str, default: bool) -> PromptResult<bool> {
    Confirm::new().with_prompt(question).default(default).interact()
}

fn ask(prompt: &str, default: &str) -> PromptResult<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .allow_empty(true)
        .interact_text()
}

/// Walk through every day. A day left unfinished keeps `start`'s values.
pub fn collect_week(start: &WeekSchedule) -> PromptResult<WeekSchedule> {
    let mut week = start.clone();
    for day in Weekday::ALL {
        let collected = collect_day(day, start.day(day))?;
        week.set_day(day, collected);
        println!();
    }
    Ok(week)
}

fn collect_day(day: Weekday, current: &DaySchedule) -> PromptResult<DaySchedule> {
    header(&format!("SCHEDULE FOR {}", day));

    let study_time = sanitize(ask("Study time", &current.study_time)?.trim());
    let goals = sanitize(ask(&format!("Study goals for {} (Enter for none)", day), &current.goals)?.trim());

    let mut plans = Vec::new();
    if !current.plans.is_empty() {
        println!("Existing plans:");
        for (i, plan) in current.plans.iter().enumerate() {
            println!("  {}. {}: {}", i + 1, plan.name, plan.details);
        }
        if !confirm("Clear existing plans and enter new ones?", false)? {
            println!("Keeping existing plans.");
            plans = current.plans.clone();
        }
    }

    if plans.is_empty() {
        while confirm(&format!("Add a plan for {}?", day), plans.is_empty())? {
            let name = sanitize(ask("  Plan name", "")?.trim());
            let details = sanitize(ask("  Plan details (e.g., hours, location)", "")?.trim());
            if name.is_empty() {
                println!("Plan name cannot be empty. Plan not added.");
                continue;
            }
            plans.push(Plan::new(name, details));
        }
    }

    Ok(DaySchedule {
        study_time,
        goals,
        plans,
    })
}

/// Collect note lines until a line reading `END`. The sentinel line is kept
/// verbatim; every other line is sanitized.
pub fn notes_from_lines<I>(lines: I) -> String
where
    I: IntoIterator<Item = std::io::Result<String>>,
{
    let mut kept = Vec::new();
    for line in lines {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::warn!("Notes input interrupted: {}", e);
                break;
            }
        };
        if line.trim().eq_ignore_ascii_case("END") {
            break;
        }
        if line == PASSTHROUGH_SENTINEL {
            kept.push(line);
        } else {
            kept.push(sanitize(&line));
        }
    }
    kept.join("\n")
}

/// Show the current notes and, if wanted, read replacements from stdin.
/// `None` means keep what is there.
pub fn collect_notes(previous: &str) -> PromptResult<Option<String>> {
    header("ADDITIONAL SCHEDULE NOTES");
    if !previous.is_empty() {
        println!("Previous notes:\n{}\n{}", previous, "-".repeat(20));
        if !confirm("Would you like to update/replace these notes?", false)? {
            println!("Keeping previous notes.");
            return Ok(None);
        }
    }
    println!("Enter any additional notes for this week (type 'END' on a line by itself when finished):");
    let stdin = std::io::stdin();
    Ok(Some(notes_from_lines(stdin.lock().lines())))
}

fn ask_email(prompt: &str, default: &str) -> PromptResult<String> {
    let mut input = Input::<String>::new().with_prompt(prompt);
    if !default.is_empty() {
        input = input.default(default.to_string());
    }
    input
        .validate_with(|s: &String| -> Result<(), &str> {
            if is_valid_email(s.trim()) {
                Ok(())
            } else {
                Err("Invalid email format. Please try again.")
            }
        })
        .interact_text()
        .map(|s| s.trim().to_string())
}

/// Unparseable ports fall back to `current`.
pub fn parse_port(input: &str, current: u16) -> u16 {
    match input.trim().parse::<u16>() {
        Ok(port) if port > 0 => port,
        _ => {
            println!("Invalid port number. Using {}.", current);
            current
        }
    }
}

/// New settings plus, when the user typed one, a password for the secret store.
pub struct EmailAnswers {
    pub settings: EmailSettings,
    pub password: Option<String>,
}

pub fn collect_email_settings(current: &EmailSettings, password_stored: bool) -> PromptResult<EmailAnswers> {
    header("EMAIL CONFIGURATION");
    println!("Enter/Update email settings. The password is kept in the system keyring.");

    let mut settings = current.clone();
    settings.email_to = ask_email("Recipient email", &current.email_to)?;
    settings.email_from = ask_email("Sender email", &current.email_from)?;
    settings.smtp_server = ask("SMTP server", &current.smtp_server)?.trim().to_string();
    let port_default = if current.smtp_port == 0 { DEFAULT_SMTP_PORT } else { current.smtp_port };
    settings.smtp_port = parse_port(&ask("SMTP port", &port_default.to_string())?, port_default);
    let user_default = if current.smtp_user.is_empty() {
        settings.email_from.clone()
    } else {
        current.smtp_user.clone()
    };
    settings.smtp_user = ask("SMTP username", &user_default)?.trim().to_string();

    let same_user = settings.smtp_user == current.smtp_user;
    let want_password = !(password_stored && same_user)
        || confirm(&format!("Password already stored for {}. Update it?", settings.smtp_user), false)?;
    let password = if want_password {
        let entered = Password::new()
            .with_prompt(format!("SMTP password for {}", settings.smtp_user))
            .allow_empty_password(true)
            .interact()?;
        (!entered.is_empty()).then_some(entered)
    } else {
        None
    };

    Ok(EmailAnswers { settings, password })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Notes,
    Email,
    Configure,
    Quit,
}

/// The menu shown after editing the week.
pub fn choose_action(recipient: &str) -> PromptResult<Action> {
    let picked = Select::new()
        .with_prompt("Choose action")
        .item("Notes      - Add/Update additional notes")
        .item(format!("Email      - Send schedule email to {}", recipient))
        .item("Configure  - Change email settings")
        .item("Quit       - Exit")
        .default(0)
        .interact()?;
    Ok(match picked {
        0 => Action::Notes,
        1 => Action::Email,
        2 => Action::Configure,
        _ => Action::Quit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(input: &str) -> Vec<std::io::Result<String>> {
        input.lines().map(|l| Ok(l.to_string())).collect()
    }

    #[test]
    fn notes_stop_at_end_marker() {
        let notes = notes_from_lines(lines("first; line\nDIEEEEE\n  end  \nnever read"));
        assert_eq!(notes, "first line\nDIEEEEE");
    }

    #[test]
    fn notes_keep_what_was_read_before_an_error() {
        let mut input = lines("kept <b>");
        input.push(Err(std::io::Error::other("closed")));
        input.push(Ok("lost".to_string()));
        assert_eq!(notes_from_lines(input), "kept b");
    }

    #[test]
    fn notes_without_end_take_everything() {
        assert_eq!(notes_from_lines(lines("a\n\nb")), "a\n\nb");
    }

    #[test]
    fn port_parsing_falls_back() {
        assert_eq!(parse_port(" 465 ", 587), 465);
        assert_eq!(parse_port("smtp", 587), 587);
        assert_eq!(parse_port("0", 25), 25);
        assert_eq!(parse_port("70000", 587), 587);
    }
}
