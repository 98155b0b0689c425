pub mod html;
pub mod reminders;
pub mod text;

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use crate::config::SmakerConfig;
use crate::core::WeekSchedule;
use crate::store::restrict_permissions;

pub use html::render_html;
pub use reminders::render_reminders;
pub use text::{render_schedule, WeekSummary};

/// Paths of the reports that were written. A report that failed to write is `None`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub schedule: Option<PathBuf>,
    pub reminders: Option<PathBuf>,
    pub html: Option<PathBuf>,
}

impl GeneratedFiles {
    /// Render and write all three reports. Each file is attempted on its own,
    /// so one failure does not stop the others.
    pub fn write_all(config: &SmakerConfig, week: &WeekSchedule, notes: &str, date: NaiveDate) -> Self {
        let schedule_path = config.schedule_text_path();
        let reminders_path = config.reminders_path();
        let html_path = config.html_path();

        let schedule = write_report(&schedule_path, &render_schedule(week, date), "Schedule");
        let reminders = write_report(&reminders_path, &render_reminders(week, date), "Reminders");
        let html = write_report(&html_path, &render_html(week, notes, date), "HTML");
        if html {
            restrict_permissions(&html_path);
        }

        Self {
            schedule: schedule.then_some(schedule_path),
            reminders: reminders.then_some(reminders_path),
            html: html.then_some(html_path),
        }
    }

    /// Every report that was written, in attachment order.
    pub fn attachments(&self) -> Vec<&Path> {
        [&self.schedule, &self.reminders, &self.html]
            .into_iter()
            .flatten()
            .map(PathBuf::as_path)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.schedule.is_some() && self.reminders.is_some() && self.html.is_some()
    }
}

fn write_report(path: &Path, content: &str, label: &str) -> bool {
    let result = path
        .parent()
        .map_or(Ok(()), std::fs::create_dir_all)
        .and_then(|_| std::fs::write(path, content));
    match result {
        Ok(()) => {
            log::info!("{} saved to {}", label, path.display());
            true
        }
        Err(e) => {
            log::error!("Error saving {} to {}: {}", label.to_lowercase(), path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> SmakerConfig {
        SmakerConfig {
            config_dir: dir.path().to_path_buf(),
            ..SmakerConfig::default()
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 6).unwrap()
    }

    #[test]
    fn writes_all_three_reports() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let files = GeneratedFiles::write_all(&config, &WeekSchedule::default(), "bring snacks", date());
        assert!(files.is_complete());
        assert_eq!(files.attachments().len(), 3);

        let schedule = std::fs::read_to_string(config.schedule_text_path()).unwrap();
        assert!(schedule.contains("WEEKLY SCHEDULE"));
        let html = std::fs::read_to_string(config.html_path()).unwrap();
        assert!(html.contains("bring snacks"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(config.html_path()).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn one_failure_does_not_stop_the_rest() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        // a file where the Schedules directory should be
        std::fs::write(config.schedules_dir(), "blocker").unwrap();
        let files = GeneratedFiles::write_all(&config, &WeekSchedule::default(), "", date());
        assert!(files.schedule.is_none());
        assert!(files.reminders.is_none());
        assert_eq!(files.html, Some(config.html_path()));
        assert_eq!(files.attachments(), vec![config.html_path().as_path()]);
        assert!(!files.is_complete());
    }
}
