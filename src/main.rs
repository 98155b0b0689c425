mod cli;
mod prompt;

use clap::Parser;

use smaker::config::{SmakerConfig, KEYRING_SERVICE};
use smaker::core::WeekSchedule;
use smaker::mail::{send_schedule_email, SecretServiceStore, SecretStore};
use smaker::report::{render_html, render_reminders, render_schedule, GeneratedFiles};
use smaker::store::{today, LoadOrigin, ScheduleStore};

use cli::{Cli, Command, NotesArgs, ShowArgs};
use prompt::Action;

type AppResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Log to the systemd user journal (`journalctl --user -t smaker -f`).
/// smaker records pass at info/debug, everything else at warn.
fn init_logging() {
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("smaker") {
                let max = if smaker::debug_logging() { log::LevelFilter::Debug } else { log::LevelFilter::Info };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    // No journal socket means no log sink; the tool itself still works.
    let Ok(journal) = systemd_journal_logger::JournalLog::new() else {
        return;
    };
    let journal = journal.with_syslog_identifier("smaker".to_string());
    if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
        // Global max must be Debug so smaker debug logs can pass through when toggled
        log::set_max_level(log::LevelFilter::Debug);
    }
}

struct App {
    config: SmakerConfig,
    store: ScheduleStore,
    secrets: SecretServiceStore,
}

impl App {
    fn new(config: SmakerConfig) -> Self {
        if let Err(e) = config.ensure_dirs() {
            log::warn!("Could not create {}: {}", config.config_dir.display(), e);
        }
        let store = ScheduleStore::new(&config);
        Self {
            config,
            store,
            secrets: SecretServiceStore,
        }
    }

    fn load_week(&self) -> (WeekSchedule, LoadOrigin) {
        let loaded = self.store.load_schedule();
        match loaded.origin {
            LoadOrigin::Corrupt => println!("The saved schedule could not be read. Starting from defaults."),
            LoadOrigin::Empty => println!("The saved schedule held no days. Starting from defaults."),
            LoadOrigin::Migrated => println!("Schedule moved to {}.", self.store.document_path().display()),
            LoadOrigin::Stored | LoadOrigin::Legacy | LoadOrigin::Missing => {}
        }
        (loaded.schedule, loaded.origin)
    }

    fn regenerate(&self, week: &WeekSchedule) -> GeneratedFiles {
        let notes = self.store.load_notes();
        let files = GeneratedFiles::write_all(&self.config, week, &notes, today());
        for (label, path) in [
            ("Schedule", &files.schedule),
            ("Reminders", &files.reminders),
            ("HTML", &files.html),
        ] {
            match path {
                Some(path) => println!("{} saved to {}", label, path.display()),
                None => println!("{} could not be written; see the journal for details.", label),
            }
        }
        files
    }

    fn generate(&self) {
        let (week, _) = self.load_week();
        self.regenerate(&week);
    }

    fn show(&self, args: &ShowArgs) {
        let (week, _) = self.load_week();
        let out = if args.reminders {
            render_reminders(&week, today())
        } else if args.html {
            render_html(&week, &self.store.load_notes(), today())
        } else {
            render_schedule(&week, today())
        };
        println!("{}", out);
    }

    fn replace_notes(&self, notes: &str) -> AppResult {
        self.store.save_notes(notes)?;
        println!("Notes saved!");
        let (week, _) = self.load_week();
        self.regenerate(&week);
        Ok(())
    }

    fn notes(&self, args: &NotesArgs) -> AppResult {
        if let Some(text) = &args.set {
            let notes = prompt::notes_from_lines(text.lines().map(|l| Ok(l.to_string())));
            return self.replace_notes(&notes);
        }
        if args.edit {
            return self.edit_notes();
        }
        let notes = self.store.load_notes();
        if notes.is_empty() {
            println!("No additional notes.");
        } else {
            println!("{}", notes);
        }
        Ok(())
    }

    fn edit_notes(&self) -> AppResult {
        match prompt::collect_notes(&self.store.load_notes())? {
            Some(notes) => self.replace_notes(&notes),
            None => Ok(()),
        }
    }

    async fn configure(&mut self) -> AppResult {
        let stored = self
            .secrets
            .get_secret(KEYRING_SERVICE, &self.config.email.smtp_user)
            .await
            .ok()
            .flatten()
            .is_some();
        let answers = prompt::collect_email_settings(&self.config.email, stored)?;
        self.config.email = answers.settings;
        self.config.save()?;
        println!("Non-sensitive settings saved to {}", self.config.config_file_path().display());

        if let Some(password) = answers.password {
            match self
                .secrets
                .set_secret(KEYRING_SERVICE, &self.config.email.smtp_user, &password)
                .await
            {
                Ok(()) => println!("Password stored in the system keyring."),
                Err(e) => {
                    log::error!("{}", e);
                    println!("Could not store the password: {}", e);
                }
            }
        }
        Ok(())
    }

    async fn email(&mut self, interactive: bool) -> AppResult {
        let (week, _) = self.load_week();
        let files = self.regenerate(&week);
        println!("Attempting to send email to {}...", self.config.email.email_to);
        let outcome = send_schedule_email(&self.config.email, &self.secrets, &files, today()).await;
        println!("{}", outcome.message);
        if !outcome.success
            && outcome.reconfigure
            && interactive
            && prompt::confirm("Configure email settings now?", true)?
        {
            self.configure().await?;
        }
        Ok(())
    }

    async fn edit(&mut self) -> AppResult {
        prompt::header("WEEKLY SCHEDULE GENERATOR");
        let (loaded, origin) = self.load_week();
        let start = if origin.used_defaults() {
            println!("No previous schedule found. Creating a new one.");
            WeekSchedule::default()
        } else if prompt::confirm("Load your previous schedule as a starting point?", true)? {
            println!("Previous schedule loaded. You can now update it.");
            loaded
        } else {
            println!("Starting with a default schedule.");
            WeekSchedule::default()
        };

        let week = prompt::collect_week(&start)?;
        self.store.save_schedule(&week)?;
        self.regenerate(&week);

        loop {
            match prompt::choose_action(&self.config.email.email_to)? {
                Action::Notes => self.edit_notes()?,
                Action::Email => self.email(true).await?,
                Action::Configure => {
                    self.configure().await?;
                    self.regenerate(&week);
                }
                Action::Quit => break,
            }
        }
        prompt::header("SCHEDULE GENERATION COMPLETE");
        Ok(())
    }

    fn export_records(&self, path: Option<&std::path::Path>) -> AppResult {
        let (week, _) = self.load_week();
        let written = self.store.export_records(&week, path)?;
        println!("Records written to {}", written.display());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> AppResult {
    let cli = Cli::parse();
    smaker::set_debug_logging(cli.debug);
    init_logging();

    let config = SmakerConfig::load_or_default(cli.config_dir.clone());
    if config.debug_logging {
        smaker::set_debug_logging(true);
    }

    let mut app = App::new(config);
    match cli.resolved_command() {
        Command::Edit => app.edit().await?,
        Command::Generate => app.generate(),
        Command::Show(args) => app.show(&args),
        Command::Notes(args) => app.notes(&args)?,
        Command::Configure => app.configure().await?,
        Command::Email => app.email(false).await?,
        Command::ExportRecords { path } => app.export_records(path.as_deref())?,
    }
    Ok(())
}
