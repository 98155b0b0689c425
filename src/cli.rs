use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "smaker")]
#[command(version)]
#[command(about = "Plan the week, then print, file or email it", long_about = None)]
pub struct Cli {
    /// Directory holding schedules, notes and settings
    #[arg(long, global = true, env = "SMAKER_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Log debug detail to the journal
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fill in the week day by day, then save and regenerate the reports
    Edit,
    /// Regenerate the reports from the saved week
    #[command(alias = "auto")]
    Generate,
    /// Print a rendered view of the saved week
    Show(ShowArgs),
    /// Show or replace the additional notes
    Notes(NotesArgs),
    /// Set up email delivery
    Configure,
    /// Regenerate the reports and email them
    Email,
    /// Write the week in the shell record format
    ExportRecords {
        /// Destination; defaults to PA/previous_answers.sh
        path: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ShowArgs {
    /// Show the goals and reminders view
    #[arg(long, conflicts_with = "html")]
    pub reminders: bool,

    /// Show the HTML email document
    #[arg(long)]
    pub html: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct NotesArgs {
    /// Replace the notes without prompting
    #[arg(long)]
    pub set: Option<String>,

    /// Enter new notes interactively
    #[arg(long, conflicts_with = "set")]
    pub edit: bool,
}

impl Cli {
    /// The chosen subcommand, `edit` when none was given.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Edit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn edit_is_the_default() {
        let cli = Cli::try_parse_from(["smaker"]).unwrap();
        assert!(matches!(cli.resolved_command(), Command::Edit));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["smaker", "show", "--reminders", "--config-dir", "/tmp/x", "--debug"]).unwrap();
        assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/x")));
        assert!(cli.debug);
        match cli.resolved_command() {
            Command::Show(args) => assert!(args.reminders && !args.html),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn auto_alias_and_export_path() {
        let cli = Cli::try_parse_from(["smaker", "auto"]).unwrap();
        assert!(matches!(cli.resolved_command(), Command::Generate));
        let cli = Cli::try_parse_from(["smaker", "export-records", "out.sh"]).unwrap();
        assert!(matches!(cli.resolved_command(), Command::ExportRecords { path: Some(p) } if p == PathBuf::from("out.sh")));
    }

    #[test]
    fn show_views_conflict() {
        assert!(Cli::try_parse_from(["smaker", "show", "--reminders", "--html"]).is_err());
    }
}
