pub mod document;
pub mod plans;
pub mod record;

use std::path::{Path, PathBuf};

use crate::config::SmakerConfig;
use crate::core::WeekSchedule;
use document::{DocumentParser, DocumentWriter};
use record::{RecordParser, RecordWriter};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where a loaded schedule came from, so callers can tell the fallbacks apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Read from the schedule document.
    Stored,
    /// Read from the record file, which was then migrated to the document.
    Migrated,
    /// Read from the record file, but the migration write failed.
    Legacy,
    /// Nothing persisted yet; defaults.
    Missing,
    /// A file existed but could not be read or parsed; defaults.
    Corrupt,
    /// A record file existed but held no day entries; defaults.
    Empty,
}

impl LoadOrigin {
    pub fn used_defaults(&self) -> bool {
        matches!(self, Self::Missing | Self::Corrupt | Self::Empty)
    }
}

#[derive(Debug, Clone)]
pub struct Loaded {
    pub schedule: WeekSchedule,
    pub origin: LoadOrigin,
}

impl Loaded {
    fn defaults(origin: LoadOrigin) -> Self {
        Self {
            schedule: WeekSchedule::default(),
            origin,
        }
    }
}

/// Reads and writes the schedule document, the legacy record file and the notes file.
pub struct ScheduleStore {
    document_path: PathBuf,
    records_path: PathBuf,
    notes_path: PathBuf,
}

impl ScheduleStore {
    pub fn new(config: &SmakerConfig) -> Self {
        Self {
            document_path: config.document_path(),
            records_path: config.records_path(),
            notes_path: config.notes_path(),
        }
    }

    pub fn document_path(&self) -> &Path {
        &self.document_path
    }

    /// Load the week. Never fails; every problem ends in defaults plus a log entry.
    pub fn load_schedule(&self) -> Loaded {
        if self.document_path.exists() {
            return self.load_document();
        }
        if self.records_path.exists() {
            return self.migrate_records();
        }
        log::debug!("No schedule found at {}. Using defaults.", self.document_path.display());
        Loaded::defaults(LoadOrigin::Missing)
    }

    fn load_document(&self) -> Loaded {
        let content = match std::fs::read_to_string(&self.document_path) {
            Ok(c) => c,
            Err(e) => {
                log::error!("Error reading schedule from {}: {}. Using defaults.", self.document_path.display(), e);
                return Loaded::defaults(LoadOrigin::Corrupt);
            }
        };
        match DocumentParser::parse(&content) {
            Ok(schedule) => Loaded {
                schedule,
                origin: LoadOrigin::Stored,
            },
            Err(e) => {
                log::error!("Schedule document {} is {}. Using defaults.", self.document_path.display(), e);
                Loaded::defaults(LoadOrigin::Corrupt)
            }
        }
    }

    /// One-time move from the record file to the document. The record file is
    /// renamed to `*.migrated` once the document is written.
    fn migrate_records(&self) -> Loaded {
        let content = match std::fs::read_to_string(&self.records_path) {
            Ok(c) => c,
            Err(e) => {
                log::error!("Error reading schedule data from {}: {}. Using defaults.", self.records_path.display(), e);
                return Loaded::defaults(LoadOrigin::Corrupt);
            }
        };
        let decoded = RecordParser::parse(&content);
        if !decoded.matched_any() {
            return Loaded::defaults(LoadOrigin::Empty);
        }

        if let Err(e) = self.save_schedule(&decoded.schedule) {
            log::error!("Migration: failed to write {}: {}", self.document_path.display(), e);
            return Loaded {
                schedule: decoded.schedule,
                origin: LoadOrigin::Legacy,
            };
        }
        let retired = append_suffix(&self.records_path, ".migrated");
        if let Err(e) = std::fs::rename(&self.records_path, &retired) {
            log::warn!("Failed to retire old record file {}: {}", self.records_path.display(), e);
        }
        log::info!(
            "Migrated {} days from {} to {}",
            decoded.matched.len(),
            self.records_path.display(),
            self.document_path.display()
        );
        Loaded {
            schedule: decoded.schedule,
            origin: LoadOrigin::Migrated,
        }
    }

    pub fn save_schedule(&self, week: &WeekSchedule) -> Result<(), StoreError> {
        let content = DocumentWriter::write(week, today())?;
        write_with_backup(&self.document_path, &content)?;
        log::debug!("Schedule saved to {}", self.document_path.display());
        Ok(())
    }

    /// Write the week in the shell-record format, for tools that still source it.
    pub fn export_records(&self, week: &WeekSchedule, path: Option<&Path>) -> Result<PathBuf, StoreError> {
        let path = path.unwrap_or(&self.records_path);
        write_with_backup(path, &RecordWriter::write_file(week, today()))?;
        log::info!("Schedule records exported to {}", path.display());
        Ok(path.to_path_buf())
    }

    pub fn load_notes(&self) -> String {
        match std::fs::read_to_string(&self.notes_path) {
            Ok(notes) => notes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                log::error!("Error reading notes file {}: {}", self.notes_path.display(), e);
                String::new()
            }
        }
    }

    /// Notes are stored verbatim.
    pub fn save_notes(&self, notes: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.notes_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.notes_path, notes)?;
        restrict_permissions(&self.notes_path);
        log::debug!("Notes saved to {}", self.notes_path.display());
        Ok(())
    }
}

/// Local calendar date used to stamp saved files and reports.
pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// `<file>.bak_<unix seconds>` beside it.
pub fn backup_path(path: &Path, unix_secs: i64) -> PathBuf {
    append_suffix(path, &format!(".bak_{}", unix_secs))
}

/// Backups kept per file; older ones are removed after each new backup.
pub const KEPT_BACKUPS: usize = 5;

/// Overwrite `path`, first copying any existing file to a timestamped backup.
/// A failed backup is logged and does not stop the write.
pub fn write_with_backup(path: &Path, content: &str) -> std::io::Result<()> {
    write_with_backup_at(path, content, chrono::Utc::now().timestamp())
}

fn write_with_backup_at(path: &Path, content: &str, unix_secs: i64) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if path.exists() {
        let backup = backup_path(path, unix_secs);
        match std::fs::copy(path, &backup) {
            Ok(_) => {
                log::debug!("Created backup at {}", backup.display());
                prune_backups(path, KEPT_BACKUPS);
            }
            Err(e) => log::warn!("Could not create backup of {}: {}", path.display(), e),
        }
    }
    std::fs::write(path, content)?;
    restrict_permissions(path);
    Ok(())
}

/// Remove all but the `keep` newest `<file>.bak_<secs>` files beside `path`.
pub fn prune_backups(path: &Path, keep: usize) {
    let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
        return;
    };
    let prefix = format!("{}.bak_", name.to_string_lossy());
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Could not list backups in {}: {}", dir.display(), e);
            return;
        }
    };

    let mut backups: Vec<(i64, PathBuf)> = entries
        .flatten()
        .filter_map(|entry| {
            let file_name = entry.file_name();
            let secs = file_name.to_str()?.strip_prefix(&prefix)?.parse().ok()?;
            entry.file_type().ok()?.is_file().then(|| (secs, entry.path()))
        })
        .collect();
    if backups.len() <= keep {
        return;
    }
    backups.sort_by_key(|(secs, _)| std::cmp::Reverse(*secs));
    for (_, old) in backups.drain(keep..) {
        match std::fs::remove_file(&old) {
            Ok(()) => log::debug!("Removed old backup {}", old.display()),
            Err(e) => log::warn!("Could not remove old backup {}: {}", old.display(), e),
        }
    }
}

/// Owner read/write only, where the platform supports it.
pub fn restrict_permissions(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
            log::warn!("Could not set permissions on {}: {}", path.display(), e);
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}
