use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;

use crate::store::restrict_permissions;

pub const DEFAULT_RECIPIENT: &str = "your_default_recipient@example.com";
pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Secret-store service under which the SMTP password is kept.
pub const KEYRING_SERVICE: &str = "schedule_maker_email";

const CONFIG_FILE_NAME: &str = "config.toml";

static LEGACY_EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"EMAIL="([^"]*)""#).unwrap());

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".schedule_config")
}

/// Non-secret email settings. The SMTP password never lives here.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EmailSettings {
    pub email_to: String,
    pub email_from: String,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_user: String,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            email_to: DEFAULT_RECIPIENT.to_string(),
            email_from: String::new(),
            smtp_server: DEFAULT_SMTP_SERVER.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            smtp_user: String::new(),
        }
    }
}

impl EmailSettings {
    /// Recipient, sender, user and server are all required to send.
    pub fn is_complete(&self) -> bool {
        [&self.email_to, &self.email_from, &self.smtp_user, &self.smtp_server]
            .iter()
            .all(|s| !s.is_empty())
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SmakerConfig {
    #[serde(skip)]
    pub config_dir: PathBuf,
    pub debug_logging: bool,
    pub email: EmailSettings,
}

impl Default for SmakerConfig {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            debug_logging: false,
            email: EmailSettings::default(),
        }
    }
}

impl SmakerConfig {
    /// Load `config.toml` from `dir` (or the default directory). A missing file
    /// gives defaults; a recipient from the legacy `config.sh` is honoured while
    /// the recipient is still the built-in default.
    pub fn load(dir: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config_dir = dir.unwrap_or_else(default_config_dir);
        let path = config_dir.join(CONFIG_FILE_NAME);
        let mut config: SmakerConfig = if path.exists() {
            toml::from_str(&std::fs::read_to_string(&path)?)?
        } else {
            SmakerConfig::default()
        };
        config.config_dir = config_dir;
        config.apply_legacy_config();
        Ok(config)
    }

    /// Like [`load`](Self::load), but a broken config file is logged and
    /// replaced by defaults.
    pub fn load_or_default(dir: Option<PathBuf>) -> Self {
        Self::load(dir.clone()).unwrap_or_else(|e| {
            log::error!("Could not load config, using defaults: {}", e);
            let mut config = SmakerConfig::default();
            if let Some(dir) = dir {
                config.config_dir = dir;
            }
            config
        })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.config_dir)?;
        let path = self.config_file_path();
        std::fs::write(&path, toml::to_string_pretty(self)?)?;
        restrict_permissions(&path);
        log::debug!("Non-sensitive settings saved to {}", path.display());
        Ok(())
    }

    fn apply_legacy_config(&mut self) {
        let path = self.legacy_config_path();
        if !path.exists() || self.email.email_to != DEFAULT_RECIPIENT {
            return;
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                if let Some(caps) = LEGACY_EMAIL_RE.captures(&content) {
                    self.email.email_to = caps[1].to_string();
                    log::debug!("Loaded legacy config recipient {}", &caps[1]);
                }
            }
            Err(e) => log::warn!("Could not read legacy config file {}: {}", path.display(), e),
        }
    }

    pub fn config_file_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    pub fn schedules_dir(&self) -> PathBuf {
        self.config_dir.join("Schedules")
    }

    pub fn answers_dir(&self) -> PathBuf {
        self.config_dir.join("PA")
    }

    pub fn schedule_text_path(&self) -> PathBuf {
        self.schedules_dir().join("schedule.txt")
    }

    pub fn reminders_path(&self) -> PathBuf {
        self.schedules_dir().join("schedule_reminders.txt")
    }

    pub fn html_path(&self) -> PathBuf {
        self.config_dir.join("schedule_email.html")
    }

    pub fn notes_path(&self) -> PathBuf {
        self.config_dir.join("schedule_notes.txt")
    }

    /// Shell-style record file written by earlier versions.
    pub fn records_path(&self) -> PathBuf {
        self.answers_dir().join("previous_answers.sh")
    }

    pub fn document_path(&self) -> PathBuf {
        self.answers_dir().join("schedule.json")
    }

    pub fn legacy_config_path(&self) -> PathBuf {
        self.config_dir.join("config.sh")
    }

    /// Ensure the configuration directory tree exists.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [&self.config_dir, &self.schedules_dir(), &self.answers_dir()] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
