pub mod keyring;

use chrono::NaiveDate;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;

use crate::config::{EmailSettings, KEYRING_SERVICE};
use crate::report::GeneratedFiles;

pub use keyring::{MemorySecretStore, SecretServiceStore, SecretStore};

/// What the user is told after an email attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailOutcome {
    pub success: bool,
    pub message: String,
    /// The failure is fixed by `smaker configure`.
    pub reconfigure: bool,
}

impl MailOutcome {
    fn sent(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            reconfigure: false,
        }
    }

    fn failed(err: &MailError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            reconfigure: matches!(
                err,
                MailError::NotConfigured | MailError::MissingPassword(_) | MailError::Auth(_)
            ),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Email recipient/sender/user/server not configured.")]
    NotConfigured,
    #[error("Password for {0} not found in keyring.")]
    MissingPassword(String),
    #[error("Error retrieving password from keyring: {0}")]
    SecretStore(String),
    #[error("Failed to generate HTML email content.")]
    NoHtml,
    #[error("Failed to read generated HTML file: {0}")]
    ReadHtml(std::io::Error),
    #[error("Invalid email address {0:?}: {1}")]
    Address(String, lettre::address::AddressError),
    #[error("Could not build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("Email Authentication Failed: Check username/password (retrieved from keyring).")]
    Auth(#[source] lettre::transport::smtp::Error),
    #[error("Email Connection Failed: Could not connect to server.")]
    Connect(#[source] lettre::transport::smtp::Error),
    #[error("Email Failed: SMTP Error - {0}")]
    Transport(#[source] lettre::transport::smtp::Error),
}

impl MailError {
    /// Classify an SMTP error. 530/534/535 replies are credential problems;
    /// anything without a server reply is a connection problem.
    fn from_smtp(err: lettre::transport::smtp::Error) -> Self {
        let code = err.status().map(|c| c.to_string());
        match code.as_deref() {
            Some("530" | "534" | "535") => MailError::Auth(err),
            None if !err.is_response() => MailError::Connect(err),
            _ => MailError::Transport(err),
        }
    }

    /// Whether the `mail` command is worth trying after this failure.
    fn allows_fallback(&self) -> bool {
        matches!(self, MailError::Connect(_) | MailError::Transport(_))
    }
}

pub fn subject(date: NaiveDate) -> String {
    format!("Weekly Schedule - {}", date.format("%Y-%m-%d"))
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse()
        .map_err(|e| MailError::Address(address.to_string(), e))
}

/// HTML body with each existing file attached. An unreadable attachment is
/// skipped with a warning.
pub fn build_message(
    settings: &EmailSettings,
    html: String,
    attachments: &[&Path],
    date: NaiveDate,
) -> Result<Message, MailError> {
    let from = Mailbox::new(
        Some("Schedule Maker".to_string()),
        mailbox(&settings.email_from)?.email,
    );
    let to = mailbox(&settings.email_to)?;

    let mut body = MultiPart::mixed().singlepart(SinglePart::html(html));
    for path in attachments {
        let content = match std::fs::read(path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Could not attach file {}: {}", path.display(), e);
                continue;
            }
        };
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = if path.extension().is_some_and(|ext| ext == "html") {
            ContentType::TEXT_HTML
        } else {
            ContentType::TEXT_PLAIN
        };
        body = body.singlepart(Attachment::new(filename).body(content, content_type));
        log::debug!("Attached {}", path.display());
    }

    Ok(Message::builder()
        .from(from)
        .to(to)
        .subject(subject(date))
        .multipart(body)?)
}

async fn send_smtp(settings: &EmailSettings, password: String, message: Message) -> Result<(), MailError> {
    log::info!("Connecting to {}:{}", settings.smtp_server, settings.smtp_port);
    let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_server)
        .map_err(MailError::Connect)?
        .port(settings.smtp_port)
        .credentials(Credentials::new(settings.smtp_user.clone(), password))
        .build();
    log::info!("Sending email to: {}", settings.email_to);
    transport.send(message).await.map_err(MailError::from_smtp)?;
    Ok(())
}

/// Send through the system `mail` command with the HTML on stdin.
async fn send_with_mail_command(subject: &str, html: &str, attachments: &[&Path], to: &str) -> bool {
    let mut cmd = tokio::process::Command::new("mail");
    cmd.arg("-s")
        .arg(subject)
        .arg("-a")
        .arg("Content-Type: text/html; charset=utf-8");
    for path in attachments {
        cmd.arg("-A").arg(path);
    }
    cmd.arg(to)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    log::info!("Attempting backup mail command to {}", to);
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("'mail' command not found.");
            return false;
        }
        Err(e) => {
            log::error!("Backup email method failed: {}", e);
            return false;
        }
    };
    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(html.as_bytes()).await {
            log::error!("Could not write to 'mail' command: {}", e);
        }
    }
    match child.wait_with_output().await {
        Ok(output) if output.status.success() => {
            log::info!("Email sent using backup 'mail' command.");
            true
        }
        Ok(output) => {
            log::error!(
                "Backup 'mail' command failed. RC: {:?}. Stderr: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            );
            false
        }
        Err(e) => {
            log::error!("Backup email method failed: {}", e);
            false
        }
    }
}

async fn fetch_password<S: SecretStore>(settings: &EmailSettings, secrets: &S) -> Result<String, MailError> {
    match secrets.get_secret(KEYRING_SERVICE, &settings.smtp_user).await {
        Ok(Some(password)) if !password.is_empty() => Ok(password),
        Ok(_) => Err(MailError::MissingPassword(settings.smtp_user.clone())),
        Err(e) => Err(MailError::SecretStore(e)),
    }
}

/// Email the generated reports. Every failure is reported in the outcome.
pub async fn send_schedule_email<S: SecretStore>(
    settings: &EmailSettings,
    secrets: &S,
    files: &GeneratedFiles,
    date: NaiveDate,
) -> MailOutcome {
    if !settings.is_complete() {
        log::warn!("Email recipient/sender/user/server not configured. Cannot send email.");
        return MailOutcome::failed(&MailError::NotConfigured);
    }

    let password = match fetch_password(settings, secrets).await {
        Ok(password) => password,
        Err(e) => {
            log::error!("{}", e);
            return MailOutcome::failed(&e);
        }
    };

    let html = match read_html(files.html.as_deref()) {
        Ok(html) => html,
        Err(e) => {
            log::error!("{}", e);
            return MailOutcome::failed(&e);
        }
    };

    let attachments = files.attachments();
    let result = match build_message(settings, html.clone(), &attachments, date) {
        Ok(message) => send_smtp(settings, password, message).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => MailOutcome::sent(format!("Email sent successfully to {}.", settings.email_to)),
        Err(e) => {
            log::error!("{}", e);
            if e.allows_fallback()
                && send_with_mail_command(&subject(date), &html, &attachments, &settings.email_to).await
            {
                return MailOutcome::sent("Email sent using backup 'mail' command.");
            }
            MailOutcome::failed(&e)
        }
    }
}

fn read_html(path: Option<&Path>) -> Result<String, MailError> {
    let path = path.ok_or(MailError::NoHtml)?;
    std::fs::read_to_string(path).map_err(MailError::ReadHtml)
}
